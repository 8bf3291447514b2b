#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the firewatch application.
//!
//! Serves the REST API behind the wildfire-response dashboard: the
//! simulate → optimize → allocate → track workflow, incident queries and
//! statistics, operation center and equipment administration, officer
//! availability, and notifications. Report-building sessions live in
//! server memory, keyed by report id once a report exists; everything
//! durable goes through the relational store.

mod handlers;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use firewatch_database::{db, run_migrations};
use firewatch_optimizer::{HttpOptimizer, ResourceOptimizer};
use firewatch_simulation::{FireSimulator, HttpSimulator};
use firewatch_workflow::ReportSession;
use switchy_database::Database;

/// Shared application state.
pub struct AppState {
    /// Database connection.
    pub db: Arc<dyn Database>,
    /// Fire-spread simulation service client.
    pub simulator: Arc<dyn FireSimulator>,
    /// Resource optimization service client.
    pub optimizer: Arc<dyn ResourceOptimizer>,
    /// In-flight report-building sessions.
    pub sessions: SessionStore,
}

/// In-flight report-building sessions.
///
/// Sessions with a saved report are keyed by report id. A session whose
/// first save failed before the report existed still holds the
/// simulation result; it is keyed under a generated token that goes back
/// to the caller so the save can be retried without re-simulating.
///
/// Sessions are taken out of the map for the duration of a workflow
/// call and reinserted afterwards, so the lock is never held across an
/// await point.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, ReportSession>>,
}

impl SessionStore {
    /// Removes and returns the session stored under a key, if any.
    ///
    /// # Panics
    ///
    /// Panics if the session mutex is poisoned.
    pub fn take(&self, key: &str) -> Option<ReportSession> {
        self.sessions
            .lock()
            .expect("Session mutex poisoned")
            .remove(key)
    }

    /// Stores a session and returns the key it was stored under.
    ///
    /// Sessions with neither a report nor a held simulation result have
    /// nothing worth keeping and are dropped.
    ///
    /// # Panics
    ///
    /// Panics if the session mutex is poisoned.
    pub fn store(&self, session: ReportSession) -> Option<String> {
        let key = if let Some(report) = session.report() {
            report.id.clone()
        } else if session.has_pending() {
            uuid::Uuid::new_v4().to_string()
        } else {
            return None;
        };
        self.sessions
            .lock()
            .expect("Session mutex poisoned")
            .insert(key.clone(), session);
        Some(key)
    }
}

/// Starts the firewatch API server.
///
/// Connects to the database, runs migrations, builds the external
/// service clients, and starts the Actix-Web HTTP server. This is a
/// regular async function — the caller is responsible for providing the
/// async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind
/// or encounters a runtime error.
///
/// # Panics
///
/// Panics if the database connection fails, migrations fail, or the
/// HTTP client cannot be built.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Connecting to database...");
    let db_conn = db::connect_from_env()
        .await
        .expect("Failed to connect to database");

    log::info!("Running migrations...");
    run_migrations(db_conn.as_ref())
        .await
        .expect("Failed to run migrations");

    let http = reqwest::Client::builder()
        .build()
        .expect("Failed to build HTTP client");
    let simulator = HttpSimulator::from_env(http.clone());
    let optimizer = HttpOptimizer::from_env(http);

    let state = web::Data::new(AppState {
        db: Arc::from(db_conn),
        simulator: Arc::new(simulator),
        optimizer: Arc::new(optimizer),
        sessions: SessionStore::default(),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/simulate", web::post().to(handlers::simulate))
                    .route("/optimize", web::post().to(handlers::optimize))
                    .route("/allocations", web::post().to(handlers::save_allocation))
                    .route(
                        "/reports/{id}/finish",
                        web::post().to(handlers::finish_report),
                    )
                    .route("/notify", web::post().to(handlers::broadcast))
                    .route("/incidents", web::get().to(handlers::incidents))
                    .route("/incidents/stats", web::get().to(handlers::incident_stats))
                    .route("/incidents/{id}", web::get().to(handlers::incident))
                    .route(
                        "/incidents/{id}/status",
                        web::put().to(handlers::update_incident_status),
                    )
                    .route("/centers", web::get().to(handlers::centers))
                    .route("/centers", web::post().to(handlers::create_center))
                    .route("/centers/{code}", web::put().to(handlers::update_center))
                    .route("/centers/{code}", web::delete().to(handlers::delete_center))
                    .route(
                        "/centers/{code}/resources",
                        web::get().to(handlers::center_resources),
                    )
                    .route(
                        "/centers/{code}/equipment",
                        web::put().to(handlers::upsert_equipment),
                    )
                    .route("/profiles", web::get().to(handlers::profiles))
                    .route(
                        "/profiles/{id}/daily-status",
                        web::post().to(handlers::daily_status),
                    )
                    .route("/notifications", web::get().to(handlers::notifications))
                    .route(
                        "/notifications/unread-count",
                        web::get().to(handlers::unread_count),
                    )
                    .route(
                        "/notifications/read-all",
                        web::put().to(handlers::mark_all_read),
                    )
                    .route(
                        "/notifications/read",
                        web::delete().to(handlers::delete_read),
                    )
                    .route(
                        "/notifications/{id}/read",
                        web::put().to(handlers::mark_read),
                    ),
            )
    })
    .bind((bind_addr, port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sessions_are_not_kept() {
        let store = SessionStore::default();
        assert!(store.store(ReportSession::new()).is_none());
        assert!(store.take("missing").is_none());
    }
}
