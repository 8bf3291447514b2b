#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Database connection, queries, and migrations for firewatch.
//!
//! Uses `switchy_database` for all database access and `switchy_schema`
//! for embedded SQL migrations. JSON-typed columns (simulation payloads,
//! allocation summaries, status history) are stored as text and decoded
//! with `serde_json` on read.

pub mod centers;
pub mod db;
pub mod incidents;
pub mod notifications;
pub mod profiles;
pub mod reports;

use include_dir::{Dir, include_dir};
use switchy_database::Database;
use switchy_schema::discovery::embedded::EmbeddedMigrationSource;
use switchy_schema::runner::MigrationRunner;

/// Embedded SQL migrations from the `migrations/` directory.
static MIGRATIONS_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/../../migrations");

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] switchy_schema::MigrationError),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

impl DbError {
    /// Whether this error was caused by a backend access policy rejecting
    /// the write (e.g., a non-admin touching operation centers).
    ///
    /// The backend reports policy rejections only through its error text,
    /// so the check matches on "permission"/"policy" substrings.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        let text = self.to_string().to_lowercase();
        text.contains("permission") || text.contains("policy")
    }
}

/// Runs all pending database migrations.
///
/// # Errors
///
/// Returns [`DbError`] if any migration fails to apply.
pub async fn run_migrations(db: &dyn Database) -> Result<(), DbError> {
    let source = EmbeddedMigrationSource::new(&MIGRATIONS_DIR);
    let runner = MigrationRunner::new(Box::new(source));
    runner.run(db).await?;
    log::info!("Database migrations completed successfully");
    Ok(())
}

pub(crate) fn parse_timestamp(s: &str) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .unwrap_or_default()
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use switchy_database::Database;
    use switchy_database_connection::init_sqlite_rusqlite;

    /// Opens an in-memory `SQLite` database with the full firewatch schema.
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be opened or the schema DDL fails.
    pub async fn test_db() -> Box<dyn Database> {
        let db = init_sqlite_rusqlite(None).expect("Failed to open in-memory SQLite");
        for migration in super::MIGRATIONS_DIR.dirs() {
            let up = migration
                .get_file(migration.path().join("up.sql"))
                .and_then(include_dir::File::contents_utf8)
                .expect("Missing up.sql in migration");
            for statement in up.split(';').filter(|s| !s.trim().is_empty()) {
                db.exec_raw(statement).await.expect("Schema DDL failed");
            }
        }
        db
    }
}
