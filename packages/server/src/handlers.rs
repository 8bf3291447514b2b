//! HTTP handler functions for the firewatch API.

use actix_web::{HttpRequest, HttpResponse, http::StatusCode, http::header, web};
use firewatch_database::DbError;
use firewatch_server_models::{
    ApiAllocationPlan, ApiCenterResources, ApiEquipment, ApiHealth, ApiIncident, ApiIncidentStats,
    ApiNotification, ApiOperationCenter, ApiProfile, ApiSimulationRun, ApiStaffCounts,
    ApiUnreadCount, BroadcastBody, CenterBody, DailyStatusBody, EquipmentBody, OptimizeBody,
    SaveAllocationBody, SimulateBody, StatusUpdateBody, UserQuery,
};
use firewatch_simulation::{SimulationError, SimulationRequest, SimulationResponse};
use firewatch_workflow::{
    AllocationParams, ReportIdentity, ReportSession, SimulationParams, WorkflowError,
};

use crate::AppState;

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(ToString::to_string)
}

fn error_body(message: &str) -> serde_json::Value {
    serde_json::json!({ "error": message })
}

fn db_error_parts(e: &DbError, context: &str) -> (StatusCode, serde_json::Value) {
    if e.is_permission_denied() {
        log::warn!("{context}: access denied: {e}");
        return (StatusCode::FORBIDDEN, error_body("Access denied"));
    }
    log::error!("{context}: {e}");
    (StatusCode::INTERNAL_SERVER_ERROR, error_body(context))
}

fn db_error_response(e: &DbError, context: &str) -> HttpResponse {
    let (status, body) = db_error_parts(e, context);
    HttpResponse::build(status).json(body)
}

fn workflow_error_parts(e: &WorkflowError) -> (StatusCode, serde_json::Value) {
    match e {
        WorkflowError::Simulation(SimulationError::Invalid(fields)) => (
            StatusCode::BAD_REQUEST,
            serde_json::json!({
                "error": "Invalid simulation input",
                "fields": fields,
            }),
        ),
        WorkflowError::Simulation(_) => {
            log::error!("Simulation failed: {e}");
            (StatusCode::BAD_GATEWAY, error_body("Simulation failed"))
        }
        WorkflowError::Optimization(_) => {
            log::error!("Optimization failed: {e}");
            (StatusCode::BAD_GATEWAY, error_body("Optimization failed"))
        }
        WorkflowError::Database(db) => db_error_parts(db, "Persistence failed"),
        WorkflowError::DuplicateZone(_)
        | WorkflowError::MissingSimulation(_)
        | WorkflowError::NoActiveReport
        | WorkflowError::StatusUnchanged(_) => {
            (StatusCode::CONFLICT, error_body(&e.to_string()))
        }
        WorkflowError::IncidentNotFound(_) => {
            (StatusCode::NOT_FOUND, error_body(&e.to_string()))
        }
    }
}

fn workflow_error_response(e: &WorkflowError) -> HttpResponse {
    let (status, body) = workflow_error_parts(e);
    HttpResponse::build(status).json(body)
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /api/simulate`
///
/// Runs one simulation and persists its results as a report zone. The
/// first zone creates the report; `reportId` resumes an existing one.
/// When the first zone's save fails before a report exists, the error
/// body carries a `sessionId` the caller sends back to retry the save
/// without re-simulating.
pub async fn simulate(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<SimulateBody>,
) -> HttpResponse {
    let token = bearer_token(&req);
    let body = body.into_inner();

    let params = SimulationParams {
        request: SimulationRequest {
            lat: body.lat,
            lon: body.lon,
            year: body.year,
            month: body.month,
            day: body.day,
            grid_x: body.grid_x,
            grid_y: body.grid_y,
            sim_minutes: body.sim_minutes,
            cell_size: body.cell_size,
        },
        zone: body.zone,
        report_name: body.report_name,
        created_by: body.user_id,
    };

    let mut session = match &body.report_id {
        Some(report_id) => match state.sessions.take(report_id) {
            Some(session) => session,
            None => match ReportSession::resume(state.db.as_ref(), report_id).await {
                Ok(session) => session,
                Err(e) => return workflow_error_response(&e),
            },
        },
        None => body
            .session_id
            .as_deref()
            .and_then(|key| state.sessions.take(key))
            .unwrap_or_default(),
    };

    let result = firewatch_workflow::run_simulation(
        state.db.as_ref(),
        state.simulator.as_ref(),
        state.optimizer.as_ref(),
        &mut session,
        &params,
        token.as_deref(),
    )
    .await;

    match result {
        Ok(run) => {
            let cell_status = run.response.cell_areas();
            let response = ApiSimulationRun {
                report_id: run.report.id,
                report_code: run.report.code,
                zone: body.zone,
                burn_percentage: cell_status.burn_percentage(),
                cell_status,
                wind: run.response.wind(),
                available_zones: session.available_zones(),
            };
            state.sessions.store(session);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            // A held result survives a failed save, so keep the session.
            let had_report = session.report().is_some();
            let retry_key = state.sessions.store(session);
            let (status, mut payload) = workflow_error_parts(&e);
            if !had_report
                && let Some(key) = retry_key
                && let Some(map) = payload.as_object_mut()
            {
                map.insert("sessionId".to_string(), serde_json::Value::String(key));
            }
            HttpResponse::build(status).json(payload)
        }
    }
}

/// `POST /api/optimize`
///
/// Requests an allocation plan for the given zones.
pub async fn optimize(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<OptimizeBody>,
) -> HttpResponse {
    let token = bearer_token(&req);

    match firewatch_workflow::request_allocation(
        state.optimizer.as_ref(),
        &body.zones,
        token.as_deref(),
    )
    .await
    {
        Ok((outcome, aggregate)) => {
            let result = serde_json::to_value(&outcome).unwrap_or(serde_json::Value::Null);
            HttpResponse::Ok().json(ApiAllocationPlan::new(result, &aggregate))
        }
        Err(e) => workflow_error_response(&e),
    }
}

/// `POST /api/allocations`
///
/// Saves an allocation for a simulated zone and creates the tracked
/// incident.
pub async fn save_allocation(
    state: web::Data<AppState>,
    body: web::Json<SaveAllocationBody>,
) -> HttpResponse {
    let body = body.into_inner();

    let Some(session) = state.sessions.take(&body.report_id) else {
        return workflow_error_response(&WorkflowError::NoActiveReport);
    };

    let params = AllocationParams {
        zone: body.zone,
        operation_center: body.operation_center,
        staff_available: body.staff_available,
        equipment: body.equipment,
        zone_outcome: body.zone_outcome,
        ros: body.ros,
        optimization_result: body.optimization_result,
        officer_name: body.officer_name,
        created_by: body.user_id,
    };

    let result = firewatch_workflow::save_allocation(state.db.as_ref(), &session, &params).await;
    state.sessions.store(session);

    match result {
        Ok(incident) => HttpResponse::Ok().json(ApiIncident::from(incident)),
        Err(e) => workflow_error_response(&e),
    }
}

/// `POST /api/reports/{id}/finish`
///
/// Ends a report-building session and clears the optimizer's zone
/// bookkeeping.
pub async fn finish_report(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let token = bearer_token(&req);
    let report_id = path.into_inner();

    let mut session = state.sessions.take(&report_id).unwrap_or_default();
    firewatch_workflow::finish_report(state.optimizer.as_ref(), &mut session, token.as_deref())
        .await;

    HttpResponse::Ok().json(serde_json::json!({ "finished": true }))
}

/// `POST /api/notify`
///
/// Broadcasts a fire report to every other known user.
pub async fn broadcast(
    state: web::Data<AppState>,
    body: web::Json<BroadcastBody>,
) -> HttpResponse {
    let body = body.into_inner();

    let report = match firewatch_database::reports::get_report(state.db.as_ref(), &body.report_id)
        .await
    {
        Ok(Some(report)) => report,
        Ok(None) => return HttpResponse::NotFound().json(error_body("Report not found")),
        Err(e) => return db_error_response(&e, "Failed to load report"),
    };

    let areas = serde_json::from_value::<SimulationResponse>(report.simulation_result)
        .map(|r| r.cell_areas())
        .unwrap_or_default();
    let identity = ReportIdentity {
        id: report.id,
        code: report.report_code,
    };

    match firewatch_workflow::broadcast_report(
        state.db.as_ref(),
        &body.sender_id,
        &identity,
        body.zone,
        &areas,
    )
    .await
    {
        Ok(recipients) => HttpResponse::Ok().json(serde_json::json!({ "recipients": recipients })),
        Err(e) => workflow_error_response(&e),
    }
}

/// `GET /api/incidents`
///
/// Lists all tracked incidents, newest first.
pub async fn incidents(state: web::Data<AppState>) -> HttpResponse {
    match firewatch_database::incidents::list_incidents(state.db.as_ref()).await {
        Ok(rows) => {
            let incidents: Vec<ApiIncident> = rows.into_iter().map(ApiIncident::from).collect();
            HttpResponse::Ok().json(incidents)
        }
        Err(e) => db_error_response(&e, "Failed to query incidents"),
    }
}

/// `GET /api/incidents/stats`
///
/// Returns incident counts by status, fire status, and severity.
pub async fn incident_stats(state: web::Data<AppState>) -> HttpResponse {
    match firewatch_database::incidents::incident_stats(state.db.as_ref()).await {
        Ok(stats) => HttpResponse::Ok().json(ApiIncidentStats::from(stats)),
        Err(e) => db_error_response(&e, "Failed to aggregate incidents"),
    }
}

/// `GET /api/incidents/{id}`
pub async fn incident(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    match firewatch_database::incidents::get_incident(state.db.as_ref(), &path.into_inner()).await
    {
        Ok(Some(row)) => HttpResponse::Ok().json(ApiIncident::from(row)),
        Ok(None) => HttpResponse::NotFound().json(error_body("Incident not found")),
        Err(e) => db_error_response(&e, "Failed to query incident"),
    }
}

/// `PUT /api/incidents/{id}/status`
///
/// Applies a fire-status update, appending to the incident's history.
pub async fn update_incident_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<StatusUpdateBody>,
) -> HttpResponse {
    match firewatch_workflow::update_status(
        state.db.as_ref(),
        &path.into_inner(),
        body.fire_status,
        &body.officer_name,
    )
    .await
    {
        Ok(row) => HttpResponse::Ok().json(ApiIncident::from(row)),
        Err(e) => workflow_error_response(&e),
    }
}

/// `GET /api/centers`
pub async fn centers(state: web::Data<AppState>) -> HttpResponse {
    match firewatch_database::centers::list_centers(state.db.as_ref()).await {
        Ok(rows) => {
            let centers: Vec<ApiOperationCenter> =
                rows.into_iter().map(ApiOperationCenter::from).collect();
            HttpResponse::Ok().json(centers)
        }
        Err(e) => db_error_response(&e, "Failed to query operation centers"),
    }
}

/// `POST /api/centers`
///
/// Creates an operation center. Writes are restricted to admins by
/// backend policy; policy rejections come back as 403.
pub async fn create_center(
    state: web::Data<AppState>,
    body: web::Json<CenterBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let user_id = body.user_id.clone();
    let row = body.into_row();

    match firewatch_database::centers::insert_center(state.db.as_ref(), &row, user_id.as_deref())
        .await
    {
        Ok(()) => HttpResponse::Created().json(ApiOperationCenter::from(row)),
        Err(e) => db_error_response(&e, "Failed to create operation center"),
    }
}

/// `PUT /api/centers/{code}`
pub async fn update_center(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<CenterBody>,
) -> HttpResponse {
    let mut row = body.into_inner().into_row();
    row.code = path.into_inner();

    match firewatch_database::centers::update_center(state.db.as_ref(), &row).await {
        Ok(()) => HttpResponse::Ok().json(ApiOperationCenter::from(row)),
        Err(e @ DbError::Conversion { .. }) => {
            HttpResponse::NotFound().json(error_body(&e.to_string()))
        }
        Err(e) => db_error_response(&e, "Failed to update operation center"),
    }
}

/// `DELETE /api/centers/{code}`
pub async fn delete_center(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    match firewatch_database::centers::delete_center(state.db.as_ref(), &path.into_inner()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => db_error_response(&e, "Failed to delete operation center"),
    }
}

/// `GET /api/centers/{code}/resources`
///
/// Returns a center with its equipment quantities and staff counts.
pub async fn center_resources(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let code = path.into_inner();

    let center = match firewatch_database::centers::get_center(state.db.as_ref(), &code).await {
        Ok(Some(center)) => center,
        Ok(None) => return HttpResponse::NotFound().json(error_body("Operation center not found")),
        Err(e) => return db_error_response(&e, "Failed to query operation center"),
    };
    let equipment = match firewatch_database::centers::list_equipment(state.db.as_ref(), &code)
        .await
    {
        Ok(rows) => rows.into_iter().map(ApiEquipment::from).collect(),
        Err(e) => return db_error_response(&e, "Failed to query equipment"),
    };
    let staff = match firewatch_database::centers::staff_counts(state.db.as_ref(), &code).await {
        Ok(counts) => ApiStaffCounts::from(counts),
        Err(e) => return db_error_response(&e, "Failed to count staff"),
    };

    HttpResponse::Ok().json(ApiCenterResources {
        center: ApiOperationCenter::from(center),
        equipment,
        staff,
    })
}

/// `PUT /api/centers/{code}/equipment`
///
/// Sets one equipment quantity at a center. Last write wins.
pub async fn upsert_equipment(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<EquipmentBody>,
) -> HttpResponse {
    match firewatch_database::centers::upsert_equipment(
        state.db.as_ref(),
        &path.into_inner(),
        body.equipment_type,
        body.quantity,
    )
    .await
    {
        Ok(()) => HttpResponse::Ok().json(ApiEquipment {
            equipment_type: body.equipment_type,
            quantity: body.quantity,
        }),
        Err(e) => db_error_response(&e, "Failed to update equipment"),
    }
}

/// `GET /api/profiles`
pub async fn profiles(state: web::Data<AppState>) -> HttpResponse {
    match firewatch_database::profiles::list_profiles(state.db.as_ref()).await {
        Ok(rows) => {
            let profiles: Vec<ApiProfile> = rows.into_iter().map(ApiProfile::from).collect();
            HttpResponse::Ok().json(profiles)
        }
        Err(e) => db_error_response(&e, "Failed to query profiles"),
    }
}

/// `POST /api/profiles/{id}/daily-status`
///
/// Records a user's availability for the day and syncs their profile.
pub async fn daily_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<DailyStatusBody>,
) -> HttpResponse {
    let date = body.date.unwrap_or_else(|| chrono::Utc::now().date_naive());

    match firewatch_database::profiles::set_daily_status(
        state.db.as_ref(),
        &path.into_inner(),
        date,
        body.status,
    )
    .await
    {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "date": date,
            "status": body.status,
        })),
        Err(e) => db_error_response(&e, "Failed to record daily status"),
    }
}

/// `GET /api/notifications?userId=`
///
/// Lists a user's notifications, newest first.
pub async fn notifications(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> HttpResponse {
    match firewatch_database::notifications::list_for_user(state.db.as_ref(), &query.user_id).await
    {
        Ok(rows) => {
            let notifications: Vec<ApiNotification> =
                rows.into_iter().map(ApiNotification::from).collect();
            HttpResponse::Ok().json(notifications)
        }
        Err(e) => db_error_response(&e, "Failed to query notifications"),
    }
}

/// `GET /api/notifications/unread-count?userId=`
///
/// Badge freshness is an explicit full re-fetch of this count.
pub async fn unread_count(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> HttpResponse {
    match firewatch_database::notifications::unread_count(state.db.as_ref(), &query.user_id).await
    {
        Ok(count) => HttpResponse::Ok().json(ApiUnreadCount { count }),
        Err(e) => db_error_response(&e, "Failed to count notifications"),
    }
}

/// `PUT /api/notifications/{id}/read?userId=`
pub async fn mark_read(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<UserQuery>,
) -> HttpResponse {
    match firewatch_database::notifications::mark_read(
        state.db.as_ref(),
        &query.user_id,
        &path.into_inner(),
    )
    .await
    {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "read": true })),
        Err(e) => db_error_response(&e, "Failed to mark notification read"),
    }
}

/// `PUT /api/notifications/read-all?userId=`
pub async fn mark_all_read(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> HttpResponse {
    match firewatch_database::notifications::mark_all_read(state.db.as_ref(), &query.user_id).await
    {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "read": true })),
        Err(e) => db_error_response(&e, "Failed to mark notifications read"),
    }
}

/// `DELETE /api/notifications/read?userId=`
///
/// Deletes all of a user's read notifications.
pub async fn delete_read(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> HttpResponse {
    match firewatch_database::notifications::delete_read(state.db.as_ref(), &query.user_id).await {
        Ok(deleted) => HttpResponse::Ok().json(serde_json::json!({ "deleted": deleted })),
        Err(e) => db_error_response(&e, "Failed to delete notifications"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firewatch_fire_models::ZoneLabel;

    #[test]
    fn bearer_token_requires_bearer_scheme() {
        let req = actix_web::test::TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc123"))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("abc123"));

        let req = actix_web::test::TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic abc123"))
            .to_http_request();
        assert!(bearer_token(&req).is_none());

        let req = actix_web::test::TestRequest::default().to_http_request();
        assert!(bearer_token(&req).is_none());
    }

    #[test]
    fn duplicate_zone_maps_to_conflict() {
        let response = workflow_error_response(&WorkflowError::DuplicateZone(ZoneLabel::A));
        assert_eq!(response.status(), actix_web::http::StatusCode::CONFLICT);
    }

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let response = workflow_error_response(&WorkflowError::Simulation(
            SimulationError::Invalid(vec![]),
        ));
        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unknown_incident_maps_to_not_found() {
        let response =
            workflow_error_response(&WorkflowError::IncidentNotFound("x".to_string()));
        assert_eq!(response.status(), actix_web::http::StatusCode::NOT_FOUND);
    }
}
