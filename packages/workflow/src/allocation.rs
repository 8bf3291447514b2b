//! The optimize-and-save step: allocation requests, allocation
//! persistence, and incident creation.

use std::collections::BTreeMap;

use firewatch_database_models::{AllocationSummary, IncidentRow, NewIncident, StatusHistoryEntry};
use firewatch_fire_models::{FireStatus, RosStatistics, Severity, StartingPoint, ZoneLabel};
use firewatch_optimizer::{AllocationAggregate, OptimizationOutcome, ResourceOptimizer, aggregate};
use switchy_database::Database;

use crate::WorkflowError;
use crate::session::ReportSession;

/// Requests an allocation plan for the given zones and aggregates it.
///
/// # Errors
///
/// Returns [`WorkflowError::Optimization`] if the service fails or
/// rejects the request; nothing is written in that case.
pub async fn request_allocation(
    optimizer: &dyn ResourceOptimizer,
    zones: &BTreeMap<ZoneLabel, f64>,
    token: Option<&str>,
) -> Result<(OptimizationOutcome, AllocationAggregate), WorkflowError> {
    let outcome = optimizer.optimize(zones, token).await?;
    let aggregate = aggregate(zones, &outcome);

    if aggregate.no_deployment_needed {
        log::info!("Allocation plan needs no deployment");
    }

    Ok((outcome, aggregate))
}

/// Inputs to one allocation save.
#[derive(Debug, Clone)]
pub struct AllocationParams {
    /// Zone the allocation covers.
    pub zone: ZoneLabel,
    /// Selected operation center code.
    pub operation_center: String,
    /// Available-staff count at save time.
    pub staff_available: i64,
    /// Equipment snapshot at save time, by type.
    pub equipment: serde_json::Value,
    /// The optimizer's outcome for this zone, stored verbatim.
    pub zone_outcome: serde_json::Value,
    /// Measured rate-of-spread statistics, zeros when absent.
    pub ros: Option<RosStatistics>,
    /// The full optimizer response, stored on the incident verbatim.
    pub optimization_result: serde_json::Value,
    /// Display name of the initiating officer, recorded in the history.
    pub officer_name: String,
    /// Initiating user id.
    pub created_by: String,
}

/// Saves an allocation and creates the tracked incident.
///
/// Ordered two-step with no compensating rollback: the allocation
/// summary is attached to the zone row first, and the incident is only
/// inserted once that update succeeded. A failure between the two
/// leaves the zone allocated with no incident; the error is surfaced.
///
/// # Errors
///
/// Returns [`WorkflowError::MissingSimulation`] when the zone was not
/// simulated in this session, [`WorkflowError::NoActiveReport`] when
/// the session has no report, or [`WorkflowError::Database`] when a
/// persistence step fails.
pub async fn save_allocation(
    db: &dyn Database,
    session: &ReportSession,
    params: &AllocationParams,
) -> Result<IncidentRow, WorkflowError> {
    let simulation = session
        .simulation(params.zone)
        .ok_or(WorkflowError::MissingSimulation(params.zone))?;
    let report = session.report().ok_or(WorkflowError::NoActiveReport)?;

    let summary = AllocationSummary {
        operation_center: params.operation_center.clone(),
        staff_available: params.staff_available,
        equipment: params.equipment.clone(),
        optimization_result: params.zone_outcome.clone(),
    };
    let summary_json = serde_json::to_value(&summary).unwrap_or(serde_json::Value::Null);
    firewatch_database::reports::update_zone_allocation(
        db,
        &report.id,
        params.zone,
        &summary_json,
    )
    .await?;

    let areas = simulation.response.cell_areas();
    let ros = params.ros.unwrap_or_default();
    let severity = Severity::derive(areas.burn_percentage(), ros.max);
    let fire_status = if areas.burning_area_m2 > 0.0 {
        FireStatus::Burning
    } else {
        FireStatus::Contained
    };

    let incident = NewIncident {
        zone: params.zone,
        lat: simulation.request.lat,
        lon: simulation.request.lon,
        severity,
        status: fire_status.lifecycle(),
        fire_status,
        cell_status: areas,
        ros_statistics: ros,
        starting_point: StartingPoint {
            lat: simulation.request.lat,
            lon: simulation.request.lon,
            temperature: None,
            humidity: None,
            wind_speed: Some(simulation.response.wind_speed),
            wind_direction: Some(simulation.response.wind_direction),
        },
        wind_info: simulation.response.wind(),
        simulation_params: serde_json::to_value(&simulation.request)
            .unwrap_or(serde_json::Value::Null),
        optimization_result: Some(params.optimization_result.clone()),
        status_history: vec![StatusHistoryEntry {
            status: fire_status,
            updated_by: params.officer_name.clone(),
            updated_at: chrono::Utc::now(),
        }],
        report_id: Some(report.id.clone()),
        report_code: Some(report.code.clone()),
        created_by: params.created_by.clone(),
    };

    Ok(firewatch_database::incidents::insert_incident(db, &incident).await?)
}

/// Finishes a report: resets the session and clears the optimizer's
/// bookkeeping store. The clear is best-effort and only logged on
/// failure.
pub async fn finish_report(
    optimizer: &dyn ResourceOptimizer,
    session: &mut ReportSession,
    token: Option<&str>,
) {
    if let Err(e) = optimizer.clear_zones(token).await {
        log::warn!("Zone bookkeeping clear failed: {e}");
    }
    session.reset();
}
