//! The simulate-and-persist step of the workflow.

use firewatch_database_models::{FireReportRow, ReportZoneRow};
use firewatch_fire_models::ZoneLabel;
use firewatch_optimizer::ResourceOptimizer;
use firewatch_simulation::{FireSimulator, SimulationRequest, SimulationResponse, validate};
use switchy_database::Database;

use crate::session::{ReportIdentity, ReportSession, ZoneSimulation};
use crate::WorkflowError;

/// Inputs to one simulate-and-persist step.
#[derive(Debug, Clone)]
pub struct SimulationParams {
    /// The simulation request, validated before any network call.
    pub request: SimulationRequest,
    /// Zone the results belong to.
    pub zone: ZoneLabel,
    /// Display name for the report, used only when this step creates it.
    pub report_name: Option<String>,
    /// Initiating user id.
    pub created_by: Option<String>,
}

/// Outcome of one successful simulate-and-persist step.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    /// The report the zone was attached to.
    pub report: ReportIdentity,
    /// The persisted zone row.
    pub zone: ReportZoneRow,
    /// The simulation service's response.
    pub response: SimulationResponse,
}

/// Runs one simulation and persists its results.
///
/// Order of operations: input validation, duplicate-zone guard, the
/// simulator call, then persistence. The first saved zone creates the
/// report; later zones reuse it. After persistence succeeds, the zone
/// is registered with the optimizer's bookkeeping store; that call is
/// best-effort and only logged on failure.
///
/// If a result was already simulated for this exact zone and request
/// but its save failed, the held result is reused instead of
/// re-simulating.
///
/// # Errors
///
/// Returns [`WorkflowError::Simulation`] for validation or simulator
/// failures (nothing persisted), [`WorkflowError::DuplicateZone`] when
/// the zone already has results, or [`WorkflowError::Database`] when
/// persistence fails (the simulation result stays in the session).
pub async fn run_simulation(
    db: &dyn Database,
    simulator: &dyn FireSimulator,
    optimizer: &dyn ResourceOptimizer,
    session: &mut ReportSession,
    params: &SimulationParams,
    token: Option<&str>,
) -> Result<SimulationRun, WorkflowError> {
    validate(&params.request)?;

    if session.used_zones().contains(&params.zone) {
        return Err(WorkflowError::DuplicateZone(params.zone));
    }

    let simulation = match session.take_matching_pending(params.zone, &params.request) {
        Some(held) => {
            log::debug!("Reusing held simulation result for zone {}", params.zone);
            held
        }
        None => {
            let response = simulator.simulate(&params.request, token).await?;
            ZoneSimulation {
                request: params.request.clone(),
                response,
            }
        }
    };

    session.hold_pending(params.zone, simulation.clone());
    let run = persist(db, session, params, &simulation).await?;
    session.commit_zone(params.zone, simulation);

    let firebreak_area_m2 = run.zone.firebreak_area_m2;
    if let Err(e) = optimizer
        .save_zone(params.zone, firebreak_area_m2, token)
        .await
    {
        log::warn!("Zone bookkeeping save failed for zone {}: {e}", params.zone);
    }

    Ok(run)
}

async fn persist(
    db: &dyn Database,
    session: &mut ReportSession,
    params: &SimulationParams,
    simulation: &ZoneSimulation,
) -> Result<SimulationRun, WorkflowError> {
    let report = match session.report() {
        Some(report) => report.clone(),
        None => {
            let row = create_report(db, params, simulation).await?;
            let identity = ReportIdentity {
                id: row.id,
                code: row.report_code,
            };
            session.set_report(identity.clone());
            identity
        }
    };

    let zone_row = firewatch_database::reports::insert_report_zone(
        db,
        &report.id,
        params.zone,
        simulation.response.cell_areas().firebreak_area_m2,
    )
    .await?;

    Ok(SimulationRun {
        report,
        zone: zone_row,
        response: simulation.response.clone(),
    })
}

async fn create_report(
    db: &dyn Database,
    params: &SimulationParams,
    simulation: &ZoneSimulation,
) -> Result<FireReportRow, WorkflowError> {
    let code = generate_report_code();
    let simulation_params =
        serde_json::to_value(&simulation.request).unwrap_or(serde_json::Value::Null);
    let simulation_result =
        serde_json::to_value(&simulation.response).unwrap_or(serde_json::Value::Null);

    Ok(firewatch_database::reports::insert_report(
        db,
        &code,
        params.report_name.as_deref(),
        params.request.lat,
        params.request.lon,
        &simulation_params,
        &simulation_result,
        params.created_by.as_deref(),
    )
    .await?)
}

/// Generates a `FR-YYYYMMDD-XXXX` report code: today's date plus a
/// 4-character uppercase random suffix.
#[must_use]
pub fn generate_report_code() -> String {
    let date = chrono::Utc::now().format("%Y%m%d");
    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(4)
        .collect::<String>()
        .to_uppercase();
    format!("FR-{date}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{FakeOptimizer, FakeSimulator, sample_params, sample_response};
    use firewatch_database::test_support::test_db;
    use firewatch_simulation::SimulationError;

    #[test]
    fn report_code_shape() {
        let code = generate_report_code();
        let parts: Vec<_> = code.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "FR");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 4);
        assert_eq!(parts[2], parts[2].to_uppercase());
    }

    #[tokio::test]
    async fn first_zone_creates_report_later_zones_reuse_it() {
        let db = test_db().await;
        let simulator = FakeSimulator::succeeding(sample_response());
        let optimizer = FakeOptimizer::default();
        let mut session = ReportSession::new();

        let first = run_simulation(
            db.as_ref(),
            &simulator,
            &optimizer,
            &mut session,
            &sample_params(ZoneLabel::A),
            None,
        )
        .await
        .unwrap();

        let second = run_simulation(
            db.as_ref(),
            &simulator,
            &optimizer,
            &mut session,
            &sample_params(ZoneLabel::B),
            None,
        )
        .await
        .unwrap();

        assert_eq!(first.report, second.report);
        assert!(first.report.code.starts_with("FR-"));
        assert_eq!(simulator.calls(), 2);

        let zones =
            firewatch_database::reports::get_report_zones(db.as_ref(), &first.report.id)
                .await
                .unwrap();
        assert_eq!(zones.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_zone_is_rejected_before_simulating() {
        let db = test_db().await;
        let simulator = FakeSimulator::succeeding(sample_response());
        let optimizer = FakeOptimizer::default();
        let mut session = ReportSession::new();

        run_simulation(
            db.as_ref(),
            &simulator,
            &optimizer,
            &mut session,
            &sample_params(ZoneLabel::A),
            None,
        )
        .await
        .unwrap();

        let err = run_simulation(
            db.as_ref(),
            &simulator,
            &optimizer,
            &mut session,
            &sample_params(ZoneLabel::A),
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, WorkflowError::DuplicateZone(ZoneLabel::A)));
        assert_eq!(simulator.calls(), 1);
    }

    #[tokio::test]
    async fn simulator_failure_persists_nothing() {
        let db = test_db().await;
        let simulator = FakeSimulator::failing();
        let optimizer = FakeOptimizer::default();
        let mut session = ReportSession::new();

        let err = run_simulation(
            db.as_ref(),
            &simulator,
            &optimizer,
            &mut session,
            &sample_params(ZoneLabel::A),
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::Simulation(SimulationError::RemoteFailure { .. })
        ));
        assert!(session.report().is_none());
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_simulator() {
        let db = test_db().await;
        let simulator = FakeSimulator::succeeding(sample_response());
        let optimizer = FakeOptimizer::default();
        let mut session = ReportSession::new();

        let mut params = sample_params(ZoneLabel::A);
        params.request.lat = 123.0;

        let err = run_simulation(
            db.as_ref(),
            &simulator,
            &optimizer,
            &mut session,
            &params,
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::Simulation(SimulationError::Invalid(_))
        ));
        assert_eq!(simulator.calls(), 0);
    }

    #[tokio::test]
    async fn failed_first_save_retries_without_resimulating() {
        let db = test_db().await;
        let simulator = FakeSimulator::succeeding(sample_response());
        let optimizer = FakeOptimizer::default();
        let mut session = ReportSession::new();

        db.exec_raw("ALTER TABLE fire_reports RENAME TO fire_reports_offline")
            .await
            .unwrap();

        let err = run_simulation(
            db.as_ref(),
            &simulator,
            &optimizer,
            &mut session,
            &sample_params(ZoneLabel::A),
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, WorkflowError::Database(_)));
        assert!(session.report().is_none());
        assert!(session.has_pending());

        db.exec_raw("ALTER TABLE fire_reports_offline RENAME TO fire_reports")
            .await
            .unwrap();

        let run = run_simulation(
            db.as_ref(),
            &simulator,
            &optimizer,
            &mut session,
            &sample_params(ZoneLabel::A),
            None,
        )
        .await
        .unwrap();

        assert_eq!(simulator.calls(), 1);
        assert!(run.report.code.starts_with("FR-"));
        assert!(!session.has_pending());
    }

    #[tokio::test]
    async fn bookkeeping_failure_does_not_fail_the_run() {
        let db = test_db().await;
        let simulator = FakeSimulator::succeeding(sample_response());
        let optimizer = FakeOptimizer::rejecting_bookkeeping();
        let mut session = ReportSession::new();

        let run = run_simulation(
            db.as_ref(),
            &simulator,
            &optimizer,
            &mut session,
            &sample_params(ZoneLabel::A),
            None,
        )
        .await
        .unwrap();

        assert!(session.used_zones().contains(&ZoneLabel::A));
        assert!(run.zone.firebreak_area_m2 > 0.0);
    }
}
