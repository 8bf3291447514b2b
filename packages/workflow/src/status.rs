//! Incident status updates.

use firewatch_database_models::{IncidentRow, StatusHistoryEntry};
use firewatch_fire_models::FireStatus;
use switchy_database::Database;

use crate::WorkflowError;

/// Applies a fire-status update to an incident.
///
/// The lifecycle status is always derived from the new fire status, and
/// a history entry naming the officer is appended; the three are
/// persisted together. Updating to the status the incident already has
/// is rejected before any write. Transition order is otherwise
/// unrestricted, so a re-ignited fire can go back to burning.
///
/// # Errors
///
/// Returns [`WorkflowError::IncidentNotFound`] for an unknown id,
/// [`WorkflowError::StatusUnchanged`] for a no-op update, or
/// [`WorkflowError::Database`] when persistence fails.
pub async fn update_status(
    db: &dyn Database,
    incident_id: &str,
    new_status: FireStatus,
    officer_name: &str,
) -> Result<IncidentRow, WorkflowError> {
    let incident = firewatch_database::incidents::get_incident(db, incident_id)
        .await?
        .ok_or_else(|| WorkflowError::IncidentNotFound(incident_id.to_string()))?;

    if incident.fire_status == new_status {
        return Err(WorkflowError::StatusUnchanged(new_status));
    }

    let mut history = incident.status_history;
    history.push(StatusHistoryEntry {
        status: new_status,
        updated_by: officer_name.to_string(),
        updated_at: chrono::Utc::now(),
    });

    firewatch_database::incidents::update_incident_status(db, incident_id, new_status, &history)
        .await?;

    firewatch_database::incidents::get_incident(db, incident_id)
        .await?
        .ok_or_else(|| WorkflowError::IncidentNotFound(incident_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::{AllocationParams, save_allocation};
    use crate::session::ReportSession;
    use crate::simulate::run_simulation;
    use crate::tests::{FakeOptimizer, FakeSimulator, sample_params, sample_response};
    use firewatch_database::test_support::test_db;
    use firewatch_fire_models::{IncidentStatus, ZoneLabel};

    async fn tracked_incident(db: &dyn Database) -> IncidentRow {
        let simulator = FakeSimulator::succeeding(sample_response());
        let optimizer = FakeOptimizer::default();
        let mut session = ReportSession::new();
        run_simulation(
            db,
            &simulator,
            &optimizer,
            &mut session,
            &sample_params(ZoneLabel::A),
            None,
        )
        .await
        .unwrap();

        save_allocation(
            db,
            &session,
            &AllocationParams {
                zone: ZoneLabel::A,
                operation_center: "OC-01".to_string(),
                staff_available: 10,
                equipment: serde_json::json!({}),
                zone_outcome: serde_json::json!({}),
                ros: None,
                optimization_result: serde_json::json!({}),
                officer_name: "Officer A".to_string(),
                created_by: "officer-1".to_string(),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn update_appends_history_and_derives_status() {
        let db = test_db().await;
        let incident = tracked_incident(db.as_ref()).await;

        let updated = update_status(
            db.as_ref(),
            &incident.id,
            FireStatus::Extinguished,
            "Officer B",
        )
        .await
        .unwrap();

        assert_eq!(updated.fire_status, FireStatus::Extinguished);
        assert_eq!(updated.status, IncidentStatus::Resolved);
        assert_eq!(updated.status_history.len(), 2);
        assert_eq!(updated.status_history[1].updated_by, "Officer B");
    }

    #[tokio::test]
    async fn unchanged_status_is_rejected_without_writing() {
        let db = test_db().await;
        let incident = tracked_incident(db.as_ref()).await;

        let err = update_status(db.as_ref(), &incident.id, FireStatus::Burning, "Officer B")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::StatusUnchanged(FireStatus::Burning)
        ));

        let unchanged = firewatch_database::incidents::get_incident(db.as_ref(), &incident.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.status_history.len(), 1);
    }

    #[tokio::test]
    async fn reignition_is_allowed() {
        let db = test_db().await;
        let incident = tracked_incident(db.as_ref()).await;

        update_status(
            db.as_ref(),
            &incident.id,
            FireStatus::Extinguished,
            "Officer B",
        )
        .await
        .unwrap();
        let reignited = update_status(db.as_ref(), &incident.id, FireStatus::Burning, "Officer C")
            .await
            .unwrap();

        assert_eq!(reignited.fire_status, FireStatus::Burning);
        assert_eq!(reignited.status, IncidentStatus::Active);
        assert_eq!(reignited.status_history.len(), 3);
    }

    #[tokio::test]
    async fn unknown_incident_is_reported() {
        let db = test_db().await;
        let err = update_status(db.as_ref(), "missing", FireStatus::Contained, "Officer B")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::IncidentNotFound(_)));
    }
}
