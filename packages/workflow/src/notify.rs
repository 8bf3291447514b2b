//! Notification fan-out for new fire reports.

use firewatch_database_models::NewNotification;
use firewatch_fire_models::{CellAreas, ZoneLabel};
use switchy_database::Database;

use crate::WorkflowError;
use crate::session::ReportIdentity;

/// Broadcasts a new fire report to every other known user.
///
/// One notification per recipient, inserted as a single batch: either
/// everyone gets one or nobody does. Returns the recipient count.
///
/// # Errors
///
/// Returns [`WorkflowError::Database`] if loading the recipients or
/// writing the batch fails.
pub async fn broadcast_report(
    db: &dyn Database,
    sender_id: &str,
    report: &ReportIdentity,
    zone: ZoneLabel,
    areas: &CellAreas,
) -> Result<u64, WorkflowError> {
    let targets = firewatch_database::profiles::broadcast_targets(db, sender_id).await?;
    if targets.is_empty() {
        log::info!("No recipients for report {}", report.code);
        return Ok(0);
    }

    let title = format!("New Fire Report: {}", report.code);
    let message = format!(
        "Zone {zone}: firebreak {:.0} m2, burned {:.0} m2",
        areas.firebreak_area_m2,
        areas.burned_area_m2 + areas.burning_area_m2,
    );

    let batch: Vec<NewNotification> = targets
        .into_iter()
        .map(|user_id| NewNotification {
            user_id,
            sender_id: Some(sender_id.to_string()),
            title: title.clone(),
            message: message.clone(),
            kind: "alert".to_string(),
            report_id: Some(report.id.clone()),
        })
        .collect();

    let written = firewatch_database::notifications::insert_batch(db, &batch).await?;
    log::info!("Broadcast report {} to {written} user(s)", report.code);

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use firewatch_database::test_support::test_db;
    use firewatch_database_models::ProfileRow;
    use firewatch_fire_models::AvailabilityStatus;

    fn profile(id: &str) -> ProfileRow {
        ProfileRow {
            id: id.to_string(),
            name: format!("user-{id}"),
            email: format!("{id}@firewatch.example"),
            operation_center: "OC-01".to_string(),
            current_status: AvailabilityStatus::Available,
        }
    }

    async fn saved_report(db: &dyn Database) -> ReportIdentity {
        let row = firewatch_database::reports::insert_report(
            db,
            "FR-20251102-AB12",
            None,
            18.7883,
            98.9853,
            &serde_json::json!({}),
            &serde_json::json!({}),
            Some("u1"),
        )
        .await
        .unwrap();
        ReportIdentity {
            id: row.id,
            code: row.report_code,
        }
    }

    fn areas() -> CellAreas {
        CellAreas {
            unburned_area_m2: 500_000.0,
            burning_area_m2: 12_000.0,
            burned_area_m2: 88_000.0,
            firebreak_area_m2: 4_000.0,
        }
    }

    #[tokio::test]
    async fn every_other_user_gets_one_alert() {
        let db = test_db().await;
        for id in ["u1", "u2", "u3"] {
            firewatch_database::profiles::insert_profile(db.as_ref(), &profile(id))
                .await
                .unwrap();
        }
        let report = saved_report(db.as_ref()).await;

        let written = broadcast_report(db.as_ref(), "u1", &report, ZoneLabel::A, &areas())
            .await
            .unwrap();
        assert_eq!(written, 2);

        let u2 = firewatch_database::notifications::list_for_user(db.as_ref(), "u2")
            .await
            .unwrap();
        assert_eq!(u2.len(), 1);
        assert_eq!(u2[0].title, "New Fire Report: FR-20251102-AB12");
        assert_eq!(u2[0].kind, "alert");
        assert!(u2[0].message.contains("Zone A"));

        let sender = firewatch_database::notifications::list_for_user(db.as_ref(), "u1")
            .await
            .unwrap();
        assert!(sender.is_empty());
    }

    #[tokio::test]
    async fn no_recipients_is_a_noop() {
        let db = test_db().await;
        firewatch_database::profiles::insert_profile(db.as_ref(), &profile("u1"))
            .await
            .unwrap();
        let report = saved_report(db.as_ref()).await;

        let written = broadcast_report(db.as_ref(), "u1", &report, ZoneLabel::A, &areas())
            .await
            .unwrap();
        assert_eq!(written, 0);
    }
}
