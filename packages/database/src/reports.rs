//! Query functions for fire reports and their zones.

use firewatch_database_models::{FireReportRow, ReportZoneRow};
use firewatch_fire_models::ZoneLabel;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::{DbError, parse_timestamp};

/// Inserts a new fire report and returns its row.
///
/// The raw simulation input and output are stored verbatim as JSON text.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert_report(
    db: &dyn Database,
    report_code: &str,
    report_name: Option<&str>,
    lat: f64,
    lon: f64,
    simulation_params: &serde_json::Value,
    simulation_result: &serde_json::Value,
    created_by: Option<&str>,
) -> Result<FireReportRow, DbError> {
    let id = uuid::Uuid::new_v4().to_string();
    let created_at = chrono::Utc::now();

    db.exec_raw_params(
        "INSERT INTO fire_reports (
            id, report_code, report_name, lat, lon,
            simulation_params, simulation_result, created_by, created_at
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        &[
            DatabaseValue::String(id.clone()),
            DatabaseValue::String(report_code.to_string()),
            report_name.map_or(DatabaseValue::Null, |n| DatabaseValue::String(n.to_string())),
            DatabaseValue::Real64(lat),
            DatabaseValue::Real64(lon),
            DatabaseValue::String(simulation_params.to_string()),
            DatabaseValue::String(simulation_result.to_string()),
            created_by.map_or(DatabaseValue::Null, |u| DatabaseValue::String(u.to_string())),
            DatabaseValue::String(created_at.to_rfc3339()),
        ],
    )
    .await?;

    Ok(FireReportRow {
        id,
        report_code: report_code.to_string(),
        report_name: report_name.map(ToString::to_string),
        lat,
        lon,
        simulation_params: simulation_params.clone(),
        simulation_result: simulation_result.clone(),
        created_by: created_by.map(ToString::to_string),
        created_at,
    })
}

/// Fetches a fire report by id, or `None` if it doesn't exist.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get_report(db: &dyn Database, id: &str) -> Result<Option<FireReportRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT * FROM fire_reports WHERE id = $1",
            &[DatabaseValue::String(id.to_string())],
        )
        .await?;

    let Some(row) = rows.first() else {
        return Ok(None);
    };

    let params_text: String = row.to_value("simulation_params").unwrap_or_default();
    let result_text: String = row.to_value("simulation_result").unwrap_or_default();
    let created_at_text: String = row.to_value("created_at").unwrap_or_default();

    Ok(Some(FireReportRow {
        id: row.to_value("id").unwrap_or_default(),
        report_code: row.to_value("report_code").unwrap_or_default(),
        report_name: row.to_value("report_name").unwrap_or(None),
        lat: row.to_value("lat").unwrap_or(0.0),
        lon: row.to_value("lon").unwrap_or(0.0),
        simulation_params: serde_json::from_str(&params_text).unwrap_or(serde_json::Value::Null),
        simulation_result: serde_json::from_str(&result_text).unwrap_or(serde_json::Value::Null),
        created_by: row.to_value("created_by").unwrap_or(None),
        created_at: parse_timestamp(&created_at_text),
    }))
}

/// Returns the zone labels already attached to a report.
///
/// Used to exclude used zones from re-selection and to enforce the
/// duplicate-zone guard when resuming a report.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get_existing_zones(
    db: &dyn Database,
    report_id: &str,
) -> Result<Vec<ZoneLabel>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT zone_name FROM report_zones WHERE report_id = $1 ORDER BY zone_name",
            &[DatabaseValue::String(report_id.to_string())],
        )
        .await?;

    let mut zones = Vec::with_capacity(rows.len());
    for row in &rows {
        let name: String = row.to_value("zone_name").unwrap_or_default();
        if let Ok(zone) = name.parse::<ZoneLabel>() {
            zones.push(zone);
        }
    }

    Ok(zones)
}

/// Inserts a zone row for a report.
///
/// The `(report_id, zone_name)` unique constraint backs the duplicate-zone
/// guard at the storage level; callers are expected to have already
/// rejected duplicates before simulating.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert_report_zone(
    db: &dyn Database,
    report_id: &str,
    zone: ZoneLabel,
    firebreak_area_m2: f64,
) -> Result<ReportZoneRow, DbError> {
    let id = uuid::Uuid::new_v4().to_string();
    let created_at = chrono::Utc::now();

    db.exec_raw_params(
        "INSERT INTO report_zones (id, report_id, zone_name, firebreak_area_m2, created_at)
         VALUES ($1, $2, $3, $4, $5)",
        &[
            DatabaseValue::String(id.clone()),
            DatabaseValue::String(report_id.to_string()),
            DatabaseValue::String(zone.to_string()),
            DatabaseValue::Real64(firebreak_area_m2),
            DatabaseValue::String(created_at.to_rfc3339()),
        ],
    )
    .await?;

    Ok(ReportZoneRow {
        id,
        report_id: report_id.to_string(),
        zone_name: zone,
        firebreak_area_m2,
        allocation_result: None,
        created_at,
    })
}

/// Attaches an allocation summary to the zone matching
/// `(report_id, zone_name)`.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails or no matching
/// zone row exists.
pub async fn update_zone_allocation(
    db: &dyn Database,
    report_id: &str,
    zone: ZoneLabel,
    allocation: &serde_json::Value,
) -> Result<(), DbError> {
    let updated = db
        .exec_raw_params(
            "UPDATE report_zones SET allocation_result = $1
             WHERE report_id = $2 AND zone_name = $3",
            &[
                DatabaseValue::String(allocation.to_string()),
                DatabaseValue::String(report_id.to_string()),
                DatabaseValue::String(zone.to_string()),
            ],
        )
        .await?;

    if updated == 0 {
        return Err(DbError::Conversion {
            message: format!("No zone {zone} found for report {report_id}"),
        });
    }

    Ok(())
}

/// Fetches all zone rows for a report, oldest first.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get_report_zones(
    db: &dyn Database,
    report_id: &str,
) -> Result<Vec<ReportZoneRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT * FROM report_zones WHERE report_id = $1 ORDER BY created_at",
            &[DatabaseValue::String(report_id.to_string())],
        )
        .await?;

    let mut zones = Vec::with_capacity(rows.len());
    for row in &rows {
        let name: String = row.to_value("zone_name").unwrap_or_default();
        let Ok(zone_name) = name.parse::<ZoneLabel>() else {
            continue;
        };
        let allocation_text: Option<String> = row.to_value("allocation_result").unwrap_or(None);
        let created_at_text: String = row.to_value("created_at").unwrap_or_default();

        zones.push(ReportZoneRow {
            id: row.to_value("id").unwrap_or_default(),
            report_id: report_id.to_string(),
            zone_name,
            firebreak_area_m2: row.to_value("firebreak_area_m2").unwrap_or(0.0),
            allocation_result: allocation_text.and_then(|t| serde_json::from_str(&t).ok()),
            created_at: parse_timestamp(&created_at_text),
        });
    }

    Ok(zones)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;

    #[tokio::test]
    async fn report_roundtrip() {
        let db = test_db().await;
        let params = serde_json::json!({"lat": 18.7883, "grid_x": 50});
        let result = serde_json::json!({"wind_speed": 3.2});

        let report = insert_report(
            db.as_ref(),
            "FR-20251102-AB12",
            Some("Fire Report 11/2/2025"),
            18.7883,
            98.9853,
            &params,
            &result,
            Some("officer-1"),
        )
        .await
        .unwrap();

        let fetched = get_report(db.as_ref(), &report.id).await.unwrap().unwrap();
        assert_eq!(fetched.report_code, "FR-20251102-AB12");
        assert_eq!(fetched.simulation_params, params);
        assert_eq!(fetched.simulation_result, result);
        assert_eq!(fetched.created_by.as_deref(), Some("officer-1"));

        assert!(get_report(db.as_ref(), "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn zone_insert_and_allocation_update() {
        let db = test_db().await;
        let report = insert_report(
            db.as_ref(),
            "FR-20251102-CD34",
            None,
            10.0,
            100.0,
            &serde_json::json!({}),
            &serde_json::json!({}),
            None,
        )
        .await
        .unwrap();

        insert_report_zone(db.as_ref(), &report.id, ZoneLabel::A, 12_000.0)
            .await
            .unwrap();

        let zones = get_existing_zones(db.as_ref(), &report.id).await.unwrap();
        assert_eq!(zones, vec![ZoneLabel::A]);

        let allocation = serde_json::json!({"operation_center": "OC1"});
        update_zone_allocation(db.as_ref(), &report.id, ZoneLabel::A, &allocation)
            .await
            .unwrap();

        let rows = get_report_zones(db.as_ref(), &report.id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].allocation_result, Some(allocation));
        assert!((rows[0].firebreak_area_m2 - 12_000.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn allocation_update_requires_existing_zone() {
        let db = test_db().await;
        let err = update_zone_allocation(
            db.as_ref(),
            "no-such-report",
            ZoneLabel::B,
            &serde_json::json!({}),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DbError::Conversion { .. }));
    }
}
