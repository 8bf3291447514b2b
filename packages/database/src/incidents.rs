//! Query functions for tracked incidents.
//!
//! Incident statuses only ever change through
//! [`update_incident_status`], which persists the new fire status, its
//! derived lifecycle status, and the extended history as one update.

use firewatch_database_models::{IncidentRow, IncidentStats, NewIncident, StatusHistoryEntry};
use firewatch_fire_models::{FireStatus, IncidentStatus, Severity, ZoneLabel};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::{DbError, parse_timestamp};

/// Inserts a new incident and returns its row.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails or a JSON column
/// cannot be serialized.
pub async fn insert_incident(
    db: &dyn Database,
    incident: &NewIncident,
) -> Result<IncidentRow, DbError> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now();

    let history_json = serde_json::to_string(&incident.status_history).map_err(json_error)?;
    let cell_status_json = serde_json::to_string(&incident.cell_status).map_err(json_error)?;
    let ros_json = serde_json::to_string(&incident.ros_statistics).map_err(json_error)?;
    let starting_point_json = serde_json::to_string(&incident.starting_point).map_err(json_error)?;
    let wind_json = serde_json::to_string(&incident.wind_info).map_err(json_error)?;

    db.exec_raw_params(
        "INSERT INTO incidents (
            id, zone, lat, lon, severity, status, fire_status,
            cell_status, ros_statistics, starting_point, wind_info,
            simulation_params, optimization_result, status_history,
            report_id, report_code, created_by, created_at, updated_at
         ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
            $11, $12, $13, $14, $15, $16, $17, $18, $19
         )",
        &[
            DatabaseValue::String(id.clone()),
            DatabaseValue::String(incident.zone.to_string()),
            DatabaseValue::Real64(incident.lat),
            DatabaseValue::Real64(incident.lon),
            DatabaseValue::String(incident.severity.to_string()),
            DatabaseValue::String(incident.status.to_string()),
            DatabaseValue::String(incident.fire_status.to_string()),
            DatabaseValue::String(cell_status_json),
            DatabaseValue::String(ros_json),
            DatabaseValue::String(starting_point_json),
            DatabaseValue::String(wind_json),
            DatabaseValue::String(incident.simulation_params.to_string()),
            incident
                .optimization_result
                .as_ref()
                .map_or(DatabaseValue::Null, |v| DatabaseValue::String(v.to_string())),
            DatabaseValue::String(history_json),
            incident
                .report_id
                .as_ref()
                .map_or(DatabaseValue::Null, |v| DatabaseValue::String(v.clone())),
            incident
                .report_code
                .as_ref()
                .map_or(DatabaseValue::Null, |v| DatabaseValue::String(v.clone())),
            DatabaseValue::String(incident.created_by.clone()),
            DatabaseValue::String(now.to_rfc3339()),
            DatabaseValue::String(now.to_rfc3339()),
        ],
    )
    .await?;

    Ok(IncidentRow {
        id,
        zone: incident.zone,
        lat: incident.lat,
        lon: incident.lon,
        severity: incident.severity,
        status: incident.status,
        fire_status: incident.fire_status,
        cell_status: incident.cell_status,
        ros_statistics: incident.ros_statistics,
        starting_point: incident.starting_point,
        wind_info: incident.wind_info,
        simulation_params: incident.simulation_params.clone(),
        optimization_result: incident.optimization_result.clone(),
        status_history: incident.status_history.clone(),
        report_id: incident.report_id.clone(),
        report_code: incident.report_code.clone(),
        created_by: incident.created_by.clone(),
        created_at: now,
        updated_at: now,
    })
}

/// Fetches one incident by id, or `None` if it doesn't exist.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get_incident(db: &dyn Database, id: &str) -> Result<Option<IncidentRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT * FROM incidents WHERE id = $1",
            &[DatabaseValue::String(id.to_string())],
        )
        .await?;

    Ok(rows.first().map(row_to_incident))
}

/// Fetches all incidents, newest first.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_incidents(db: &dyn Database) -> Result<Vec<IncidentRow>, DbError> {
    let rows = db
        .query_raw_params("SELECT * FROM incidents ORDER BY created_at DESC", &[])
        .await?;

    Ok(rows.iter().map(row_to_incident).collect())
}

/// Persists a status update: the new fire status, its derived lifecycle
/// status, and the full extended history, as one update.
///
/// The caller is responsible for having appended the new entry to
/// `history` — this function never edits existing entries.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails or the incident
/// doesn't exist.
pub async fn update_incident_status(
    db: &dyn Database,
    id: &str,
    fire_status: FireStatus,
    history: &[StatusHistoryEntry],
) -> Result<(), DbError> {
    let history_json = serde_json::to_string(history).map_err(json_error)?;

    let updated = db
        .exec_raw_params(
            "UPDATE incidents SET
                fire_status = $1,
                status = $2,
                status_history = $3,
                updated_at = $4
             WHERE id = $5",
            &[
                DatabaseValue::String(fire_status.to_string()),
                DatabaseValue::String(fire_status.lifecycle().to_string()),
                DatabaseValue::String(history_json),
                DatabaseValue::String(chrono::Utc::now().to_rfc3339()),
                DatabaseValue::String(id.to_string()),
            ],
        )
        .await?;

    if updated == 0 {
        return Err(DbError::Conversion {
            message: format!("Incident not found: {id}"),
        });
    }

    Ok(())
}

/// Aggregates incident counts by lifecycle status, fire status, and
/// severity for the dashboard.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn incident_stats(db: &dyn Database) -> Result<IncidentStats, DbError> {
    let rows = db
        .query_raw_params("SELECT status, fire_status, severity FROM incidents", &[])
        .await?;

    let mut stats = IncidentStats::default();
    for row in &rows {
        stats.total += 1;

        let status: String = row.to_value("status").unwrap_or_default();
        match status.parse::<IncidentStatus>() {
            Ok(IncidentStatus::Active) => stats.active += 1,
            Ok(IncidentStatus::Contained) => stats.contained += 1,
            Ok(IncidentStatus::Resolved) => stats.resolved += 1,
            Err(_) => {}
        }

        let fire_status: String = row.to_value("fire_status").unwrap_or_default();
        match fire_status.parse::<FireStatus>() {
            Ok(FireStatus::Burning) => stats.burning += 1,
            Ok(FireStatus::Contained) => stats.contained_fires += 1,
            Ok(FireStatus::Extinguished) => stats.extinguished += 1,
            Err(_) => {}
        }

        let severity: String = row.to_value("severity").unwrap_or_default();
        match severity.parse::<Severity>() {
            Ok(Severity::High) => stats.high += 1,
            Ok(Severity::Medium) => stats.medium += 1,
            Ok(Severity::Low) => stats.low += 1,
            Err(_) => {}
        }
    }

    Ok(stats)
}

fn json_error(e: serde_json::Error) -> DbError {
    DbError::Conversion {
        message: format!("JSON serialization failed: {e}"),
    }
}

fn row_to_incident(row: &switchy_database::Row) -> IncidentRow {
    let zone: String = row.to_value("zone").unwrap_or_default();
    let severity: String = row.to_value("severity").unwrap_or_default();
    let status: String = row.to_value("status").unwrap_or_default();
    let fire_status: String = row.to_value("fire_status").unwrap_or_default();

    let cell_status: String = row.to_value("cell_status").unwrap_or_default();
    let ros: String = row.to_value("ros_statistics").unwrap_or_default();
    let starting_point: String = row.to_value("starting_point").unwrap_or_default();
    let wind_info: String = row.to_value("wind_info").unwrap_or_default();
    let simulation_params: String = row.to_value("simulation_params").unwrap_or_default();
    let optimization_result: Option<String> =
        row.to_value("optimization_result").unwrap_or_default();
    let history: String = row.to_value("status_history").unwrap_or_default();

    let created_at: String = row.to_value("created_at").unwrap_or_default();
    let updated_at: String = row.to_value("updated_at").unwrap_or_default();

    IncidentRow {
        id: row.to_value("id").unwrap_or_default(),
        zone: zone.parse().unwrap_or(ZoneLabel::A),
        lat: row.to_value("lat").unwrap_or(0.0),
        lon: row.to_value("lon").unwrap_or(0.0),
        severity: severity.parse().unwrap_or(Severity::Low),
        status: status.parse().unwrap_or(IncidentStatus::Active),
        fire_status: fire_status.parse().unwrap_or(FireStatus::Burning),
        cell_status: serde_json::from_str(&cell_status).unwrap_or_default(),
        ros_statistics: serde_json::from_str(&ros).unwrap_or_default(),
        starting_point: serde_json::from_str(&starting_point).unwrap_or_default(),
        wind_info: serde_json::from_str(&wind_info).unwrap_or_default(),
        simulation_params: serde_json::from_str(&simulation_params)
            .unwrap_or(serde_json::Value::Null),
        optimization_result: optimization_result.and_then(|t| serde_json::from_str(&t).ok()),
        status_history: serde_json::from_str(&history).unwrap_or_default(),
        report_id: row.to_value("report_id").unwrap_or_default(),
        report_code: row.to_value("report_code").unwrap_or_default(),
        created_by: row.to_value("created_by").unwrap_or_default(),
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
    }
}
