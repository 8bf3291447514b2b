#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Database row types and query parameter definitions.
//!
//! These types represent the shapes of data as stored in and retrieved
//! from the relational store. Opaque simulation/optimization payloads are
//! kept as raw [`serde_json::Value`] columns, exactly as received from
//! the external services. API response types live separately in
//! `firewatch_server_models`.

use chrono::{DateTime, NaiveDate, Utc};
use firewatch_fire_models::{
    AvailabilityStatus, CellAreas, EquipmentType, FireStatus, IncidentStatus, RosStatistics,
    Severity, StartingPoint, WindObservation, ZoneLabel,
};
use serde::{Deserialize, Serialize};

/// A fire report row: one simulation workflow's persisted identity.
///
/// Immutable after creation; zones are attached through `report_zones`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireReportRow {
    /// Primary key (uuid).
    pub id: String,
    /// Human-readable code, `FR-YYYYMMDD-XXXX`.
    pub report_code: String,
    /// Optional display name.
    pub report_name: Option<String>,
    /// Latitude of the simulated ignition point.
    pub lat: f64,
    /// Longitude of the simulated ignition point.
    pub lon: f64,
    /// Raw simulation input, stored verbatim.
    pub simulation_params: serde_json::Value,
    /// Raw simulation output, stored verbatim.
    pub simulation_result: serde_json::Value,
    /// Creating user id.
    pub created_by: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A zone attached to a fire report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportZoneRow {
    /// Primary key (uuid).
    pub id: String,
    /// Owning report.
    pub report_id: String,
    /// Zone label, unique within the report.
    pub zone_name: ZoneLabel,
    /// Computed firebreak area for this zone, m².
    pub firebreak_area_m2: f64,
    /// Allocation summary attached after optimization, if any.
    pub allocation_result: Option<serde_json::Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Allocation summary stored on a report zone after a successful
/// optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSummary {
    /// Code of the selected operation center.
    pub operation_center: String,
    /// Available-staff count at the center when the plan was saved.
    pub staff_available: i64,
    /// Equipment quantities at the center when the plan was saved,
    /// keyed by equipment type.
    pub equipment: serde_json::Value,
    /// The optimizer's per-zone outcome, stored verbatim.
    pub optimization_result: serde_json::Value,
}

/// One entry of an incident's append-only status history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    /// Fire-observation status recorded by this entry.
    pub status: FireStatus,
    /// Display name of the updating officer.
    pub updated_by: String,
    /// When the entry was appended (RFC 3339).
    pub updated_at: DateTime<Utc>,
}

/// A tracked incident row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRow {
    /// Primary key (uuid).
    pub id: String,
    /// Zone of the originating report.
    pub zone: ZoneLabel,
    /// Latitude of the fire.
    pub lat: f64,
    /// Longitude of the fire.
    pub lon: f64,
    /// Derived severity.
    pub severity: Severity,
    /// Lifecycle status, derived from `fire_status`.
    pub status: IncidentStatus,
    /// Current fire-observation status.
    pub fire_status: FireStatus,
    /// Area breakdown at creation, m² per cell state.
    pub cell_status: CellAreas,
    /// Rate-of-spread statistics over the run.
    pub ros_statistics: RosStatistics,
    /// Environmental snapshot at the ignition point.
    pub starting_point: StartingPoint,
    /// Wind observation from the simulation.
    pub wind_info: WindObservation,
    /// Raw simulation input, stored verbatim.
    pub simulation_params: serde_json::Value,
    /// Raw optimizer response, stored verbatim.
    pub optimization_result: Option<serde_json::Value>,
    /// Append-only, chronological status history. Entry 1 is the
    /// creation entry.
    pub status_history: Vec<StatusHistoryEntry>,
    /// Originating report id.
    pub report_id: Option<String>,
    /// Originating report code.
    pub report_code: Option<String>,
    /// Creating user id.
    pub created_by: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert shape for a new incident. The id and timestamps are assigned
/// by the insert query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIncident {
    /// Zone of the originating report.
    pub zone: ZoneLabel,
    /// Latitude of the fire.
    pub lat: f64,
    /// Longitude of the fire.
    pub lon: f64,
    /// Derived severity.
    pub severity: Severity,
    /// Lifecycle status.
    pub status: IncidentStatus,
    /// Fire-observation status.
    pub fire_status: FireStatus,
    /// Area breakdown, m².
    pub cell_status: CellAreas,
    /// Rate-of-spread statistics.
    pub ros_statistics: RosStatistics,
    /// Environmental snapshot at ignition.
    pub starting_point: StartingPoint,
    /// Wind observation.
    pub wind_info: WindObservation,
    /// Raw simulation input.
    pub simulation_params: serde_json::Value,
    /// Raw optimizer response.
    pub optimization_result: Option<serde_json::Value>,
    /// Initial single-entry status history.
    pub status_history: Vec<StatusHistoryEntry>,
    /// Originating report id.
    pub report_id: Option<String>,
    /// Originating report code.
    pub report_code: Option<String>,
    /// Creating user id.
    pub created_by: String,
}

/// Incident counts for the dashboard, aggregated over all incidents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IncidentStats {
    /// Total incident count.
    pub total: u64,
    /// Incidents with lifecycle status `active`.
    pub active: u64,
    /// Incidents with lifecycle status `contained`.
    pub contained: u64,
    /// Incidents with lifecycle status `resolved`.
    pub resolved: u64,
    /// Incidents with fire status `burning`.
    pub burning: u64,
    /// Incidents with fire status `contained`.
    pub contained_fires: u64,
    /// Incidents with fire status `extinguished`.
    pub extinguished: u64,
    /// Incidents with severity `high`.
    pub high: u64,
    /// Incidents with severity `medium`.
    pub medium: u64,
    /// Incidents with severity `low`.
    pub low: u64,
}

/// An operation center row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationCenterRow {
    /// Center code (primary key).
    pub code: String,
    /// Display name.
    pub name: String,
    /// Free-form location description.
    pub location: Option<String>,
    /// Latitude of the center.
    pub latitude: Option<f64>,
    /// Longitude of the center.
    pub longitude: Option<f64>,
    /// Free-form description.
    pub description: Option<String>,
    /// Number of officers assigned to this center.
    pub staff_count: i64,
}

/// An equipment quantity row, keyed by (center, type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRow {
    /// Owning operation center code.
    pub operation_center: String,
    /// Equipment type.
    pub equipment_type: EquipmentType,
    /// Current quantity at the center.
    pub quantity: i64,
}

/// A user profile row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRow {
    /// User id (uuid).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Assigned operation center code.
    pub operation_center: String,
    /// Daily availability status.
    pub current_status: AvailabilityStatus,
}

/// Staff availability counts for one operation center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StaffCounts {
    /// Officers currently marked available.
    pub available: i64,
    /// All officers assigned to the center.
    pub total: i64,
}

/// A notification row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRow {
    /// Primary key (uuid).
    pub id: String,
    /// Target user id.
    pub user_id: Option<String>,
    /// Authoring user id.
    pub sender_id: Option<String>,
    /// Title line.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Notification category (alert/info/warning).
    pub kind: String,
    /// Whether the target user has read it.
    pub read: bool,
    /// Linked fire report, if any.
    pub report_id: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert shape for one notification in a fan-out batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    /// Target user id.
    pub user_id: String,
    /// Authoring user id.
    pub sender_id: Option<String>,
    /// Title line.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Notification category.
    pub kind: String,
    /// Linked fire report, if any.
    pub report_id: Option<String>,
}

/// One day's availability record for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStatusRow {
    /// User id.
    pub user_id: String,
    /// The day the status applies to.
    pub date: NaiveDate,
    /// Availability for that day.
    pub status: AvailabilityStatus,
}
