#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the firewatch server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the database row types to allow independent evolution of the API
//! contract.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use firewatch_database_models::{
    EquipmentRow, IncidentRow, IncidentStats, NotificationRow, OperationCenterRow, ProfileRow,
    StaffCounts, StatusHistoryEntry,
};
use firewatch_fire_models::{
    AvailabilityStatus, CellAreas, EquipmentType, FireStatus, IncidentStatus, RosStatistics,
    Severity, StartingPoint, WindObservation, ZoneLabel,
};
use firewatch_optimizer::AllocationAggregate;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Body of the simulate endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateBody {
    /// Ignition latitude.
    pub lat: f64,
    /// Ignition longitude.
    pub lon: f64,
    /// Simulation year.
    pub year: i32,
    /// Simulation month.
    pub month: u32,
    /// Simulation day of month.
    pub day: u32,
    /// Grid width in cells.
    pub grid_x: u32,
    /// Grid height in cells.
    pub grid_y: u32,
    /// Simulated duration in minutes.
    pub sim_minutes: u32,
    /// Cell edge length in meters.
    pub cell_size: f64,
    /// Zone the results belong to.
    pub zone: ZoneLabel,
    /// Display name for the report, used when this call creates it.
    pub report_name: Option<String>,
    /// Report to resume, when adding a zone to an existing report.
    pub report_id: Option<String>,
    /// Retry token from a failed first save, used to reuse its held
    /// simulation result. Ignored when `report_id` is set.
    pub session_id: Option<String>,
    /// Initiating user id.
    pub user_id: Option<String>,
}

/// Response of the simulate endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSimulationRun {
    /// Report row id.
    pub report_id: String,
    /// Human-readable report code.
    pub report_code: String,
    /// Zone the results were attached to.
    pub zone: ZoneLabel,
    /// Area breakdown per cell state, m².
    pub cell_status: CellAreas,
    /// Burn percentage of the simulated area.
    pub burn_percentage: f64,
    /// Wind at the ignition point.
    pub wind: WindObservation,
    /// Zone labels still open on this report.
    pub available_zones: Vec<ZoneLabel>,
}

/// Body of the optimize endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeBody {
    /// Firebreak area per zone, m².
    pub zones: BTreeMap<ZoneLabel, f64>,
}

/// Response of the optimize endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAllocationPlan {
    /// The optimizer's full response, verbatim.
    pub result: serde_json::Value,
    /// Sum of teams across all zones.
    pub total_teams: i64,
    /// Longest per-zone operation time, minutes.
    pub operation_time: f64,
    /// Sum of unfinished firebreak area, m².
    pub unfinished_area_m2: f64,
    /// Whether the plan deploys nobody and leaves nothing unfinished.
    pub no_deployment_needed: bool,
}

impl ApiAllocationPlan {
    /// Builds the API plan from the raw optimizer response and its
    /// aggregate.
    #[must_use]
    pub fn new(result: serde_json::Value, aggregate: &AllocationAggregate) -> Self {
        Self {
            result,
            total_teams: aggregate.total_teams,
            operation_time: aggregate.operation_time,
            unfinished_area_m2: aggregate.unfinished_area_m2,
            no_deployment_needed: aggregate.no_deployment_needed,
        }
    }
}

/// Body of the allocation save endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAllocationBody {
    /// Report the allocation belongs to.
    pub report_id: String,
    /// Zone the allocation covers.
    pub zone: ZoneLabel,
    /// Selected operation center code.
    pub operation_center: String,
    /// Available-staff count at save time.
    pub staff_available: i64,
    /// Equipment snapshot at save time, by type.
    pub equipment: serde_json::Value,
    /// The optimizer's outcome for this zone.
    pub zone_outcome: serde_json::Value,
    /// Measured rate-of-spread statistics, when available.
    pub ros: Option<RosStatistics>,
    /// The full optimizer response.
    pub optimization_result: serde_json::Value,
    /// Display name of the initiating officer.
    pub officer_name: String,
    /// Initiating user id.
    pub user_id: String,
}

/// A tracked incident as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiIncident {
    /// Incident id.
    pub id: String,
    /// Zone of the originating report.
    pub zone: ZoneLabel,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
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
    /// Append-only status history.
    pub status_history: Vec<StatusHistoryEntry>,
    /// Originating report code.
    pub report_code: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<IncidentRow> for ApiIncident {
    fn from(row: IncidentRow) -> Self {
        Self {
            id: row.id,
            zone: row.zone,
            lat: row.lat,
            lon: row.lon,
            severity: row.severity,
            status: row.status,
            fire_status: row.fire_status,
            cell_status: row.cell_status,
            ros_statistics: row.ros_statistics,
            starting_point: row.starting_point,
            wind_info: row.wind_info,
            status_history: row.status_history,
            report_code: row.report_code,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Body of the incident status update endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateBody {
    /// The new fire-observation status.
    pub fire_status: FireStatus,
    /// Display name of the updating officer.
    pub officer_name: String,
}

/// Incident dashboard counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiIncidentStats {
    /// Total incident count.
    pub total: u64,
    /// Counts by lifecycle status.
    pub by_status: BTreeMap<IncidentStatus, u64>,
    /// Counts by fire status.
    pub by_fire_status: BTreeMap<FireStatus, u64>,
    /// Counts by severity.
    pub by_severity: BTreeMap<Severity, u64>,
}

impl From<IncidentStats> for ApiIncidentStats {
    fn from(stats: IncidentStats) -> Self {
        Self {
            total: stats.total,
            by_status: [
                (IncidentStatus::Active, stats.active),
                (IncidentStatus::Contained, stats.contained),
                (IncidentStatus::Resolved, stats.resolved),
            ]
            .into_iter()
            .collect(),
            by_fire_status: [
                (FireStatus::Burning, stats.burning),
                (FireStatus::Contained, stats.contained_fires),
                (FireStatus::Extinguished, stats.extinguished),
            ]
            .into_iter()
            .collect(),
            by_severity: [
                (Severity::High, stats.high),
                (Severity::Medium, stats.medium),
                (Severity::Low, stats.low),
            ]
            .into_iter()
            .collect(),
        }
    }
}

/// An operation center as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOperationCenter {
    /// Center code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Free-form location description.
    pub location: Option<String>,
    /// Latitude.
    pub latitude: Option<f64>,
    /// Longitude.
    pub longitude: Option<f64>,
    /// Free-form description.
    pub description: Option<String>,
    /// Assigned officer count.
    pub staff_count: i64,
}

impl From<OperationCenterRow> for ApiOperationCenter {
    fn from(row: OperationCenterRow) -> Self {
        Self {
            code: row.code,
            name: row.name,
            location: row.location,
            latitude: row.latitude,
            longitude: row.longitude,
            description: row.description,
            staff_count: row.staff_count,
        }
    }
}

/// Body of the center create/update endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CenterBody {
    /// Center code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Free-form location description.
    pub location: Option<String>,
    /// Latitude.
    pub latitude: Option<f64>,
    /// Longitude.
    pub longitude: Option<f64>,
    /// Free-form description.
    pub description: Option<String>,
    /// Assigned officer count.
    #[serde(default)]
    pub staff_count: i64,
    /// Acting user id, checked against backend policy.
    pub user_id: Option<String>,
}

impl CenterBody {
    /// The row shape of this body.
    #[must_use]
    pub fn into_row(self) -> OperationCenterRow {
        OperationCenterRow {
            code: self.code,
            name: self.name,
            location: self.location,
            latitude: self.latitude,
            longitude: self.longitude,
            description: self.description,
            staff_count: self.staff_count,
        }
    }
}

/// One equipment quantity as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEquipment {
    /// Equipment type.
    pub equipment_type: EquipmentType,
    /// Quantity at the center.
    pub quantity: i64,
}

impl From<EquipmentRow> for ApiEquipment {
    fn from(row: EquipmentRow) -> Self {
        Self {
            equipment_type: row.equipment_type,
            quantity: row.quantity,
        }
    }
}

/// Body of the equipment upsert endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentBody {
    /// Equipment type.
    pub equipment_type: EquipmentType,
    /// New quantity, replacing the previous one.
    pub quantity: i64,
}

/// Staff availability counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStaffCounts {
    /// Officers currently marked available.
    pub available: i64,
    /// All officers assigned to the center.
    pub total: i64,
}

impl From<StaffCounts> for ApiStaffCounts {
    fn from(counts: StaffCounts) -> Self {
        Self {
            available: counts.available,
            total: counts.total,
        }
    }
}

/// A center's full resource picture: equipment plus staff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCenterResources {
    /// The center itself.
    pub center: ApiOperationCenter,
    /// Equipment quantities by type.
    pub equipment: Vec<ApiEquipment>,
    /// Staff availability counts.
    pub staff: ApiStaffCounts,
}

/// A user profile as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiProfile {
    /// User id.
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

impl From<ProfileRow> for ApiProfile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            operation_center: row.operation_center,
            current_status: row.current_status,
        }
    }
}

/// Body of the daily availability endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStatusBody {
    /// Availability for the day.
    pub status: AvailabilityStatus,
    /// The day the status applies to; today when omitted.
    pub date: Option<NaiveDate>,
}

/// A notification as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiNotification {
    /// Notification id.
    pub id: String,
    /// Title line.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Notification category.
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the user has read it.
    pub read: bool,
    /// Linked fire report, if any.
    pub report_id: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<NotificationRow> for ApiNotification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            message: row.message,
            kind: row.kind,
            read: row.read,
            report_id: row.report_id,
            created_at: row.created_at,
        }
    }
}

/// Unread notification count.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ApiUnreadCount {
    /// Number of unread notifications.
    pub count: u64,
}

/// Body of the report broadcast endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastBody {
    /// Report to announce.
    pub report_id: String,
    /// Zone the announcement covers.
    pub zone: ZoneLabel,
    /// Sending user id, excluded from the recipients.
    pub sender_id: String,
}

/// Query parameter naming the acting user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    /// The acting user id.
    pub user_id: String,
}
