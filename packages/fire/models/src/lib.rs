#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Wildfire domain taxonomy types and severity derivation.
//!
//! This crate defines the canonical enums and value types shared across the
//! entire firewatch system: zone labels, incident severity and status
//! taxonomies, equipment types, and the measurement records produced by a
//! fire-spread simulation run.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Label of a coverage zone within a fire report.
///
/// Each report covers up to one zone per label; the label set is fixed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum ZoneLabel {
    /// Zone A coverage area.
    A,
    /// Zone B coverage area.
    B,
    /// Zone C coverage area.
    C,
}

impl ZoneLabel {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::A, Self::B, Self::C]
    }
}

/// Severity of an incident, derived from the simulation outcome.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// Burn percentage above 30% or maximum rate of spread above 2 m/s.
    High,
    /// Burn percentage above 15% or maximum rate of spread above 1 m/s.
    Medium,
    /// Everything else.
    Low,
}

impl Severity {
    /// Derives the severity from the burn percentage (0–100) and the
    /// maximum observed rate of spread (m/s).
    ///
    /// The derivation is total: high iff `burn_pct > 30` or `ros_max > 2`,
    /// medium iff (not high and) `burn_pct > 15` or `ros_max > 1`,
    /// low otherwise.
    #[must_use]
    pub fn derive(burn_pct: f64, ros_max: f64) -> Self {
        if burn_pct > 30.0 || ros_max > 2.0 {
            Self::High
        } else if burn_pct > 15.0 || ros_max > 1.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Observed state of the fire itself, updated by officers in the field.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FireStatus {
    /// Fire is actively burning.
    Burning,
    /// Fire is held within control lines.
    Contained,
    /// Fire is fully extinguished.
    Extinguished,
}

impl FireStatus {
    /// Returns the incident lifecycle status derived from this
    /// fire-observation status.
    ///
    /// The mapping is total: burning→active, contained→contained,
    /// extinguished→resolved.
    #[must_use]
    pub const fn lifecycle(self) -> IncidentStatus {
        match self {
            Self::Burning => IncidentStatus::Active,
            Self::Contained => IncidentStatus::Contained,
            Self::Extinguished => IncidentStatus::Resolved,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Burning, Self::Contained, Self::Extinguished]
    }
}

/// Lifecycle status of a tracked incident, always derived from the
/// current [`FireStatus`] — never set independently.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IncidentStatus {
    /// Incident requires active response.
    Active,
    /// Incident is under control but still tracked.
    Contained,
    /// Incident is closed.
    Resolved,
}

/// Hand equipment tracked per operation center.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EquipmentType {
    /// Brush knife.
    Knife,
    /// Fire rake.
    Rake,
    /// Leaf blower.
    Blower,
    /// Drip torch.
    Torch,
}

impl EquipmentType {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Knife, Self::Rake, Self::Blower, Self::Torch]
    }
}

/// Daily availability of an officer.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AvailabilityStatus {
    /// Ready for deployment today.
    Available,
    /// Not deployable today.
    Unavailable,
}

/// Application role assigned to a user. Operation-center writes are
/// restricted to admins by backend policy.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AppRole {
    /// Full administrative access.
    Admin,
    /// Regular officer.
    User,
}

/// Category of a user notification.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationType {
    /// Urgent fire-report broadcast.
    Alert,
    /// Informational message.
    Info,
    /// Non-urgent caution.
    Warning,
}

/// Area breakdown of the simulated grid, in square meters per cell state.
///
/// The four categories conceptually sum to the report's total simulated
/// area; each is non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CellAreas {
    /// Area never reached by fire.
    pub unburned_area_m2: f64,
    /// Area currently burning at the end of the run.
    pub burning_area_m2: f64,
    /// Area fully burned.
    pub burned_area_m2: f64,
    /// Area cleared as firebreak / control line.
    pub firebreak_area_m2: f64,
}

impl CellAreas {
    /// Total simulated area: the sum of the four categories.
    #[must_use]
    pub fn total_m2(&self) -> f64 {
        self.unburned_area_m2 + self.burning_area_m2 + self.burned_area_m2 + self.firebreak_area_m2
    }

    /// Percentage of the total area that is burned or burning,
    /// 0 when the total area is 0.
    #[must_use]
    pub fn burn_percentage(&self) -> f64 {
        let total = self.total_m2();
        if total > 0.0 {
            (self.burned_area_m2 + self.burning_area_m2) / total * 100.0
        } else {
            0.0
        }
    }
}

/// Rate-of-spread statistics over a simulation run (m/s).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RosStatistics {
    /// Minimum observed rate of spread.
    pub min: f64,
    /// Average observed rate of spread.
    pub avg: f64,
    /// Maximum observed rate of spread.
    pub max: f64,
}

/// Wind observation at the starting point of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindObservation {
    /// Wind speed in m/s.
    pub speed_mps: f64,
    /// Wind direction in degrees, 0–360.
    pub direction_deg: f64,
}

/// Environmental snapshot at the ignition point of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StartingPoint {
    /// Latitude of the ignition point.
    pub lat: f64,
    /// Longitude of the ignition point.
    pub lon: f64,
    /// Air temperature in °C, when observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Relative humidity in percent, when observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    /// Wind speed at ignition in m/s, when observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    /// Wind direction at ignition in degrees, when observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_thresholds() {
        assert_eq!(Severity::derive(20.0, 0.5), Severity::Medium);
        assert_eq!(Severity::derive(5.0, 3.0), Severity::High);
        assert_eq!(Severity::derive(5.0, 0.0), Severity::Low);
        assert_eq!(Severity::derive(31.0, 0.0), Severity::High);
        assert_eq!(Severity::derive(30.0, 0.0), Severity::Medium);
        assert_eq!(Severity::derive(15.0, 0.0), Severity::Low);
        assert_eq!(Severity::derive(0.0, 1.0), Severity::Low);
        assert_eq!(Severity::derive(0.0, 2.0), Severity::Medium);
    }

    #[test]
    fn lifecycle_mapping_total() {
        assert_eq!(FireStatus::Burning.lifecycle(), IncidentStatus::Active);
        assert_eq!(FireStatus::Contained.lifecycle(), IncidentStatus::Contained);
        assert_eq!(
            FireStatus::Extinguished.lifecycle(),
            IncidentStatus::Resolved
        );
    }

    #[test]
    fn statuses_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&FireStatus::Burning).unwrap(),
            "\"burning\""
        );
        assert_eq!(
            serde_json::to_string(&IncidentStatus::Resolved).unwrap(),
            "\"resolved\""
        );
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"high\"");
        assert_eq!(FireStatus::Extinguished.to_string(), "extinguished");
        assert_eq!("contained".parse::<FireStatus>(), Ok(FireStatus::Contained));
    }

    #[test]
    fn zone_labels_roundtrip() {
        for zone in ZoneLabel::all() {
            let s = zone.to_string();
            assert_eq!(s.parse::<ZoneLabel>().unwrap(), *zone);
        }
        assert_eq!(ZoneLabel::A.to_string(), "A");
        assert!("D".parse::<ZoneLabel>().is_err());
    }

    #[test]
    fn burn_percentage_zero_total() {
        let areas = CellAreas::default();
        assert!((areas.burn_percentage()).abs() < f64::EPSILON);
    }

    #[test]
    fn burn_percentage_sums_categories() {
        let areas = CellAreas {
            unburned_area_m2: 6000.0,
            burning_area_m2: 1000.0,
            burned_area_m2: 2000.0,
            firebreak_area_m2: 1000.0,
        };
        assert!((areas.total_m2() - 10_000.0).abs() < f64::EPSILON);
        assert!((areas.burn_percentage() - 30.0).abs() < 1e-9);
    }
}
