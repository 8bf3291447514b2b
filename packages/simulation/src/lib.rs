#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Fire-spread simulator client.
//!
//! Wraps the external simulation service behind the [`FireSimulator`]
//! trait and validates every input field before any network call is
//! made. The service's response is kept verbatim for storage; typed
//! accessors expose the pieces the workflow needs.

use async_trait::async_trait;
use firewatch_fire_models::{CellAreas, WindObservation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod client;
mod validation;

pub use client::HttpSimulator;
pub use validation::validate;

/// Grid dimensions accepted by the simulation service.
pub const GRID_SIZES: &[u32] = &[25, 50, 100];

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending field.
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

/// Errors from validating inputs or calling the simulation service.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The request never reached the service or the transport failed.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("Simulation service returned {status}: {message}")]
    RemoteFailure {
        /// HTTP status code from the service.
        status: u16,
        /// Response body, as far as it could be read.
        message: String,
    },
    /// One or more input fields are out of range.
    #[error("Invalid simulation input: {}", .0.iter().map(|e| format!("{}: {}", e.field, e.message)).collect::<Vec<_>>().join("; "))]
    Invalid(Vec<FieldError>),
}

/// Input to one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// Ignition latitude.
    pub lat: f64,
    /// Ignition longitude.
    pub lon: f64,
    /// Simulation year.
    pub year: i32,
    /// Simulation month, 1-12.
    pub month: u32,
    /// Simulation day of month, 1-31.
    pub day: u32,
    /// Grid width in cells.
    pub grid_x: u32,
    /// Grid height in cells.
    pub grid_y: u32,
    /// Simulated duration in minutes.
    pub sim_minutes: u32,
    /// Cell edge length in meters.
    pub cell_size: f64,
}

/// Area bucket of the response summary.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AreaBucket {
    /// Area in square meters.
    pub area_m2: f64,
}

/// Per-cell-state area summary of one run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulationSummary {
    /// Area never reached by fire.
    pub unburned: AreaBucket,
    /// Area still burning at the end of the run.
    pub burning: AreaBucket,
    /// Area fully burned.
    pub burned: AreaBucket,
    /// Area cleared as firebreak.
    pub firebreak: AreaBucket,
}

/// Simulation service response.
///
/// The service reports no rate-of-spread block; ROS statistics default
/// to zero downstream.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulationResponse {
    /// Wind speed at the ignition point, m/s.
    #[serde(default)]
    pub wind_speed: f64,
    /// Wind direction at the ignition point, degrees.
    #[serde(default)]
    pub wind_direction: f64,
    /// Area breakdown per cell state.
    pub summary: SimulationSummary,
}

impl SimulationResponse {
    /// Area breakdown as the domain value type.
    #[must_use]
    pub const fn cell_areas(&self) -> CellAreas {
        CellAreas {
            unburned_area_m2: self.summary.unburned.area_m2,
            burning_area_m2: self.summary.burning.area_m2,
            burned_area_m2: self.summary.burned.area_m2,
            firebreak_area_m2: self.summary.firebreak.area_m2,
        }
    }

    /// Wind observation as the domain value type.
    #[must_use]
    pub const fn wind(&self) -> WindObservation {
        WindObservation {
            speed_mps: self.wind_speed,
            direction_deg: self.wind_direction,
        }
    }
}

/// Seam over the external simulation service.
#[async_trait]
pub trait FireSimulator: Send + Sync {
    /// Runs one simulation. The bearer token, when present, is passed
    /// through to the service untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError`] if the request fails or the service
    /// rejects it.
    async fn simulate(
        &self,
        request: &SimulationRequest,
        token: Option<&str>,
    ) -> Result<SimulationResponse, SimulationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parses_wire_shape() {
        let body = serde_json::json!({
            "wind_speed": 3.4,
            "wind_direction": 225.0,
            "summary": {
                "unburned": {"area_m2": 500_000.0},
                "burning": {"area_m2": 12_000.0},
                "burned": {"area_m2": 88_000.0},
                "firebreak": {"area_m2": 4_000.0}
            }
        });

        let response: SimulationResponse = serde_json::from_value(body).unwrap();
        let areas = response.cell_areas();
        assert!((areas.total_m2() - 604_000.0).abs() < f64::EPSILON);
        assert!((response.wind().speed_mps - 3.4).abs() < f64::EPSILON);
    }

    #[test]
    fn response_without_wind_defaults_to_zero() {
        let body = serde_json::json!({
            "summary": {
                "unburned": {"area_m2": 100.0},
                "burning": {"area_m2": 0.0},
                "burned": {"area_m2": 0.0},
                "firebreak": {"area_m2": 0.0}
            }
        });

        let response: SimulationResponse = serde_json::from_value(body).unwrap();
        assert!(response.wind_speed.abs() < f64::EPSILON);
        assert!(response.wind_direction.abs() < f64::EPSILON);
    }
}
