#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Resource optimizer client.
//!
//! Wraps the external optimization service behind the
//! [`ResourceOptimizer`] trait. All client-side arithmetic is limited
//! to aggregating the per-zone outcomes the service returns; the
//! optimization itself is entirely remote.

use std::collections::BTreeMap;

use async_trait::async_trait;
use firewatch_fire_models::ZoneLabel;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod client;

pub use client::HttpOptimizer;

/// Errors from calling the optimization service.
#[derive(Debug, Error)]
pub enum OptimizerError {
    /// The request never reached the service or the transport failed.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// The service answered with a non-success HTTP status.
    #[error("Optimizer service returned {status}: {message}")]
    RemoteFailure {
        /// HTTP status code from the service.
        status: u16,
        /// Response body, as far as it could be read.
        message: String,
    },
    /// The service answered 200 but reported an error status.
    #[error("Optimization failed: {0}")]
    Rejected(String),
}

/// The optimizer's plan for one zone.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ZoneOutcome {
    /// Deployment flag, 0 or 1 on the wire.
    #[serde(rename = "do", default)]
    pub deploy: u8,
    /// Number of teams assigned.
    #[serde(default)]
    pub teams: i64,
    /// Estimated operation time for this zone, minutes.
    #[serde(default)]
    pub time: f64,
    /// Firebreak area left unfinished within the time budget, m².
    #[serde(default)]
    pub unfinished_area: f64,
}

impl ZoneOutcome {
    /// Whether the optimizer recommends deploying to this zone.
    #[must_use]
    pub const fn deploys(&self) -> bool {
        self.deploy != 0
    }
}

/// Per-zone results of one optimization run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Outcome per requested zone label.
    pub zones: BTreeMap<ZoneLabel, ZoneOutcome>,
}

/// Optimization service response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationOutcome {
    /// `"success"` or `"error"`.
    pub status: String,
    /// Per-zone plan, present on success.
    #[serde(default)]
    pub result: OptimizationResult,
}

/// Aggregate view over a full optimization outcome.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AllocationAggregate {
    /// Sum of teams across all zones.
    pub total_teams: i64,
    /// Longest per-zone operation time, minutes.
    pub operation_time: f64,
    /// Sum of unfinished firebreak area across all zones, m².
    pub unfinished_area_m2: f64,
    /// Whether the plan deploys nobody and leaves nothing unfinished.
    pub no_deployment_needed: bool,
}

/// Aggregates an optimization outcome: total teams is the sum,
/// operation time the max, unfinished area the sum.
///
/// A plan needs no deployment when the requested firebreak area is 0,
/// or when every zone outcome has no teams and no unfinished area. Such
/// a plan is still saveable; its effective team count is 0.
#[must_use]
pub fn aggregate(
    requested: &BTreeMap<ZoneLabel, f64>,
    outcome: &OptimizationOutcome,
) -> AllocationAggregate {
    let zones = &outcome.result.zones;

    let total_teams = zones.values().map(|z| z.teams).sum();
    let operation_time = zones.values().map(|z| z.time).fold(0.0, f64::max);
    let unfinished_area_m2 = zones.values().map(|z| z.unfinished_area).sum();

    let requested_total: f64 = requested.values().sum();
    let no_deployment_needed = requested_total <= 0.0
        || zones
            .values()
            .all(|z| z.teams == 0 && z.unfinished_area <= 0.0);

    AllocationAggregate {
        total_teams,
        operation_time,
        unfinished_area_m2,
        no_deployment_needed,
    }
}

/// Seam over the external optimization service, including its zone
/// bookkeeping endpoints.
#[async_trait]
pub trait ResourceOptimizer: Send + Sync {
    /// Requests an allocation plan for the given zones and their
    /// firebreak areas.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizerError`] if the request fails or the service
    /// reports an error status.
    async fn optimize(
        &self,
        zones: &BTreeMap<ZoneLabel, f64>,
        token: Option<&str>,
    ) -> Result<OptimizationOutcome, OptimizerError>;

    /// Records a zone with the service's bookkeeping store.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizerError`] if the request fails.
    async fn save_zone(
        &self,
        zone: ZoneLabel,
        firebreak_area_m2: f64,
        token: Option<&str>,
    ) -> Result<(), OptimizerError>;

    /// Clears the service's bookkeeping store.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizerError`] if the request fails.
    async fn clear_zones(&self, token: Option<&str>) -> Result<(), OptimizerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(zones: &[(ZoneLabel, ZoneOutcome)]) -> OptimizationOutcome {
        OptimizationOutcome {
            status: "success".to_string(),
            result: OptimizationResult {
                zones: zones.iter().copied().collect(),
            },
        }
    }

    #[test]
    fn parses_wire_shape() {
        let body = serde_json::json!({
            "status": "success",
            "result": {
                "zones": {
                    "A": {"do": 1, "teams": 3, "time": 45.2, "unfinished_area": 500.0},
                    "B": {"do": 0, "teams": 0, "time": 0.0, "unfinished_area": 120.5}
                }
            }
        });

        let outcome: OptimizationOutcome = serde_json::from_value(body).unwrap();
        assert_eq!(outcome.status, "success");
        assert!(outcome.result.zones[&ZoneLabel::A].deploys());
        assert_eq!(outcome.result.zones[&ZoneLabel::A].teams, 3);
        assert!(!outcome.result.zones[&ZoneLabel::B].deploys());
        assert_eq!(outcome.result.zones[&ZoneLabel::B].teams, 0);
    }

    #[test]
    fn tolerates_a_missing_deploy_flag() {
        let outcome: ZoneOutcome =
            serde_json::from_value(serde_json::json!({"teams": 2, "time": 10.0})).unwrap();
        assert!(!outcome.deploys());
        assert_eq!(outcome.teams, 2);
    }

    #[test]
    fn aggregates_sum_max_sum() {
        let requested = [(ZoneLabel::A, 800.0), (ZoneLabel::B, 400.0)]
            .into_iter()
            .collect();
        let outcome = outcome(&[
            (
                ZoneLabel::A,
                ZoneOutcome {
                    deploy: 1,
                    teams: 3,
                    time: 45.0,
                    unfinished_area: 10.0,
                },
            ),
            (
                ZoneLabel::B,
                ZoneOutcome {
                    deploy: 1,
                    teams: 2,
                    time: 90.0,
                    unfinished_area: 5.0,
                },
            ),
        ]);

        let aggregate = aggregate(&requested, &outcome);
        assert_eq!(aggregate.total_teams, 5);
        assert!((aggregate.operation_time - 90.0).abs() < f64::EPSILON);
        assert!((aggregate.unfinished_area_m2 - 15.0).abs() < f64::EPSILON);
        assert!(!aggregate.no_deployment_needed);
    }

    #[test]
    fn detects_no_deployment_from_zero_request() {
        let requested = [(ZoneLabel::A, 0.0)].into_iter().collect();
        let aggregate = aggregate(&requested, &outcome(&[(ZoneLabel::A, ZoneOutcome::default())]));
        assert!(aggregate.no_deployment_needed);
        assert_eq!(aggregate.total_teams, 0);
    }

    #[test]
    fn detects_no_deployment_from_idle_plan() {
        let requested = [(ZoneLabel::A, 500.0)].into_iter().collect();
        let aggregate = aggregate(
            &requested,
            &outcome(&[(
                ZoneLabel::A,
                ZoneOutcome {
                    deploy: 0,
                    teams: 0,
                    time: 0.0,
                    unfinished_area: 0.0,
                },
            )]),
        );
        assert!(aggregate.no_deployment_needed);
    }

    #[test]
    fn busy_plan_is_not_trivially_complete() {
        let requested = [(ZoneLabel::A, 500.0)].into_iter().collect();
        let aggregate = aggregate(
            &requested,
            &outcome(&[(
                ZoneLabel::A,
                ZoneOutcome {
                    deploy: 0,
                    teams: 0,
                    time: 0.0,
                    unfinished_area: 500.0,
                },
            )]),
        );
        assert!(!aggregate.no_deployment_needed);
    }
}
