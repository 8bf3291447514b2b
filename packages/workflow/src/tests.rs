//! Shared fakes for workflow tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use firewatch_fire_models::ZoneLabel;
use firewatch_optimizer::{
    OptimizationOutcome, OptimizationResult, OptimizerError, ResourceOptimizer, ZoneOutcome,
};
use firewatch_simulation::{
    AreaBucket, FireSimulator, SimulationError, SimulationRequest, SimulationResponse,
    SimulationSummary,
};

use crate::SimulationParams;

pub struct FakeSimulator {
    response: Option<SimulationResponse>,
    calls: AtomicUsize,
}

impl FakeSimulator {
    pub fn succeeding(response: SimulationResponse) -> Self {
        Self {
            response: Some(response),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FireSimulator for FakeSimulator {
    async fn simulate(
        &self,
        _request: &SimulationRequest,
        _token: Option<&str>,
    ) -> Result<SimulationResponse, SimulationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response
            .clone()
            .ok_or(SimulationError::RemoteFailure {
                status: 500,
                message: "simulated outage".to_string(),
            })
    }
}

#[derive(Default)]
pub struct FakeOptimizer {
    outcome: Option<OptimizationOutcome>,
    reject_bookkeeping: bool,
    cleared: AtomicBool,
}

impl FakeOptimizer {
    pub fn with_outcome(outcome: OptimizationOutcome) -> Self {
        Self {
            outcome: Some(outcome),
            ..Self::default()
        }
    }

    pub fn rejecting_bookkeeping() -> Self {
        Self {
            reject_bookkeeping: true,
            ..Self::default()
        }
    }

    pub fn cleared(&self) -> bool {
        self.cleared.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceOptimizer for FakeOptimizer {
    async fn optimize(
        &self,
        zones: &BTreeMap<ZoneLabel, f64>,
        _token: Option<&str>,
    ) -> Result<OptimizationOutcome, OptimizerError> {
        Ok(self.outcome.clone().unwrap_or_else(|| OptimizationOutcome {
            status: "success".to_string(),
            result: OptimizationResult {
                zones: zones
                    .keys()
                    .map(|zone| (*zone, ZoneOutcome::default()))
                    .collect(),
            },
        }))
    }

    async fn save_zone(
        &self,
        _zone: ZoneLabel,
        _firebreak_area_m2: f64,
        _token: Option<&str>,
    ) -> Result<(), OptimizerError> {
        if self.reject_bookkeeping {
            return Err(OptimizerError::RemoteFailure {
                status: 500,
                message: "bookkeeping down".to_string(),
            });
        }
        Ok(())
    }

    async fn clear_zones(&self, _token: Option<&str>) -> Result<(), OptimizerError> {
        if self.reject_bookkeeping {
            return Err(OptimizerError::RemoteFailure {
                status: 500,
                message: "bookkeeping down".to_string(),
            });
        }
        self.cleared.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub fn sample_response() -> SimulationResponse {
    SimulationResponse {
        wind_speed: 3.2,
        wind_direction: 180.0,
        summary: SimulationSummary {
            unburned: AreaBucket { area_m2: 500_000.0 },
            burning: AreaBucket { area_m2: 12_000.0 },
            burned: AreaBucket { area_m2: 88_000.0 },
            firebreak: AreaBucket { area_m2: 4_000.0 },
        },
    }
}

pub fn sample_params(zone: ZoneLabel) -> SimulationParams {
    SimulationParams {
        request: SimulationRequest {
            lat: 18.7883,
            lon: 98.9853,
            year: 2025,
            month: 11,
            day: 2,
            grid_x: 50,
            grid_y: 50,
            sim_minutes: 120,
            cell_size: 30.0,
        },
        zone,
        report_name: Some("Doi Suthep burn".to_string()),
        created_by: Some("officer-1".to_string()),
    }
}
