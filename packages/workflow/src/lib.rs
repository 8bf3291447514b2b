#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Incident workflow manager.
//!
//! Drives the simulate → optimize → allocate → track lifecycle: a
//! [`ReportSession`] carries one report through its zones, simulation
//! results are persisted as reports and zones, allocation saves create
//! tracked incidents, and status updates append to the incident's
//! history. Notification fan-out to every other user happens when a
//! report is broadcast.

use firewatch_database::DbError;
use firewatch_fire_models::{FireStatus, ZoneLabel};
use firewatch_optimizer::OptimizerError;
use firewatch_simulation::SimulationError;
use thiserror::Error;

mod allocation;
mod notify;
mod session;
mod simulate;
mod status;

#[cfg(test)]
pub(crate) mod tests;

pub use allocation::{AllocationParams, finish_report, request_allocation, save_allocation};
pub use notify::broadcast_report;
pub use session::{ReportIdentity, ReportSession};
pub use simulate::{SimulationParams, SimulationRun, generate_report_code, run_simulation};
pub use status::update_status;

/// Errors from the incident workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Input validation failed or the simulation service failed.
    #[error(transparent)]
    Simulation(#[from] SimulationError),

    /// The optimization service failed or rejected the request.
    #[error(transparent)]
    Optimization(#[from] OptimizerError),

    /// A persistence step failed. After a failed simulation save the
    /// result stays in the session, so the save can be retried without
    /// re-simulating.
    #[error(transparent)]
    Database(#[from] DbError),

    /// The requested zone already has simulation results in this report.
    #[error("Zone {0} already has results in this report")]
    DuplicateZone(ZoneLabel),

    /// Allocation was requested for a zone this session never simulated.
    #[error("Zone {0} has no simulation results in this session")]
    MissingSimulation(ZoneLabel),

    /// The session has no report to attach the operation to.
    #[error("No active report in this session")]
    NoActiveReport,

    /// The incident id does not exist.
    #[error("Incident not found: {0}")]
    IncidentNotFound(String),

    /// The update names the fire status the incident already has.
    #[error("Incident is already {0}")]
    StatusUnchanged(FireStatus),
}
