//! Session state for one report-building workflow.
//!
//! A session pins the report identity once the first zone is saved and
//! tracks which zones are spoken for, so the duplicate-zone guard can
//! run before any network call. Simulation results are held here
//! between the simulate and allocate steps, and kept after a failed
//! save so the save can be retried without re-simulating.

use std::collections::{BTreeMap, BTreeSet};

use firewatch_fire_models::ZoneLabel;
use firewatch_simulation::{SimulationRequest, SimulationResponse};
use switchy_database::Database;

use crate::WorkflowError;

/// Identity of the report a session is building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportIdentity {
    /// Report row id.
    pub id: String,
    /// Human-readable report code.
    pub code: String,
}

#[derive(Debug, Clone)]
pub(crate) struct ZoneSimulation {
    pub request: SimulationRequest,
    pub response: SimulationResponse,
}

/// One report-building workflow's state.
#[derive(Debug, Default)]
pub struct ReportSession {
    report: Option<ReportIdentity>,
    used_zones: BTreeSet<ZoneLabel>,
    simulated: BTreeMap<ZoneLabel, ZoneSimulation>,
    pending: Option<(ZoneLabel, ZoneSimulation)>,
}

impl ReportSession {
    /// Creates an empty session with no report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes a session for an existing report, loading its used zones
    /// fresh from storage.
    ///
    /// Previously saved zones are excluded from re-selection; their
    /// simulation results are not reloaded, so allocation is only
    /// possible for zones simulated within the resumed session.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NoActiveReport`] if the report does not
    /// exist, or a database error if loading fails.
    pub async fn resume(db: &dyn Database, report_id: &str) -> Result<Self, WorkflowError> {
        let report = firewatch_database::reports::get_report(db, report_id)
            .await?
            .ok_or(WorkflowError::NoActiveReport)?;
        let used_zones = firewatch_database::reports::get_existing_zones(db, report_id)
            .await?
            .into_iter()
            .collect();

        Ok(Self {
            report: Some(ReportIdentity {
                id: report.id,
                code: report.report_code,
            }),
            used_zones,
            simulated: BTreeMap::new(),
            pending: None,
        })
    }

    /// Clears everything: report identity, used zones, held results.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The report this session is building, once one exists.
    #[must_use]
    pub const fn report(&self) -> Option<&ReportIdentity> {
        self.report.as_ref()
    }

    /// Zones already holding results in this report.
    #[must_use]
    pub const fn used_zones(&self) -> &BTreeSet<ZoneLabel> {
        &self.used_zones
    }

    /// Whether a simulation result is held awaiting a (re)tried save.
    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Zone labels still open for simulation.
    #[must_use]
    pub fn available_zones(&self) -> Vec<ZoneLabel> {
        ZoneLabel::all()
            .iter()
            .copied()
            .filter(|zone| !self.used_zones.contains(zone))
            .collect()
    }

    pub(crate) fn set_report(&mut self, report: ReportIdentity) {
        self.report = Some(report);
    }

    pub(crate) fn simulation(&self, zone: ZoneLabel) -> Option<&ZoneSimulation> {
        self.simulated.get(&zone)
    }

    pub(crate) fn hold_pending(&mut self, zone: ZoneLabel, simulation: ZoneSimulation) {
        self.pending = Some((zone, simulation));
    }

    pub(crate) fn take_matching_pending(
        &mut self,
        zone: ZoneLabel,
        request: &SimulationRequest,
    ) -> Option<ZoneSimulation> {
        match &self.pending {
            Some((held_zone, held)) if *held_zone == zone && held.request == *request => {
                self.pending.take().map(|(_, simulation)| simulation)
            }
            _ => None,
        }
    }

    pub(crate) fn commit_zone(&mut self, zone: ZoneLabel, simulation: ZoneSimulation) {
        self.pending = None;
        self.used_zones.insert(zone);
        self.simulated.insert(zone, simulation);
    }
}
