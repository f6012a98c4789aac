//! In-memory incident store with atomic per-incident state transitions
//!
//! All session state lives here: the incident collection (insertion order
//! preserved) and the per-incident remediation plan cache. Every transition
//! runs under one lock, so the OPEN → ANALYZING check-and-set doubles as the
//! at-most-one-in-flight-analysis guard. Incidents are never deleted within
//! a session.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::model::incident::{Incident, IncidentStatus};
use crate::model::remediation::RemediationPlan;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Incident not found: {0}")]
    NotFound(String),

    #[error("Analysis already in flight for {0}")]
    AnalysisInFlight(String),

    #[error("Illegal transition for {id}: {from} -> {to}")]
    IllegalTransition {
        id: String,
        from: IncidentStatus,
        to: IncidentStatus,
    },
}

#[derive(Default)]
struct StoreInner {
    order: Vec<String>,
    incidents: HashMap<String, Incident>,
    plans: HashMap<String, RemediationPlan>,
}

#[derive(Default)]
pub struct IncidentStore {
    inner: Mutex<StoreInner>,
}

impl IncidentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new incident. Replaces silently on id collision; ids are
    /// process-unique by construction.
    pub fn insert(&self, incident: Incident) {
        let mut inner = self.inner.lock().expect("incident store poisoned");
        if !inner.incidents.contains_key(&incident.id) {
            inner.order.push(incident.id.clone());
        }
        inner.incidents.insert(incident.id.clone(), incident);
    }

    /// All incidents in insertion order.
    pub fn list(&self) -> Vec<Incident> {
        let inner = self.inner.lock().expect("incident store poisoned");
        inner
            .order
            .iter()
            .filter_map(|id| inner.incidents.get(id).cloned())
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<Incident> {
        let inner = self.inner.lock().expect("incident store poisoned");
        inner.incidents.get(id).cloned()
    }

    /// Cached remediation plan for an incident, if analysis has completed.
    pub fn plan(&self, id: &str) -> Option<RemediationPlan> {
        let inner = self.inner.lock().expect("incident store poisoned");
        inner.plans.get(id).cloned()
    }

    /// OPEN → ANALYZING, atomically. Fails when an analysis is already in
    /// flight, when a plan is already cached, or from any other status.
    pub fn begin_analysis(&self, id: &str) -> Result<Incident, StoreError> {
        let mut inner = self.inner.lock().expect("incident store poisoned");
        let has_plan = inner.plans.contains_key(id);
        let incident = inner
            .incidents
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        match incident.status {
            IncidentStatus::Analyzing => Err(StoreError::AnalysisInFlight(id.to_string())),
            IncidentStatus::Open if !has_plan => {
                incident.status = IncidentStatus::Analyzing;
                Ok(incident.clone())
            }
            from => Err(StoreError::IllegalTransition {
                id: id.to_string(),
                from,
                to: IncidentStatus::Analyzing,
            }),
        }
    }

    /// ANALYZING → REMEDIATION_PROPOSED, caching the plan.
    pub fn complete_analysis(
        &self,
        id: &str,
        plan: RemediationPlan,
    ) -> Result<Incident, StoreError> {
        let mut inner = self.inner.lock().expect("incident store poisoned");
        let incident = inner
            .incidents
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        match incident.status {
            IncidentStatus::Analyzing => {
                incident.status = IncidentStatus::RemediationProposed;
                let incident = incident.clone();
                inner.plans.insert(id.to_string(), plan);
                Ok(incident)
            }
            from => Err(StoreError::IllegalTransition {
                id: id.to_string(),
                from,
                to: IncidentStatus::RemediationProposed,
            }),
        }
    }

    /// ANALYZING → OPEN after a failed analysis; nothing is cached.
    /// Best-effort: a missing incident or unexpected status is left alone.
    pub fn fail_analysis(&self, id: &str) {
        let mut inner = self.inner.lock().expect("incident store poisoned");
        if let Some(incident) = inner.incidents.get_mut(id)
            && incident.status == IncidentStatus::Analyzing
        {
            incident.status = IncidentStatus::Open;
        }
    }

    /// REMEDIATION_PROPOSED → RESOLVED. Terminal; the plan stays cached for
    /// later reads.
    pub fn resolve(&self, id: &str) -> Result<Incident, StoreError> {
        let mut inner = self.inner.lock().expect("incident store poisoned");
        let incident = inner
            .incidents
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        match incident.status {
            IncidentStatus::RemediationProposed => {
                incident.status = IncidentStatus::Resolved;
                Ok(incident.clone())
            }
            from => Err(StoreError::IllegalTransition {
                id: id.to_string(),
                from,
                to: IncidentStatus::Resolved,
            }),
        }
    }

    /// REMEDIATION_PROPOSED → OPEN, discarding the cached plan so a later
    /// analyze call issues a fresh request.
    pub fn reject(&self, id: &str) -> Result<Incident, StoreError> {
        let mut inner = self.inner.lock().expect("incident store poisoned");
        let incident = inner
            .incidents
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        match incident.status {
            IncidentStatus::RemediationProposed => {
                incident.status = IncidentStatus::Open;
                let incident = incident.clone();
                inner.plans.remove(id);
                Ok(incident)
            }
            from => Err(StoreError::IllegalTransition {
                id: id.to_string(),
                from,
                to: IncidentStatus::Open,
            }),
        }
    }
}
