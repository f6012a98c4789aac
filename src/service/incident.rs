//! Incident orchestration: analyze, approve, and reject flows
//!
//! Thin coordinator over the store and the two capabilities (analysis,
//! change management). All status decisions live in the store; this layer
//! adds the cache-hit short-circuit and capability dispatch.

use std::sync::Arc;

use crate::model::incident::{Incident, IncidentStatus};
use crate::model::remediation::RemediationPlan;
use crate::service::analysis::{AnalysisError, IncidentAnalyzer};
use crate::service::changes::{ChangeError, ChangeManagement, ChangeRef};
use crate::service::store::{IncidentStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Incident not found: {0}")]
    NotFound(String),

    #[error("Incident analysis is not configured")]
    AnalyzerUnavailable,

    #[error("No remediation plan cached for {0}")]
    PlanMissing(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Change(#[from] ChangeError),
}

/// Incident state and workflow service.
pub struct IncidentService {
    store: Arc<IncidentStore>,
    analyzer: Option<Arc<dyn IncidentAnalyzer>>,
    changes: Arc<dyn ChangeManagement>,
}

impl IncidentService {
    pub fn new(
        store: Arc<IncidentStore>,
        analyzer: Option<Arc<dyn IncidentAnalyzer>>,
        changes: Arc<dyn ChangeManagement>,
    ) -> Self {
        Self {
            store,
            analyzer,
            changes,
        }
    }

    pub fn analyzer_configured(&self) -> bool {
        self.analyzer.is_some()
    }

    /// Add an incident to the session.
    pub fn ingest(&self, incident: Incident) {
        tracing::info!(
            incident_id = %incident.id,
            service = %incident.service,
            severity = %incident.severity,
            "Incident ingested"
        );
        self.store.insert(incident);
    }

    pub fn list(&self) -> Vec<Incident> {
        self.store.list()
    }

    pub fn get(&self, id: &str) -> Option<Incident> {
        self.store.get(id)
    }

    pub fn plan(&self, id: &str) -> Option<RemediationPlan> {
        self.store.plan(id)
    }

    /// Run root-cause analysis for an incident.
    ///
    /// A cached plan is returned as-is without a second reasoning request.
    /// Otherwise the incident moves OPEN → ANALYZING → REMEDIATION_PROPOSED,
    /// reverting to OPEN (nothing cached) when the analyzer fails.
    pub async fn analyze(&self, id: &str) -> Result<RemediationPlan, FlowError> {
        if let Some(plan) = self.store.plan(id) {
            tracing::debug!(incident_id = %id, "Returning cached remediation plan");
            return Ok(plan);
        }

        if self.store.get(id).is_none() {
            return Err(FlowError::NotFound(id.to_string()));
        }

        let analyzer = self.analyzer.as_ref().ok_or(FlowError::AnalyzerUnavailable)?;
        let incident = self.store.begin_analysis(id)?;

        match analyzer.analyze(&incident).await {
            Ok(plan) => {
                self.store.complete_analysis(id, plan.clone())?;
                tracing::info!(
                    incident_id = %id,
                    category = %plan.root_cause_category,
                    confidence = plan.confidence,
                    "Remediation proposed"
                );
                Ok(plan)
            }
            Err(e) => {
                self.store.fail_analysis(id);
                tracing::error!(incident_id = %id, error = %e, "Incident analysis failed");
                Err(e.into())
            }
        }
    }

    /// Approve a proposed remediation: submit it to change management, then
    /// mark the incident RESOLVED. A provider failure leaves the incident in
    /// REMEDIATION_PROPOSED with its plan intact.
    pub async fn approve(&self, id: &str) -> Result<(Incident, ChangeRef), FlowError> {
        let incident = self
            .store
            .get(id)
            .ok_or_else(|| FlowError::NotFound(id.to_string()))?;

        if incident.status != IncidentStatus::RemediationProposed {
            return Err(StoreError::IllegalTransition {
                id: id.to_string(),
                from: incident.status,
                to: IncidentStatus::Resolved,
            }
            .into());
        }

        let plan = self
            .store
            .plan(id)
            .ok_or_else(|| FlowError::PlanMissing(id.to_string()))?;

        let change = self.changes.submit(id, &plan).await?;
        let resolved = self.store.resolve(id)?;

        tracing::info!(
            incident_id = %id,
            reference = %change.reference,
            "Incident resolved"
        );
        Ok((resolved, change))
    }

    /// Reject a proposed remediation: the plan is discarded and the incident
    /// returns to OPEN, permitting a fresh analysis.
    pub fn reject(&self, id: &str) -> Result<Incident, FlowError> {
        let reopened = self.store.reject(id)?;
        tracing::info!(incident_id = %id, "Remediation rejected");
        Ok(reopened)
    }

    /// Submit an externally supplied plan for an incident, without touching
    /// incident state. Backs the `/api/remediate` contract.
    pub async fn submit_change(
        &self,
        incident_id: &str,
        plan: &RemediationPlan,
    ) -> Result<ChangeRef, FlowError> {
        Ok(self.changes.submit(incident_id, plan).await?)
    }
}
