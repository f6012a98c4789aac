//! Change-management capability: turning an approved plan into a merge
//! request
//!
//! The real integration (GitLab/GitHub) is an external collaborator; the
//! default provider simulates it and hands back a reference so the approval
//! flow is complete end to end.

use async_trait::async_trait;

use crate::model::remediation::RemediationPlan;

#[derive(Debug, thiserror::Error)]
pub enum ChangeError {
    #[error("Change provider request failed: {0}")]
    ProviderFailed(String),
}

/// Reference to a submitted change.
#[derive(Debug, Clone)]
pub struct ChangeRef {
    /// Provider-side locator, e.g. a merge-request path.
    pub reference: String,
    pub url: Option<String>,
    pub number: Option<u64>,
}

/// Capability interface for submitting an approved remediation.
#[async_trait]
pub trait ChangeManagement: Send + Sync {
    async fn submit(
        &self,
        incident_id: &str,
        plan: &RemediationPlan,
    ) -> Result<ChangeRef, ChangeError>;
}

/// Stand-in provider used when no source-control integration is configured.
pub struct SimulatedChangeProvider;

#[async_trait]
impl ChangeManagement for SimulatedChangeProvider {
    async fn submit(
        &self,
        incident_id: &str,
        plan: &RemediationPlan,
    ) -> Result<ChangeRef, ChangeError> {
        let reference = format!("mr/fix-{}", incident_id.to_lowercase());

        tracing::info!(
            incident_id = %incident_id,
            reference = %reference,
            branch = %plan.suggested_branch_name,
            auto_patch_safe = plan.auto_patch_safe,
            "Simulated merge request created"
        );

        Ok(ChangeRef {
            reference,
            url: None,
            number: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::incident::Severity;

    #[tokio::test]
    async fn simulated_provider_derives_reference_from_incident_id() {
        let plan = RemediationPlan {
            root_cause_category: "CONNECTIVITY".to_string(),
            root_cause_summary: "Pool exhausted".to_string(),
            severity: Severity::High,
            confidence: 0.9,
            auto_patch_safe: true,
            recommended_fix_description: "Raise ceiling".to_string(),
            suggested_code_patch: "pool_size = 50".to_string(),
            suggested_branch_name: "fix/pool".to_string(),
            suggested_commit_message: "fix: pool".to_string(),
            finding_type: None,
            cve_ids: None,
            affected_components: None,
            target_file: None,
        };

        let change = SimulatedChangeProvider
            .submit("INC-7429", &plan)
            .await
            .unwrap();
        assert_eq!(change.reference, "mr/fix-inc-7429");
    }
}
