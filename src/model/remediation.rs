//! Remediation plan produced by the reasoning service

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Classification of a finding: runtime errors, security, performance, config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FindingType {
    RuntimeError,
    SecurityVulnerability,
    Performance,
    Config,
    Connectivity,
    Other,
}

/// Structured root-cause analysis output.
///
/// Produced once per incident and cached by incident id; never mutated after
/// creation. Field names are the wire contract with the reasoning service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RemediationPlan {
    /// Short identifier, e.g. CONFIG_ERROR, RESOURCE_LIMIT, CONNECTIVITY.
    pub root_cause_category: String,
    pub root_cause_summary: String,
    pub severity: crate::model::incident::Severity,
    /// Model confidence in [0, 1].
    pub confidence: f64,
    /// Whether the proposed fix may be applied without manual review.
    pub auto_patch_safe: bool,
    pub recommended_fix_description: String,
    pub suggested_code_patch: String,
    pub suggested_branch_name: String,
    pub suggested_commit_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finding_type: Option<FindingType>,
    /// CVE IDs when a security vulnerability is detected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cve_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_components: Option<Vec<String>>,
    /// Repository path the patch targets, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_file: Option<String>,
}
