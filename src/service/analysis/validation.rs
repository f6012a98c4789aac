//! Validation of parsed remediation plans
//!
//! Hard errors reject the response; warnings are logged and the plan is
//! kept.

use crate::model::remediation::RemediationPlan;

/// Result of remediation plan validation
#[derive(Debug)]
pub struct PlanValidationResult {
    /// Whether the plan passed validation
    pub is_valid: bool,
    /// Critical errors that reject the response
    pub errors: Vec<String>,
    /// Quality issues worth logging but not fatal
    pub warnings: Vec<String>,
}

impl PlanValidationResult {
    fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

/// Validate a parsed plan before it is cached.
///
/// Checks:
/// 1. `confidence` is a finite value in [0, 1]
/// 2. The root-cause summary is non-empty
/// 3. Auto-patchable plans actually carry a patch
/// 4. The suggested branch name is a plausible git ref
pub fn validate_plan(plan: &RemediationPlan) -> PlanValidationResult {
    let mut result = PlanValidationResult::valid();

    if !plan.confidence.is_finite() || !(0.0..=1.0).contains(&plan.confidence) {
        result.add_error(format!(
            "confidence must be in [0, 1], got {}",
            plan.confidence
        ));
    }

    if plan.root_cause_summary.trim().is_empty() {
        result.add_error("root_cause_summary is empty".to_string());
    }

    if plan.auto_patch_safe && plan.suggested_code_patch.trim().is_empty() {
        result.add_warning(
            "auto_patch_safe is set but suggested_code_patch is empty".to_string(),
        );
    }

    if plan.suggested_branch_name.contains(char::is_whitespace) {
        result.add_warning(format!(
            "suggested_branch_name contains whitespace: '{}'",
            plan.suggested_branch_name
        ));
    }

    if plan.recommended_fix_description.trim().is_empty() {
        result.add_warning("recommended_fix_description is empty".to_string());
    }

    result
}
