//! Prompts for incident root-cause analysis

use crate::model::incident::Incident;

/// System instruction for the reasoning service: deterministic,
/// conservative, production-ready, JSON-only output.
pub const SYSTEM_PROMPT: &str = r#"You are an expert Senior DevOps Engineer and Backend Architect.
Your job is root cause analysis and safe remediation suggestion for:
1) Runtime errors and application failures (prioritize recurring errors; suggest concrete code or config fixes).
2) Security vulnerabilities (exposed secrets, auth failures, CVE/dependency issues, misconfigurations); classify as security and suggest upgrades, config changes, or secret rotation.
3) Performance, connectivity, and configuration issues.

Strict Requirements:
1. Deterministic output.
2. Safe and conservative fixes.
3. Production-ready suggestions.
4. ONLY return the structured JSON.
5. NEVER include markdown formatting, explanations, or commentary outside the JSON.
6. For security findings: set finding_type to "security_vulnerability", include any CVE IDs in cve_ids, and list affected_components (e.g. dependency name, file, service).
7. For application/runtime errors: set finding_type to "runtime_error" and suggest a concrete code or config patch to resolve the error.

Expected Schema:
{
  "root_cause_category": "Short identifier (e.g., CONFIG_ERROR, RESOURCE_LIMIT, CONNECTIVITY, SECURITY_VULNERABILITY, AUTH_FAILURE)",
  "root_cause_summary": "Detailed technical explanation",
  "severity": "low | medium | high | critical",
  "confidence": 0.0 to 1.0,
  "auto_patch_safe": true | false,
  "recommended_fix_description": "Explanation of the fix",
  "suggested_code_patch": "The actual patch or configuration change",
  "suggested_branch_name": "fix/incident-id-slug",
  "suggested_commit_message": "fix: resolve [incident-id] root cause",
  "finding_type": "runtime_error | security_vulnerability | performance | config | connectivity | other",
  "cve_ids": ["CVE-YYYY-NNNNN"] or [],
  "affected_components": ["service-name", "file or dependency"],
  "target_file": "path/to/file/in/repo (e.g. src/auth/service.ts) when applicable, or empty string"
}"#;

/// Build the analysis prompt for one incident: alert metadata, metric
/// values, and log lines rendered as `[LEVEL] message`.
pub fn build_incident_prompt(incident: &Incident) -> String {
    let metrics = incident
        .metrics
        .iter()
        .map(|m| m.value.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let logs = incident
        .logs
        .iter()
        .map(|l| format!("[{}] {}", l.level, l.message))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Analyze the following production monitoring alert.

Service Name: {service}
Environment: {environment}
Alert Type: {alert_type}
Error Rate: {error_rate}
Threshold: {threshold}
Recent Deployment: {recent_deployment}
Last Commit Message: {last_commit_message}
System Metrics: {metrics}
Recent Logs:
{logs}
Repository Language: {repository_language}

Identify: (1) runtime errors and suggest fixes, (2) security vulnerabilities (CVEs, secrets, auth) and suggest patches/upgrades, (3) config or connectivity issues.
Return JSON matching the expected schema exactly."#,
        service = incident.service,
        environment = incident.environment,
        alert_type = incident.alert_type,
        error_rate = incident.error_rate,
        threshold = incident.threshold,
        recent_deployment = incident.recent_deployment,
        last_commit_message = incident.last_commit_message,
        metrics = metrics,
        logs = logs,
        repository_language = incident.repository_language,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::incident::{
        Incident, IncidentStatus, LogEntry, LogLevel, MetricPoint, Severity,
    };

    fn sample_incident() -> Incident {
        Incident {
            id: "INC-1".to_string(),
            title: "High Error Rate".to_string(),
            service: "auth-api".to_string(),
            environment: "production".to_string(),
            alert_type: "HTTP 5xx Spike".to_string(),
            error_rate: "15.4%".to_string(),
            threshold: "1.0%".to_string(),
            recent_deployment: "v1.4.2".to_string(),
            last_commit_message: "feat: pooling".to_string(),
            repository_language: "Rust".to_string(),
            severity: Severity::Critical,
            status: IncidentStatus::Open,
            timestamp: "2024-01-01T00:00:00.000Z".to_string(),
            logs: vec![LogEntry {
                timestamp: "2024-01-01T00:00:00.000Z".to_string(),
                level: LogLevel::Error,
                message: "Connection timeout".to_string(),
            }],
            metrics: vec![
                MetricPoint {
                    time: "10:00".to_string(),
                    value: 5.0,
                },
                MetricPoint {
                    time: "11:00".to_string(),
                    value: 85.0,
                },
            ],
        }
    }

    #[test]
    fn prompt_embeds_incident_context() {
        let prompt = build_incident_prompt(&sample_incident());
        assert!(prompt.contains("Service Name: auth-api"));
        assert!(prompt.contains("System Metrics: 5, 85"));
        assert!(prompt.contains("[ERROR] Connection timeout"));
        assert!(prompt.contains("Repository Language: Rust"));
    }

    #[test]
    fn system_prompt_demands_json_only() {
        assert!(SYSTEM_PROMPT.contains("ONLY return the structured JSON"));
        assert!(SYSTEM_PROMPT.contains("root_cause_category"));
    }
}
