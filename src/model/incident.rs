//! Canonical incident and log types shared by the ingestion pipeline and the API

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Severity of an incident, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Parse a severity from an alert label value, case-insensitively.
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Log line severity as rendered in the incident log view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// A single normalized log line. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LogEntry {
    /// ISO-8601 UTC timestamp with millisecond precision.
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

/// Incident lifecycle state.
///
/// Transitions are driven exclusively by the incident store: OPEN →
/// ANALYZING → REMEDIATION_PROPOSED → RESOLVED, with rejection returning a
/// proposed incident to OPEN. REJECTED remains in the vocabulary for wire
/// compatibility but no transition produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentStatus {
    Open,
    Analyzing,
    RemediationProposed,
    Resolved,
    Rejected,
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IncidentStatus::Open => "OPEN",
            IncidentStatus::Analyzing => "ANALYZING",
            IncidentStatus::RemediationProposed => "REMEDIATION_PROPOSED",
            IncidentStatus::Resolved => "RESOLVED",
            IncidentStatus::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

/// One point on the incident metrics chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MetricPoint {
    pub time: String,
    pub value: f64,
}

/// A normalized monitoring alert with its associated logs and metrics.
///
/// Display metadata fields (`error_rate`, `threshold`, `recent_deployment`,
/// `last_commit_message`) may carry the placeholder "—" when the source does
/// not provide them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    pub title: String,
    pub service: String,
    pub environment: String,
    pub alert_type: String,
    pub error_rate: String,
    pub threshold: String,
    pub recent_deployment: String,
    pub last_commit_message: String,
    pub repository_language: String,
    pub severity: Severity,
    pub status: IncidentStatus,
    /// ISO-8601 creation time.
    pub timestamp: String,
    /// Chronologically ascending, regardless of source ordering.
    pub logs: Vec<LogEntry>,
    pub metrics: Vec<MetricPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_label_parsing_is_case_insensitive() {
        assert_eq!(Severity::from_label("CRITICAL"), Some(Severity::Critical));
        assert_eq!(Severity::from_label(" high "), Some(Severity::High));
        assert_eq!(Severity::from_label("warning"), None);
    }

    #[test]
    fn incident_wire_shape_is_camel_case() {
        let incident = Incident {
            id: "GRAF-1".to_string(),
            title: "t".to_string(),
            service: "svc".to_string(),
            environment: "production".to_string(),
            alert_type: "Grafana Webhook".to_string(),
            error_rate: "—".to_string(),
            threshold: "—".to_string(),
            recent_deployment: "—".to_string(),
            last_commit_message: "—".to_string(),
            repository_language: "Unknown".to_string(),
            severity: Severity::High,
            status: IncidentStatus::Open,
            timestamp: "2024-01-01T00:00:00.000Z".to_string(),
            logs: vec![],
            metrics: vec![],
        };

        let value = serde_json::to_value(&incident).unwrap();
        assert_eq!(value["alertType"], "Grafana Webhook");
        assert_eq!(value["repositoryLanguage"], "Unknown");
        assert_eq!(value["severity"], "high");
        assert_eq!(value["status"], "OPEN");
    }

    #[test]
    fn log_level_serializes_uppercase() {
        assert_eq!(serde_json::to_value(LogLevel::Error).unwrap(), "ERROR");
        assert_eq!(serde_json::to_value(LogLevel::Warn).unwrap(), "WARN");
        assert_eq!(serde_json::to_value(LogLevel::Info).unwrap(), "INFO");
    }
}
