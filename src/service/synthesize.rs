//! Incident synthesis: id generation, defaults, and source-specific seeds

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{SecondsFormat, Utc};

use crate::model::incident::{Incident, IncidentStatus, LogEntry, Severity};

/// Placeholder for display metadata the source does not provide.
pub const FIELD_PLACEHOLDER: &str = "—";

const DEFAULT_SERVICE: &str = "unknown";
const DEFAULT_ENVIRONMENT: &str = "production";
const DEFAULT_LANGUAGE: &str = "Unknown";
const WEBHOOK_FALLBACK_TITLE: &str = "Grafana Alert";

static INCIDENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Where an incident entered the system; determines its id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentOrigin {
    Mock,
    Query,
    Webhook,
}

impl IncidentOrigin {
    fn prefix(self) -> &'static str {
        match self {
            IncidentOrigin::Mock => "INC",
            IncidentOrigin::Query => "LOKI",
            IncidentOrigin::Webhook => "GRAF",
        }
    }
}

/// Allocate a process-unique incident id: origin prefix, creation epoch
/// milliseconds, and a process-wide counter so same-millisecond incidents
/// cannot collide.
pub fn next_incident_id(origin: IncidentOrigin) -> String {
    let seq = INCIDENT_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}", origin.prefix(), Utc::now().timestamp_millis(), seq)
}

/// Current time in the ISO-8601 shape used on the wire.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Source descriptor for a new incident. Every field is optional; defaults
/// are applied in [`synthesize`].
#[derive(Debug, Clone, Default)]
pub struct IncidentSeed {
    pub title: Option<String>,
    pub service: Option<String>,
    pub environment: Option<String>,
    pub severity: Option<Severity>,
    pub repository_language: Option<String>,
    pub alert_type: String,
}

/// Assemble a canonical incident from a seed plus already-normalized logs.
///
/// Defaults: service "unknown", environment "production", language
/// "Unknown", severity high, display metadata "—", no metrics, status OPEN.
pub fn synthesize(origin: IncidentOrigin, seed: IncidentSeed, logs: Vec<LogEntry>) -> Incident {
    Incident {
        id: next_incident_id(origin),
        title: seed.title.unwrap_or_else(|| seed.alert_type.clone()),
        service: seed.service.unwrap_or_else(|| DEFAULT_SERVICE.to_string()),
        environment: seed
            .environment
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
        alert_type: seed.alert_type,
        error_rate: FIELD_PLACEHOLDER.to_string(),
        threshold: FIELD_PLACEHOLDER.to_string(),
        recent_deployment: FIELD_PLACEHOLDER.to_string(),
        last_commit_message: FIELD_PLACEHOLDER.to_string(),
        repository_language: seed
            .repository_language
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        severity: seed.severity.unwrap_or(Severity::High),
        status: IncidentStatus::Open,
        timestamp: now_iso(),
        logs,
        metrics: Vec::new(),
    }
}

fn label<'a>(labels: &'a HashMap<String, String>, key: &str) -> Option<&'a String> {
    labels.get(key).filter(|v| !v.is_empty())
}

/// Seed for a webhook-origin incident.
///
/// Fallback chains: title from annotation `summary` → `title` → alert status
/// → "Grafana Alert"; service from label `job` → `app` → `instance`;
/// environment from `namespace` → `env`; severity from the `severity` label
/// (case-folded, unrecognized values fall back to high).
pub fn webhook_seed(
    alert_status: Option<&str>,
    labels: &HashMap<String, String>,
    annotations: &HashMap<String, String>,
) -> IncidentSeed {
    let title = label(annotations, "summary")
        .or_else(|| label(annotations, "title"))
        .cloned()
        .or_else(|| {
            alert_status
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| WEBHOOK_FALLBACK_TITLE.to_string());

    let service = label(labels, "job")
        .or_else(|| label(labels, "app"))
        .or_else(|| label(labels, "instance"))
        .cloned();

    let environment = label(labels, "namespace")
        .or_else(|| label(labels, "env"))
        .cloned();

    let severity = label(labels, "severity")
        .and_then(|value| Severity::from_label(value))
        .unwrap_or(Severity::High);

    IncidentSeed {
        title: Some(title),
        service,
        environment,
        severity: Some(severity),
        repository_language: None,
        alert_type: "Grafana Webhook".to_string(),
    }
}

/// Seed for a query-origin incident created from an ad-hoc Loki query.
pub fn query_seed(title: Option<String>, service: Option<String>, hours_back: i64) -> IncidentSeed {
    let service = service.filter(|s| !s.is_empty());
    let title = title.filter(|t| !t.is_empty()).unwrap_or_else(|| {
        format!(
            "Logs: {} ({}h)",
            service.as_deref().unwrap_or(DEFAULT_SERVICE),
            hours_back
        )
    });

    IncidentSeed {
        title: Some(title),
        service,
        environment: None,
        severity: Some(Severity::High),
        repository_language: None,
        alert_type: "Loki Query".to_string(),
    }
}
