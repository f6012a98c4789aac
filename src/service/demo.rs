//! Demo fixture seeded at startup so the dashboard has an incident to show
//! before any webhook or query arrives.

use chrono::{Duration, SecondsFormat, Utc};

use crate::model::incident::{
    Incident, IncidentStatus, LogEntry, LogLevel, MetricPoint, Severity,
};

/// Mock incidents mirrored from the demo monitoring scenario.
pub fn mock_incidents() -> Vec<Incident> {
    let five_minutes_ago = (Utc::now() - Duration::minutes(5))
        .to_rfc3339_opts(SecondsFormat::Millis, true);

    // Traffic ramp: flat baseline, spiking over threshold in the last stretch.
    let metrics = (0..20)
        .map(|i| MetricPoint {
            time: format!("{}:00", 10 + i),
            value: if i > 15 {
                85.0 + f64::from(i % 4) * 3.5
            } else {
                5.0 + f64::from(i % 5)
            },
        })
        .collect();

    vec![Incident {
        id: "INC-7429".to_string(),
        title: "High Error Rate in Auth Service".to_string(),
        service: "auth-api".to_string(),
        environment: "production".to_string(),
        alert_type: "HTTP 5xx Spike".to_string(),
        error_rate: "15.4%".to_string(),
        threshold: "1.0%".to_string(),
        recent_deployment: "v1.4.2-release (2 hours ago)".to_string(),
        last_commit_message: "feat: add redis connection pooling".to_string(),
        repository_language: "TypeScript / Node.js".to_string(),
        severity: Severity::Critical,
        status: IncidentStatus::Open,
        timestamp: five_minutes_ago,
        logs: vec![
            LogEntry {
                timestamp: "2023-10-27T10:00:01Z".to_string(),
                level: LogLevel::Error,
                message: "Connection timeout with Redis cluster at redis-prod-01:6379"
                    .to_string(),
            },
            LogEntry {
                timestamp: "2023-10-27T10:00:05Z".to_string(),
                level: LogLevel::Error,
                message: "Max retries exceeded for session retrieval".to_string(),
            },
            LogEntry {
                timestamp: "2023-10-27T10:00:10Z".to_string(),
                level: LogLevel::Warn,
                message: "CPU usage spiked to 94% on node-auth-01".to_string(),
            },
        ],
        metrics,
    }]
}
