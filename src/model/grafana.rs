//! Wire types for Grafana alert webhook payloads
//!
//! Grafana posts a batch of alerts; all fields are optional so that partial
//! or older payload shapes still deserialize.

use std::collections::HashMap;

use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct GrafanaAlert {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct GrafanaWebhook {
    #[serde(default)]
    pub alerts: Vec<GrafanaAlert>,
    /// Top-level labels, used when the payload carries no alerts array.
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
}

impl GrafanaWebhook {
    /// Label set for the incident: the first alert's labels when an alert is
    /// present, otherwise the top-level labels.
    pub fn effective_labels(&self) -> &HashMap<String, String> {
        match self.alerts.first() {
            Some(alert) => &alert.labels,
            None => &self.labels,
        }
    }

    pub fn effective_annotations(&self) -> &HashMap<String, String> {
        match self.alerts.first() {
            Some(alert) => &alert.annotations,
            None => &self.annotations,
        }
    }
}
