//! Grafana Loki client: `query_range` with normalization to log entries

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;

use crate::model::Config;
use crate::model::incident::LogEntry;
use crate::model::loki::LokiQueryRangeResponse;
use crate::service::normalize;

const QUERY_RANGE_PATH: &str = "/loki/api/v1/query_range";

/// Default number of log lines per query.
pub const DEFAULT_QUERY_LIMIT: u32 = 100;
/// Default lookback window in seconds.
pub const DEFAULT_WINDOW_SECS: i64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum LokiError {
    #[error("LOKI_URL not configured")]
    NotConfigured,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Loki answered with a non-success status and a JSON body; callers may
    /// proxy both through.
    #[error("Loki returned status {status}")]
    Upstream { status: u16, body: serde_json::Value },

    #[error("Failed to parse Loki response: {0}")]
    Parse(String),
}

/// One bounded `query_range` request.
#[derive(Debug, Clone)]
pub struct LokiRangeQuery {
    pub logql: String,
    pub start_sec: i64,
    pub end_sec: i64,
    pub limit: u32,
}

impl LokiRangeQuery {
    /// Query covering the last hour with the default limit.
    pub fn last_hour(logql: impl Into<String>) -> Self {
        let end_sec = Utc::now().timestamp();
        Self {
            logql: logql.into(),
            start_sec: end_sec - DEFAULT_WINDOW_SECS,
            end_sec,
            limit: DEFAULT_QUERY_LIMIT,
        }
    }
}

/// Client for the upstream log store. Constructed once at startup; cheap to
/// clone. An unset base URL is a supported degraded mode, surfaced as
/// [`LokiError::NotConfigured`] per call.
#[derive(Clone)]
pub struct LokiClient {
    client: reqwest::Client,
    base_url: Option<String>,
    auth_header: Option<String>,
}

impl LokiClient {
    pub fn from_config(config: &Config) -> Self {
        // Credential form matches the upstream proxy convention: "user:token",
        // or the bare token when no username is configured.
        let auth_header = config.loki_token.as_ref().map(|token| {
            let credential = match &config.loki_user {
                Some(user) => format!("{user}:{token}"),
                None => token.clone(),
            };
            format!("Basic {}", BASE64.encode(credential))
        });

        Self {
            client: reqwest::Client::new(),
            base_url: config.loki_url.clone(),
            auth_header,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// Run a `query_range` request and normalize the result into
    /// chronologically ascending log entries.
    pub async fn query_range(&self, query: &LokiRangeQuery) -> Result<Vec<LogEntry>, LokiError> {
        let base = self.base_url.as_deref().ok_or(LokiError::NotConfigured)?;
        let url = format!("{base}{QUERY_RANGE_PATH}");

        tracing::debug!(
            logql = %query.logql,
            start = query.start_sec,
            end = query.end_sec,
            limit = query.limit,
            "Querying Loki"
        );

        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[
                ("query", query.logql.clone()),
                ("start", query.start_sec.to_string()),
                ("end", query.end_sec.to_string()),
                ("limit", query.limit.to_string()),
                ("direction", "backward".to_string()),
            ]);

        if let Some(auth) = &self.auth_header {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body: serde_json::Value = serde_json::from_str(&text).map_err(|_| {
                LokiError::Parse(format!("Loki returned status {status} with a non-JSON body"))
            })?;
            return Err(LokiError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: LokiQueryRangeResponse = serde_json::from_str(&text).map_err(|e| {
            LokiError::Parse(format!("Failed to deserialize query_range response: {e}"))
        })?;

        let streams = parsed.data.map(|d| d.result).unwrap_or_default();
        let entries = normalize::entries_from_streams(&streams);

        tracing::debug!(entries = entries.len(), "Loki query completed");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with(url: Option<&str>, user: Option<&str>, token: Option<&str>) -> LokiClient {
        LokiClient::from_config(&Config {
            loki_url: url.map(str::to_string),
            loki_user: user.map(str::to_string),
            loki_token: token.map(str::to_string),
            ..Config::default()
        })
    }

    #[test]
    fn configured_reflects_base_url() {
        assert!(!client_with(None, None, None).is_configured());
        assert!(client_with(Some("http://loki:3100"), None, None).is_configured());
    }

    #[test]
    fn auth_header_uses_user_colon_token() {
        let client = client_with(Some("http://loki:3100"), Some("admin"), Some("secret"));
        let expected = format!("Basic {}", BASE64.encode("admin:secret"));
        assert_eq!(client.auth_header.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn auth_header_uses_bare_token_without_user() {
        let client = client_with(Some("http://loki:3100"), None, Some("secret"));
        let expected = format!("Basic {}", BASE64.encode("secret"));
        assert_eq!(client.auth_header.as_deref(), Some(expected.as_str()));
    }

    #[tokio::test]
    async fn unconfigured_client_errors_without_network() {
        let client = client_with(None, None, None);
        let result = client
            .query_range(&LokiRangeQuery::last_hour("{job=~\".+\"}"))
            .await;
        assert!(matches!(result, Err(LokiError::NotConfigured)));
    }
}
