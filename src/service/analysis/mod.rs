//! Remediation client: structured root-cause analysis via a reasoning
//! service
//!
//! The analyzer is a capability behind [`IncidentAnalyzer`] so tests can
//! substitute a deterministic fake. The production implementation talks to
//! an OpenAI-compatible chat-completions endpoint with near-zero temperature
//! and a JSON response format, then validates the body into a
//! [`RemediationPlan`]. No retries: every failure surfaces immediately.

use std::env;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::incident::Incident;
use crate::model::remediation::RemediationPlan;

pub mod prompts;
mod validation;

const ENV_ANALYSIS_MODEL: &str = "ANALYSIS_MODEL";
const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";

const DEFAULT_ANALYSIS_MODEL: &str = "gpt-4o-mini";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Low temperature for deterministic analysis output.
const ANALYSIS_TEMPERATURE: f64 = 0.1;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Transport failure or non-success status from the reasoning service.
    #[error("Reasoning request failed: {0}")]
    RequestFailed(String),

    /// Response body that does not parse or validate as a plan.
    #[error("Failed to parse reasoning response: {0}")]
    ParseFailed(String),
}

/// Capability interface for incident analysis.
#[async_trait]
pub trait IncidentAnalyzer: Send + Sync {
    async fn analyze(&self, incident: &Incident) -> Result<RemediationPlan, AnalysisError>;
}

/// Analyzer backed by an OpenAI-compatible chat-completions endpoint.
pub struct LlmAnalyzer {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl LlmAnalyzer {
    /// Create an analyzer with the provided API key.
    ///
    /// The model comes from `ANALYSIS_MODEL` (default gpt-4o-mini) and the
    /// endpoint from `OPENAI_BASE_URL` (default api.openai.com).
    pub fn new(api_key: &str) -> Self {
        let model =
            env::var(ENV_ANALYSIS_MODEL).unwrap_or_else(|_| DEFAULT_ANALYSIS_MODEL.to_string());
        let base_url = env::var(ENV_OPENAI_BASE_URL)
            .ok()
            .filter(|u| !u.is_empty())
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

        tracing::info!(model = %model, "Analysis service initialized");

        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key: api_key.to_string(),
            model,
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl IncidentAnalyzer for LlmAnalyzer {
    async fn analyze(&self, incident: &Incident) -> Result<RemediationPlan, AnalysisError> {
        let start_time = std::time::Instant::now();
        let prompt = prompts::build_incident_prompt(incident);

        let request = ChatRequest {
            model: &self.model,
            temperature: ANALYSIS_TEMPERATURE,
            response_format: ResponseFormat {
                kind: "json_object",
            },
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompts::SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalysisError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                incident_id = %incident.id,
                status = status.as_u16(),
                "Reasoning service returned an error"
            );
            return Err(AnalysisError::RequestFailed(format!(
                "status {status}: {body}"
            )));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::ParseFailed(e.to_string()))?;

        let content = completion
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or_else(|| {
                AnalysisError::ParseFailed("completion contained no content".to_string())
            })?;

        let plan = parse_plan(content)?;

        tracing::info!(
            incident_id = %incident.id,
            model = %self.model,
            elapsed_ms = start_time.elapsed().as_millis(),
            confidence = plan.confidence,
            "Incident analysis completed"
        );

        Ok(plan)
    }
}

/// Parse and validate a reasoning-service response body into a plan.
pub fn parse_plan(text: &str) -> Result<RemediationPlan, AnalysisError> {
    let plan: RemediationPlan = serde_json::from_str(text.trim())
        .map_err(|e| AnalysisError::ParseFailed(e.to_string()))?;

    let report = validation::validate_plan(&plan);
    for warning in &report.warnings {
        tracing::warn!(warning = %warning, "Remediation plan quality warning");
    }
    if !report.is_valid {
        return Err(AnalysisError::ParseFailed(report.errors.join("; ")));
    }

    Ok(plan)
}
