//! Unified API error handling
//!
//! Every endpoint returns `Result<_, ApiError>` so clients always see the
//! same `{error, message, request_id}` shape.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use uuid::Uuid;

use crate::service::incident::FlowError;
use crate::service::store::StoreError;

/// Standard error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type/code
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Unique request ID for tracing
    pub request_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed request fields (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Unknown incident or resource (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Request conflicts with the incident's current state (409)
    #[error("Conflicting incident state: {0}")]
    Conflict(String),

    /// Required upstream configuration absent (503)
    #[error("{0}")]
    NotConfigured(String),

    /// Upstream request or response handling failed (502)
    #[error("Upstream request failed: {0}")]
    Upstream(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_type = match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::NotConfigured(_) => "not_configured",
            ApiError::Upstream(_) => "upstream_error",
        };

        tracing::error!(
            error_type = error_type,
            status = status.as_u16(),
            message = %self,
            "API error"
        );

        HttpResponse::build(status).json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            request_id: Uuid::new_v4().to_string(),
        })
    }
}

// ============================================================================
// From conversions for service errors
// ============================================================================

impl From<FlowError> for ApiError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::NotFound(id) => ApiError::NotFound(id),
            FlowError::AnalyzerUnavailable => {
                ApiError::NotConfigured("OPENAI_API_KEY is not set".to_string())
            }
            FlowError::PlanMissing(id) => {
                ApiError::Conflict(format!("No remediation plan cached for {id}"))
            }
            FlowError::Store(StoreError::NotFound(id)) => ApiError::NotFound(id),
            FlowError::Store(e @ StoreError::AnalysisInFlight(_)) => {
                ApiError::Conflict(e.to_string())
            }
            FlowError::Store(e @ StoreError::IllegalTransition { .. }) => {
                ApiError::Conflict(e.to_string())
            }
            FlowError::Analysis(e) => ApiError::Upstream(e.to_string()),
            FlowError::Change(e) => ApiError::Upstream(e.to_string()),
        }
    }
}
