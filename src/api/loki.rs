//! Loki query proxy
//!
//! Keeps the log-store URL and auth token server-side; clients post a LogQL
//! query and get normalized log entries back.

use actix_web::{HttpResponse, http::StatusCode, post, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::error::ApiError;
use crate::app::AppState;
use crate::model::incident::LogEntry;
use crate::service::loki::{DEFAULT_QUERY_LIMIT, DEFAULT_WINDOW_SECS, LokiError, LokiRangeQuery};

/// Start/end bound: epoch seconds or an ISO-8601 string.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum TimeParam {
    Seconds(f64),
    Iso(String),
}

impl TimeParam {
    pub fn to_epoch_seconds(&self) -> Result<i64, String> {
        match self {
            TimeParam::Seconds(s) => Ok(s.floor() as i64),
            TimeParam::Iso(s) => chrono::DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.timestamp())
                .map_err(|_| format!("invalid timestamp: {s}")),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LokiQueryRequest {
    /// LogQL query, e.g. `{job="auth-api"} |= "error"`.
    #[serde(default)]
    pub logql: Option<String>,
    #[serde(default)]
    pub start: Option<TimeParam>,
    #[serde(default)]
    pub end: Option<TimeParam>,
    /// Max log lines; 0 and absent both mean the default of 100.
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogsResponse {
    pub logs: Vec<LogEntry>,
}

/// Proxy a bounded `query_range` to the configured Loki instance.
#[utoipa::path(
    post,
    path = "/api/loki/query",
    request_body = LokiQueryRequest,
    responses(
        (status = 200, description = "Normalized log entries", body = LogsResponse),
        (status = 400, description = "Missing or invalid logql/bounds"),
        (status = 503, description = "LOKI_URL not configured"),
        (status = 502, description = "Upstream transport failure")
    ),
    tag = "logs"
)]
#[post("/api/loki/query")]
pub async fn query_logs(
    state: web::Data<AppState>,
    body: web::Json<LokiQueryRequest>,
) -> Result<HttpResponse, ApiError> {
    if !state.loki.is_configured() {
        return Err(ApiError::NotConfigured("LOKI_URL not configured".to_string()));
    }

    let logql = body
        .logql
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("logql is required".to_string()))?;

    let now = Utc::now().timestamp();
    let end_sec = match &body.end {
        Some(t) => t.to_epoch_seconds().map_err(ApiError::BadRequest)?,
        None => now,
    };
    let start_sec = match &body.start {
        Some(t) => t.to_epoch_seconds().map_err(ApiError::BadRequest)?,
        None => now - DEFAULT_WINDOW_SECS,
    };
    let limit = body.limit.filter(|l| *l != 0).unwrap_or(DEFAULT_QUERY_LIMIT);

    let query = LokiRangeQuery {
        logql: logql.to_string(),
        start_sec,
        end_sec,
        limit,
    };

    match state.loki.query_range(&query).await {
        Ok(logs) => Ok(HttpResponse::Ok().json(LogsResponse { logs })),
        Err(LokiError::Upstream { status, body }) => {
            // Loki answered with an error: pass its status and body through.
            tracing::warn!(status, logql = %query.logql, "Loki returned an error");
            let code = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            Ok(HttpResponse::build(code).json(body))
        }
        Err(LokiError::NotConfigured) => {
            Err(ApiError::NotConfigured("LOKI_URL not configured".to_string()))
        }
        Err(e) => Err(ApiError::Upstream(e.to_string())),
    }
}

/// Configure Loki proxy routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(query_logs);
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test};

    use super::*;
    use crate::app::AppState;
    use crate::model::Config;

    fn state(loki_url: Option<&str>) -> web::Data<AppState> {
        web::Data::new(AppState::new(&Config {
            loki_url: loki_url.map(str::to_string),
            ..Config::default()
        }))
    }

    #[actix_web::test]
    async fn unconfigured_loki_yields_503() {
        let app = test::init_service(App::new().app_data(state(None)).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/loki/query")
            .set_json(serde_json::json!({ "logql": "{job=\"x\"}" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn empty_logql_yields_400_with_error_body() {
        let app = test::init_service(
            App::new()
                .app_data(state(Some("http://127.0.0.1:9")))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/loki/query")
            .set_json(serde_json::json!({ "logql": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "bad_request");
        assert!(body["message"].as_str().unwrap().contains("logql"));
    }

    #[actix_web::test]
    async fn invalid_iso_bound_yields_400() {
        let app = test::init_service(
            App::new()
                .app_data(state(Some("http://127.0.0.1:9")))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/loki/query")
            .set_json(serde_json::json!({ "logql": "{job=\"x\"}", "start": "yesterday" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn unreachable_upstream_yields_502() {
        // Port 9 (discard) is closed; the connection is refused immediately.
        let app = test::init_service(
            App::new()
                .app_data(state(Some("http://127.0.0.1:9")))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/loki/query")
            .set_json(serde_json::json!({ "logql": "{job=\"x\"}" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[core::prelude::v1::test]
    fn time_params_accept_seconds_and_iso() {
        assert_eq!(TimeParam::Seconds(1700.9).to_epoch_seconds().unwrap(), 1700);
        assert_eq!(
            TimeParam::Iso("1970-01-01T00:01:00Z".to_string())
                .to_epoch_seconds()
                .unwrap(),
            60
        );
        assert!(
            TimeParam::Iso("not-a-date".to_string())
                .to_epoch_seconds()
                .is_err()
        );
    }
}
