//! Incident endpoints: listing, ad-hoc query ingestion, and the
//! analyze/approve/reject workflow

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::error::ApiError;
use crate::app::AppState;
use crate::model::incident::Incident;
use crate::model::remediation::RemediationPlan;
use crate::service::loki::{DEFAULT_QUERY_LIMIT, LokiRangeQuery};
use crate::service::synthesize::{IncidentOrigin, query_seed, synthesize};

/// All incidents in the session, insertion order.
#[utoipa::path(
    get,
    path = "/api/incidents",
    responses(
        (status = 200, description = "All incidents", body = [Incident])
    ),
    tag = "incidents"
)]
#[get("/api/incidents")]
pub async fn list_incidents(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.incidents.list())
}

#[utoipa::path(
    get,
    path = "/api/incidents/{id}",
    params(("id" = String, Path, description = "Incident id")),
    responses(
        (status = 200, description = "The incident", body = Incident),
        (status = 404, description = "Unknown incident")
    ),
    tag = "incidents"
)]
#[get("/api/incidents/{id}")]
pub async fn get_incident(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let incident = state
        .incidents
        .get(&id)
        .ok_or(ApiError::NotFound(id))?;
    Ok(HttpResponse::Ok().json(incident))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FromQueryRequest {
    pub logql: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Lookback window in hours, default 1.
    #[serde(default)]
    pub hours_back: Option<i64>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Create a query-origin incident from an ad-hoc Loki query.
///
/// Unlike the webhook path, a failing log fetch here is an error: the
/// operator asked for these logs specifically.
#[utoipa::path(
    post,
    path = "/api/incidents/from-query",
    request_body = FromQueryRequest,
    responses(
        (status = 200, description = "Synthesized incident", body = Incident),
        (status = 400, description = "Missing logql"),
        (status = 503, description = "LOKI_URL not configured"),
        (status = 502, description = "Upstream failure")
    ),
    tag = "incidents"
)]
#[post("/api/incidents/from-query")]
pub async fn incident_from_query(
    state: web::Data<AppState>,
    body: web::Json<FromQueryRequest>,
) -> Result<HttpResponse, ApiError> {
    if !state.loki.is_configured() {
        return Err(ApiError::NotConfigured("LOKI_URL not configured".to_string()));
    }
    let request = body.into_inner();
    let logql = request.logql.trim();
    if logql.is_empty() {
        return Err(ApiError::BadRequest("logql is required".to_string()));
    }

    let hours_back = request.hours_back.filter(|h| *h > 0).unwrap_or(1);
    let end_sec = chrono::Utc::now().timestamp();
    let query = LokiRangeQuery {
        logql: logql.to_string(),
        start_sec: end_sec - hours_back * 3600,
        end_sec,
        limit: request.limit.filter(|l| *l != 0).unwrap_or(DEFAULT_QUERY_LIMIT),
    };

    let logs = state
        .loki
        .query_range(&query)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    let seed = query_seed(request.title, request.service, hours_back);
    let incident = synthesize(IncidentOrigin::Query, seed, logs);
    state.incidents.ingest(incident.clone());

    Ok(HttpResponse::Ok().json(incident))
}

/// Cached remediation plan for an incident.
#[utoipa::path(
    get,
    path = "/api/incidents/{id}/plan",
    params(("id" = String, Path, description = "Incident id")),
    responses(
        (status = 200, description = "Cached plan", body = RemediationPlan),
        (status = 404, description = "Unknown incident or no plan cached")
    ),
    tag = "incidents"
)]
#[get("/api/incidents/{id}/plan")]
pub async fn get_plan(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let plan = state
        .incidents
        .plan(&id)
        .ok_or_else(|| ApiError::NotFound(format!("No remediation plan for {id}")))?;
    Ok(HttpResponse::Ok().json(plan))
}

/// Run root-cause analysis for an incident; idempotent once a plan exists.
#[utoipa::path(
    post,
    path = "/api/incidents/{id}/analyze",
    params(("id" = String, Path, description = "Incident id")),
    responses(
        (status = 200, description = "Proposed remediation plan", body = RemediationPlan),
        (status = 404, description = "Unknown incident"),
        (status = 409, description = "Analysis in flight or incident not OPEN"),
        (status = 502, description = "Reasoning service failure"),
        (status = 503, description = "Analyzer not configured")
    ),
    tag = "incidents"
)]
#[post("/api/incidents/{id}/analyze")]
pub async fn analyze_incident(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let plan = state.incidents.analyze(&id).await?;
    Ok(HttpResponse::Ok().json(plan))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RemediateResponse {
    pub ok: bool,
    /// Merge-request locator, `null` only on failure.
    pub pr_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Approve the proposed remediation: submit the change and resolve the
/// incident. A provider failure leaves the proposal intact.
#[utoipa::path(
    post,
    path = "/api/incidents/{id}/approve",
    params(("id" = String, Path, description = "Incident id")),
    responses(
        (status = 200, description = "Change submitted, incident resolved", body = RemediateResponse),
        (status = 404, description = "Unknown incident"),
        (status = 409, description = "No proposed remediation to approve"),
        (status = 502, description = "Change provider failure")
    ),
    tag = "incidents"
)]
#[post("/api/incidents/{id}/approve")]
pub async fn approve_incident(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let (_incident, change) = state.incidents.approve(&id).await?;
    Ok(HttpResponse::Ok().json(RemediateResponse {
        ok: true,
        pr_url: Some(change.url.unwrap_or(change.reference)),
        pr_number: change.number,
        error: None,
    }))
}

/// Reject the proposed remediation: plan discarded, incident back to OPEN.
#[utoipa::path(
    post,
    path = "/api/incidents/{id}/reject",
    params(("id" = String, Path, description = "Incident id")),
    responses(
        (status = 200, description = "Incident reopened", body = Incident),
        (status = 404, description = "Unknown incident"),
        (status = 409, description = "No proposed remediation to reject")
    ),
    tag = "incidents"
)]
#[post("/api/incidents/{id}/reject")]
pub async fn reject_incident(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let incident = state.incidents.reject(&id)?;
    Ok(HttpResponse::Ok().json(incident))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemediateRequest {
    pub incident_id: String,
    pub remediation_plan: RemediationPlan,
}

/// Submit an externally supplied remediation plan to change management.
/// Incident state is not consulted or modified.
#[utoipa::path(
    post,
    path = "/api/remediate",
    request_body = RemediateRequest,
    responses(
        (status = 200, description = "Change submitted", body = RemediateResponse),
        (status = 502, description = "Change provider failure", body = RemediateResponse)
    ),
    tag = "incidents"
)]
#[post("/api/remediate")]
pub async fn remediate(
    state: web::Data<AppState>,
    body: web::Json<RemediateRequest>,
) -> HttpResponse {
    let request = body.into_inner();
    match state
        .incidents
        .submit_change(&request.incident_id, &request.remediation_plan)
        .await
    {
        Ok(change) => HttpResponse::Ok().json(RemediateResponse {
            ok: true,
            pr_url: Some(change.url.unwrap_or(change.reference)),
            pr_number: change.number,
            error: None,
        }),
        Err(e) => {
            tracing::error!(
                incident_id = %request.incident_id,
                error = %e,
                "Remediation submission failed"
            );
            HttpResponse::BadGateway().json(RemediateResponse {
                ok: false,
                pr_url: None,
                pr_number: None,
                error: Some(e.to_string()),
            })
        }
    }
}

/// Configure incident routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_incidents)
        .service(incident_from_query)
        .service(get_incident)
        .service(get_plan)
        .service(analyze_incident)
        .service(approve_incident)
        .service(reject_incident)
        .service(remediate);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test};
    use async_trait::async_trait;

    use super::*;
    use crate::model::Config;
    use crate::model::incident::Severity;
    use crate::service::analysis::{AnalysisError, IncidentAnalyzer};
    use crate::service::changes::SimulatedChangeProvider;
    use crate::service::store::IncidentStore;
    use crate::service::{IncidentService, LokiClient};

    struct FixedAnalyzer;

    #[async_trait]
    impl IncidentAnalyzer for FixedAnalyzer {
        async fn analyze(&self, _incident: &Incident) -> Result<RemediationPlan, AnalysisError> {
            Ok(RemediationPlan {
                root_cause_category: "CONNECTIVITY".to_string(),
                root_cause_summary: "Redis pool exhausted".to_string(),
                severity: Severity::High,
                confidence: 0.9,
                auto_patch_safe: false,
                recommended_fix_description: "Raise ceiling".to_string(),
                suggested_code_patch: "pool_size = 50".to_string(),
                suggested_branch_name: "fix/inc-7429-redis-pool".to_string(),
                suggested_commit_message: "fix: raise redis pool ceiling".to_string(),
                finding_type: None,
                cve_ids: None,
                affected_components: None,
                target_file: None,
            })
        }
    }

    fn state_with_analyzer(analyzer: bool) -> web::Data<AppState> {
        let store = Arc::new(IncidentStore::new());
        for incident in crate::service::demo::mock_incidents() {
            store.insert(incident);
        }
        let analyzer: Option<Arc<dyn IncidentAnalyzer>> = if analyzer {
            Some(Arc::new(FixedAnalyzer))
        } else {
            None
        };
        let incidents =
            IncidentService::new(store, analyzer, Arc::new(SimulatedChangeProvider));
        web::Data::new(AppState {
            loki: LokiClient::from_config(&Config::default()),
            incidents,
        })
    }

    #[actix_web::test]
    async fn listing_contains_the_seed_incident() {
        let app = test::init_service(
            App::new().app_data(state_with_analyzer(true)).configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/incidents").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["id"], "INC-7429");
    }

    #[actix_web::test]
    async fn unknown_incident_is_404() {
        let app = test::init_service(
            App::new().app_data(state_with_analyzer(true)).configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/incidents/NOPE-1")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn analyze_approve_lifecycle_over_http() {
        let state = state_with_analyzer(true);
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/incidents/INC-7429/analyze")
            .to_request();
        let plan: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(plan["root_cause_category"], "CONNECTIVITY");
        assert_eq!(
            state.incidents.get("INC-7429").unwrap().status.to_string(),
            "REMEDIATION_PROPOSED"
        );

        let req = test::TestRequest::post()
            .uri("/api/incidents/INC-7429/approve")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["pr_url"], "mr/fix-inc-7429");
        assert_eq!(
            state.incidents.get("INC-7429").unwrap().status.to_string(),
            "RESOLVED"
        );
    }

    #[actix_web::test]
    async fn reject_reopens_and_clears_plan() {
        let state = state_with_analyzer(true);
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/incidents/INC-7429/analyze")
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/incidents/INC-7429/reject")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "OPEN");
        assert!(state.incidents.plan("INC-7429").is_none());
    }

    #[actix_web::test]
    async fn plan_endpoint_follows_the_cache() {
        let app = test::init_service(
            App::new().app_data(state_with_analyzer(true)).configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/incidents/INC-7429/plan")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri("/api/incidents/INC-7429/analyze")
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get()
            .uri("/api/incidents/INC-7429/plan")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["root_cause_category"], "CONNECTIVITY");
    }

    #[actix_web::test]
    async fn analyze_without_analyzer_is_503() {
        let app = test::init_service(
            App::new().app_data(state_with_analyzer(false)).configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/incidents/INC-7429/analyze")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn approve_without_plan_is_409() {
        let app = test::init_service(
            App::new().app_data(state_with_analyzer(true)).configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/incidents/INC-7429/approve")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn remediate_submits_external_plan() {
        let app = test::init_service(
            App::new().app_data(state_with_analyzer(true)).configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/remediate")
            .set_json(serde_json::json!({
                "incidentId": "INC-7429",
                "remediationPlan": {
                    "root_cause_category": "CONFIG_ERROR",
                    "root_cause_summary": "Bad pool size",
                    "severity": "medium",
                    "confidence": 0.7,
                    "auto_patch_safe": true,
                    "recommended_fix_description": "Set pool size",
                    "suggested_code_patch": "pool_size = 50",
                    "suggested_branch_name": "fix/pool",
                    "suggested_commit_message": "fix: pool"
                }
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["pr_url"], "mr/fix-inc-7429");
    }

    #[actix_web::test]
    async fn from_query_requires_configured_loki() {
        let app = test::init_service(
            App::new().app_data(state_with_analyzer(true)).configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/incidents/from-query")
            .set_json(serde_json::json!({ "logql": "{job=\"auth-api\"}" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
