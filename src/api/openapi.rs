//! OpenAPI specification endpoints

use actix_web::{HttpResponse, Responder, get};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::health::liveness,
        crate::api::health::readiness,
        crate::api::loki::query_logs,
        crate::api::webhook::grafana_webhook,
        crate::api::incident::list_incidents,
        crate::api::incident::get_incident,
        crate::api::incident::get_plan,
        crate::api::incident::incident_from_query,
        crate::api::incident::analyze_incident,
        crate::api::incident::approve_incident,
        crate::api::incident::reject_incident,
        crate::api::incident::remediate,
    ),
    components(schemas(
        crate::model::incident::Incident,
        crate::model::incident::LogEntry,
        crate::model::incident::LogLevel,
        crate::model::incident::Severity,
        crate::model::incident::IncidentStatus,
        crate::model::incident::MetricPoint,
        crate::model::remediation::RemediationPlan,
        crate::model::remediation::FindingType,
        crate::model::grafana::GrafanaWebhook,
        crate::model::grafana::GrafanaAlert,
        crate::api::loki::LokiQueryRequest,
        crate::api::loki::TimeParam,
        crate::api::loki::LogsResponse,
        crate::api::incident::FromQueryRequest,
        crate::api::incident::RemediateRequest,
        crate::api::incident::RemediateResponse,
        crate::api::health::HealthStatus,
        crate::api::health::ReadinessStatus,
        crate::api::health::DependencyHealth,
    )),
    tags(
        (name = "health", description = "Liveness and readiness probes"),
        (name = "logs", description = "Loki query proxy"),
        (name = "webhooks", description = "Monitoring webhook intake"),
        (name = "incidents", description = "Incident workflow")
    ),
    info(
        title = "HealFlow API",
        description = "Incident ingestion, log normalization, and AI remediation workflow"
    )
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
#[get("/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Serve OpenAPI YAML specification
#[get("/openapi.yaml")]
pub async fn openapi_yaml() -> impl Responder {
    match ApiDoc::openapi().to_yaml() {
        Ok(yaml) => HttpResponse::Ok().content_type("text/yaml").body(yaml),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render OpenAPI YAML");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Configure OpenAPI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(openapi_json).service(openapi_yaml);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_includes_the_core_routes() {
        let spec = ApiDoc::openapi();
        let paths: Vec<&String> = spec.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/api/loki/query"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/webhook/grafana"));
        assert!(paths.iter().any(|p| p.as_str() == "/health"));
    }
}
