//! Health and readiness endpoints

use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::app::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthStatus {
    pub ok: bool,
}

#[derive(Serialize, ToSchema)]
pub struct ReadinessStatus {
    pub status: String,
    pub version: String,
    pub dependencies: DependencyHealth,
}

#[derive(Serialize, ToSchema)]
pub struct DependencyHealth {
    pub loki: String,
    pub analyzer: String,
}

/// Liveness probe. Always 200 while the process runs.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is alive", body = HealthStatus)
    ),
    tag = "health"
)]
#[get("/health")]
pub async fn liveness() -> impl Responder {
    HttpResponse::Ok().json(HealthStatus { ok: true })
}

/// Readiness probe reporting which upstreams are configured.
///
/// Unconfigured upstreams are a supported degraded mode, so this always
/// returns 200; the body tells operators what is missing.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Readiness with dependency detail", body = ReadinessStatus)
    ),
    tag = "health"
)]
#[get("/health/ready")]
pub async fn readiness(state: web::Data<AppState>) -> impl Responder {
    let loki = if state.loki.is_configured() {
        "configured"
    } else {
        "not_configured"
    };
    let analyzer = if state.incidents.analyzer_configured() {
        "configured"
    } else {
        "not_configured"
    };

    let degraded = loki == "not_configured" || analyzer == "not_configured";

    HttpResponse::Ok().json(ReadinessStatus {
        status: if degraded { "degraded" } else { "ready" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        dependencies: DependencyHealth {
            loki: loki.to_string(),
            analyzer: analyzer.to_string(),
        },
    })
}

/// Configure health routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(liveness).service(readiness);
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test};

    use super::*;
    use crate::app::AppState;
    use crate::model::Config;

    #[actix_web::test]
    async fn health_returns_ok_true() {
        let state = web::Data::new(AppState::new(&Config::default()));
        let app =
            test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, serde_json::json!({ "ok": true }));
    }

    #[actix_web::test]
    async fn readiness_reports_unconfigured_upstreams() {
        let state = web::Data::new(AppState::new(&Config::default()));
        let app =
            test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::get().uri("/health/ready").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["dependencies"]["loki"], "not_configured");
    }
}
