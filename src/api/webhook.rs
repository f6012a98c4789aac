//! Grafana alert webhook intake
//!
//! Receives an alert payload, fetches matching logs from Loki best-effort,
//! and synthesizes a stored incident. Log unavailability never fails
//! incident creation: the one place in the pipeline where an upstream error
//! is swallowed.

use actix_web::{HttpResponse, Responder, post, web};

use crate::app::AppState;
use crate::model::grafana::GrafanaWebhook;
use crate::model::incident::Incident;
use crate::service::logql::build_logql;
use crate::service::loki::LokiRangeQuery;
use crate::service::synthesize::{IncidentOrigin, synthesize, webhook_seed};

/// Ingest a Grafana alert webhook. Always 200 with the synthesized incident.
#[utoipa::path(
    post,
    path = "/api/webhook/grafana",
    request_body = GrafanaWebhook,
    responses(
        (status = 200, description = "Synthesized incident", body = Incident)
    ),
    tag = "webhooks"
)]
#[post("/api/webhook/grafana")]
pub async fn grafana_webhook(
    state: web::Data<AppState>,
    body: web::Json<GrafanaWebhook>,
) -> impl Responder {
    let payload = body.into_inner();
    let labels = payload.effective_labels();
    let annotations = payload.effective_annotations();

    let logql = build_logql(labels);
    let logs = match state.loki.query_range(&LokiRangeQuery::last_hour(&logql)).await {
        Ok(logs) => logs,
        Err(e) => {
            tracing::warn!(
                error = %e,
                logql = %logql,
                "Webhook log fetch failed; continuing with empty logs"
            );
            Vec::new()
        }
    };

    let alert_status = payload.alerts.first().and_then(|a| a.status.as_deref());
    let seed = webhook_seed(alert_status, labels, annotations);
    let incident = synthesize(IncidentOrigin::Webhook, seed, logs);

    state.incidents.ingest(incident.clone());
    HttpResponse::Ok().json(incident)
}

/// Configure webhook routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(grafana_webhook);
}
