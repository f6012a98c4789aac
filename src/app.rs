//! Application state and service initialization
//!
//! Centralizes construction of the service graph so actix handlers receive
//! one injected state object instead of ambient singletons.

use std::sync::Arc;

use crate::model::Config;
use crate::service::analysis::{IncidentAnalyzer, LlmAnalyzer};
use crate::service::{IncidentService, IncidentStore, LokiClient, SimulatedChangeProvider};

/// Application state shared across handlers.
pub struct AppState {
    /// Upstream log store client.
    pub loki: LokiClient,
    /// Incident collection and workflow service.
    pub incidents: IncidentService,
}

impl AppState {
    /// Build the service graph from configuration.
    ///
    /// Missing upstream configuration never fails startup: the Loki client
    /// and the analyzer each degrade at request time instead.
    pub fn new(config: &Config) -> Self {
        let loki = LokiClient::from_config(config);
        if !loki.is_configured() {
            tracing::warn!("LOKI_URL not set; log queries will return 503");
        }

        let analyzer: Option<Arc<dyn IncidentAnalyzer>> = match &config.openai_api_key {
            Some(key) => Some(Arc::new(LlmAnalyzer::new(key))),
            None => {
                tracing::warn!("OPENAI_API_KEY not set; incident analysis will return 503");
                None
            }
        };

        let store = Arc::new(IncidentStore::new());
        let seed = crate::service::demo::mock_incidents();
        tracing::info!(count = seed.len(), "Seeding demo incidents");
        for incident in seed {
            store.insert(incident);
        }

        let incidents = IncidentService::new(store, analyzer, Arc::new(SimulatedChangeProvider));

        Self { loki, incidents }
    }
}
