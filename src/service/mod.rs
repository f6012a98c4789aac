pub mod analysis;
pub mod changes;
pub mod demo;
pub mod incident;
pub mod logql;
pub mod loki;
pub mod normalize;
pub mod store;
pub mod synthesize;

pub use changes::SimulatedChangeProvider;
pub use incident::IncidentService;
pub use loki::LokiClient;
pub use store::IncidentStore;
