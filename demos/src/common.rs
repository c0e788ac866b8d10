use std::sync::Arc;

use cascata::{Cascata, CascataError};
use cascata_core::CascataConnector;

/// Environment variable that switches every demo to the fixture connector.
pub const USE_MOCK_ENV: &str = "CASCATA_DEMOS_USE_MOCK";

/// Connectors for demos: the fixture connector in CI, otherwise every
/// connector the environment can build.
#[must_use]
pub fn get_connectors() -> Vec<Arc<dyn CascataConnector>> {
    if std::env::var(USE_MOCK_ENV).is_ok() {
        println!("--- (Using Mock Connector for CI) ---");
        vec![Arc::new(cascata_mock::MockConnector::new())]
    } else {
        cascata_providers::env_connectors()
    }
}

/// Orchestrator over [`get_connectors`] with default configuration.
///
/// # Errors
/// Returns an error if no connector could be built.
pub fn build_cascata() -> Result<Cascata, CascataError> {
    let connectors = get_connectors();
    let names: Vec<&str> = connectors.iter().map(|c| c.name()).collect();
    tracing::info!(?names, "building cascata");
    connectors
        .into_iter()
        .fold(Cascata::builder(), |b, c| b.with_connector(c))
        .build()
}

/// Initialize a compact tracing subscriber honoring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}
