// Handler modules
pub mod cleanup;
pub mod expose;
pub mod manifests;
pub mod run;

// Re-export all handler functions
pub use cleanup::handle_cleanup;
pub use expose::handle_expose;
pub use manifests::handle_manifests;
pub use run::handle_run;

use crate::monitoring::{MonitoringClient, TokenSource};
use crate::config::types::Config;
use crate::error::Result;

/// Monitoring client for operator commands: configured token or gcloud credentials
pub(crate) fn operator_monitoring_client(config: &Config) -> Result<MonitoringClient> {
    let token_source = TokenSource::detect(config.monitoring.access_token.as_deref());
    Ok(MonitoringClient::with_endpoint(
        &config.monitoring.endpoint,
        token_source,
    )?)
}
