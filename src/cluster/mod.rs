//! Kubernetes access: client construction, object create/delete, and the
//! Custom Metrics API.

pub mod custom_metrics;
pub mod resources;

pub use custom_metrics::{CustomMetricsClient, MetricValue, MetricValueList, parse_quantity};
pub use resources::{create_manifest, delete_manifest, is_not_found};

use kube::{Client, Config};

use crate::error::Result;

/// Create a client for `context`, or for the current kubeconfig context /
/// in-cluster config when `None`.
pub async fn create_client(context: Option<&str>) -> Result<Client> {
    // Install rustls crypto provider (required for TLS connections to K8s API)
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = match context {
        Some(context) => {
            let kubeconfig = kube::config::Kubeconfig::read()?;
            Config::from_custom_kubeconfig(
                kubeconfig,
                &kube::config::KubeConfigOptions {
                    context: Some(context.to_string()),
                    ..Default::default()
                },
            )
            .await?
        }
        None => Config::infer().await?,
    };

    log::debug!("Connecting to Kubernetes API at {}", config.cluster_url);
    Ok(Client::try_from(config)?)
}
