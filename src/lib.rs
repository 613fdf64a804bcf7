//! # Custom Metrics E2E
//!
//! End-to-end harness for the Custom Metrics Stackdriver adapter.
//!
//! ## Features
//!
//! - **Adapter provisioning**: Deployment, Service, RBAC and APIService objects for the adapter
//! - **Metric descriptors**: Registers and removes custom metric descriptors in Cloud Monitoring
//! - **Metrics exposer**: Writes a constant gauge for its pod every few seconds
//! - **Verification**: Queries the Custom Metrics API and checks the values per pod
//!
//! ## Example
//!
//! ```rust,no_run
//! use custom_metrics_e2e::manifests::{ManifestParams, adapter_manifests, render_yaml};
//!
//! # fn main() -> custom_metrics_e2e::Result<()> {
//! let yaml = render_yaml(&adapter_manifests(&ManifestParams::default()))?;
//! println!("{}", yaml);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod cluster;
pub mod config;
pub mod e2e;
pub mod error;
pub mod exposer;
pub mod handlers;
pub mod manifests;
pub mod metadata;
pub mod monitoring;

pub use error::{E2eError, Result};
pub use handlers::{handle_cleanup, handle_expose, handle_manifests, handle_run};
use cli::{Commands, TargetArgs};
use config::types::Config;

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn apply_target(config: &mut Config, target: TargetArgs, namespace: Option<String>) {
    if let Some(project) = target.project {
        config.monitoring.project_id = Some(project);
    }
    if let Some(context) = target.context {
        config.cluster.context = Some(context);
    }
    if let Some(provider) = target.provider {
        config.cluster.provider = provider;
    }
    if let Some(namespace) = namespace {
        config.cluster.namespace = namespace;
    }
}

pub async fn run_command(command: Commands, mut config: Config) -> Result<()> {
    match command {
        Commands::Run { target, namespace, settle_secs } => {
            apply_target(&mut config, target, namespace);
            if let Some(secs) = settle_secs {
                config.test.settle_secs = secs;
            }
            handlers::handle_run(config).await
        }
        Commands::Manifests { set, namespace, output } => {
            apply_target(&mut config, TargetArgs::default(), namespace);
            handlers::handle_manifests(&config, set, output)
        }
        Commands::Cleanup { target, namespace } => {
            apply_target(&mut config, target, namespace);
            handlers::handle_cleanup(config).await
        }
        Commands::Expose(mut args) => {
            if args.interval_secs.is_none() {
                args.interval_secs = Some(config.exposer.interval_secs);
            }
            if args.project.is_none() {
                args.project = config.monitoring.project_id.clone();
            }
            handlers::handle_expose(
                args,
                config.monitoring.access_token.clone(),
                &config.monitoring.endpoint,
            )
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_target() {
        let mut config = Config::default();
        apply_target(
            &mut config,
            TargetArgs {
                project: Some("p".to_string()),
                context: None,
                provider: Some("gce".to_string()),
            },
            Some("metrics".to_string()),
        );

        assert_eq!(config.monitoring.project_id.as_deref(), Some("p"));
        assert_eq!(config.cluster.context, None);
        assert_eq!(config.cluster.provider, "gce");
        assert_eq!(config.cluster.namespace, "metrics");
    }
}
