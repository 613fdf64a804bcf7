use std::time::Duration;

use crate::cli::ExposeArgs;
use crate::error::Result;
use crate::exposer::{DEFAULT_INTERVAL, MetricsExposer};
use crate::metadata::MetadataClient;
use crate::monitoring::{MonitoringClient, TokenSource};

/// Run the exposer against the Cloud Monitoring API at `endpoint`. Identity
/// and credentials come from instance metadata unless a token is passed in.
pub async fn handle_expose(
    args: ExposeArgs,
    access_token: Option<String>,
    endpoint: &str,
) -> Result<()> {
    let metadata = MetadataClient::new()?;
    expose(args, metadata, access_token, endpoint).await
}

async fn expose(
    args: ExposeArgs,
    metadata: MetadataClient,
    access_token: Option<String>,
    endpoint: &str,
) -> Result<()> {
    let mut identity = metadata.pod_identity(&args.pod_id).await;
    if let Some(project) = args.project {
        identity.project_id = project;
    }

    let token_source = match access_token {
        Some(token) => TokenSource::Static(token),
        None => TokenSource::Metadata(metadata),
    };
    let client = MonitoringClient::with_endpoint(endpoint, token_source)?;

    let interval = args
        .interval_secs
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_INTERVAL);
    let exposer = MetricsExposer::new(client, identity, args.metric_name, args.metric_value)
        .with_interval(interval);

    log::info!(
        "Exposing {} for pod {:?} in project {:?} via {}",
        args.metric_value,
        exposer.identity().pod_id,
        exposer.identity().project_id,
        endpoint
    );

    if args.once {
        exposer.tick().await?;
        log::info!("Finished writing time series with value: {}", args.metric_value);
        return Ok(());
    }

    exposer.run().await;
    Ok(())
}
