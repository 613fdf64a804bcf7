use crate::cluster::create_client;
use crate::config::types::Config;
use crate::e2e::cleanup_all;
use crate::error::{E2eError, Result};

pub async fn handle_cleanup(config: Config) -> Result<()> {
    let kube = create_client(config.cluster.context.as_deref()).await?;
    let monitoring = super::operator_monitoring_client(&config)?;

    let failures = cleanup_all(&config, &kube, &monitoring).await?;
    if failures > 0 {
        return Err(E2eError::Cleanup(failures));
    }

    println!("\u{1F9F9} Removed adapter, exposer pods and metric descriptors");
    Ok(())
}
