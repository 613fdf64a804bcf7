//! Custom Metrics adapter end-to-end run.
//!
//! Registers the metric descriptors, deploys the adapter and two exposer
//! pods, waits for points to propagate, then checks the Custom Metrics API
//! returns what the exposers write. Everything created is removed again,
//! whether or not verification passed.

pub mod teardown;
pub mod verify;

use kube::Client;
use std::time::Duration;

use crate::cluster::{CustomMetricsClient, create_manifest};
use crate::config::types::Config;
use crate::error::Result;
use crate::manifests::{
    EXPOSER_LABEL_KEY, EXPOSER_LABEL_VALUE, EXPOSER_POD_1, ManifestParams, adapter_manifests,
    expected_values, exposer_manifests,
};
use crate::monitoring::{MonitoringClient, gauge_descriptor};
use teardown::{Step, Teardown};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Skipped(String),
}

pub struct AdapterTest {
    config: Config,
    params: ManifestParams,
    kube: Client,
    monitoring: MonitoringClient,
}

impl AdapterTest {
    pub fn new(config: Config, kube: Client, monitoring: MonitoringClient) -> Self {
        let params = ManifestParams::from_config(&config);
        Self {
            config,
            params,
            kube,
            monitoring,
        }
    }

    pub async fn run(&self) -> Result<Outcome> {
        if !self.config.is_supported_provider() {
            return Ok(Outcome::Skipped(format!(
                "provider {} is not one of gce, gke",
                self.config.cluster.provider
            )));
        }
        let project_id = self.config.project_id()?;

        let mut teardown = Teardown::default();
        let result = self.setup_and_verify(project_id, &mut teardown).await;
        if teardown.is_empty() {
            log::debug!("Setup failed before creating anything");
        }

        let failures = teardown.run(&self.kube, &self.monitoring, project_id).await;
        if failures > 0 {
            log::warn!("{} cleanup step(s) failed; run `cm-e2e cleanup` to retry", failures);
        }

        result.map(|()| Outcome::Passed)
    }

    async fn setup_and_verify(&self, project_id: &str, teardown: &mut Teardown) -> Result<()> {
        for name in self.config.metric_names() {
            self.monitoring
                .create_metric_descriptor(project_id, &gauge_descriptor(name))
                .await?;
            teardown.push(Step::Descriptor(name.to_string()));
        }

        for manifest in adapter_manifests(&self.params)
            .into_iter()
            .chain(exposer_manifests(&self.params))
        {
            create_manifest(&self.kube, &manifest).await?;
            teardown.push(Step::Object(manifest));
        }

        let settle = Duration::from_secs(self.config.test.settle_secs);
        log::info!("Waiting {:?} for pods to start and export metrics", settle);
        tokio::time::sleep(settle).await;

        self.verify().await
    }

    async fn verify(&self) -> Result<()> {
        let client = CustomMetricsClient::new(self.kube.clone());
        let namespace = &self.params.namespace;
        let metric = &self.config.test.custom_metric;

        let resources: Vec<String> = client
            .supported_metrics()
            .await?
            .into_iter()
            .map(|r| r.name)
            .collect();
        log::debug!("Custom Metrics API advertises {:?}", resources);
        verify::check_supported_metrics(&resources, &self.config.metric_names())?;

        let value = client
            .get_for_object(namespace, "pods", EXPOSER_POD_1, metric)
            .await?;
        verify::check_value(&value, self.params.value_1)?;

        let selector = format!("{}={}", EXPOSER_LABEL_KEY, EXPOSER_LABEL_VALUE);
        let values = client
            .get_for_objects(namespace, "pods", &selector, metric)
            .await?;
        verify::check_values(&values, &expected_values(&self.params))?;

        log::info!("Custom Metrics API returned the expected values for {}", metric);
        Ok(())
    }
}

/// Delete every object and descriptor a run could have created, ignoring
/// ones that are already gone. Returns the number of failed deletions.
pub async fn cleanup_all(config: &Config, kube: &Client, monitoring: &MonitoringClient) -> Result<usize> {
    let project_id = config.project_id()?;
    let params = ManifestParams::from_config(config);

    let mut teardown = Teardown::default();
    for name in config.metric_names() {
        teardown.push(Step::Descriptor(name.to_string()));
    }
    for manifest in adapter_manifests(&params)
        .into_iter()
        .chain(exposer_manifests(&params))
    {
        teardown.push(Step::Object(manifest));
    }

    Ok(teardown.run(kube, monitoring, project_id).await)
}
