//! Live Custom Metrics adapter test.
//!
//! Needs a GKE/GCE cluster in the current kubeconfig context, a project with
//! Cloud Monitoring enabled, and credentials (`CLOUDSDK_AUTH_ACCESS_TOKEN` or
//! gcloud application default credentials).
//!
//! ```bash
//! CM_E2E_PROJECT=my-project cargo test --test adapter_e2e -- --ignored
//! ```

use custom_metrics_e2e::cluster::create_client;
use custom_metrics_e2e::config::load_config;
use custom_metrics_e2e::e2e::{AdapterTest, Outcome};
use custom_metrics_e2e::monitoring::{MonitoringClient, TokenSource};

#[tokio::test]
#[ignore = "requires a GKE cluster and Cloud Monitoring credentials"]
async fn stackdriver_adapter_serves_custom_metrics() {
    let _ = env_logger::builder().is_test(true).try_init();

    let config = load_config(None).expect("Failed to load config");
    let kube = create_client(config.cluster.context.as_deref())
        .await
        .expect("Failed to create Kubernetes client");
    let monitoring = MonitoringClient::with_endpoint(
        &config.monitoring.endpoint,
        TokenSource::detect(config.monitoring.access_token.as_deref()),
    )
    .expect("Failed to create monitoring client");

    match AdapterTest::new(config, kube, monitoring).run().await {
        Ok(Outcome::Passed) => {}
        Ok(Outcome::Skipped(reason)) => println!("Skipping: {}", reason),
        Err(e) => panic!("Custom Metrics adapter test failed: {}", e),
    }
}
