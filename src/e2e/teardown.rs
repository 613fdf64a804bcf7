//! Reverse-order cleanup of everything a run created.

use kube::Client;

use crate::cluster::delete_manifest;
use crate::manifests::Manifest;
use crate::monitoring::{MonitoringClient, MonitoringError};

#[derive(Debug, Clone)]
pub enum Step {
    /// Custom metric descriptor, by short metric name
    Descriptor(String),
    Object(Manifest),
}

impl Step {
    pub fn describe(&self) -> String {
        match self {
            Self::Descriptor(name) => format!("MetricDescriptor {}", name),
            Self::Object(manifest) => manifest.identifier(),
        }
    }
}

/// Steps are registered as their setup succeeds and undone last-first.
#[derive(Debug, Default)]
pub struct Teardown {
    steps: Vec<Step>,
}

impl Teardown {
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Pending steps in the order they will run
    pub fn pending(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().rev()
    }

    /// Undo every step. Objects that are already gone count as undone;
    /// other failures are logged and do not stop the teardown.
    /// Returns the number of steps that failed.
    pub async fn run(&mut self, kube: &Client, monitoring: &MonitoringClient, project_id: &str) -> usize {
        let mut failures = 0;

        while let Some(step) = self.steps.pop() {
            let result = match &step {
                Step::Descriptor(name) => {
                    match monitoring.delete_metric_descriptor(project_id, name).await {
                        Ok(()) | Err(MonitoringError::NotFound(_)) => Ok(()),
                        Err(e) => Err(e.to_string()),
                    }
                }
                Step::Object(manifest) => delete_manifest(kube, manifest)
                    .await
                    .map_err(|e| e.to_string()),
            };

            if let Err(e) = result {
                log::warn!("Failed to clean up {}: {}", step.describe(), e);
                failures += 1;
            }
        }

        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifests::{ManifestParams, adapter_manifests, exposer_manifests};
    use crate::monitoring::TokenSource;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const POD_1_PATH: &str = "/api/v1/namespaces/default/pods/metrics-exposer-1";
    const POD_2_PATH: &str = "/api/v1/namespaces/default/pods/metrics-exposer-2";
    const DESCRIPTOR_PATH: &str = "/projects/p/metricDescriptors/custom.googleapis.com/foo-metric";

    /// Kubernetes and Cloud Monitoring clients both pointed at `server`
    fn clients(server: &MockServer) -> (Client, MonitoringClient) {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let uri: http::Uri = server.uri().parse().unwrap();
        let kube = Client::try_from(kube::Config::new(uri)).unwrap();
        let monitoring =
            MonitoringClient::with_endpoint(server.uri(), TokenSource::Static("t".to_string()))
                .unwrap();
        (kube, monitoring)
    }

    fn status(code: u16, reason: &str) -> ResponseTemplate {
        ResponseTemplate::new(code).set_body_json(serde_json::json!({
            "kind": "Status",
            "apiVersion": "v1",
            "metadata": {},
            "status": "Failure",
            "message": format!("request failed: {}", reason),
            "reason": reason,
            "code": code
        }))
    }

    /// Descriptor first, then both exposer pods, as a run registers them
    fn exposer_teardown() -> Teardown {
        let mut teardown = Teardown::default();
        teardown.push(Step::Descriptor("foo-metric".to_string()));
        for manifest in exposer_manifests(&ManifestParams::default()) {
            teardown.push(Step::Object(manifest));
        }
        teardown
    }

    async fn deleted_paths(server: &MockServer) -> Vec<String> {
        server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.method.as_str() == "DELETE")
            .map(|r| r.url.path().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_already_deleted_counts_as_success() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(status(404, "NotFound"))
            .mount(&server)
            .await;
        let (kube, monitoring) = clients(&server);

        let mut teardown = exposer_teardown();
        let failures = teardown.run(&kube, &monitoring, "p").await;

        assert_eq!(failures, 0);
        assert!(teardown.is_empty());
        assert_eq!(
            deleted_paths(&server).await,
            vec![POD_2_PATH, POD_1_PATH, DESCRIPTOR_PATH]
        );
    }

    #[tokio::test]
    async fn test_failed_step_does_not_stop_teardown() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(POD_1_PATH))
            .respond_with(status(403, "Forbidden"))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .respond_with(status(404, "NotFound"))
            .mount(&server)
            .await;
        let (kube, monitoring) = clients(&server);

        let mut teardown = exposer_teardown();
        let failures = teardown.run(&kube, &monitoring, "p").await;

        assert_eq!(failures, 1);
        assert!(teardown.is_empty());
        assert_eq!(
            deleted_paths(&server).await,
            vec![POD_2_PATH, POD_1_PATH, DESCRIPTOR_PATH]
        );
    }

    #[test]
    fn test_pending_is_reverse_order() {
        let mut teardown = Teardown::default();
        teardown.push(Step::Descriptor("foo-metric".to_string()));
        for manifest in adapter_manifests(&ManifestParams::default()).into_iter().take(2) {
            teardown.push(Step::Object(manifest));
        }

        let order: Vec<String> = teardown.pending().map(Step::describe).collect();
        assert_eq!(
            order,
            vec![
                "ServiceAccount default/custom-metrics-stackdriver-adapter".to_string(),
                "RoleBinding kube-system/custom-metrics-authentication-reader".to_string(),
                "MetricDescriptor foo-metric".to_string(),
            ]
        );
    }
}
