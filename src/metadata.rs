//! GCE instance metadata client.
//!
//! Reads project, zone and cluster identity for the pod the exposer runs in,
//! and issues service-account access tokens for the monitoring client.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{E2eError, Result};

const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";
const METADATA_HOST_ENV: &str = "GCE_METADATA_HOST";
const METADATA_FLAVOR: (&str, &str) = ("Metadata-Flavor", "Google");

/// Identity labels attached to every exposed time series
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodIdentity {
    pub project_id: String,
    pub zone: String,
    pub cluster_name: String,
    pub container_name: String,
    pub pod_id: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Clone)]
pub struct MetadataClient {
    http_client: Client,
    base_url: String,
}

impl MetadataClient {
    /// Create a client for the metadata server, honouring `GCE_METADATA_HOST`.
    pub fn new() -> Result<Self> {
        let host = std::env::var(METADATA_HOST_ENV)
            .ok()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_METADATA_HOST.to_string());
        Self::with_base_url(format!("http://{}", host))
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get(&self, suffix: &str) -> Result<String> {
        let url = format!("{}/computeMetadata/v1/{}", self.base_url, suffix);
        let response = self
            .http_client
            .get(&url)
            .header(METADATA_FLAVOR.0, METADATA_FLAVOR.1)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(E2eError::Metadata(format!(
                "{} returned HTTP {}",
                suffix, status
            )));
        }

        Ok(response.text().await?)
    }

    pub async fn project_id(&self) -> Result<String> {
        Ok(self.get("project/project-id").await?.trim().to_string())
    }

    /// Zone the instance runs in, e.g. `us-central1-b`.
    pub async fn zone(&self) -> Result<String> {
        let full = self.get("instance/zone").await?;
        Ok(last_segment(full.trim()).to_string())
    }

    pub async fn instance_attribute(&self, name: &str) -> Result<String> {
        let value = self
            .get(&format!("instance/attributes/{}", name))
            .await?;
        Ok(value.trim().to_string())
    }

    /// OAuth2 access token for the instance's default service account.
    pub async fn access_token(&self) -> Result<String> {
        let body = self
            .get("instance/service-accounts/default/token")
            .await?;
        let token: TokenResponse = serde_json::from_str(&body)?;
        Ok(token.access_token)
    }

    /// Gather identity labels for `pod_id`. Lookup failures are logged and
    /// leave the corresponding label empty.
    pub async fn pod_identity(&self, pod_id: &str) -> PodIdentity {
        let project_id = self.project_id().await.unwrap_or_else(|e| {
            log::warn!("Could not read project id: {}", e);
            String::new()
        });
        let zone = self.zone().await.unwrap_or_else(|e| {
            log::warn!("Could not read zone: {}", e);
            String::new()
        });
        let cluster_name = self
            .instance_attribute("cluster-name")
            .await
            .unwrap_or_else(|e| {
                log::warn!("Could not read cluster name: {}", e);
                String::new()
            });

        PodIdentity {
            project_id,
            zone,
            cluster_name,
            container_name: String::new(),
            pod_id: pod_id.to_string(),
        }
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Serve canned metadata values; requests without the flavor header miss.
    async fn metadata_server(routes: &[(&str, &str)]) -> MockServer {
        let server = MockServer::start().await;
        for (route, body) in routes {
            Mock::given(method("GET"))
                .and(path(format!("/computeMetadata/v1/{}", route)))
                .and(header("Metadata-Flavor", "Google"))
                .respond_with(ResponseTemplate::new(200).set_body_string(*body))
                .mount(&server)
                .await;
        }
        server
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("projects/123/zones/us-central1-b"), "us-central1-b");
        assert_eq!(last_segment("us-east1-c"), "us-east1-c");
    }

    #[tokio::test]
    async fn test_pod_identity() {
        let server = metadata_server(&[
            ("project/project-id", "my-project\n"),
            ("instance/zone", "projects/42/zones/europe-west1-d"),
            ("instance/attributes/cluster-name", "  test-cluster \n"),
        ])
        .await;

        let client = MetadataClient::with_base_url(server.uri()).unwrap();
        let identity = client.pod_identity("uid-1").await;

        assert_eq!(
            identity,
            PodIdentity {
                project_id: "my-project".to_string(),
                zone: "europe-west1-d".to_string(),
                cluster_name: "test-cluster".to_string(),
                container_name: String::new(),
                pod_id: "uid-1".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_missing_attribute_is_empty() {
        let server = metadata_server(&[("project/project-id", "p")]).await;

        let client = MetadataClient::with_base_url(server.uri()).unwrap();
        let identity = client.pod_identity("uid-2").await;

        assert_eq!(identity.project_id, "p");
        assert!(identity.zone.is_empty());
        assert!(identity.cluster_name.is_empty());
    }

    #[tokio::test]
    async fn test_access_token() {
        let server = metadata_server(&[(
            "instance/service-accounts/default/token",
            r#"{"access_token":"ya29.token","expires_in":3599,"token_type":"Bearer"}"#,
        )])
        .await;

        let client = MetadataClient::with_base_url(server.uri()).unwrap();
        assert_eq!(client.access_token().await.unwrap(), "ya29.token");
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/computeMetadata/v1/project/project-id"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = MetadataClient::with_base_url(server.uri()).unwrap();
        let err = client.project_id().await.unwrap_err();
        assert!(matches!(err, E2eError::Metadata(_)), "{}", err);
    }
}
