//! Cloud Monitoring v3 REST client
//!
//! Covers the three calls the harness needs: creating and deleting custom
//! metric descriptors, and writing time series.

use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::auth::TokenSource;
use super::error::{MonitoringError, Result};
use super::types::{CreateTimeSeriesRequest, MetricDescriptor, custom_metric_type};

/// Production API URL
pub const DEFAULT_ENDPOINT: &str = "https://monitoring.googleapis.com/v3";

/// User agent for API requests
const USER_AGENT: &str = concat!("custom-metrics-e2e/", env!("CARGO_PKG_VERSION"));

pub struct MonitoringClient {
    http_client: Client,
    endpoint: String,
    token_source: TokenSource,
}

impl MonitoringClient {
    pub fn new(token_source: TokenSource) -> Result<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT, token_source)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, token_source: TokenSource) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(MonitoringError::HttpError)?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token_source,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn create_metric_descriptor(
        &self,
        project_id: &str,
        descriptor: &MetricDescriptor,
    ) -> Result<MetricDescriptor> {
        let path = format!("projects/{}/metricDescriptors", project_id);
        let created = self.send(Method::POST, &path, Some(descriptor)).await?;
        log::info!("Created metric descriptor {}", descriptor.metric_type);
        Ok(created)
    }

    /// Delete the descriptor of a custom metric by its short name
    pub async fn delete_metric_descriptor(&self, project_id: &str, metric_name: &str) -> Result<()> {
        let path = format!(
            "projects/{}/metricDescriptors/{}",
            project_id,
            custom_metric_type(metric_name)
        );
        let _: serde_json::Value = self.send::<(), _>(Method::DELETE, &path, None).await?;
        log::info!("Deleted metric descriptor {}", metric_name);
        Ok(())
    }

    pub async fn create_time_series(
        &self,
        project_id: &str,
        request: &CreateTimeSeriesRequest,
    ) -> Result<()> {
        let path = format!("projects/{}/timeSeries", project_id);
        let _: serde_json::Value = self.send(Method::POST, &path, Some(request)).await?;
        Ok(())
    }

    async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let token = self.token_source.token().await?;
        let url = format!("{}/{}", self.endpoint, path);

        log::debug!("{} {}", method, url);
        let mut request = self.http_client.request(method, &url).bearer_auth(&token);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;

        self.handle_response(response).await
    }

    /// Handle the HTTP response, converting errors appropriately
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            // empty bodies (timeSeries.create, delete) decode as `{}`
            let body = if body.trim().is_empty() { "{}" } else { body.as_str() };
            return serde_json::from_str(body).map_err(|e| MonitoringError::ParseError(e.to_string()));
        }

        Err(MonitoringError::from_status(status.as_u16(), error_message(&body)))
    }
}

/// Pull `error.message` out of a Google API error body, falling back to the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
