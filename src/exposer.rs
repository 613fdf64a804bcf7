//! Synthetic metric exposer.
//!
//! Writes a single constant gauge point for the pod it runs in on a fixed
//! interval. Write failures are logged and the next tick tries again.

use std::time::Duration;

use crate::metadata::PodIdentity;
use crate::monitoring::{MonitoringClient, MonitoringError, gke_container_series};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

pub struct MetricsExposer {
    client: MonitoringClient,
    identity: PodIdentity,
    metric_name: String,
    metric_value: i64,
    interval: Duration,
}

impl MetricsExposer {
    pub fn new(
        client: MonitoringClient,
        identity: PodIdentity,
        metric_name: impl Into<String>,
        metric_value: i64,
    ) -> Self {
        Self {
            client,
            identity,
            metric_name: metric_name.into(),
            metric_value,
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn identity(&self) -> &PodIdentity {
        &self.identity
    }

    /// Write one point stamped with the current time.
    pub async fn tick(&self) -> Result<(), MonitoringError> {
        let request = gke_container_series(
            &self.identity,
            &self.metric_name,
            self.metric_value,
            chrono::Utc::now(),
        );
        self.client
            .create_time_series(&self.identity.project_id, &request)
            .await
    }

    /// Run until `shutdown` resolves, returning the number of ticks attempted.
    pub async fn run_until<F>(&self, shutdown: F) -> u64
    where
        F: std::future::Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut ticks = 0u64;

        loop {
            ticks += 1;
            match self.tick().await {
                Ok(()) => log::info!(
                    "Finished writing time series with value: {}",
                    self.metric_value
                ),
                Err(e) => log::warn!("Failed to write time series data: {}", e),
            }

            tokio::select! {
                _ = &mut shutdown => {
                    log::info!("Shutting down after {} writes", ticks);
                    return ticks;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    /// Run until Ctrl-C or SIGTERM.
    pub async fn run(&self) -> u64 {
        self.run_until(shutdown_signal()).await
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                log::warn!("Could not install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::TokenSource;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Accepts time series writes for project `p`, answering `status`.
    async fn monitoring_server(status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/p/timeSeries"))
            .respond_with(ResponseTemplate::new(status).set_body_string("{}"))
            .mount(&server)
            .await;
        server
    }

    async fn writes(server: &MockServer) -> usize {
        server.received_requests().await.unwrap_or_default().len()
    }

    fn exposer(url: &str) -> MetricsExposer {
        let client =
            MonitoringClient::with_endpoint(url, TokenSource::Static("t".to_string())).unwrap();
        let identity = PodIdentity {
            project_id: "p".to_string(),
            pod_id: "uid".to_string(),
            ..Default::default()
        };
        MetricsExposer::new(client, identity, "foo-metric", 448)
            .with_interval(Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_tick_writes_once() {
        let server = monitoring_server(200).await;
        exposer(&server.uri()).tick().await.unwrap();
        assert_eq!(writes(&server).await, 1);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let server = monitoring_server(200).await;
        let ticks = exposer(&server.uri())
            .run_until(tokio::time::sleep(Duration::from_millis(200)))
            .await;

        assert!(ticks >= 2, "expected repeated writes, got {}", ticks);
        assert_eq!(writes(&server).await as u64, ticks);
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_loop() {
        let server = monitoring_server(500).await;
        let ticks = exposer(&server.uri())
            .run_until(tokio::time::sleep(Duration::from_millis(200)))
            .await;

        assert!(ticks >= 2);
        assert_eq!(writes(&server).await as u64, ticks);
    }
}
