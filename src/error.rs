//! Crate-wide error type.

use thiserror::Error;

use crate::monitoring::MonitoringError;

#[derive(Debug, Error)]
pub enum E2eError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Failed to infer Kubernetes config: {0}")]
    KubeConfig(#[from] kube::config::InferConfigError),

    #[error("Failed to read kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Monitoring API error: {0}")]
    Monitoring(#[from] MonitoringError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Metadata server error: {0}")]
    Metadata(String),

    #[error("Custom Metrics API error: {0}")]
    CustomMetrics(String),

    #[error("Verification failed: {0}")]
    Verification(String),

    #[error("{0} cleanup step(s) failed")]
    Cleanup(usize),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParsingFailed(String),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {field}: {value}")]
    Invalid { field: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, E2eError>;
