use serde::{Deserialize, Serialize};

use crate::manifests::{
    ADAPTER_IMAGE, CUSTOM_METRIC_NAME, EXPOSER_IMAGE, METRIC_VALUE_1, METRIC_VALUE_2,
    UNUSED_METRIC_NAME,
};
use crate::monitoring::DEFAULT_ENDPOINT;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cluster: ClusterConfig,
    pub monitoring: MonitoringConfig,
    pub adapter: AdapterConfig,
    pub exposer: ExposerConfig,
    pub test: TestConfig,
}

/// Target cluster configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Cloud provider the cluster runs on ("gce", "gke", ...)
    pub provider: String,
    /// Kubeconfig context; the current context when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Namespace the adapter and exposer pods are created in
    pub namespace: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            provider: "gke".to_string(),
            context: None,
            namespace: "default".to_string(),
        }
    }
}

/// Cloud Monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub endpoint: String,
    /// Pre-issued OAuth2 access token; falls back to gcloud when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_token: None,
        }
    }
}

/// Adapter deployment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    pub image: String,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            image: ADAPTER_IMAGE.to_string(),
        }
    }
}

/// Metrics exposer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposerConfig {
    pub image: String,
    pub interval_secs: u64,
}

impl Default for ExposerConfig {
    fn default() -> Self {
        Self {
            image: EXPOSER_IMAGE.to_string(),
            interval_secs: 5,
        }
    }
}

/// Expected values and timing for the adapter test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    pub custom_metric: String,
    pub unused_metric: String,
    pub value_1: i64,
    pub value_2: i64,
    /// Time allowed for pods to start and points to propagate
    pub settle_secs: u64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            custom_metric: CUSTOM_METRIC_NAME.to_string(),
            unused_metric: UNUSED_METRIC_NAME.to_string(),
            value_1: METRIC_VALUE_1,
            value_2: METRIC_VALUE_2,
            settle_secs: 60,
        }
    }
}
