//! Kubernetes objects for the custom metrics adapter test.
//!
//! Everything here is a plain constructor: the adapter deployment with its
//! RBAC and API registration, and the two exposer pods. Objects are grouped
//! into [`Manifest`] values so they can be created, deleted and rendered in
//! a fixed order.

mod adapter;
mod exposer;
mod rbac;

pub use adapter::{adapter_deployment, adapter_service, adapter_service_account, api_service};
pub use exposer::exposer_pod;
pub use rbac::{
    auth_reader, auth_reader_role, extension_auth_reader, metrics_reader_binding,
    metrics_reader_role, system_auth_delegator,
};

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Pod, Service, ServiceAccount};
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::kube_aggregator::pkg::apis::apiregistration::v1::APIService;
use std::collections::BTreeMap;

use crate::config::types::Config;
use crate::error::Result;

pub const ADAPTER_NAME: &str = "custom-metrics-stackdriver-adapter";
pub const ADAPTER_IMAGE: &str = "gcr.io/kawych-test/custom-metrics-stackdriver-adapter:v1.0";
pub const EXPOSER_IMAGE: &str = "gcr.io/kawych-test/metrics-exposer:v1.0";

pub const CUSTOM_METRIC_NAME: &str = "foo-metric";
pub const UNUSED_METRIC_NAME: &str = "unused-metric";
pub const METRIC_VALUE_1: i64 = 448;
pub const METRIC_VALUE_2: i64 = 446;

pub const EXPOSER_POD_1: &str = "metrics-exposer-1";
pub const EXPOSER_POD_2: &str = "metrics-exposer-2";
pub const EXPOSER_LABEL_KEY: &str = "name";
pub const EXPOSER_LABEL_VALUE: &str = "metric-exposer";

pub const CUSTOM_METRICS_GROUP: &str = "custom-metrics.metrics.k8s.io";
pub const CUSTOM_METRICS_VERSION: &str = "v1alpha1";
pub const RBAC_GROUP: &str = "rbac.authorization.k8s.io";

/// Values the manifests vary on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestParams {
    pub namespace: String,
    pub adapter_image: String,
    pub exposer_image: String,
    pub metric_name: String,
    pub value_1: i64,
    pub value_2: i64,
}

impl Default for ManifestParams {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            adapter_image: ADAPTER_IMAGE.to_string(),
            exposer_image: EXPOSER_IMAGE.to_string(),
            metric_name: CUSTOM_METRIC_NAME.to_string(),
            value_1: METRIC_VALUE_1,
            value_2: METRIC_VALUE_2,
        }
    }
}

impl ManifestParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            namespace: config.cluster.namespace.clone(),
            adapter_image: config.adapter.image.clone(),
            exposer_image: config.exposer.image.clone(),
            metric_name: config.test.custom_metric.clone(),
            value_1: config.test.value_1,
            value_2: config.test.value_2,
        }
    }
}

/// A single object the harness creates
#[derive(Debug, Clone)]
pub enum Manifest {
    ServiceAccount(ServiceAccount),
    Deployment(Deployment),
    Service(Service),
    Role(Role),
    RoleBinding(RoleBinding),
    ClusterRole(ClusterRole),
    ClusterRoleBinding(ClusterRoleBinding),
    ApiService(APIService),
    Pod(Pod),
}

impl Manifest {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ServiceAccount(_) => "ServiceAccount",
            Self::Deployment(_) => "Deployment",
            Self::Service(_) => "Service",
            Self::Role(_) => "Role",
            Self::RoleBinding(_) => "RoleBinding",
            Self::ClusterRole(_) => "ClusterRole",
            Self::ClusterRoleBinding(_) => "ClusterRoleBinding",
            Self::ApiService(_) => "APIService",
            Self::Pod(_) => "Pod",
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::ServiceAccount(o) => &o.metadata,
            Self::Deployment(o) => &o.metadata,
            Self::Service(o) => &o.metadata,
            Self::Role(o) => &o.metadata,
            Self::RoleBinding(o) => &o.metadata,
            Self::ClusterRole(o) => &o.metadata,
            Self::ClusterRoleBinding(o) => &o.metadata,
            Self::ApiService(o) => &o.metadata,
            Self::Pod(o) => &o.metadata,
        }
    }

    pub fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata().namespace.as_deref()
    }

    /// `Kind namespace/name`, or `Kind name` for cluster-scoped objects
    pub fn identifier(&self) -> String {
        match self.namespace() {
            Some(ns) => format!("{} {}/{}", self.kind(), ns, self.name()),
            None => format!("{} {}", self.kind(), self.name()),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        let yaml = match self {
            Self::ServiceAccount(o) => serde_yaml::to_string(o)?,
            Self::Deployment(o) => serde_yaml::to_string(o)?,
            Self::Service(o) => serde_yaml::to_string(o)?,
            Self::Role(o) => serde_yaml::to_string(o)?,
            Self::RoleBinding(o) => serde_yaml::to_string(o)?,
            Self::ClusterRole(o) => serde_yaml::to_string(o)?,
            Self::ClusterRoleBinding(o) => serde_yaml::to_string(o)?,
            Self::ApiService(o) => serde_yaml::to_string(o)?,
            Self::Pod(o) => serde_yaml::to_string(o)?,
        };
        Ok(yaml)
    }
}

/// Adapter objects in creation order. Teardown walks this list backwards.
pub fn adapter_manifests(params: &ManifestParams) -> Vec<Manifest> {
    vec![
        Manifest::RoleBinding(extension_auth_reader(params)),
        Manifest::ServiceAccount(adapter_service_account(params)),
        Manifest::Deployment(adapter_deployment(params)),
        Manifest::Service(adapter_service(params)),
        Manifest::ClusterRoleBinding(system_auth_delegator(params)),
        Manifest::Role(auth_reader_role(params)),
        Manifest::RoleBinding(auth_reader(params)),
        Manifest::ApiService(api_service(params)),
        Manifest::ClusterRole(metrics_reader_role()),
        Manifest::ClusterRoleBinding(metrics_reader_binding(params)),
    ]
}

/// The two exposer pods with their expected values
pub fn exposer_manifests(params: &ManifestParams) -> Vec<Manifest> {
    vec![
        Manifest::Pod(exposer_pod(params, EXPOSER_POD_1, params.value_1)),
        Manifest::Pod(exposer_pod(params, EXPOSER_POD_2, params.value_2)),
    ]
}

/// Expected metric value per exposer pod
pub fn expected_values(params: &ManifestParams) -> BTreeMap<String, i64> {
    [
        (EXPOSER_POD_1.to_string(), params.value_1),
        (EXPOSER_POD_2.to_string(), params.value_2),
    ]
    .into_iter()
    .collect()
}

/// Render every object as one multi-document YAML stream.
pub fn render_yaml(manifests: &[Manifest]) -> Result<String> {
    let mut out = String::new();
    for manifest in manifests {
        out.push_str("---\n");
        out.push_str(&manifest.to_yaml()?);
    }
    Ok(out)
}

pub(crate) fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_order() {
        let kinds: Vec<&str> = adapter_manifests(&ManifestParams::default())
            .iter()
            .map(Manifest::kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                "RoleBinding",
                "ServiceAccount",
                "Deployment",
                "Service",
                "ClusterRoleBinding",
                "Role",
                "RoleBinding",
                "APIService",
                "ClusterRole",
                "ClusterRoleBinding",
            ]
        );
    }

    #[test]
    fn test_identifier() {
        let manifests = adapter_manifests(&ManifestParams::default());
        assert_eq!(
            manifests[0].identifier(),
            "RoleBinding kube-system/custom-metrics-authentication-reader"
        );
        assert_eq!(
            manifests[7].identifier(),
            "APIService v1alpha1.custom-metrics.metrics.k8s.io"
        );
    }

    #[test]
    fn test_exposer_pods_are_distinct() {
        let pods = exposer_manifests(&ManifestParams::default());
        assert_eq!(pods[0].name(), EXPOSER_POD_1);
        assert_eq!(pods[1].name(), EXPOSER_POD_2);
        let expected = expected_values(&ManifestParams::default());
        assert_eq!(expected[EXPOSER_POD_1], 448);
        assert_eq!(expected[EXPOSER_POD_2], 446);
    }

    #[test]
    fn test_render_yaml() {
        let params = ManifestParams::default();
        let yaml = render_yaml(&exposer_manifests(&params)).unwrap();
        assert_eq!(yaml.matches("---\n").count(), 2);
        assert!(yaml.contains("kind: Pod"));
        assert!(yaml.contains("--metric_value=446"));
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.cluster.namespace = "metrics".to_string();
        config.test.value_1 = 1;
        let params = ManifestParams::from_config(&config);
        assert_eq!(params.namespace, "metrics");
        assert_eq!(params.value_1, 1);
        assert_eq!(params.value_2, METRIC_VALUE_2);
    }
}
