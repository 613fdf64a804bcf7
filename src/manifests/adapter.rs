use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, PodSpec, PodTemplateSpec, ResourceRequirements, Service, ServiceAccount,
    ServicePort, ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use k8s_openapi::kube_aggregator::pkg::apis::apiregistration::v1::{
    APIService, APIServiceSpec, ServiceReference,
};
use std::collections::BTreeMap;

use super::{
    ADAPTER_NAME, CUSTOM_METRICS_GROUP, CUSTOM_METRICS_VERSION, ManifestParams, labels,
};

const CPU_NEED: &str = "200m";
const MEMORY_NEED: &str = "250M";
const CLIENT_CA_FLAG: &str =
    "--requestheader-client-ca-file=/var/run/secrets/kubernetes.io/serviceaccount/ca.crt";

fn selector_labels() -> BTreeMap<String, String> {
    labels(&[("run", ADAPTER_NAME), ("k8s-app", ADAPTER_NAME)])
}

fn cluster_service_labels() -> BTreeMap<String, String> {
    let mut labels = selector_labels();
    labels.insert("kubernetes.io/cluster-service".to_string(), "true".to_string());
    labels
}

pub fn adapter_service_account(params: &ManifestParams) -> ServiceAccount {
    ServiceAccount {
        metadata: ObjectMeta {
            name: Some(ADAPTER_NAME.to_string()),
            namespace: Some(params.namespace.clone()),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn adapter_deployment(params: &ManifestParams) -> Deployment {
    let resources: BTreeMap<String, Quantity> = [
        ("cpu".to_string(), Quantity(CPU_NEED.to_string())),
        ("memory".to_string(), Quantity(MEMORY_NEED.to_string())),
    ]
    .into_iter()
    .collect();

    Deployment {
        metadata: ObjectMeta {
            name: Some(ADAPTER_NAME.to_string()),
            namespace: Some(params.namespace.clone()),
            labels: Some(selector_labels()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(1),
            selector: LabelSelector {
                match_labels: Some(selector_labels()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(cluster_service_labels()),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    service_account_name: Some(ADAPTER_NAME.to_string()),
                    containers: vec![Container {
                        name: format!("pod-{}", ADAPTER_NAME),
                        image: Some(params.adapter_image.clone()),
                        image_pull_policy: Some("Always".to_string()),
                        command: Some(vec!["/adapter".to_string(), CLIENT_CA_FLAG.to_string()]),
                        resources: Some(ResourceRequirements {
                            limits: Some(resources.clone()),
                            requests: Some(resources),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn adapter_service(params: &ManifestParams) -> Service {
    let mut service_labels = cluster_service_labels();
    service_labels.insert("kubernetes.io/name".to_string(), "Adapter".to_string());

    Service {
        metadata: ObjectMeta {
            name: Some(ADAPTER_NAME.to_string()),
            namespace: Some(params.namespace.clone()),
            labels: Some(service_labels),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            ports: Some(vec![ServicePort {
                port: 443,
                protocol: Some("TCP".to_string()),
                target_port: Some(IntOrString::Int(443)),
                ..Default::default()
            }]),
            selector: Some(selector_labels()),
            type_: Some("ClusterIP".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Registers the adapter as the backend of the Custom Metrics API group.
pub fn api_service(params: &ManifestParams) -> APIService {
    APIService {
        metadata: ObjectMeta {
            name: Some(format!("{}.{}", CUSTOM_METRICS_VERSION, CUSTOM_METRICS_GROUP)),
            ..Default::default()
        },
        spec: Some(APIServiceSpec {
            insecure_skip_tls_verify: Some(true),
            group: Some(CUSTOM_METRICS_GROUP.to_string()),
            group_priority_minimum: 100,
            version_priority: 100,
            version: Some(CUSTOM_METRICS_VERSION.to_string()),
            service: Some(ServiceReference {
                name: Some(ADAPTER_NAME.to_string()),
                namespace: Some(params.namespace.clone()),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployment_resources() {
        let deployment = adapter_deployment(&ManifestParams::default());
        let spec = deployment.spec.unwrap();
        assert_eq!(spec.replicas, Some(1));

        let template_labels = spec.template.metadata.unwrap().labels.unwrap();
        assert_eq!(template_labels["kubernetes.io/cluster-service"], "true");
        assert_eq!(spec.selector.match_labels.unwrap()["k8s-app"], ADAPTER_NAME);

        let pod_spec = spec.template.spec.unwrap();
        let container = &pod_spec.containers[0];
        let resources = container.resources.as_ref().unwrap();
        assert_eq!(resources.requests, resources.limits);
        assert_eq!(resources.requests.as_ref().unwrap()["cpu"].0, "200m");
        assert_eq!(resources.requests.as_ref().unwrap()["memory"].0, "250M");
        assert_eq!(container.command.as_ref().unwrap()[1], CLIENT_CA_FLAG);
    }

    #[test]
    fn test_service_targets_adapter() {
        let service = adapter_service(&ManifestParams::default());
        let spec = service.spec.unwrap();
        let ports = spec.ports.unwrap();
        let port = &ports[0];
        assert_eq!(port.port, 443);
        assert_eq!(port.target_port, Some(IntOrString::Int(443)));
        assert_eq!(spec.type_.as_deref(), Some("ClusterIP"));
        assert_eq!(spec.selector.unwrap(), selector_labels());
        assert_eq!(service.metadata.labels.unwrap()["kubernetes.io/name"], "Adapter");
    }

    #[test]
    fn test_api_service_points_at_namespace() {
        let params = ManifestParams {
            namespace: "metrics".to_string(),
            ..Default::default()
        };
        let spec = api_service(&params).spec.unwrap();
        assert_eq!(spec.insecure_skip_tls_verify, Some(true));
        assert_eq!(spec.group_priority_minimum, 100);
        assert_eq!(spec.service.unwrap().namespace.as_deref(), Some("metrics"));
    }
}
