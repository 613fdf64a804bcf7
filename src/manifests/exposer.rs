use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EnvVar, EnvVarSource, ObjectFieldSelector, Pod, PodSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use super::{EXPOSER_LABEL_KEY, EXPOSER_LABEL_VALUE, ManifestParams, labels};

/// Pod running the exposer binary with `value` for the configured metric.
/// The pod's UID reaches the binary through the `POD_ID` env var.
pub fn exposer_pod(params: &ManifestParams, name: &str, value: i64) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(params.namespace.clone()),
            labels: Some(labels(&[(EXPOSER_LABEL_KEY, EXPOSER_LABEL_VALUE)])),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name: "metrics-exposer".to_string(),
                image: Some(params.exposer_image.clone()),
                image_pull_policy: Some("Always".to_string()),
                command: Some(vec![
                    "/metrics_exposer".to_string(),
                    "--pod_id=$(POD_ID)".to_string(),
                    format!("--metric_name={}", params.metric_name),
                    format!("--metric_value={}", value),
                ]),
                env: Some(vec![EnvVar {
                    name: "POD_ID".to_string(),
                    value_from: Some(EnvVarSource {
                        field_ref: Some(ObjectFieldSelector {
                            field_path: "metadata.uid".to_string(),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }),
                    ..Default::default()
                }]),
                ports: Some(vec![ContainerPort {
                    container_port: 80,
                    ..Default::default()
                }]),
                ..Default::default()
            }],
            ..Default::default()
        }),
        ..Default::default()
    }
}
