//! Request and response bodies for the Cloud Monitoring v3 API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::metadata::PodIdentity;

/// Prefix of user-defined metric types
pub const CUSTOM_METRIC_PREFIX: &str = "custom.googleapis.com/";

/// Monitored resource type the adapter maps pods onto
pub const GKE_CONTAINER: &str = "gke_container";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub metric_type: String,
    pub metric_kind: String,
    pub value_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    #[serde(rename = "type")]
    pub metric_type: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoredResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInterval {
    pub end_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
}

/// Only the int64 arm of the API's typed value is produced here.
/// The API encodes int64 as a JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedValue {
    #[serde(with = "int64_as_string")]
    pub int64_value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub interval: TimeInterval,
    pub value: TypedValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub metric: Metric,
    pub resource: MonitoredResource,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimeSeriesRequest {
    pub time_series: Vec<TimeSeries>,
}

/// Full metric type for a custom metric name
pub fn custom_metric_type(name: &str) -> String {
    format!("{}{}", CUSTOM_METRIC_PREFIX, name)
}

/// INT64 gauge descriptor for a custom metric
pub fn gauge_descriptor(name: &str) -> MetricDescriptor {
    MetricDescriptor {
        name: Some(name.to_string()),
        metric_type: custom_metric_type(name),
        metric_kind: "GAUGE".to_string(),
        value_type: "INT64".to_string(),
        description: None,
    }
}

/// A single-point series attributed to the pod's container.
pub fn gke_container_series(
    identity: &PodIdentity,
    metric_name: &str,
    value: i64,
    end_time: chrono::DateTime<chrono::Utc>,
) -> CreateTimeSeriesRequest {
    let mut labels = BTreeMap::new();
    labels.insert("project_id".to_string(), identity.project_id.clone());
    labels.insert("zone".to_string(), identity.zone.clone());
    labels.insert("cluster_name".to_string(), identity.cluster_name.clone());
    labels.insert("container_name".to_string(), identity.container_name.clone());
    labels.insert("pod_id".to_string(), identity.pod_id.clone());
    // the adapter ignores these two
    labels.insert("namespace_id".to_string(), "default".to_string());
    labels.insert("instance_id".to_string(), String::new());

    CreateTimeSeriesRequest {
        time_series: vec![TimeSeries {
            metric: Metric {
                metric_type: custom_metric_type(metric_name),
                labels: BTreeMap::new(),
            },
            resource: MonitoredResource {
                resource_type: GKE_CONTAINER.to_string(),
                labels,
            },
            points: vec![Point {
                interval: TimeInterval {
                    end_time: end_time.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                    start_time: None,
                },
                value: TypedValue { int64_value: value },
            }],
        }],
    }
}

mod int64_as_string {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(i64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Str(s) => s.parse().map_err(de::Error::custom),
            Raw::Num(n) => Ok(n),
        }
    }
}
