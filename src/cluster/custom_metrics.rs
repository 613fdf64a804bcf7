//! Custom Metrics API client.
//!
//! The Custom Metrics API is served by an aggregated API server (the
//! adapter), so it has no generated types; queries are raw requests against
//! `/apis/custom-metrics.metrics.k8s.io/<version>`.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResource;
use kube::Client;
use serde::Deserialize;

use crate::error::{E2eError, Result};
use crate::manifests::{CUSTOM_METRICS_GROUP, CUSTOM_METRICS_VERSION};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribedObject {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub namespace: Option<String>,
    pub name: String,
    #[serde(default)]
    pub api_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricValue {
    pub described_object: DescribedObject,
    pub metric_name: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub window_seconds: Option<i64>,
    /// Resource quantity, e.g. `448` or `448000m`
    pub value: String,
}

impl MetricValue {
    /// Integer value of the quantity, rounded up like apimachinery's `Value()`
    pub fn int_value(&self) -> Option<i64> {
        parse_quantity(&self.value)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricValueList {
    #[serde(default)]
    pub items: Vec<MetricValue>,
}

pub struct CustomMetricsClient {
    client: Client,
    version: String,
}

impl CustomMetricsClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            version: CUSTOM_METRICS_VERSION.to_string(),
        }
    }

    pub fn group_version(&self) -> String {
        format!("{}/{}", CUSTOM_METRICS_GROUP, self.version)
    }

    /// Resources advertised by the adapter, e.g. `pods/foo-metric`.
    pub async fn supported_metrics(&self) -> Result<Vec<APIResource>> {
        let list = self
            .client
            .list_api_group_resources(&self.group_version())
            .await
            .map_err(|e| {
                E2eError::CustomMetrics(format!(
                    "Failed to retrieve a list of supported metrics: {}",
                    e
                ))
            })?;
        Ok(list.resources)
    }

    /// Value of `metric` for a single named object.
    pub async fn get_for_object(
        &self,
        namespace: &str,
        resource: &str,
        name: &str,
        metric: &str,
    ) -> Result<MetricValue> {
        let path = object_path(&self.group_version(), namespace, resource, name, metric);
        let mut list = self.get(&path).await?;

        if list.items.len() != 1 {
            return Err(E2eError::CustomMetrics(format!(
                "expected exactly one metric value for {}/{}, got {}",
                resource,
                name,
                list.items.len()
            )));
        }
        Ok(list.items.remove(0))
    }

    /// Values of `metric` for every object matching `label_selector`.
    pub async fn get_for_objects(
        &self,
        namespace: &str,
        resource: &str,
        label_selector: &str,
        metric: &str,
    ) -> Result<MetricValueList> {
        let path = selector_path(
            &self.group_version(),
            namespace,
            resource,
            label_selector,
            metric,
        );
        self.get(&path).await
    }

    async fn get(&self, path: &str) -> Result<MetricValueList> {
        let request = http::Request::builder()
            .method("GET")
            .uri(path)
            .body(Vec::new())
            .map_err(|e| E2eError::CustomMetrics(format!("Failed to build request: {}", e)))?;

        self.client
            .request::<MetricValueList>(request)
            .await
            .map_err(|e| E2eError::CustomMetrics(format!("Failed query {}: {}", path, e)))
    }
}

fn object_path(group_version: &str, namespace: &str, resource: &str, name: &str, metric: &str) -> String {
    format!(
        "/apis/{}/namespaces/{}/{}/{}/{}",
        group_version, namespace, resource, name, metric
    )
}

fn selector_path(
    group_version: &str,
    namespace: &str,
    resource: &str,
    label_selector: &str,
    metric: &str,
) -> String {
    let base = object_path(group_version, namespace, resource, "*", metric);
    if label_selector.is_empty() {
        base
    } else {
        format!("{}?labelSelector={}", base, urlencoding::encode(label_selector))
    }
}

/// Parse a resource quantity into an integer, rounding fractions up.
///
/// Handles plain and exponent numbers, decimal SI suffixes (`n`, `u`, `m`,
/// `k`, `M`, `G`, `T`, `P`, `E`) and binary SI suffixes (`Ki` .. `Ei`).
pub fn parse_quantity(quantity: &str) -> Option<i64> {
    const BINARY: &[(&str, f64)] = &[
        ("Ki", 1024.0),
        ("Mi", 1_048_576.0),
        ("Gi", 1_073_741_824.0),
        ("Ti", 1_099_511_627_776.0),
        ("Pi", 1_125_899_906_842_624.0),
        ("Ei", 1_152_921_504_606_846_976.0),
    ];
    const DECIMAL: &[(char, f64)] = &[
        ('n', 1e-9),
        ('u', 1e-6),
        ('m', 1e-3),
        ('k', 1e3),
        ('M', 1e6),
        ('G', 1e9),
        ('T', 1e12),
        ('P', 1e15),
        ('E', 1e18),
    ];

    let quantity = quantity.trim();
    if quantity.is_empty() {
        return None;
    }

    // integers stay exact
    if let Ok(n) = quantity.parse::<i64>() {
        return Some(n);
    }

    let (number, multiplier) = if let Some((suffix, mult)) =
        BINARY.iter().find(|(s, _)| quantity.ends_with(s))
    {
        (&quantity[..quantity.len() - suffix.len()], *mult)
    } else if quantity.parse::<f64>().is_ok() {
        (quantity, 1.0)
    } else {
        let last = quantity.chars().last()?;
        let (_, mult) = DECIMAL.iter().find(|(c, _)| *c == last)?;
        (&quantity[..quantity.len() - last.len_utf8()], *mult)
    };

    let value = number.parse::<f64>().ok()? * multiplier;
    if !value.is_finite() {
        return None;
    }
    // absorb float noise such as 448000m -> 447.99999999999994, but keep
    // genuine fractions like 1.0000001 rounding up
    let nearest = value.round();
    if (value - nearest).abs() <= 1e-9 * nearest.abs().max(1.0) {
        return Some(nearest as i64);
    }
    Some(value.ceil() as i64)
}
