//! Assertions over Custom Metrics API responses.

use std::collections::BTreeMap;

use crate::cluster::{MetricValue, MetricValueList};
use crate::error::{E2eError, Result};

fn fail(message: String) -> E2eError {
    E2eError::Verification(message)
}

/// Every advertised resource must be `pods/<metric>` for one of `allowed`.
pub fn check_supported_metrics(resource_names: &[String], allowed: &[&str]) -> Result<()> {
    let expected: Vec<String> = allowed.iter().map(|m| format!("pods/{}", m)).collect();

    for name in resource_names {
        if !expected.contains(name) {
            return Err(fail(format!(
                "Unexpected metric {}. Only metrics {} should be supported",
                name,
                expected.join(", ")
            )));
        }
    }
    Ok(())
}

pub fn check_value(value: &MetricValue, expected: i64) -> Result<()> {
    match value.int_value() {
        Some(actual) if actual == expected => Ok(()),
        _ => Err(fail(format!(
            "Unexpected metric value for metric {}: expected {} but received {}",
            value.metric_name, expected, value.value
        ))),
    }
}

/// Exactly one value per expected object, each matching its expected value.
pub fn check_values(list: &MetricValueList, expected: &BTreeMap<String, i64>) -> Result<()> {
    if list.items.len() != expected.len() {
        return Err(fail(format!(
            "Expected results for exactly {} pods, but {} results received",
            expected.len(),
            list.items.len()
        )));
    }

    for item in &list.items {
        let name = &item.described_object.name;
        let want = expected.get(name).ok_or_else(|| {
            fail(format!(
                "Unexpected metric value for metric {} and pod {}: {}",
                item.metric_name, name, item.value
            ))
        })?;
        if item.int_value() != Some(*want) {
            return Err(fail(format!(
                "Unexpected metric value for metric {} and pod {}: expected {} but received {}",
                item.metric_name, name, want, item.value
            )));
        }
    }
    Ok(())
}
