//! Cloud Monitoring (Stackdriver) API access.

mod auth;
mod client;
mod error;
pub mod types;

pub use auth::TokenSource;
pub use client::{DEFAULT_ENDPOINT, MonitoringClient};
pub use error::MonitoringError;
pub use types::{
    CreateTimeSeriesRequest, MetricDescriptor, custom_metric_type, gauge_descriptor,
    gke_container_series,
};
