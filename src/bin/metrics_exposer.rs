//! Container entrypoint for the synthetic metrics exposer.
//!
//! ```text
//! /metrics_exposer --pod_id=$(POD_ID) --metric_name=foo-metric --metric_value=448
//! ```

use clap::Parser;
use custom_metrics_e2e::cli::{ExposeArgs, init_logging};
use custom_metrics_e2e::handlers::handle_expose;
use custom_metrics_e2e::monitoring::DEFAULT_ENDPOINT;
use std::process;

#[derive(Parser)]
#[command(name = "metrics-exposer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Write a constant custom metric for this pod to Cloud Monitoring")]
struct ExposerCli {
    #[command(flatten)]
    args: ExposeArgs,

    /// More log output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = ExposerCli::parse();
    init_logging(cli.verbose, false, log::LevelFilter::Info);

    let access_token = std::env::var("CLOUDSDK_AUTH_ACCESS_TOKEN")
        .ok()
        .filter(|t| !t.is_empty());

    if let Err(e) = handle_expose(cli.args, access_token, DEFAULT_ENDPOINT).await {
        log::error!("error: {}", e);
        process::exit(1);
    }
}
