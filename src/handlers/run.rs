use colored::Colorize;

use crate::cluster::create_client;
use crate::config::types::Config;
use crate::e2e::{AdapterTest, Outcome};
use crate::error::Result;

pub async fn handle_run(config: Config) -> Result<()> {
    if !config.is_supported_provider() {
        println!(
            "\u{23ED}\u{FE0F}  Skipping: provider {} is not one of gce, gke",
            config.cluster.provider.yellow()
        );
        return Ok(());
    }

    let project_id = config.project_id()?.to_string();
    println!(
        "\u{1F3C3} Running Custom Metrics adapter test (project {}, namespace {})",
        project_id, config.cluster.namespace
    );

    let kube = create_client(config.cluster.context.as_deref()).await?;
    let monitoring = super::operator_monitoring_client(&config)?;

    match AdapterTest::new(config, kube, monitoring).run().await {
        Ok(Outcome::Passed) => {
            println!("{} Custom Metrics adapter test passed", "\u{2705}".green());
            Ok(())
        }
        Ok(Outcome::Skipped(reason)) => {
            println!("\u{23ED}\u{FE0F}  Skipping: {}", reason.yellow());
            Ok(())
        }
        Err(e) => {
            eprintln!("{} Custom Metrics adapter test failed", "\u{274C}".red());
            Err(e)
        }
    }
}
