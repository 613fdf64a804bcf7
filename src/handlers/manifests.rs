use std::fs;
use std::path::PathBuf;

use crate::cli::ManifestSet;
use crate::config::types::Config;
use crate::error::Result;
use crate::manifests::{ManifestParams, adapter_manifests, exposer_manifests, render_yaml};

/// Render the selected objects as a multi-document YAML stream
pub fn render_manifests(config: &Config, set: ManifestSet) -> Result<String> {
    let params = ManifestParams::from_config(config);
    let manifests = match set {
        ManifestSet::All => adapter_manifests(&params)
            .into_iter()
            .chain(exposer_manifests(&params))
            .collect(),
        ManifestSet::Adapter => adapter_manifests(&params),
        ManifestSet::Exposer => exposer_manifests(&params),
    };
    render_yaml(&manifests)
}

pub fn handle_manifests(config: &Config, set: ManifestSet, output: Option<PathBuf>) -> Result<()> {
    let yaml = render_manifests(config, set)?;

    match output {
        Some(path) => {
            fs::write(&path, yaml)?;
            log::info!("Wrote manifests to {}", path.display());
        }
        None => print!("{}", yaml),
    }
    Ok(())
}
