pub mod types;

use crate::error::{ConfigError, Result};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = ".cm-e2e.toml";

/// Providers the adapter test can run against
pub const SUPPORTED_PROVIDERS: &[&str] = &["gce", "gke"];

/// Get the global config file path (~/.cm-e2e.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (dir/.cm-e2e.toml)
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Load configuration from an explicit file, the working directory, the
/// home directory, or defaults, in that order. Environment overrides are
/// applied last.
pub fn load_config(explicit: Option<&Path>) -> Result<types::Config> {
    let mut config = match explicit {
        Some(path) => read_config(path)?,
        None => find_config()?.unwrap_or_default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

fn find_config() -> Result<Option<types::Config>> {
    let local = local_config_path(Path::new("."));
    if local.exists() {
        return read_config(&local).map(Some);
    }

    if let Some(global) = global_config_path() {
        if global.exists() {
            return read_config(&global).map(Some);
        }
    }

    Ok(None)
}

/// Read and parse a single config file
pub fn read_config(path: &Path) -> Result<types::Config> {
    let content = fs::read_to_string(path)?;
    let config = toml::from_str(&content)
        .map_err(|e| ConfigError::ParsingFailed(format!("{}: {}", path.display(), e)))?;
    log::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Apply `CM_E2E_PROJECT`, `CM_E2E_PROVIDER`, `KUBE_CONTEXT` and
/// `CLOUDSDK_AUTH_ACCESS_TOKEN` on top of file settings.
pub fn apply_env_overrides<F>(config: &mut types::Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(project) = non_empty("CM_E2E_PROJECT") {
        config.monitoring.project_id = Some(project);
    }
    if let Some(provider) = non_empty("CM_E2E_PROVIDER") {
        config.cluster.provider = provider;
    }
    if let Some(context) = non_empty("KUBE_CONTEXT") {
        config.cluster.context = Some(context);
    }
    if let Some(token) = non_empty("CLOUDSDK_AUTH_ACCESS_TOKEN") {
        config.monitoring.access_token = Some(token);
    }
}

impl types::Config {
    /// Whether the configured provider can host the Stackdriver adapter
    pub fn is_supported_provider(&self) -> bool {
        SUPPORTED_PROVIDERS.contains(&self.cluster.provider.as_str())
    }

    /// Metric descriptors a run registers: the exposed metric and one nobody writes
    pub fn metric_names(&self) -> Vec<&str> {
        vec![self.test.custom_metric.as_str(), self.test.unused_metric.as_str()]
    }

    /// Reject settings no run could succeed with
    pub fn validate(&self) -> Result<()> {
        if self.cluster.namespace.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "cluster.namespace",
                value: self.cluster.namespace.clone(),
            }
            .into());
        }
        if self.exposer.interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "exposer.interval_secs",
                value: "0".to_string(),
            }
            .into());
        }
        if self.test.custom_metric == self.test.unused_metric {
            return Err(ConfigError::Invalid {
                field: "test.unused_metric",
                value: self.test.unused_metric.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Project id, required for every Cloud Monitoring call
    pub fn project_id(&self) -> Result<&str> {
        self.monitoring
            .project_id
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ConfigError::Missing("monitoring.project_id").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = types::Config::default();
        assert_eq!(config.cluster.provider, "gke");
        assert_eq!(config.cluster.namespace, "default");
        assert_eq!(config.test.value_1, 448);
        assert_eq!(config.test.value_2, 446);
        assert_eq!(config.test.settle_secs, 60);
        assert_eq!(config.exposer.interval_secs, 5);
        assert!(config.is_supported_provider());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: types::Config = toml::from_str(
            r#"
            [monitoring]
            project_id = "my-project"

            [test]
            settle_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.project_id().unwrap(), "my-project");
        assert_eq!(config.test.settle_secs, 5);
        assert_eq!(config.test.custom_metric, "foo-metric");
        assert_eq!(config.adapter.image, crate::manifests::ADAPTER_IMAGE);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("CM_E2E_PROJECT", "env-project"),
            ("CM_E2E_PROVIDER", "aws"),
            ("KUBE_CONTEXT", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = types::Config::default();
        config.cluster.context = Some("file-context".to_string());
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.monitoring.project_id.as_deref(), Some("env-project"));
        assert_eq!(config.cluster.provider, "aws");
        // blank values do not clobber file settings
        assert_eq!(config.cluster.context.as_deref(), Some("file-context"));
        assert!(!config.is_supported_provider());
    }

    #[test]
    fn test_missing_project_id() {
        let config = types::Config::default();
        assert!(config.project_id().is_err());
    }

    #[test]
    fn test_read_config_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = local_config_path(dir.path());
        fs::write(&path, "[cluster\nprovider = 1").unwrap();

        let err = read_config(&path).unwrap_err().to_string();
        assert!(err.contains(".cm-e2e.toml"), "{}", err);
    }

    #[test]
    fn test_validate() {
        assert!(types::Config::default().validate().is_ok());

        let mut config = types::Config::default();
        config.exposer.interval_secs = 0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("exposer.interval_secs"), "{}", err);

        let mut config = types::Config::default();
        config.test.unused_metric = config.test.custom_metric.clone();
        assert!(config.validate().is_err());
    }
}
