//! Access-token sources for the monitoring client.

use tokio::process::Command;

use super::error::{MonitoringError, Result};
use crate::metadata::MetadataClient;

const GCLOUD_ARGS: &[&str] = &["auth", "application-default", "print-access-token"];

#[derive(Debug, Clone)]
pub enum TokenSource {
    /// Default service account of the instance the process runs on
    Metadata(MetadataClient),
    /// Pre-issued token
    Static(String),
    /// Application default credentials via the gcloud CLI
    Gcloud,
}

impl TokenSource {
    /// Static token when one is configured, application default credentials otherwise.
    pub fn detect(configured: Option<&str>) -> Self {
        match configured.filter(|t| !t.is_empty()) {
            Some(token) => Self::Static(token.to_string()),
            None => Self::Gcloud,
        }
    }

    pub async fn token(&self) -> Result<String> {
        match self {
            Self::Metadata(client) => client
                .access_token()
                .await
                .map_err(|e| MonitoringError::Token(e.to_string())),
            Self::Static(token) => Ok(token.clone()),
            Self::Gcloud => gcloud_token().await,
        }
    }
}

async fn gcloud_token() -> Result<String> {
    let output = Command::new("gcloud")
        .args(GCLOUD_ARGS)
        .output()
        .await
        .map_err(|e| MonitoringError::Token(format!("failed to run gcloud: {}", e)))?;

    if !output.status.success() {
        return Err(MonitoringError::Token(format!(
            "gcloud exited with {}: {} (run `gcloud auth application-default login`)",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(MonitoringError::Token("gcloud returned an empty token".to_string()));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert!(matches!(TokenSource::detect(Some("abc")), TokenSource::Static(t) if t == "abc"));
        assert!(matches!(TokenSource::detect(Some("")), TokenSource::Gcloud));
        assert!(matches!(TokenSource::detect(None), TokenSource::Gcloud));
    }

    #[tokio::test]
    async fn test_static_token() {
        let source = TokenSource::Static("ya29.static".to_string());
        assert_eq!(source.token().await.unwrap(), "ya29.static");
    }
}
