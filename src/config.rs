//! Process configuration, read from the environment.

use crate::FirebaseApp;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const PROJECT_ENV: &str = "GOOGLE_CLOUD_PROJECT";
pub const PORT_ENV: &str = "PORT";

pub const DEFAULT_CREDENTIALS_PATH: &str = "serviceAccountKey.json";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read service account key {}: {source}", path.display())]
    Credentials {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no project id: set GOOGLE_CLOUD_PROJECT or use a key that carries project_id")]
    MissingProjectId,
    #[error("invalid PORT value {0:?}")]
    InvalidPort(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeConfig {
    pub credentials_path: PathBuf,
    pub project_id: Option<String>,
    pub port: u16,
}

impl PurgeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let credentials_path = non_empty(CREDENTIALS_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH));

        let port = match non_empty(PORT_ENV) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            credentials_path,
            project_id: non_empty(PROJECT_ENV),
            port,
        })
    }

    /// Reads the service account key and builds the process-wide [`FirebaseApp`].
    pub async fn load_app(&self) -> Result<FirebaseApp, ConfigError> {
        let key = yup_oauth2::read_service_account_key(&self.credentials_path)
            .await
            .map_err(|source| ConfigError::Credentials {
                path: self.credentials_path.clone(),
                source,
            })?;

        let project_id = self
            .project_id
            .clone()
            .or_else(|| key.project_id.clone())
            .ok_or(ConfigError::MissingProjectId)?;

        info!(project = %project_id, key = %self.credentials_path.display(), "loaded credentials");
        Ok(FirebaseApp::new(key, project_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PurgeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.credentials_path, PathBuf::from(DEFAULT_CREDENTIALS_PATH));
        assert_eq!(config.project_id, None);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_overrides() {
        let config = PurgeConfig::from_lookup(lookup(&[
            (CREDENTIALS_ENV, "/secrets/key.json"),
            (PROJECT_ENV, "shop-prod"),
            (PORT_ENV, "9090"),
        ]))
        .unwrap();
        assert_eq!(config.credentials_path, PathBuf::from("/secrets/key.json"));
        assert_eq!(config.project_id.as_deref(), Some("shop-prod"));
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config = PurgeConfig::from_lookup(lookup(&[(CREDENTIALS_ENV, " "), (PROJECT_ENV, "")]))
            .unwrap();
        assert_eq!(config.credentials_path, PathBuf::from(DEFAULT_CREDENTIALS_PATH));
        assert_eq!(config.project_id, None);
    }

    #[test]
    fn test_invalid_port() {
        let err = PurgeConfig::from_lookup(lookup(&[(PORT_ENV, "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(v) if v == "http"));
    }

    #[tokio::test]
    async fn test_missing_key_file() {
        let config = PurgeConfig {
            credentials_path: PathBuf::from("/nonexistent/serviceAccountKey.json"),
            project_id: None,
            port: DEFAULT_PORT,
        };
        let err = config.load_app().await.err().unwrap();
        assert!(matches!(err, ConfigError::Credentials { .. }));
    }
}
