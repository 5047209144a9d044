use std::fs;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::domain::OEIS_URL;
use crate::error::OeisError;

pub const DEFAULT_CONFIG_FILE: &str = "oeis-tools.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ClientConfig, OeisError> {
        let config_path = match path {
            Some(path) => Utf8PathBuf::from(path),
            None => Utf8PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            tracing::debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
            return Ok(ClientConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| OeisError::ConfigRead(config_path.clone().into_std_path_buf()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<ClientConfig, OeisError> {
        let config: ClientConfig =
            serde_json::from_str(content).map_err(|err| OeisError::ConfigParse(err.to_string()))?;
        if config.base_url.trim().is_empty() {
            return Err(OeisError::ConfigParse("base_url must not be empty".to_string()));
        }
        Ok(config)
    }
}

fn default_base_url() -> String {
    OEIS_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    format!("oeis-tools/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_partial_config_fills_defaults() {
        let config = ConfigLoader::parse(r#"{"timeout_secs": 3}"#).unwrap();
        assert_eq!(config.base_url, OEIS_URL);
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert!(config.user_agent.starts_with("oeis-tools/"));
    }
}
