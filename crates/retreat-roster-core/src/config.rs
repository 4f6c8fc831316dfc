//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the endpoint URL, the remembered submitter email and the
//! request timeout.
//!
//! Configuration is stored at `~/.config/retreat-roster/config.json`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_REQUEST_TIMEOUT_SECS;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "retreat-roster";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides the configured endpoint
pub const ENDPOINT_ENV_VAR: &str = "RETREAT_ROSTER_ENDPOINT";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub endpoint_url: Option<String>,
    pub remembered_email: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Endpoint URL: environment first, then the config file
    pub fn endpoint(&self) -> Result<String> {
        std::env::var(ENDPOINT_ENV_VAR)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.endpoint_url.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No endpoint configured. Set {} or endpoint_url in the config file",
                    ENDPOINT_ENV_VAR
                )
            })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn remember_email(&mut self, email: &str) {
        self.remembered_email = Some(email.to_string());
    }

    pub fn forget_email(&mut self) {
        self.remembered_email = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("retreat-roster-test-{}-{}", std::process::id(), name))
            .join(CONFIG_FILE)
    }

    #[test]
    fn test_missing_file_loads_default() {
        let config = Config::load_from(&temp_path("missing")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load_round_trip_remembered_email() {
        let path = temp_path("roundtrip");
        let mut config = Config {
            endpoint_url: Some("https://example.com/exec".to_string()),
            ..Default::default()
        };
        config.remember_email("amy@example.org");
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.remembered_email.as_deref(), Some("amy@example.org"));

        let mut loaded = loaded;
        loaded.forget_email();
        loaded.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().remembered_email, None);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_request_timeout_default() {
        assert_eq!(Config::default().request_timeout(), Duration::from_secs(30));
        let config = Config {
            request_timeout_secs: Some(5),
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }
}
