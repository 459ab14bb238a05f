//! Core connection configuration
//!
//! Read from TOML. Lookup order: explicit path, then
//! `<config dir>/intentlink/config.toml` when it exists, then built-in
//! defaults. `INTENTLINK_CORE_URL` overrides the endpoint in every case.

use crate::util::errors::{IntentLinkError, IntentLinkResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CORE_URL: &str = "ws://localhost:8765";
pub const CORE_URL_ENV: &str = "INTENTLINK_CORE_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// WebSocket endpoint of the core.
    pub core_url: String,
    pub connect_timeout_secs: u64,
    /// Upper bound for one outbound call, e.g. `registerApp`.
    pub request_timeout_secs: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            core_url: DEFAULT_CORE_URL.to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 180,
        }
    }
}

impl CoreConfig {
    pub fn load(explicit_path: Option<&Path>) -> IntentLinkResult<Self> {
        let mut config = match explicit_path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> IntentLinkResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            IntentLinkError::config(format!(
                "Failed to read config file: path={}, error={}",
                path.display(),
                e
            ))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            IntentLinkError::config(format!(
                "Invalid config file: path={}, error={}",
                path.display(),
                e
            ))
        })?;
        debug!("Loaded config: path={}", path.display());
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(CORE_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                self.core_url = url.to_string();
            }
        }
    }

    pub fn validate(&self) -> IntentLinkResult<()> {
        let url = self.core_url.trim();
        if url.is_empty() {
            return Err(IntentLinkError::config("core_url is empty"));
        }
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(IntentLinkError::config(format!(
                "core_url must be a ws:// or wss:// URL: {}",
                url
            )));
        }
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(IntentLinkError::config("timeouts must be greater than zero"));
        }
        Ok(())
    }

    pub fn with_core_url(mut self, core_url: impl Into<String>) -> Self {
        self.core_url = core_url.into();
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("intentlink").join("config.toml"))
}
