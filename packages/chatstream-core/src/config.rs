//! Client configuration loaded from TOML.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV: &str = "CHATSTREAM_CONFIG";

/// Chat backend location and client defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the chat backend
    pub server_url: String,
    /// Path of the history/submit endpoint
    pub chat_path: String,
    /// Where to send the user when no session identity is present
    pub session_start_path: String,
    /// Fallback log filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".to_string(),
            chat_path: "/chat/".to_string(),
            session_start_path: "/".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load from the default path. A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Get the default config file path.
    ///
    /// `$CHATSTREAM_CONFIG` wins, otherwise `config.toml` in the platform
    /// config directory.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        directories::ProjectDirs::from("", "", "chatstream")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("chatstream.toml"))
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "server_url must be an http(s) URL, got {:?}",
                self.server_url
            )));
        }
        if !self.chat_path.starts_with('/') {
            return Err(Error::Config(format!(
                "chat_path must start with '/', got {:?}",
                self.chat_path
            )));
        }
        Ok(())
    }

    /// Full URL of the chat endpoint.
    pub fn chat_url(&self) -> String {
        format!("{}{}", self.server_url.trim_end_matches('/'), self.chat_path)
    }

    /// Full URL of the session-start page.
    pub fn session_start_url(&self) -> String {
        format!(
            "{}{}",
            self.server_url.trim_end_matches('/'),
            self.session_start_path
        )
    }
}
