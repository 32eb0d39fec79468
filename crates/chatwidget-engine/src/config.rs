//! Configuration for the chat widget.
//!
//! Every field has a default, so a partial (or empty) JSON object is a valid
//! config file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding [`Config::base_url`].
pub const BASE_URL_ENV: &str = "CHATWIDGET_BASE_URL";

/// Main configuration for the chat widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Scheme, host and port of the analytics site.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the chat endpoint.
    #[serde(default = "default_chat_path")]
    pub chat_path: String,

    /// Delay between showing the panel and activating it, in milliseconds.
    #[serde(default = "default_open_delay_ms")]
    pub open_delay_ms: u64,

    /// Value for the `Cookie` header (the endpoint requires a login session).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,

    /// Color theme for the terminal UI.
    #[serde(default)]
    pub theme: ThemeName,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".into()
}

fn default_chat_path() -> String {
    "/chat-ia".into()
}

fn default_open_delay_ms() -> u64 {
    10
}

/// Color theme selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThemeName {
    /// Dark theme.
    #[default]
    Mocha,
    /// Light theme.
    Latte,
    /// High contrast theme for accessibility.
    HighContrast,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Load configuration from a file, falling back to defaults when it does
    /// not exist, then apply environment overrides.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    fn load_with_env(
        path: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            Self::default()
        };
        if let Some(base_url) = env(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Full URL of the chat endpoint.
    pub fn chat_url(&self) -> String {
        self.url_for(&self.chat_path)
    }

    /// Join a site path onto the base URL.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    /// Panel activation delay.
    pub fn open_delay(&self) -> Duration {
        Duration::from_millis(self.open_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            chat_path: default_chat_path(),
            open_delay_ms: default_open_delay_ms(),
            session_cookie: None,
            theme: ThemeName::default(),
        }
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}
