//! Client configuration.
//!
//! Read from a TOML file (the CLI keeps it at `~/.sociable/config.toml`);
//! missing keys take their defaults and `SOCIABLE_API_URL` overrides the
//! base URL.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable that overrides [`ClientConfig::api_url`].
pub const API_URL_ENV: &str = "SOCIABLE_API_URL";

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config encode: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Connection and paging settings shared by the client and the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to.
    pub api_url: String,

    /// Timeout for plain JSON requests.
    pub timeout_secs: u64,

    /// Timeout for multipart uploads.
    pub upload_timeout_secs: u64,

    /// Posts requested per feed page.
    pub feed_page_size: u32,

    /// Comments requested per thread page.
    pub comment_page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
            upload_timeout_secs: 120,
            feed_page_size: 10,
            comment_page_size: 10,
        }
    }
}

impl ClientConfig {
    /// Load from `path`, falling back to defaults when the file is absent,
    /// then apply the environment override.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        Ok(config.with_api_url_override(std::env::var(API_URL_ENV).ok()))
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Replace the base URL when `url` is set and non-blank.
    pub fn with_api_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            self.api_url = url.to_string();
        }
        self
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}
