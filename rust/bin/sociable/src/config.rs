//! Local files of the CLI.
//!
//! Everything lives under `~/.sociable/`:
//! - `config.toml`: [`ClientConfig`]
//! - `session.toml`: the stored access token
//! - `cookies.toml`: the mirrored `accessToken` cookie

use std::path::{Path, PathBuf};

use sociable_client::ClientConfig;

#[derive(Debug, Clone)]
pub struct Paths {
    pub config: PathBuf,
    pub session: PathBuf,
    pub cookies: PathBuf,
}

impl Paths {
    /// Files next to `config`, or under `~/.sociable` by default.
    pub fn new(config: Option<PathBuf>) -> Self {
        let config = config.unwrap_or_else(|| dirs_path().join("config.toml"));
        let dir = config
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            session: dir.join("session.toml"),
            cookies: dir.join("cookies.toml"),
            config,
        }
    }

    /// Load the client config, then apply `--api-url` over the file and
    /// environment.
    pub fn load_config(&self, api_url: Option<String>) -> anyhow::Result<ClientConfig> {
        let config = ClientConfig::load(&self.config)?;
        Ok(config.with_api_url_override(api_url))
    }
}

/// `~/.sociable`.
fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".sociable")
}
