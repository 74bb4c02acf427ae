//! Command implementations.
//!
//! Every command builds a [`Session`]: one Flux with the app handlers
//! registered, backed by the token and cookie files under `~/.sociable`.

pub mod auth;
pub mod guard;
pub mod posts;
pub mod print;

use std::sync::Arc;

use anyhow::{bail, Result};
use sociable_app::request::Request;
use sociable_app::state::{Notice, NoticeLevel};
use sociable_app::{dispatch, register_handlers, AppContext};
use sociable_client::{ApiClient, ClientConfig, FileCookieJar, FileTokenStorage, TokenBridge};
use sociable_flux::Flux;

use crate::config::Paths;

pub struct Session {
    pub flux: Flux,
    pub ctx: Arc<AppContext>,
}

impl Session {
    pub fn open(paths: &Paths, config: ClientConfig) -> Result<Self> {
        let bridge = Arc::new(TokenBridge::new(
            Arc::new(FileTokenStorage::new(&paths.session)),
            Arc::new(FileCookieJar::new(&paths.cookies)),
        ));
        let api = Arc::new(ApiClient::new(&config, Arc::clone(&bridge))?);
        let ctx = Arc::new(AppContext::new(api, bridge, &config));
        let flux = Flux::new();
        register_handlers(&flux, Arc::clone(&ctx));
        tracing::debug!(api = %config.base_url(), "session opened");
        Ok(Self { flux, ctx })
    }

    /// Dispatch `req`; an error notice it leaves behind becomes `Err`.
    /// Returns a success notice, if any.
    pub async fn run<R: Request>(&self, req: R) -> Result<Option<String>> {
        self.flux.store().remove(Notice::PATH);
        dispatch(&self.flux, req).await;
        match self.flux.get_as::<Notice>(Notice::PATH) {
            Some(Notice {
                level: NoticeLevel::Error,
                message,
            }) => bail!(message),
            Some(Notice { message, .. }) => Ok(Some(message)),
            None => Ok(None),
        }
    }

    pub fn get<T: Clone + 'static>(&self, path: &str) -> Option<T> {
        self.flux.get_as::<T>(path)
    }
}
