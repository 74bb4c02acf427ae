//! Sociable HTTP client.
//!
//! Everything that talks to the REST API or touches the persisted auth
//! token lives here:
//!
//! - [`HttpClient`] wraps `reqwest`: bearer injection, per-request options,
//!   upload timeouts, and classification of every failure into [`ApiError`].
//! - [`TokenBridge`] keeps the stored token and the `accessToken` cookie in
//!   agreement. Nothing else in the workspace writes either copy.
//! - [`SocialApi`] is the endpoint surface; [`ApiClient`] implements it over
//!   HTTP, tests implement it in memory.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use sociable_client::{ApiClient, ClientConfig, SocialApi, TokenBridge};
//!
//! let bridge = Arc::new(TokenBridge::in_memory());
//! let api = ApiClient::new(&ClientConfig::default(), bridge.clone())?;
//! let auth = api.login(&LoginRequest::new("ada@example.com", "secret1")).await?;
//! bridge.set_token(Some(&auth.access_token))?;
//! let page = api.feed(None, 10).await?;
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod token;

pub use api::{ApiClient, SocialApi};
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ErrorKind};
pub use http::{Body, HttpClient, RequestOptions};
pub use model::*;
pub use token::{
    AuthCookie, CookieJar, FileCookieJar, FileTokenStorage, MemoryCookieJar, MemoryTokenStorage,
    SameSite, TokenBridge, TokenError, TokenStorage,
};
