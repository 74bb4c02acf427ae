use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::Form;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::token::TokenBridge;

/// Request payload.
pub enum Body {
    Empty,
    Json(serde_json::Value),
    /// Sent with the upload timeout; any caller `Content-Type` is dropped
    /// so the transport writes its own boundary.
    Multipart(Form),
}

/// Per-request knobs.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Do not attach the bearer token.
    pub skip_auth: bool,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn anonymous() -> Self {
        Self {
            skip_auth: true,
            ..Self::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }
}

/// Shared HTTP adapter.
///
/// One `reqwest::Client` with a cookie store (credentials are always
/// included) and the JSON timeout. The bearer token is read from the
/// [`TokenBridge`] on every request; a 401 clears it through the same
/// bridge before the error reaches the caller.
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    upload_timeout: Duration,
    bridge: Arc<TokenBridge>,
}

impl HttpClient {
    pub fn new(config: &ClientConfig, bridge: Arc<TokenBridge>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Network(format!("client setup: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            upload_timeout: config.upload_timeout(),
            bridge,
        })
    }

    pub fn bridge(&self) -> &Arc<TokenBridge> {
        &self.bridge
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and return the successful response.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Body,
        opts: RequestOptions,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.url(path);
        let mut req = self.http.request(method.clone(), &url);
        if !opts.query.is_empty() {
            req = req.query(&opts.query);
        }

        let multipart = matches!(body, Body::Multipart(_));
        for (name, value) in &opts.headers {
            if multipart && name.eq_ignore_ascii_case("content-type") {
                continue;
            }
            req = req.header(name.as_str(), value.as_str());
        }

        if !opts.skip_auth {
            if let Some(token) = self.bridge.get_token()? {
                req = req.bearer_auth(token);
            }
        }

        req = match body {
            Body::Empty => req,
            Body::Json(value) => req.json(&value),
            Body::Multipart(form) => req.multipart(form).timeout(self.upload_timeout),
        };

        let resp = req.send().await.map_err(|e| {
            let err = ApiError::from_transport(&e);
            warn!(%method, %url, error = %e, "request failed before a response");
            err
        })?;

        let status = resp.status();
        if status.is_success() {
            debug!(%method, %url, status = status.as_u16(), "request ok");
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        let err = ApiError::from_response(status.as_u16(), &text);
        warn!(%method, %url, status = status.as_u16(), message = %err, "request rejected");
        if err.is_unauthorized() {
            if let Err(e) = self.bridge.set_token(None) {
                warn!(error = %e, "could not clear auth token after 401");
            } else {
                debug!("auth token invalidated after 401");
            }
        }
        Err(err)
    }

    /// Send and decode a JSON response body.
    pub async fn json<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Body,
        opts: RequestOptions,
    ) -> Result<R, ApiError> {
        let resp = self.send(method, path, body, opts).await?;
        let bytes = resp.bytes().await.map_err(|e| ApiError::from_transport(&e))?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(format!("response body: {e}")))
    }

    /// Send and discard the response body.
    pub async fn empty(
        &self,
        method: Method,
        path: &str,
        body: Body,
        opts: RequestOptions,
    ) -> Result<(), ApiError> {
        self.send(method, path, body, opts).await.map(|_| ())
    }
}
