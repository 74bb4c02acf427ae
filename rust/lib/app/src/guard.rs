//! Cookie-based route guard.
//!
//! Runs before any view renders and sees only the request path and the
//! `accessToken` cookie, never the client's stored token.
//!
//! - protected path, no cookie → login (the feed root is let through, see
//!   [`GuardPolicy::strict_feed_root`])
//! - login/register with a cookie → feed
//! - anything else passes

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use sociable_client::token::COOKIE_NAME;

use crate::state::AppRoute;

const PUBLIC_ONLY: [&str; 2] = [AppRoute::LOGIN, AppRoute::REGISTER];
const PROTECTED: [&str; 2] = [AppRoute::FEED, AppRoute::PROFILE];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuardPolicy {
    /// Also redirect the bare feed root when the cookie is missing.
    ///
    /// Off by default: the cookie can trail the stored token by one render,
    /// and the client bootstrap on the feed makes the real decision.
    pub strict_feed_root: bool,
}

impl GuardPolicy {
    pub fn strict() -> Self {
        Self {
            strict_feed_root: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(&'static str),
}

/// True if `path` is `prefix` or lies below it.
fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

pub fn evaluate(path: &str, has_cookie: bool, policy: &GuardPolicy) -> GuardDecision {
    let protected = PROTECTED.iter().any(|p| under(path, p));
    let feed_root = path == AppRoute::FEED;

    if protected && !has_cookie {
        if feed_root && !policy.strict_feed_root {
            return GuardDecision::Allow;
        }
        return GuardDecision::Redirect(AppRoute::LOGIN);
    }
    if has_cookie && PUBLIC_ONLY.iter().any(|p| *p == path) {
        return GuardDecision::Redirect(AppRoute::FEED);
    }
    GuardDecision::Allow
}

/// Value of cookie `name` across all `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

/// Axum middleware applying [`evaluate`] with a 307 redirect.
pub async fn route_guard(
    State(policy): State<Arc<GuardPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let has_cookie = cookie_value(request.headers(), COOKIE_NAME).is_some_and(|v| !v.is_empty());
    let path = request.uri().path().to_string();
    match evaluate(&path, has_cookie, &policy) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Redirect(to) => {
            tracing::debug!(path = %path, to, "route guard redirect");
            Redirect::temporary(to).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    const LAX: GuardPolicy = GuardPolicy {
        strict_feed_root: false,
    };

    // ====================================================================
    // Pure decision
    // ====================================================================

    #[test]
    fn protected_without_cookie_goes_to_login() {
        assert_eq!(
            evaluate("/profile", false, &LAX),
            GuardDecision::Redirect("/auth/login")
        );
        assert_eq!(
            evaluate("/feed/post/1", false, &LAX),
            GuardDecision::Redirect("/auth/login")
        );
    }

    #[test]
    fn feed_root_passes_without_cookie() {
        assert_eq!(evaluate("/feed", false, &LAX), GuardDecision::Allow);
        assert_eq!(
            evaluate("/feed", false, &GuardPolicy::strict()),
            GuardDecision::Redirect("/auth/login")
        );
    }

    #[test]
    fn public_only_with_cookie_goes_to_feed() {
        assert_eq!(
            evaluate("/auth/login", true, &LAX),
            GuardDecision::Redirect("/feed")
        );
        assert_eq!(
            evaluate("/auth/register", true, &LAX),
            GuardDecision::Redirect("/feed")
        );
        assert_eq!(evaluate("/auth/login/help", true, &LAX), GuardDecision::Allow);
    }

    #[test]
    fn everything_else_passes() {
        assert_eq!(evaluate("/auth/login", false, &LAX), GuardDecision::Allow);
        assert_eq!(evaluate("/profile", true, &LAX), GuardDecision::Allow);
        assert_eq!(evaluate("/feedback", false, &LAX), GuardDecision::Allow);
        assert_eq!(evaluate("/", false, &LAX), GuardDecision::Allow);
    }

    #[test]
    fn cookie_parsing() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, "theme=dark; accessToken=abc".parse().unwrap());
        assert_eq!(cookie_value(&headers, "accessToken"), Some("abc"));
        assert_eq!(cookie_value(&headers, "missing"), None);

        let mut split = HeaderMap::new();
        split.append(COOKIE, "a=1".parse().unwrap());
        split.append(COOKIE, "accessToken=xyz".parse().unwrap());
        assert_eq!(cookie_value(&split, "accessToken"), Some("xyz"));
    }

    // ====================================================================
    // Middleware
    // ====================================================================

    fn app(policy: GuardPolicy) -> Router {
        Router::new()
            .route("/feed", get(|| async { "feed" }))
            .route("/profile", get(|| async { "profile" }))
            .route("/auth/login", get(|| async { "login" }))
            .layer(axum::middleware::from_fn_with_state(
                Arc::new(policy),
                route_guard,
            ))
    }

    fn request(path: &str, cookie: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn redirects_with_307() {
        let resp = app(LAX)
            .oneshot(request("/profile", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(resp.headers()[header::LOCATION], "/auth/login");
    }

    #[tokio::test]
    async fn empty_cookie_counts_as_missing() {
        let resp = app(LAX)
            .oneshot(request("/profile", Some("accessToken=")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    #[tokio::test]
    async fn signed_in_user_skips_login_page() {
        let resp = app(LAX)
            .oneshot(request("/auth/login", Some("accessToken=tok")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(resp.headers()[header::LOCATION], "/feed");
    }

    #[tokio::test]
    async fn allowed_requests_reach_the_route() {
        let resp = app(LAX).oneshot(request("/feed", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app(LAX)
            .oneshot(request("/profile", Some("accessToken=tok")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
