//! Session handlers: sign-in, sign-out, profile, surface bootstrap.

use sociable_client::{ApiError, AuthResponse, LoginRequest, RegisterRequest};
use sociable_flux::StateStore;
use tracing::{debug, info, warn};

use super::{current_user, feed, navigate, notify_error, notify_success};
use crate::context::AppContext;
use crate::request::*;
use crate::state::*;
use crate::validate::{self, ProfileForm};

/// Handle `session/login`.
pub async fn handle_login(req: &LoginReq, store: &StateStore, ctx: &AppContext) {
    if let Err(e) = validate::login(&req.email, &req.password) {
        notify_error(store, e.to_string());
        return;
    }
    let body = LoginRequest::new(req.email.as_str(), req.password.as_str());
    match ctx.api.login(&body).await {
        Ok(auth) => establish(store, ctx, auth),
        Err(e) => {
            warn!(error = %e, "login failed");
            notify_error(store, e.to_string());
        }
    }
}

/// Handle `session/register`.
pub async fn handle_register(req: &RegisterReq, store: &StateStore, ctx: &AppContext) {
    if let Err(e) = validate::register(&req.first_name, &req.last_name, &req.email, &req.password)
    {
        notify_error(store, e.to_string());
        return;
    }
    let body = RegisterRequest {
        first_name: req.first_name.clone(),
        last_name: req.last_name.clone(),
        email: req.email.clone(),
        password: req.password.clone(),
    };
    match ctx.api.register(&body).await {
        Ok(auth) => establish(store, ctx, auth),
        Err(e) => {
            warn!(error = %e, "registration failed");
            notify_error(store, e.to_string());
        }
    }
}

/// Persist the new token, then mark the session signed in.
fn establish(store: &StateStore, ctx: &AppContext, auth: AuthResponse) {
    ctx.session().advance();
    if let Err(e) = ctx.bridge.set_token(Some(auth.access_token.as_str())) {
        warn!(error = %e, "could not persist access token");
        notify_error(store, ApiError::from(e).to_string());
        return;
    }
    info!(user = %auth.user.id, "signed in");
    store.update(SessionState::PATH, |s: &mut SessionState| s.set_user(auth.user));
    navigate(store, AppRoute::FEED);
}

/// Handle `session/logout`.
///
/// The server call may fail; the local session is cleared either way.
pub async fn handle_logout(store: &StateStore, ctx: &AppContext) {
    ctx.session().advance();
    if let Err(e) = ctx.api.logout().await {
        warn!(error = %e, "logout request failed, clearing local session anyway");
    }
    // A bootstrap that started while the request was out must not win.
    ctx.session().advance();

    if let Err(e) = ctx.bridge.set_token(None) {
        warn!(error = %e, "could not clear access token");
    }
    store.update(SessionState::PATH, SessionState::clear);
    feed::handle_reset(store, ctx);
    for (path, _) in store.scan(CommentThread::PREFIX) {
        store.remove(&path);
    }
    info!("signed out");
    navigate(store, AppRoute::LOGIN);
    notify_success(store, "Logged out successfully");
}

/// Handle `session/profile`.
pub async fn handle_update_profile(req: &UpdateProfileReq, store: &StateStore, ctx: &AppContext) {
    let current = current_user(store);
    let form = ProfileForm {
        first_name: &req.first_name,
        last_name: &req.last_name,
        email: &req.email,
        password: &req.password,
        avatar: req.avatar.as_ref(),
    };
    let update = match validate::profile_update(&form, current.as_ref()) {
        Ok(update) => update,
        Err(e) => {
            notify_error(store, e.to_string());
            return;
        }
    };
    match ctx.api.update_profile(&update).await {
        Ok(user) => {
            info!(user = %user.id, "profile updated");
            store.update(SessionState::PATH, |s: &mut SessionState| s.set_user(user));
            notify_success(store, "Profile updated successfully!");
        }
        Err(e) => {
            warn!(error = %e, "profile update failed");
            notify_error(store, e.to_string());
        }
    }
}

/// Handle `app/mount`: the "who am I" bootstrap.
///
/// Runs once per mount of a surface. Without a stored token the session is
/// cleared with no network call. Otherwise the current user is fetched; a
/// result arriving after a login or logout is discarded.
pub async fn handle_mount(req: &MountSurfaceReq, store: &StateStore, ctx: &AppContext) {
    let fresh = store.update(MountedSurfaces::PATH, |m: &mut MountedSurfaces| {
        m.0.insert(req.surface)
    });
    if !fresh {
        debug!(surface = ?req.surface, "surface already mounted");
        return;
    }

    let token = ctx.bridge.get_token().unwrap_or_else(|e| {
        warn!(error = %e, "could not read stored token");
        None
    });
    if token.is_none() {
        debug!(surface = ?req.surface, "no stored token");
        store.update(SessionState::PATH, SessionState::clear);
        navigate(store, AppRoute::LOGIN);
        return;
    }
    if req.surface == Surface::Feed {
        if let Err(e) = ctx.bridge.resync_cookie() {
            warn!(error = %e, "could not mirror token into cookie");
        }
    }

    let generation = ctx.session().current();
    let result = ctx.api.me().await;
    if !ctx.session().is_current(generation) {
        info!("session changed during bootstrap, dropping result");
        return;
    }
    match result {
        Ok(user) => {
            debug!(user = %user.id, "bootstrap resolved");
            store.update(SessionState::PATH, |s: &mut SessionState| s.set_user(user));
        }
        Err(e) => {
            warn!(error = %e, "bootstrap failed, clearing session");
            if let Err(e) = ctx.bridge.set_token(None) {
                warn!(error = %e, "could not clear access token");
            }
            store.update(SessionState::PATH, SessionState::clear);
            navigate(store, AppRoute::LOGIN);
        }
    }
}

/// Handle `app/unmount`. Leaving the feed resets it.
pub fn handle_unmount(req: &UnmountSurfaceReq, store: &StateStore, ctx: &AppContext) {
    store.update(MountedSurfaces::PATH, |m: &mut MountedSurfaces| {
        m.0.remove(&req.surface)
    });
    if req.surface == Surface::Feed {
        feed::handle_reset(store, ctx);
    }
}
