//! Handler implementations and Flux wiring.
//!
//! Every request type gets one handler of the form
//! `handle_x(req, &store, &ctx)`. `register_handlers` downcasts the payload
//! for each request path and calls it.

pub mod comment;
pub mod feed;
pub mod post;
pub mod reaction;
pub mod session;

use std::future::Future;
use std::sync::Arc;

use sociable_client::User;
use sociable_flux::{Flux, StateStore};

use crate::context::AppContext;
use crate::request::*;
use crate::state::{AppRoute, Notice, SessionState};

/// Send `req` to its handler and wait for it to finish.
pub async fn dispatch<R: Request>(flux: &Flux, req: R) {
    flux.emit(R::PATH, req).await;
}

/// Register all handlers with a Flux instance.
pub fn register_handlers(flux: &Flux, ctx: Arc<AppContext>) {
    // session
    route(flux, &ctx, |req: LoginReq, store, ctx| async move {
        session::handle_login(&req, &store, &ctx).await;
    });
    route(flux, &ctx, |req: RegisterReq, store, ctx| async move {
        session::handle_register(&req, &store, &ctx).await;
    });
    route(flux, &ctx, |_: LogoutReq, store, ctx| async move {
        session::handle_logout(&store, &ctx).await;
    });
    route(flux, &ctx, |req: UpdateProfileReq, store, ctx| async move {
        session::handle_update_profile(&req, &store, &ctx).await;
    });
    route(flux, &ctx, |req: MountSurfaceReq, store, ctx| async move {
        session::handle_mount(&req, &store, &ctx).await;
    });
    route(flux, &ctx, |req: UnmountSurfaceReq, store, ctx| async move {
        session::handle_unmount(&req, &store, &ctx);
    });

    // feed
    route(flux, &ctx, |_: LoadFeedReq, store, ctx| async move {
        feed::handle_load(&store, &ctx).await;
    });
    route(flux, &ctx, |req: LoadMoreReq, store, ctx| async move {
        feed::handle_load_more(&req, &store, &ctx).await;
    });
    route(flux, &ctx, |_: ResetFeedReq, store, ctx| async move {
        feed::handle_reset(&store, &ctx);
    });

    // posts
    route(flux, &ctx, |req: CreatePostReq, store, ctx| async move {
        post::handle_create(&req, &store, &ctx).await;
    });
    route(flux, &ctx, |req: EditPostReq, store, ctx| async move {
        post::handle_edit(&req, &store, &ctx).await;
    });
    route(flux, &ctx, |req: DeletePostReq, store, ctx| async move {
        post::handle_delete(&req, &store, &ctx).await;
    });
    route(flux, &ctx, |req: RefreshPostReq, store, ctx| async move {
        post::handle_refresh(&req, &store, &ctx).await;
    });

    // reactions
    route(flux, &ctx, |req: ReactReq, store, ctx| async move {
        reaction::handle_react(&req, &store, &ctx).await;
    });

    // comments
    route(flux, &ctx, |req: LoadCommentsReq, store, ctx| async move {
        comment::handle_load(&req, &store, &ctx).await;
    });
    route(flux, &ctx, |req: LoadMoreCommentsReq, store, ctx| async move {
        comment::handle_load_more(&req, &store, &ctx).await;
    });
    route(flux, &ctx, |req: LoadRepliesReq, store, ctx| async move {
        comment::handle_load_replies(&req, &store, &ctx).await;
    });
    route(flux, &ctx, |req: SetCommentDraftReq, store, _| async move {
        comment::handle_set_draft(&req, &store);
    });
    route(flux, &ctx, |req: SetReplyDraftReq, store, _| async move {
        comment::handle_set_reply_draft(&req, &store);
    });
    route(flux, &ctx, |req: PostCommentReq, store, ctx| async move {
        comment::handle_post_comment(&req, &store, &ctx).await;
    });
    route(flux, &ctx, |req: PostReplyReq, store, ctx| async move {
        comment::handle_post_reply(&req, &store, &ctx).await;
    });
}

/// Wire `handler` to `R::PATH`, downcasting the payload to `R`.
fn route<R, F, Fut>(flux: &Flux, ctx: &Arc<AppContext>, handler: F)
where
    R: Request,
    F: Fn(R, Arc<StateStore>, Arc<AppContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let ctx = Arc::clone(ctx);
    flux.on(R::PATH, move |path, payload, store| {
        let run = payload
            .downcast_ref::<R>()
            .cloned()
            .map(|req| handler(req, store, Arc::clone(&ctx)));
        async move {
            match run {
                Some(run) => run.await,
                None => tracing::warn!(path = %path, "payload type does not match request path"),
            }
        }
    });
}

// ── Shared helpers ──────────────────────────────────────────────────

/// An in-flight flag or key taken before an `.await`.
///
/// Dropping it runs `release`, so the claim is given back even when the
/// handler future is dropped mid-request. Call [`Claim::settle`] once the
/// result write has cleared the flag itself.
pub(crate) struct Claim<F: FnOnce()> {
    release: Option<F>,
}

impl<F: FnOnce()> Claim<F> {
    pub(crate) fn new(release: F) -> Self {
        Self {
            release: Some(release),
        }
    }

    pub(crate) fn settle(mut self) {
        self.release = None;
    }
}

impl<F: FnOnce()> Drop for Claim<F> {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

pub(crate) fn current_user(store: &StateStore) -> Option<User> {
    store
        .get_as::<SessionState>(SessionState::PATH)
        .and_then(|s| s.user)
}

pub(crate) fn navigate(store: &StateStore, path: &str) {
    store.set(AppRoute::PATH, AppRoute::to(path));
}

pub(crate) fn notify_error(store: &StateStore, message: impl Into<String>) {
    store.set(Notice::PATH, Notice::error(message));
}

pub(crate) fn notify_success(store: &StateStore, message: impl Into<String>) {
    store.set(Notice::PATH, Notice::success(message));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FeedWindow;
    use crate::testing::{harness, page, FakeApi};

    #[tokio::test]
    async fn every_request_has_a_handler() {
        let (flux, _) = harness(FakeApi::new());
        for path in [
            LoginReq::PATH,
            RegisterReq::PATH,
            LogoutReq::PATH,
            UpdateProfileReq::PATH,
            MountSurfaceReq::PATH,
            UnmountSurfaceReq::PATH,
            LoadFeedReq::PATH,
            LoadMoreReq::PATH,
            ResetFeedReq::PATH,
            CreatePostReq::PATH,
            EditPostReq::PATH,
            DeletePostReq::PATH,
            RefreshPostReq::PATH,
            ReactReq::PATH,
            LoadCommentsReq::PATH,
            LoadMoreCommentsReq::PATH,
            LoadRepliesReq::PATH,
            SetCommentDraftReq::PATH,
            SetReplyDraftReq::PATH,
            PostCommentReq::PATH,
            PostReplyReq::PATH,
        ] {
            assert!(flux.has_handler(path), "{path} unhandled");
        }
    }

    #[tokio::test]
    async fn mismatched_payload_is_dropped() {
        let api = FakeApi::new();
        api.feed.ok(page(&["a"], None, false));
        let (flux, _) = harness(api.clone());

        flux.emit(LoadFeedReq::PATH, "not a request").await;

        assert_eq!(api.feed.calls(), 0);
        assert!(flux.get_as::<FeedWindow>(FeedWindow::PATH).is_none());
    }
}
