//! Reaction handler: optimistic guess, server call, reconcile or roll back.

use sociable_client::{ApiError, Reactions};
use sociable_flux::StateStore;
use tracing::{debug, info, warn};

use super::{current_user, notify_error, Claim};
use crate::context::AppContext;
use crate::protocol::{PendingReaction, ReactionIntent, ReactionOutcome, ReactionTarget};
use crate::request::ReactReq;
use crate::state::{CommentThread, FeedWindow, PendingReactions};

/// Shown when the follow-up read of the breakdown fails.
pub const REFRESH_FAILED: &str = "Failed to update reaction. Please try again.";

/// Handle `reaction/set`.
///
/// 1. Claim the target; a target already in flight is ignored.
/// 2. Write the local guess.
/// 3. Send add, replace or remove.
/// 4. Read the authoritative breakdown and store it.
///
/// A failure in step 3 or 4 puts back the state from before step 2.
pub async fn handle_react(req: &ReactReq, store: &StateStore, ctx: &AppContext) -> ReactionOutcome {
    let key = req.target.key();
    let claimed = store.update(PendingReactions::PATH, |p: &mut PendingReactions| {
        p.claim(&key)
    });
    if !claimed {
        debug!(target = %key, "reaction already in flight");
        return ReactionOutcome::Ignored;
    }

    let _claim = Claim::new(|| {
        store.update(PendingReactions::PATH, |p: &mut PendingReactions| {
            p.release(&key)
        });
    });
    react(req, store, ctx).await
}

async fn react(req: &ReactReq, store: &StateStore, ctx: &AppContext) -> ReactionOutcome {
    let Some(current) = read(store, &req.target) else {
        debug!(target = %req.target.key(), "reaction target not loaded");
        return ReactionOutcome::Ignored;
    };
    let me = current_user(store).map(|u| u.id);
    let pending = PendingReaction::begin(req.target.clone(), &current, req.reaction, me.as_deref());
    write(store, &pending.target, pending.guess.clone());

    let outcome = match send(ctx, &pending).await {
        Err(e) => {
            warn!(target = %pending.target.key(), error = %e, "reaction request failed");
            pending.roll_back(e.to_string())
        }
        Ok(()) => {
            let target = &pending.target;
            match ctx.api.reactions(target.target_type(), target.target_id()).await {
                Ok(snapshot) => pending.apply(Reactions::from(snapshot)),
                Err(e) => {
                    warn!(target = %target.key(), error = %e, "reaction refresh failed");
                    pending.roll_back(REFRESH_FAILED)
                }
            }
        }
    };

    match &outcome {
        ReactionOutcome::Applied(reactions) => {
            info!(target = %req.target.key(), total = reactions.total, "reaction applied");
            write(store, &req.target, reactions.clone());
        }
        ReactionOutcome::RolledBack { restored, error } => {
            info!(target = %req.target.key(), "reaction rolled back");
            write(store, &req.target, restored.clone());
            notify_error(store, error.clone());
        }
        ReactionOutcome::Ignored => {}
    }
    outcome
}

async fn send(ctx: &AppContext, pending: &PendingReaction) -> Result<(), ApiError> {
    let body = pending.request();
    match pending.intent {
        ReactionIntent::Add(_) => ctx.api.add_reaction(&body).await,
        ReactionIntent::Replace(_) => ctx.api.replace_reaction(&body).await,
        ReactionIntent::Remove => ctx.api.remove_reaction(&body).await,
    }
}

fn read(store: &StateStore, target: &ReactionTarget) -> Option<Reactions> {
    match target {
        ReactionTarget::Post { post_id } => store
            .get_as::<FeedWindow>(FeedWindow::PATH)?
            .post(post_id)
            .map(|p| p.reactions.clone()),
        ReactionTarget::Comment {
            post_id,
            comment_id,
        } => store
            .get_as::<CommentThread>(&CommentThread::path(post_id))?
            .comment(comment_id)
            .map(|c| c.reactions.clone()),
    }
}

fn write(store: &StateStore, target: &ReactionTarget, reactions: Reactions) {
    match target {
        ReactionTarget::Post { post_id } => {
            store.update(FeedWindow::PATH, |w: &mut FeedWindow| {
                if let Some(post) = w.post_mut(post_id) {
                    post.reactions = reactions;
                }
            });
        }
        ReactionTarget::Comment {
            post_id,
            comment_id,
        } => {
            let path = CommentThread::path(post_id);
            if !store.contains(&path) {
                return;
            }
            store.update(&path, |t: &mut CommentThread| {
                if let Some(comment) = t.comment_mut(comment_id) {
                    comment.reactions = reactions;
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sociable_client::ReactionType::{Like, Love};
    use sociable_client::{CommentPage, ReactionType};
    use sociable_flux::Flux;

    use super::*;
    use crate::dispatch;
    use crate::request::{LoadCommentsReq, LoadFeedReq};
    use crate::state::Notice;
    use crate::testing::{abandon, comment, harness, page, server_error, snapshot, FakeApi};

    fn reactions_of(flux: &Flux, post_id: &str) -> Reactions {
        flux.get_as::<FeedWindow>(FeedWindow::PATH)
            .and_then(|w| w.post(post_id).map(|p| p.reactions.clone()))
            .unwrap()
    }

    async fn setup(api: &Arc<FakeApi>) -> (Flux, Arc<AppContext>) {
        api.feed.ok(page(&["p1", "p2"], None, false));
        let (flux, ctx) = harness(api.clone());
        dispatch(&flux, LoadFeedReq).await;
        (flux, ctx)
    }

    fn react_on(post_id: &str, reaction: ReactionType) -> ReactReq {
        ReactReq {
            target: ReactionTarget::post(post_id),
            reaction,
        }
    }

    // ====================================================================
    // Protocol walkthrough
    // ====================================================================

    #[tokio::test]
    async fn love_then_like_then_like() {
        let api = FakeApi::new();
        api.react.ok(()).ok(()).ok(());
        api.reactions
            .ok(snapshot(&[(Love, 1)], Some(Love)))
            .ok(snapshot(&[(Like, 1)], Some(Like)))
            .ok(snapshot(&[], None));
        let (flux, ctx) = setup(&api).await;

        let out = handle_react(&react_on("p1", Love), flux.store(), &ctx).await;
        assert!(matches!(out, ReactionOutcome::Applied(_)));
        let r = reactions_of(&flux, "p1");
        assert_eq!((r.total, r.mine), (1, Some(Love)));

        handle_react(&react_on("p1", Like), flux.store(), &ctx).await;
        let r = reactions_of(&flux, "p1");
        assert_eq!((r.total, r.mine), (1, Some(Like)));

        handle_react(&react_on("p1", Like), flux.store(), &ctx).await;
        let r = reactions_of(&flux, "p1");
        assert_eq!((r.total, r.mine), (0, None));

        let calls: Vec<_> = api
            .log()
            .into_iter()
            .filter(|c| c.starts_with("react:"))
            .collect();
        assert_eq!(
            calls,
            vec![
                "react:add:post:p1:love",
                "react:replace:post:p1:like",
                "react:remove:post:p1",
            ]
        );
    }

    #[tokio::test]
    async fn server_breakdown_overrides_guess() {
        let api = FakeApi::new();
        api.react.ok(());
        api.reactions.ok(snapshot(&[(Love, 3), (Like, 2)], Some(Love)));
        let (flux, ctx) = setup(&api).await;

        handle_react(&react_on("p1", Love), flux.store(), &ctx).await;

        let r = reactions_of(&flux, "p1");
        assert_eq!(r.total, 5);
        assert_eq!(r.breakdown.count(Like), 2);
        assert_eq!(r.like_count(), 5);
        assert!(r.user_has_liked());
    }

    // ====================================================================
    // Rollback
    // ====================================================================

    #[tokio::test]
    async fn failed_request_restores_snapshot() {
        let api = FakeApi::new();
        api.react.err(server_error());
        let (flux, ctx) = setup(&api).await;
        let before = reactions_of(&flux, "p1");

        let out = handle_react(&react_on("p1", Love), flux.store(), &ctx).await;

        assert!(matches!(out, ReactionOutcome::RolledBack { .. }));
        assert_eq!(reactions_of(&flux, "p1"), before);
        assert_eq!(api.reactions.calls(), 0);
        assert_eq!(
            flux.get_as::<Notice>(Notice::PATH).unwrap().message,
            "Server Error: Something went wrong on the server"
        );
    }

    #[tokio::test]
    async fn failed_refresh_restores_snapshot_not_guess() {
        let api = FakeApi::new();
        api.react.ok(());
        api.reactions.err(server_error());
        let (flux, ctx) = setup(&api).await;
        let before = reactions_of(&flux, "p1");

        let out = handle_react(&react_on("p1", Love), flux.store(), &ctx).await;

        assert_eq!(
            out,
            ReactionOutcome::RolledBack {
                restored: before.clone(),
                error: REFRESH_FAILED.into(),
            }
        );
        assert_eq!(reactions_of(&flux, "p1"), before);
        assert_eq!(
            flux.get_as::<Notice>(Notice::PATH).unwrap(),
            Notice::error(REFRESH_FAILED)
        );
        assert!(flux
            .get_as::<PendingReactions>(PendingReactions::PATH)
            .unwrap()
            .is_empty());
    }

    // ====================================================================
    // Concurrency
    // ====================================================================

    #[tokio::test]
    async fn same_target_is_serialized() {
        let api = FakeApi::new();
        api.react.ok(()).ok(());
        api.reactions
            .ok(snapshot(&[(Love, 1)], Some(Love)))
            .ok(snapshot(&[], None));
        let (flux, ctx) = setup(&api).await;

        let (ra, rb) = (react_on("p1", Love), react_on("p1", Love));
        let (a, b) = tokio::join!(
            handle_react(&ra, flux.store(), &ctx),
            handle_react(&rb, flux.store(), &ctx),
        );

        assert!(matches!(a, ReactionOutcome::Applied(_)));
        assert_eq!(b, ReactionOutcome::Ignored);
        assert_eq!(api.react.calls(), 1);
        assert_eq!(reactions_of(&flux, "p1").total, 1);
    }

    #[tokio::test]
    async fn different_targets_overlap() {
        let api = FakeApi::new();
        api.react.ok(()).ok(());
        api.reactions
            .ok(snapshot(&[(Love, 1)], Some(Love)))
            .ok(snapshot(&[(Like, 1)], Some(Like)));
        let (flux, ctx) = setup(&api).await;

        let (ra, rb) = (react_on("p1", Love), react_on("p2", Like));
        let (a, b) = tokio::join!(
            handle_react(&ra, flux.store(), &ctx),
            handle_react(&rb, flux.store(), &ctx),
        );

        assert!(matches!(a, ReactionOutcome::Applied(_)));
        assert!(matches!(b, ReactionOutcome::Applied(_)));
        assert_eq!(api.react.calls(), 2);
    }

    #[tokio::test]
    async fn unknown_target_is_ignored_and_released() {
        let api = FakeApi::new();
        let (flux, ctx) = setup(&api).await;

        let out = handle_react(&react_on("ghost", Love), flux.store(), &ctx).await;

        assert_eq!(out, ReactionOutcome::Ignored);
        assert_eq!(api.react.calls(), 0);
        let pending = flux
            .get_as::<PendingReactions>(PendingReactions::PATH)
            .unwrap();
        assert!(!pending.contains("post:ghost"));
    }

    // ====================================================================
    // Comments
    // ====================================================================

    #[tokio::test]
    async fn comment_reactions_use_comment_target() {
        let api = FakeApi::new();
        api.comments.ok(CommentPage {
            comments: vec![comment("c1", "p1")],
            next_cursor: None,
            has_more: false,
        });
        api.react.ok(());
        api.reactions.ok(snapshot(&[(Like, 1)], Some(Like)));
        let (flux, _) = setup(&api).await;
        dispatch(&flux, LoadCommentsReq { post_id: "p1".into() }).await;

        dispatch(
            &flux,
            ReactReq {
                target: ReactionTarget::comment("p1", "c1"),
                reaction: Like,
            },
        )
        .await;

        let thread = flux
            .get_as::<CommentThread>(&CommentThread::path("p1"))
            .unwrap();
        assert_eq!(thread.comments[0].reactions.mine, Some(Like));
        assert!(api.log().contains(&"react:add:comment:c1:like".to_string()));
        assert!(api.log().contains(&"reactions:comment:c1".to_string()));
    }

    #[tokio::test]
    async fn dropped_request_frees_its_target() {
        let api = FakeApi::new();
        api.react.ok(());
        api.reactions.ok(snapshot(&[(Love, 1)], Some(Love)));
        let (flux, ctx) = setup(&api).await;

        abandon(handle_react(&react_on("p1", Love), flux.store(), &ctx)).await;
        let pending = flux
            .get_as::<PendingReactions>(PendingReactions::PATH)
            .unwrap_or_default();
        assert!(pending.is_empty());

        let out = handle_react(&react_on("p1", Love), flux.store(), &ctx).await;
        assert!(matches!(out, ReactionOutcome::Applied(_)));
        let r = reactions_of(&flux, "p1");
        assert_eq!((r.total, r.mine), (1, Some(Love)));
    }
}
