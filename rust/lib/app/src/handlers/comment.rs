//! Comment handlers: paging, lazy replies, drafts, submission.

use sociable_client::{ApiError, Comment};
use sociable_flux::StateStore;
use tracing::{debug, info, warn};

use super::{notify_error, notify_success, Claim};
use crate::context::AppContext;
use crate::request::*;
use crate::state::{CommentThread, FeedWindow};

/// Shown when the server answers a comment submission without an id.
pub const CREATE_FAILED: &str = "Failed to create comment. Please try again.";

/// Handle `comment/load`: first page replaces the thread's list.
pub async fn handle_load(req: &LoadCommentsReq, store: &StateStore, ctx: &AppContext) {
    let path = CommentThread::path(&req.post_id);
    store.update(&path, |t: &mut CommentThread| {
        t.is_loading = true;
        t.error = None;
    });
    let claim = loading_claim(store, &path);
    let result = ctx
        .api
        .comments(&req.post_id, None, ctx.comment_page_size)
        .await;
    claim.settle();
    match result {
        Ok(page) => {
            debug!(post = %req.post_id, comments = page.comments.len(), "comments loaded");
            store.update(&path, |t: &mut CommentThread| t.replace_page(page));
        }
        Err(e) => {
            warn!(post = %req.post_id, error = %e, "comments failed to load");
            store.update(&path, |t: &mut CommentThread| t.fail(e.to_string()));
            notify_error(store, e.to_string());
        }
    }
}

/// Handle `comment/more`. Needs a cursor and no load in flight.
pub async fn handle_load_more(req: &LoadMoreCommentsReq, store: &StateStore, ctx: &AppContext) {
    let path = CommentThread::path(&req.post_id);
    let cursor = store.update(&path, |t: &mut CommentThread| {
        if t.is_loading {
            return None;
        }
        let cursor = t.next_cursor.clone()?;
        t.is_loading = true;
        t.error = None;
        Some(cursor)
    });
    let Some(cursor) = cursor else {
        debug!(post = %req.post_id, "no further comments to load");
        return;
    };
    let claim = loading_claim(store, &path);
    let result = ctx
        .api
        .comments(&req.post_id, Some(&cursor), ctx.comment_page_size)
        .await;
    claim.settle();
    match result {
        Ok(page) => {
            let added = store.update(&path, |t: &mut CommentThread| t.append_page(page));
            debug!(post = %req.post_id, added, "comments appended");
        }
        Err(e) => {
            warn!(post = %req.post_id, error = %e, "comment page failed");
            store.update(&path, |t: &mut CommentThread| t.fail(e.to_string()));
        }
    }
}

fn loading_claim<'a>(store: &'a StateStore, path: &'a str) -> Claim<impl FnOnce() + 'a> {
    Claim::new(move || {
        store.update(path, |t: &mut CommentThread| t.is_loading = false);
    })
}

/// Handle `comment/replies`. A cached list is kept unless `force` is set.
pub async fn handle_load_replies(req: &LoadRepliesReq, store: &StateStore, ctx: &AppContext) {
    let path = CommentThread::path(&req.post_id);
    let cached = store
        .get_as::<CommentThread>(&path)
        .is_some_and(|t| t.has_replies(&req.comment_id));
    if cached && !req.force {
        debug!(comment = %req.comment_id, "replies already loaded");
        return;
    }
    match ctx.api.replies(&req.comment_id).await {
        Ok(replies) => {
            store.update(&path, |t: &mut CommentThread| {
                t.set_replies(&req.comment_id, replies)
            });
        }
        Err(e) => {
            warn!(comment = %req.comment_id, error = %e, "replies failed to load");
            notify_error(store, e.to_string());
        }
    }
}

/// Handle `comment/draft`.
pub fn handle_set_draft(req: &SetCommentDraftReq, store: &StateStore) {
    store.update(&CommentThread::path(&req.post_id), |t: &mut CommentThread| {
        t.draft = req.text.clone();
    });
}

/// Handle `comment/reply-draft`.
pub fn handle_set_reply_draft(req: &SetReplyDraftReq, store: &StateStore) {
    store.update(&CommentThread::path(&req.post_id), |t: &mut CommentThread| {
        t.reply_drafts
            .insert(req.comment_id.clone(), req.text.clone());
    });
}

/// Handle `comment/create`.
///
/// The draft is cleared before sending and put back verbatim if the send
/// fails. On success the comment goes first and the post's counter grows
/// by one.
pub async fn handle_post_comment(req: &PostCommentReq, store: &StateStore, ctx: &AppContext) {
    let text = req.text.trim();
    if text.is_empty() {
        debug!(post = %req.post_id, "ignoring blank comment");
        return;
    }
    let path = CommentThread::path(&req.post_id);
    let claimed = store.update(&path, |t: &mut CommentThread| {
        if t.is_submitting {
            return false;
        }
        t.is_submitting = true;
        t.draft.clear();
        true
    });
    if !claimed {
        debug!(post = %req.post_id, "submission already in flight");
        return;
    }
    let claim = Claim::new(|| {
        store.update(&path, |t: &mut CommentThread| {
            if t.draft.is_empty() {
                t.draft = req.text.clone();
            }
            t.is_submitting = false;
        });
    });

    let result = created(ctx.api.create_comment(&req.post_id, text).await);
    claim.settle();
    match result {
        Ok(comment) => {
            info!(post = %req.post_id, comment = %comment.id, "comment posted");
            store.update(&path, |t: &mut CommentThread| {
                t.prepend_comment(comment);
                t.is_submitting = false;
            });
            bump_comment_count(store, &req.post_id);
        }
        Err(message) => {
            info!(post = %req.post_id, "comment failed, restoring draft");
            store.update(&path, |t: &mut CommentThread| {
                t.draft = req.text.clone();
                t.is_submitting = false;
            });
            notify_error(store, message);
        }
    }
}

/// Handle `comment/reply`.
///
/// Shares the thread's submission slot with top-level comments. The reply
/// is appended under its parent; the parent's reply count and the post's
/// comment count each grow by one.
pub async fn handle_post_reply(req: &PostReplyReq, store: &StateStore, ctx: &AppContext) {
    let text = req.text.trim();
    if text.is_empty() {
        debug!(comment = %req.comment_id, "ignoring blank reply");
        return;
    }
    let path = CommentThread::path(&req.post_id);
    let claimed = store.update(&path, |t: &mut CommentThread| {
        if t.is_submitting {
            return false;
        }
        t.is_submitting = true;
        t.reply_drafts.remove(&req.comment_id);
        true
    });
    if !claimed {
        debug!(comment = %req.comment_id, "submission already in flight");
        return;
    }
    let claim = Claim::new(|| {
        store.update(&path, |t: &mut CommentThread| {
            t.reply_drafts
                .entry(req.comment_id.clone())
                .or_insert_with(|| req.text.clone());
            t.is_submitting = false;
        });
    });

    let result = created(ctx.api.create_reply(&req.comment_id, text).await);
    claim.settle();
    match result {
        Ok(reply) => {
            info!(comment = %req.comment_id, reply = %reply.id, "reply posted");
            store.update(&path, |t: &mut CommentThread| {
                t.append_reply(&req.comment_id, reply);
                t.is_submitting = false;
            });
            bump_comment_count(store, &req.post_id);
            notify_success(store, "Reply posted!");
        }
        Err(message) => {
            info!(comment = %req.comment_id, "reply failed, restoring draft");
            store.update(&path, |t: &mut CommentThread| {
                t.reply_drafts
                    .insert(req.comment_id.clone(), req.text.clone());
                t.is_submitting = false;
            });
            notify_error(store, message);
        }
    }
}

/// A created comment must come back with an id.
fn created(result: Result<Comment, ApiError>) -> Result<Comment, String> {
    match result {
        Ok(comment) if comment.id.is_empty() => Err(CREATE_FAILED.to_string()),
        Ok(comment) => Ok(comment),
        Err(e) => {
            warn!(error = %e, "comment submission failed");
            Err(e.to_string())
        }
    }
}

fn bump_comment_count(store: &StateStore, post_id: &str) {
    store.update(FeedWindow::PATH, |w: &mut FeedWindow| {
        if let Some(post) = w.post_mut(post_id) {
            post.comment_count += 1;
        }
    });
}
