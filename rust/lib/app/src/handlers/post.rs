//! Post handlers: create, edit, delete, refresh.

use sociable_client::{NewPost, PostEdit, PostPatch};
use sociable_flux::StateStore;
use tracing::{info, warn};

use super::{notify_error, notify_success};
use crate::context::AppContext;
use crate::request::*;
use crate::state::FeedWindow;
use crate::validate;

/// Handle `post/create`: on success the post goes to the top of the feed.
pub async fn handle_create(req: &CreatePostReq, store: &StateStore, ctx: &AppContext) {
    if let Err(e) = validate::new_post(&req.content, req.image.as_ref()) {
        notify_error(store, e.to_string());
        return;
    }
    let body = NewPost {
        content: req.content.trim().to_string(),
        visibility: req.visibility,
        image: req.image.clone(),
    };
    match ctx.api.create_post(&body).await {
        Ok(post) => {
            info!(post = %post.id, "post created");
            store.update(FeedWindow::PATH, |w: &mut FeedWindow| w.add_post(post));
        }
        Err(e) => {
            warn!(error = %e, "post creation failed");
            notify_error(store, e.to_string());
        }
    }
}

/// Handle `post/edit`.
pub async fn handle_edit(req: &EditPostReq, store: &StateStore, ctx: &AppContext) {
    let checked = req
        .content
        .as_deref()
        .map_or(Ok(()), validate::edited_content)
        .and_then(|()| req.image.as_ref().map_or(Ok(()), validate::post_image));
    if let Err(e) = checked {
        notify_error(store, e.to_string());
        return;
    }
    let edit = PostEdit {
        content: req.content.as_deref().map(|c| c.trim().to_string()),
        visibility: req.visibility,
        image: req.image.clone(),
    };
    match ctx.api.update_post(&req.post_id, &edit).await {
        Ok(patch) => {
            info!(post = %req.post_id, "post updated");
            merge(store, &req.post_id, patch);
            notify_success(store, "Post updated successfully!");
        }
        Err(e) => {
            warn!(post = %req.post_id, error = %e, "post update failed");
            notify_error(store, e.to_string());
        }
    }
}

/// Handle `post/delete`.
pub async fn handle_delete(req: &DeletePostReq, store: &StateStore, ctx: &AppContext) {
    match ctx.api.delete_post(&req.post_id).await {
        Ok(()) => {
            info!(post = %req.post_id, "post deleted");
            store.update(FeedWindow::PATH, |w: &mut FeedWindow| w.remove_post(&req.post_id));
        }
        Err(e) => {
            warn!(post = %req.post_id, error = %e, "post delete failed");
            notify_error(store, e.to_string());
        }
    }
}

/// Handle `post/refresh`: re-read one post and merge it in place.
pub async fn handle_refresh(req: &RefreshPostReq, store: &StateStore, ctx: &AppContext) {
    match ctx.api.get_post(&req.post_id).await {
        Ok(patch) => merge(store, &req.post_id, patch),
        Err(e) => {
            warn!(post = %req.post_id, error = %e, "post refresh failed");
            notify_error(store, e.to_string());
        }
    }
}

fn merge(store: &StateStore, id: &str, patch: PostPatch) {
    store.update(FeedWindow::PATH, |w: &mut FeedWindow| w.update_post(id, patch));
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sociable_client::{FeedPage, ReactionType, Reactions, Upload, Visibility};
    use sociable_flux::Flux;

    use super::*;
    use crate::dispatch;
    use crate::request::LoadFeedReq;
    use crate::state::{Notice, NoticeLevel};
    use crate::testing::{harness, page, post, server_error, FakeApi};

    fn window(flux: &Flux) -> FeedWindow {
        flux.get_as::<FeedWindow>(FeedWindow::PATH).unwrap_or_default()
    }

    async fn loaded(api: &std::sync::Arc<FakeApi>) -> Flux {
        api.feed.ok(page(&["a", "b"], Some("c1"), true));
        let (flux, _) = harness(api.clone());
        dispatch(&flux, LoadFeedReq).await;
        flux
    }

    #[tokio::test]
    async fn created_post_is_prepended() {
        let api = FakeApi::new();
        api.create_post.ok(post("new"));
        let flux = loaded(&api).await;

        dispatch(
            &flux,
            CreatePostReq {
                content: "  hello  ".into(),
                ..Default::default()
            },
        )
        .await;

        let w = window(&flux);
        assert_eq!(w.posts[0].id, "new");
        assert_eq!(w.posts.len(), 3);
        assert_eq!(w.next_cursor.as_deref(), Some("c1"));
        assert!(api.log().contains(&"create_post:hello".to_string()));
    }

    #[tokio::test]
    async fn empty_post_is_rejected_locally() {
        let api = FakeApi::new();
        let flux = loaded(&api).await;
        dispatch(&flux, CreatePostReq::default()).await;
        assert_eq!(api.create_post.calls(), 0);
        assert_eq!(
            flux.get_as::<Notice>(Notice::PATH).unwrap().message,
            "Post cannot be empty"
        );
    }

    #[tokio::test]
    async fn edit_merges_server_copy() {
        let api = FakeApi::new();
        let mut edited = post("a");
        edited.content = "edited".into();
        edited.visibility = Visibility::Private;
        api.update_post.ok(PostPatch::from(edited));
        let flux = loaded(&api).await;

        dispatch(
            &flux,
            EditPostReq {
                post_id: "a".into(),
                content: Some("edited".into()),
                visibility: Some(Visibility::Private),
                image: None,
            },
        )
        .await;

        let w = window(&flux);
        assert_eq!(w.posts[0].content, "edited");
        assert_eq!(w.posts[0].visibility, Visibility::Private);
        assert_eq!(w.posts.len(), 2);
        assert_eq!(
            flux.get_as::<Notice>(Notice::PATH).unwrap(),
            Notice::success("Post updated successfully!")
        );
    }

    #[tokio::test]
    async fn edit_rejects_unsupported_image() {
        let api = FakeApi::new();
        let flux = loaded(&api).await;
        dispatch(
            &flux,
            EditPostReq {
                post_id: "a".into(),
                image: Some(Upload::new("x.bmp", "image/bmp", vec![0])),
                ..Default::default()
            },
        )
        .await;
        assert_eq!(api.update_post.calls(), 0);
    }

    #[tokio::test]
    async fn delete_removes_only_on_success() {
        let api = FakeApi::new();
        api.delete_post.err(server_error()).ok(());
        let flux = loaded(&api).await;

        dispatch(&flux, DeletePostReq { post_id: "a".into() }).await;
        assert_eq!(window(&flux).posts.len(), 2);
        assert_eq!(
            flux.get_as::<Notice>(Notice::PATH).unwrap().level,
            NoticeLevel::Error
        );

        dispatch(&flux, DeletePostReq { post_id: "a".into() }).await;
        let w = window(&flux);
        assert_eq!(w.posts.len(), 1);
        assert_eq!(w.posts[0].id, "b");
    }

    /// Loads a feed whose post "a" has comments and reactions, then scripts
    /// edit and read answers that leave those keys out.
    async fn loaded_with_counts(api: &std::sync::Arc<FakeApi>) -> Flux {
        let mut a = post("a");
        a.comment_count = 7;
        a.reactions = Reactions {
            total: 4,
            mine: Some(ReactionType::Love),
            ..Reactions::default()
        };
        api.feed.ok(FeedPage {
            posts: vec![a, post("b")],
            next_cursor: None,
            has_more: false,
        });
        let sparse: PostPatch = serde_json::from_value(json!({
            "_id": "a",
            "content": "edited",
            "author": {"_id": "author", "firstName": "Ada", "lastName": "Lovelace"},
            "visibility": "public",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-02T00:00:00Z"
        }))
        .unwrap();
        api.update_post.ok(sparse.clone());
        api.get_post.ok(sparse);
        let (flux, _) = harness(api.clone());
        dispatch(&flux, LoadFeedReq).await;
        flux
    }

    fn assert_counts_kept(flux: &Flux) {
        let w = window(flux);
        let a = w.post("a").unwrap();
        assert_eq!(a.content, "edited");
        assert_eq!(a.comment_count, 7);
        assert_eq!(a.reactions.total, 4);
        assert_eq!(a.reactions.mine, Some(ReactionType::Love));
    }

    #[tokio::test]
    async fn edit_keeps_fields_the_server_left_out() {
        let api = FakeApi::new();
        let flux = loaded_with_counts(&api).await;
        dispatch(
            &flux,
            EditPostReq {
                post_id: "a".into(),
                content: Some("edited".into()),
                ..Default::default()
            },
        )
        .await;
        assert_counts_kept(&flux);
    }

    #[tokio::test]
    async fn refresh_keeps_fields_the_server_left_out() {
        let api = FakeApi::new();
        let flux = loaded_with_counts(&api).await;
        dispatch(&flux, RefreshPostReq { post_id: "a".into() }).await;
        assert_counts_kept(&flux);
    }

    #[tokio::test]
    async fn refresh_merges_in_place() {
        let api = FakeApi::new();
        let mut fresh = post("b");
        fresh.comment_count = 4;
        api.get_post.ok(PostPatch::from(fresh));
        let flux = loaded(&api).await;

        dispatch(&flux, RefreshPostReq { post_id: "b".into() }).await;

        let w = window(&flux);
        assert_eq!(w.posts[1].id, "b");
        assert_eq!(w.posts[1].comment_count, 4);
    }
}
