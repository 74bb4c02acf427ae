//! Feed, post, reaction, and comment commands.

use std::path::Path;

use anyhow::{bail, Context, Result};
use sociable_app::request::{
    CreatePostReq, DeletePostReq, EditPostReq, LoadCommentsReq, LoadFeedReq,
    LoadMoreCommentsReq, LoadMoreReq, LoadRepliesReq, PostCommentReq, PostReplyReq, ReactReq,
    ReactionTarget,
};
use sociable_app::state::{CommentThread, FeedWindow, Surface};
use sociable_client::{ReactionType, Reactions, Upload, Visibility};

use super::auth::require_user;
use super::{print, Session};

/// Read a file for a multipart upload. The MIME type follows the extension.
pub fn read_upload(path: &Path) -> Result<Upload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Upload::new(file_name, mime_for(path), bytes))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

fn window(session: &Session) -> FeedWindow {
    session
        .get::<FeedWindow>(FeedWindow::PATH)
        .unwrap_or_default()
}

fn thread(session: &Session, post_id: &str) -> CommentThread {
    session
        .get::<CommentThread>(&CommentThread::path(post_id))
        .unwrap_or_default()
}

/// Load the first feed page, then up to `pages - 1` more.
async fn load_feed(session: &Session, pages: usize) -> Result<FeedWindow> {
    session.run(LoadFeedReq).await?;
    for _ in 1..pages.max(1) {
        let current = window(session);
        if !current.has_more || current.error.is_some() {
            break;
        }
        session
            .run(LoadMoreReq {
                cursor: current.next_cursor,
            })
            .await?;
    }
    let loaded = window(session);
    if let Some(error) = &loaded.error {
        bail!("Failed to load feed: {error}");
    }
    Ok(loaded)
}

pub async fn feed(session: &Session, pages: usize) -> Result<()> {
    require_user(session, Surface::Feed).await?;
    let loaded = load_feed(session, pages).await?;
    if loaded.posts.is_empty() {
        println!("No posts yet.");
        return Ok(());
    }
    for post in &loaded.posts {
        print::post(post);
        println!();
    }
    if loaded.has_more {
        println!("More posts available; pass --pages {}.", pages.max(1) + 1);
    }
    Ok(())
}

pub async fn create(
    session: &Session,
    content: &str,
    private: bool,
    image: Option<&Path>,
) -> Result<()> {
    require_user(session, Surface::Feed).await?;
    let image = image.map(read_upload).transpose()?;
    session
        .run(CreatePostReq {
            content: content.to_string(),
            visibility: Some(if private {
                Visibility::Private
            } else {
                Visibility::Public
            }),
            image,
        })
        .await?;
    match window(session).posts.first() {
        Some(post) => {
            println!("Post created.");
            print::post(post);
        }
        None => println!("Post created."),
    }
    Ok(())
}

pub async fn edit(
    session: &Session,
    post_id: &str,
    content: Option<&str>,
    visibility: Option<Visibility>,
    image: Option<&Path>,
) -> Result<()> {
    if content.is_none() && visibility.is_none() && image.is_none() {
        bail!("Nothing to change. Pass --content, --visibility, or --image.");
    }
    require_user(session, Surface::Feed).await?;
    let image = image.map(read_upload).transpose()?;
    let message = session
        .run(EditPostReq {
            post_id: post_id.to_string(),
            content: content.map(str::to_string),
            visibility,
            image,
        })
        .await?;
    if let Some(message) = message {
        println!("{message}");
    }
    Ok(())
}

pub async fn delete(session: &Session, post_id: &str) -> Result<()> {
    require_user(session, Surface::Feed).await?;
    session
        .run(DeletePostReq {
            post_id: post_id.to_string(),
        })
        .await?;
    println!("Post {post_id} deleted.");
    Ok(())
}

/// Page through the feed until `post_id` is loaded.
async fn find_post(session: &Session, post_id: &str) -> Result<()> {
    let mut current = load_feed(session, 1).await?;
    while current.post(post_id).is_none() {
        if !current.has_more {
            bail!("Post {post_id} not found in the feed.");
        }
        session
            .run(LoadMoreReq {
                cursor: current.next_cursor.clone(),
            })
            .await?;
        let next = window(session);
        if next.posts.len() == current.posts.len() {
            bail!("Post {post_id} not found in the feed.");
        }
        current = next;
    }
    Ok(())
}

/// Page through a post's comments until `comment_id` is loaded, checking
/// loaded replies too.
async fn find_comment(session: &Session, post_id: &str, comment_id: &str) -> Result<()> {
    load_comments(session, post_id).await?;
    loop {
        let current = thread(session, post_id);
        if current.comment(comment_id).is_some() {
            return Ok(());
        }
        if !current.has_more {
            break;
        }
        session
            .run(LoadMoreCommentsReq {
                post_id: post_id.to_string(),
            })
            .await?;
        if thread(session, post_id).comments.len() == current.comments.len() {
            break;
        }
    }
    // Maybe a reply: load reply lists of commented threads.
    let parents: Vec<String> = thread(session, post_id)
        .comments
        .iter()
        .filter(|c| c.reply_count > 0)
        .map(|c| c.id.clone())
        .collect();
    for parent in parents {
        session
            .run(LoadRepliesReq {
                post_id: post_id.to_string(),
                comment_id: parent,
                force: false,
            })
            .await?;
        if thread(session, post_id).comment(comment_id).is_some() {
            return Ok(());
        }
    }
    bail!("Comment {comment_id} not found under post {post_id}.")
}

/// React to a post, or to one of its comments with `comment_id`.
///
/// Choosing the reaction you already have removes it.
pub async fn react(
    session: &Session,
    post_id: &str,
    comment_id: Option<&str>,
    reaction: ReactionType,
) -> Result<()> {
    require_user(session, Surface::Feed).await?;
    let target = match comment_id {
        Some(comment_id) => {
            find_comment(session, post_id, comment_id).await?;
            ReactionTarget::comment(post_id, comment_id)
        }
        None => {
            find_post(session, post_id).await?;
            ReactionTarget::post(post_id)
        }
    };
    session
        .run(ReactReq {
            target: target.clone(),
            reaction,
        })
        .await?;

    let after: Option<Reactions> = match &target {
        ReactionTarget::Post { post_id } => {
            window(session).post(post_id).map(|p| p.reactions.clone())
        }
        ReactionTarget::Comment {
            post_id,
            comment_id,
        } => thread(session, post_id)
            .comment(comment_id)
            .map(|c| c.reactions.clone()),
    };
    match after.and_then(|r| r.mine) {
        Some(mine) => println!("Reacted with {mine} on {}.", target.target_id()),
        None => println!("Reaction removed from {}.", target.target_id()),
    }
    Ok(())
}

async fn load_comments(session: &Session, post_id: &str) -> Result<CommentThread> {
    session
        .run(LoadCommentsReq {
            post_id: post_id.to_string(),
        })
        .await?;
    let loaded = thread(session, post_id);
    if let Some(error) = &loaded.error {
        bail!("Failed to load comments: {error}");
    }
    Ok(loaded)
}

pub async fn comments(session: &Session, post_id: &str, all: bool) -> Result<()> {
    require_user(session, Surface::Feed).await?;
    let mut loaded = load_comments(session, post_id).await?;
    while all && loaded.has_more {
        session
            .run(LoadMoreCommentsReq {
                post_id: post_id.to_string(),
            })
            .await?;
        let next = thread(session, post_id);
        if next.comments.len() == loaded.comments.len() {
            break;
        }
        loaded = next;
    }
    if loaded.comments.is_empty() {
        println!("No comments yet.");
        return Ok(());
    }
    for comment in &loaded.comments {
        print::comment(comment, 0);
    }
    if loaded.has_more {
        println!("More comments available; pass --all.");
    }
    Ok(())
}

pub async fn replies(session: &Session, post_id: &str, comment_id: &str) -> Result<()> {
    require_user(session, Surface::Feed).await?;
    session
        .run(LoadRepliesReq {
            post_id: post_id.to_string(),
            comment_id: comment_id.to_string(),
            force: true,
        })
        .await?;
    let loaded = thread(session, post_id);
    match loaded.replies.get(comment_id) {
        Some(list) if !list.is_empty() => {
            for reply in list {
                print::comment(reply, 2);
            }
        }
        _ => println!("No replies yet."),
    }
    Ok(())
}

pub async fn comment(session: &Session, post_id: &str, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        bail!("Comment text is empty.");
    }
    require_user(session, Surface::Feed).await?;
    session
        .run(PostCommentReq {
            post_id: post_id.to_string(),
            text: text.to_string(),
        })
        .await?;
    println!("Comment posted.");
    if let Some(created) = thread(session, post_id).comments.first() {
        print::comment(created, 0);
    }
    Ok(())
}

pub async fn reply(session: &Session, post_id: &str, comment_id: &str, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        bail!("Reply text is empty.");
    }
    require_user(session, Surface::Feed).await?;
    let message = session
        .run(PostReplyReq {
            post_id: post_id.to_string(),
            comment_id: comment_id.to_string(),
            text: text.to_string(),
        })
        .await?;
    if let Some(message) = message {
        println!("{message}");
    }
    Ok(())
}
