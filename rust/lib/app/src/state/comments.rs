//! Comment threads, one per post, stored at `comments/{post_id}`.

use std::collections::{BTreeMap, HashSet};

use sociable_client::{Comment, CommentPage};

/// Top-level comments of a post plus lazily loaded replies.
///
/// Replies never enter `comments`; they live in `replies` keyed by the
/// parent comment id. `is_submitting` is shared by comment and reply
/// submission, so only one of them is in flight per post.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentThread {
    pub comments: Vec<Comment>,
    pub replies: BTreeMap<String, Vec<Comment>>,
    pub draft: String,
    pub reply_drafts: BTreeMap<String, String>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
    pub is_loading: bool,
    pub is_submitting: bool,
    pub error: Option<String>,
}

impl CommentThread {
    pub const PREFIX: &'static str = "comments";

    pub fn path(post_id: &str) -> String {
        format!("{}/{post_id}", Self::PREFIX)
    }

    pub fn replace_page(&mut self, page: CommentPage) {
        self.comments = page.comments;
        self.next_cursor = page.next_cursor;
        self.has_more = page.has_more;
        self.is_loading = false;
        self.error = None;
    }

    pub fn append_page(&mut self, page: CommentPage) -> usize {
        let mut seen: HashSet<String> = self.comments.iter().map(|c| c.id.clone()).collect();
        let before = self.comments.len();
        for comment in page.comments {
            if seen.insert(comment.id.clone()) {
                self.comments.push(comment);
            }
        }
        self.next_cursor = page.next_cursor;
        self.has_more = page.has_more;
        self.is_loading = false;
        self.error = None;
        self.comments.len() - before
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.is_loading = false;
        self.error = Some(message.into());
    }

    pub fn prepend_comment(&mut self, comment: Comment) {
        self.comments.retain(|c| c.id != comment.id);
        self.comments.insert(0, comment);
    }

    pub fn has_replies(&self, comment_id: &str) -> bool {
        self.replies.contains_key(comment_id)
    }

    pub fn set_replies(&mut self, comment_id: &str, replies: Vec<Comment>) {
        self.replies.insert(comment_id.to_string(), replies);
    }

    /// Append `reply` under its parent and bump the parent's reply count.
    pub fn append_reply(&mut self, comment_id: &str, reply: Comment) {
        self.replies
            .entry(comment_id.to_string())
            .or_default()
            .push(reply);
        if let Some(parent) = self.comments.iter_mut().find(|c| c.id == comment_id) {
            parent.reply_count += 1;
        }
    }

    pub fn reply_draft(&self, comment_id: &str) -> &str {
        self.reply_drafts
            .get(comment_id)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// A top-level comment or a loaded reply with `id`.
    pub fn comment(&self, id: &str) -> Option<&Comment> {
        self.comments
            .iter()
            .chain(self.replies.values().flatten())
            .find(|c| c.id == id)
    }

    pub fn comment_mut(&mut self, id: &str) -> Option<&mut Comment> {
        if let Some(pos) = self.comments.iter().position(|c| c.id == id) {
            return self.comments.get_mut(pos);
        }
        self.replies
            .values_mut()
            .flat_map(|list| list.iter_mut())
            .find(|c| c.id == id)
    }
}
