//! Feed state, stored at `feed/window`.

use std::collections::HashSet;

use sociable_client::{FeedPage, Post, PostPatch};

/// The paginated post window behind the feed view.
///
/// Pagination only ever appends; `reset` clears everything at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedWindow {
    pub posts: Vec<Post>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl FeedWindow {
    pub const PATH: &'static str = "feed/window";

    /// Replace the window with a first page.
    pub fn replace_page(&mut self, page: FeedPage) {
        self.posts = page.posts;
        self.next_cursor = page.next_cursor;
        self.has_more = page.has_more;
        self.is_loading = false;
        self.error = None;
    }

    /// Append a continuation page. Posts already in the window are skipped.
    /// Returns how many posts were added.
    pub fn append_page(&mut self, page: FeedPage) -> usize {
        let mut seen: HashSet<String> = self.posts.iter().map(|p| p.id.clone()).collect();
        let before = self.posts.len();
        for post in page.posts {
            if seen.insert(post.id.clone()) {
                self.posts.push(post);
            }
        }
        self.next_cursor = page.next_cursor;
        self.has_more = page.has_more;
        self.is_loading = false;
        self.error = None;
        self.posts.len() - before
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.is_loading = false;
        self.error = Some(message.into());
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Put a freshly created post at the top.
    pub fn add_post(&mut self, post: Post) {
        self.posts.retain(|p| p.id != post.id);
        self.posts.insert(0, post);
    }

    /// Merge `patch` into the post with `id`. Fields absent from the patch
    /// keep their current value.
    pub fn update_post(&mut self, id: &str, patch: PostPatch) -> bool {
        match self.post_mut(id) {
            Some(post) => {
                post.merge(patch);
                true
            }
            None => false,
        }
    }

    pub fn remove_post(&mut self, id: &str) -> bool {
        let before = self.posts.len();
        self.posts.retain(|p| p.id != id);
        self.posts.len() != before
    }

    pub fn post(&self, id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn post_mut(&mut self, id: &str) -> Option<&mut Post> {
        self.posts.iter_mut().find(|p| p.id == id)
    }
}
