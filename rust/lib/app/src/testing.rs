//! Test fixtures and a scripted `SocialApi`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use sociable_client::*;
use sociable_flux::Flux;
use tokio::sync::Notify;

use crate::{register_handlers, AppContext};

// ====================================================================
// Fixtures
// ====================================================================

pub fn user(id: &str) -> User {
    User {
        id: id.into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: "ada@example.com".into(),
        avatar: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn post(id: &str) -> Post {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Post {
        id: id.into(),
        content: format!("post {id}"),
        author: Author::from(&user("author")),
        image: None,
        visibility: Visibility::Public,
        reactions: Reactions::default(),
        comment_count: 0,
        created_at: at,
        updated_at: at,
    }
}

pub fn page(ids: &[&str], cursor: Option<&str>, has_more: bool) -> FeedPage {
    FeedPage {
        posts: ids.iter().map(|id| post(id)).collect(),
        next_cursor: cursor.map(String::from),
        has_more,
    }
}

pub fn comment(id: &str, post_id: &str) -> Comment {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Comment {
        id: id.into(),
        content: format!("comment {id}"),
        author: Author::from(&user("author")),
        post_id: post_id.into(),
        parent_comment: None,
        reactions: Reactions::default(),
        reply_count: 0,
        created_at: at,
        updated_at: at,
    }
}

pub fn reply(id: &str, post_id: &str, parent: &str) -> Comment {
    Comment {
        parent_comment: Some(parent.into()),
        ..comment(id, post_id)
    }
}

pub fn auth(user_id: &str, token: &str) -> AuthResponse {
    AuthResponse {
        user: user(user_id),
        access_token: token.into(),
        refresh_token: String::new(),
    }
}

pub fn snapshot(pairs: &[(ReactionType, u64)], mine: Option<ReactionType>) -> ReactionSnapshot {
    let reactions = pairs
        .iter()
        .map(|&(t, count)| {
            (
                t,
                ReactionCount {
                    count,
                    user_ids: Vec::new(),
                },
            )
        })
        .collect();
    ReactionSnapshot {
        reactions,
        total_reactions: pairs.iter().map(|(_, c)| c).sum(),
        user_reaction: mine,
    }
}

pub fn server_error() -> ApiError {
    ApiError::Server("Server Error: Something went wrong on the server".into())
}

// ====================================================================
// Scripted API
// ====================================================================

/// Queue of canned results for one endpoint.
pub struct Script<T> {
    queue: Mutex<VecDeque<Result<T, ApiError>>>,
    calls: AtomicUsize,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl<T> Script<T> {
    pub fn ok(&self, value: T) -> &Self {
        self.queue.lock().unwrap().push_back(Ok(value));
        self
    }

    pub fn err(&self, error: ApiError) -> &Self {
        self.queue.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next(&self) -> Result<T, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Give concurrent requests a chance to run before answering.
        tokio::task::yield_now().await;
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ApiError::Status {
                    status: 501,
                    message: "unscripted call".into(),
                })
            })
    }
}

/// In-memory `SocialApi` answering from per-endpoint scripts.
///
/// `log` records every call as a short string, e.g. `feed:c1:10` or
/// `react:replace:post:p1:like`.
#[derive(Default)]
pub struct FakeApi {
    pub register: Script<AuthResponse>,
    pub login: Script<AuthResponse>,
    pub me: Script<User>,
    pub update_profile: Script<User>,
    pub logout: Script<()>,
    pub feed: Script<FeedPage>,
    pub create_post: Script<Post>,
    pub get_post: Script<PostPatch>,
    pub update_post: Script<PostPatch>,
    pub delete_post: Script<()>,
    pub react: Script<()>,
    pub reactions: Script<ReactionSnapshot>,
    pub comments: Script<CommentPage>,
    pub create_comment: Script<Comment>,
    pub replies: Script<Vec<Comment>>,
    pub create_reply: Script<Comment>,
    /// When set, `me` waits for a notification before answering.
    pub me_gate: Mutex<Option<Arc<Notify>>>,
    log: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }

    fn react_entry(verb: &str, req: &ReactionRequest) -> String {
        let mut entry = format!("react:{verb}:{}:{}", req.target_type.as_str(), req.target_id);
        if let Some(t) = req.reaction_type {
            entry.push(':');
            entry.push_str(t.as_str());
        }
        entry
    }
}

#[async_trait]
impl SocialApi for FakeApi {
    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.record(format!("register:{}", req.email));
        self.register.next().await
    }

    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.record(format!("login:{}", req.email));
        self.login.next().await
    }

    async fn me(&self) -> Result<User, ApiError> {
        self.record("me".into());
        let gate = self.me_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.me.next().await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.record(format!("update_profile:{}", update.email));
        self.update_profile.next().await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.record("logout".into());
        self.logout.next().await
    }

    async fn feed(&self, cursor: Option<&str>, limit: u32) -> Result<FeedPage, ApiError> {
        self.record(format!("feed:{}:{limit}", cursor.unwrap_or("-")));
        self.feed.next().await
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError> {
        self.record(format!("create_post:{}", post.content));
        self.create_post.next().await
    }

    async fn get_post(&self, id: &str) -> Result<PostPatch, ApiError> {
        self.record(format!("get_post:{id}"));
        self.get_post.next().await
    }

    async fn update_post(&self, id: &str, _edit: &PostEdit) -> Result<PostPatch, ApiError> {
        self.record(format!("update_post:{id}"));
        self.update_post.next().await
    }

    async fn delete_post(&self, id: &str) -> Result<(), ApiError> {
        self.record(format!("delete_post:{id}"));
        self.delete_post.next().await
    }

    async fn add_reaction(&self, req: &ReactionRequest) -> Result<(), ApiError> {
        self.record(Self::react_entry("add", req));
        self.react.next().await
    }

    async fn replace_reaction(&self, req: &ReactionRequest) -> Result<(), ApiError> {
        self.record(Self::react_entry("replace", req));
        self.react.next().await
    }

    async fn remove_reaction(&self, req: &ReactionRequest) -> Result<(), ApiError> {
        self.record(Self::react_entry("remove", req));
        self.react.next().await
    }

    async fn reactions(
        &self,
        target_type: TargetType,
        target_id: &str,
    ) -> Result<ReactionSnapshot, ApiError> {
        self.record(format!("reactions:{}:{target_id}", target_type.as_str()));
        self.reactions.next().await
    }

    async fn comments(
        &self,
        post_id: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<CommentPage, ApiError> {
        self.record(format!("comments:{post_id}:{}:{limit}", cursor.unwrap_or("-")));
        self.comments.next().await
    }

    async fn create_comment(&self, post_id: &str, content: &str) -> Result<Comment, ApiError> {
        self.record(format!("create_comment:{post_id}:{content}"));
        self.create_comment.next().await
    }

    async fn replies(&self, comment_id: &str) -> Result<Vec<Comment>, ApiError> {
        self.record(format!("replies:{comment_id}"));
        self.replies.next().await
    }

    async fn create_reply(&self, comment_id: &str, content: &str) -> Result<Comment, ApiError> {
        self.record(format!("create_reply:{comment_id}:{content}"));
        self.create_reply.next().await
    }
}

// ====================================================================
// Harness
// ====================================================================

/// Poll `fut` up to its first suspension, then drop it, the way a caller
/// timing out around `emit` would.
pub async fn abandon<F: std::future::Future>(fut: F) {
    tokio::pin!(fut);
    tokio::select! {
        biased;
        _ = &mut fut => panic!("request finished before it was dropped"),
        _ = std::future::ready(()) => {}
    }
}

/// A Flux with every handler registered against `api` and an in-memory
/// token bridge.
pub fn harness(api: Arc<FakeApi>) -> (Flux, Arc<AppContext>) {
    let flux = Flux::new();
    let ctx = Arc::new(AppContext::new(
        api,
        Arc::new(TokenBridge::in_memory()),
        &ClientConfig::default(),
    ));
    register_handlers(&flux, Arc::clone(&ctx));
    (flux, ctx)
}
