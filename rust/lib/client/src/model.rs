//! Wire models for the REST API.
//!
//! Ids travel as `_id`, everything else is camelCase. Reactions have two
//! wire shapes (the per-type breakdown and the older `likeCount` /
//! `userHasLiked` pair); both decode into one [`Reactions`] value and both
//! are written back out, the legacy pair computed from it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Users ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub public_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Image>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Author summary embedded in posts and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Image>,
}

impl From<&User> for Author {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
            avatar: u.avatar.clone(),
        }
    }
}

// ── Reactions ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    Like,
    Love,
    Haha,
    Care,
    Angry,
}

impl ReactionType {
    pub const ALL: [ReactionType; 5] = [
        ReactionType::Like,
        ReactionType::Love,
        ReactionType::Haha,
        ReactionType::Care,
        ReactionType::Angry,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReactionType::Like => "like",
            ReactionType::Love => "love",
            ReactionType::Haha => "haha",
            ReactionType::Care => "care",
            ReactionType::Angry => "angry",
        }
    }
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reaction type: {0}")]
pub struct UnknownReaction(pub String);

impl FromStr for ReactionType {
    type Err = UnknownReaction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReactionType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownReaction(s.to_string()))
    }
}

/// Count and contributing users for one reaction type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionCount {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub user_ids: Vec<String>,
}

/// Per-type reaction counts for one target. Unknown types on the wire are
/// dropped; types with a zero count are not kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, ReactionCount>",
    into = "BTreeMap<String, ReactionCount>"
)]
pub struct ReactionBreakdown(BTreeMap<ReactionType, ReactionCount>);

impl ReactionBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, t: ReactionType) -> Option<&ReactionCount> {
        self.0.get(&t)
    }

    pub fn count(&self, t: ReactionType) -> u64 {
        self.0.get(&t).map_or(0, |c| c.count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ReactionType, &ReactionCount)> {
        self.0.iter().map(|(t, c)| (*t, c))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all per-type counts.
    pub fn sum(&self) -> u64 {
        self.0.values().map(|c| c.count).sum()
    }

    /// Count one more `t`, recording `user` if given.
    pub fn add(&mut self, t: ReactionType, user: Option<&str>) {
        let entry = self.0.entry(t).or_default();
        entry.count += 1;
        if let Some(user) = user {
            if !entry.user_ids.iter().any(|u| u == user) {
                entry.user_ids.push(user.to_string());
            }
        }
    }

    /// Count one less `t`, never below zero.
    pub fn remove(&mut self, t: ReactionType, user: Option<&str>) {
        let Some(entry) = self.0.get_mut(&t) else {
            return;
        };
        entry.count = entry.count.saturating_sub(1);
        if let Some(user) = user {
            entry.user_ids.retain(|u| u != user);
        }
        if entry.count == 0 {
            self.0.remove(&t);
        }
    }
}

impl From<BTreeMap<String, ReactionCount>> for ReactionBreakdown {
    fn from(raw: BTreeMap<String, ReactionCount>) -> Self {
        Self(
            raw.into_iter()
                .filter(|(_, c)| c.count > 0)
                .filter_map(|(k, c)| k.parse::<ReactionType>().ok().map(|t| (t, c)))
                .collect(),
        )
    }
}

impl From<ReactionBreakdown> for BTreeMap<String, ReactionCount> {
    fn from(b: ReactionBreakdown) -> Self {
        b.0.into_iter()
            .map(|(t, c)| (t.as_str().to_string(), c))
            .collect()
    }
}

impl FromIterator<(ReactionType, ReactionCount)> for ReactionBreakdown {
    fn from_iter<I: IntoIterator<Item = (ReactionType, ReactionCount)>>(iter: I) -> Self {
        Self(iter.into_iter().filter(|(_, c)| c.count > 0).collect())
    }
}

/// Canonical reaction state of a post or comment.
///
/// Decodes `totalReactions` (else `likeCount` when the total is missing or
/// zero) and `userReaction` (else `like` when `userHasLiked`). Encodes both
/// shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ReactionsWire", into = "ReactionsWire")]
pub struct Reactions {
    pub breakdown: ReactionBreakdown,
    pub total: u64,
    pub mine: Option<ReactionType>,
}

impl Reactions {
    /// Legacy projection of `total`.
    pub fn like_count(&self) -> u64 {
        self.total
    }

    /// Legacy projection of `mine`.
    pub fn user_has_liked(&self) -> bool {
        self.mine.is_some()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReactionsWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reactions: Option<ReactionBreakdown>,
    #[serde(default)]
    total_reactions: Option<u64>,
    #[serde(default)]
    user_reaction: Option<ReactionType>,
    #[serde(default)]
    like_count: Option<u64>,
    #[serde(default)]
    user_has_liked: Option<bool>,
}

impl ReactionsWire {
    fn is_empty(&self) -> bool {
        self.reactions.is_none()
            && self.total_reactions.is_none()
            && self.user_reaction.is_none()
            && self.like_count.is_none()
            && self.user_has_liked.is_none()
    }
}

impl From<ReactionsWire> for Reactions {
    fn from(w: ReactionsWire) -> Self {
        let legacy_mine = w
            .user_has_liked
            .unwrap_or(false)
            .then_some(ReactionType::Like);
        Self {
            breakdown: w.reactions.unwrap_or_default(),
            total: w
                .total_reactions
                .filter(|&n| n > 0)
                .or(w.like_count)
                .unwrap_or(0),
            mine: w.user_reaction.or(legacy_mine),
        }
    }
}

impl From<Reactions> for ReactionsWire {
    fn from(r: Reactions) -> Self {
        Self {
            total_reactions: Some(r.total),
            user_reaction: r.mine,
            like_count: Some(r.like_count()),
            user_has_liked: Some(r.user_has_liked()),
            reactions: (!r.breakdown.is_empty()).then_some(r.breakdown),
        }
    }
}

/// Authoritative reaction read for one target (`GET /likes/:type/:id`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionSnapshot {
    #[serde(default)]
    pub reactions: ReactionBreakdown,
    #[serde(default)]
    pub total_reactions: u64,
    #[serde(default)]
    pub user_reaction: Option<ReactionType>,
}

impl From<ReactionSnapshot> for Reactions {
    fn from(s: ReactionSnapshot) -> Self {
        Self {
            breakdown: s.reactions,
            total: s.total_reactions,
            mine: s.user_reaction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Post,
    Comment,
}

impl TargetType {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetType::Post => "post",
            TargetType::Comment => "comment",
        }
    }
}

/// Body of the `/likes` add, replace, and remove calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionRequest {
    pub target_type: TargetType,
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction_type: Option<ReactionType>,
}

// ── Posts ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub content: String,
    pub author: Author,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(flatten)]
    pub reactions: Reactions,
    #[serde(default)]
    pub comment_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial post. `None` fields leave the existing value in place.
///
/// `GET` and `PATCH /posts/:id` decode straight into this type, so keys the
/// server leaves out stay `None` instead of taking `Post` defaults.
/// `reactions` is set only when at least one reaction key is present.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "PostPatchWire")]
pub struct PostPatch {
    pub content: Option<String>,
    pub author: Option<Author>,
    pub image: Option<Image>,
    pub visibility: Option<Visibility>,
    pub reactions: Option<Reactions>,
    pub comment_count: Option<u64>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostPatchWire {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    author: Option<Author>,
    #[serde(default)]
    image: Option<Image>,
    #[serde(default)]
    visibility: Option<Visibility>,
    #[serde(default)]
    comment_count: Option<u64>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    reactions: ReactionsWire,
}

impl From<PostPatchWire> for PostPatch {
    fn from(w: PostPatchWire) -> Self {
        Self {
            content: w.content,
            author: w.author,
            image: w.image,
            visibility: w.visibility,
            reactions: (!w.reactions.is_empty()).then(|| Reactions::from(w.reactions)),
            comment_count: w.comment_count,
            updated_at: w.updated_at,
        }
    }
}

/// Every field of a complete post.
impl From<Post> for PostPatch {
    fn from(p: Post) -> Self {
        Self {
            content: Some(p.content),
            author: Some(p.author),
            image: p.image,
            visibility: Some(p.visibility),
            reactions: Some(p.reactions),
            comment_count: Some(p.comment_count),
            updated_at: Some(p.updated_at),
        }
    }
}

impl Post {
    /// Overwrite the fields present in `patch`.
    pub fn merge(&mut self, patch: PostPatch) {
        if let Some(v) = patch.content {
            self.content = v;
        }
        if let Some(v) = patch.author {
            self.author = v;
        }
        if let Some(v) = patch.image {
            self.image = Some(v);
        }
        if let Some(v) = patch.visibility {
            self.visibility = v;
        }
        if let Some(v) = patch.reactions {
            self.reactions = v;
        }
        if let Some(v) = patch.comment_count {
            self.comment_count = v;
        }
        if let Some(v) = patch.updated_at {
            self.updated_at = v;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

// ── Comments ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    pub content: String,
    pub author: Author,
    #[serde(rename = "post")]
    pub post_id: String,
    #[serde(default)]
    pub parent_comment: Option<String>,
    #[serde(flatten)]
    pub reactions: Reactions,
    #[serde(default)]
    pub reply_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_comment.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPage {
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

// ── Auth ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

/// `/users/me` and `/users/update` answer with either the bare user or
/// `{ "user": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum UserEnvelope {
    Wrapped { user: User },
    Bare(User),
}

impl UserEnvelope {
    pub(crate) fn into_user(self) -> User {
        match self {
            UserEnvelope::Wrapped { user } | UserEnvelope::Bare(user) => user,
        }
    }
}

// ── Uploads ─────────────────────────────────────────────────────────

/// A file attached to a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_image(&self) -> bool {
        self.mime
            .split_once('/')
            .is_some_and(|(kind, sub)| kind.eq_ignore_ascii_case("image") && !sub.is_empty())
    }
}

/// Multipart body of `PATCH /users/update`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: Option<String>,
    pub avatar: Option<Upload>,
}

/// Multipart body of `POST /posts`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPost {
    pub content: String,
    pub visibility: Option<Visibility>,
    pub image: Option<Upload>,
}

/// Multipart body of `PATCH /posts/:id`. Empty fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostEdit {
    pub content: Option<String>,
    pub visibility: Option<Visibility>,
    pub image: Option<Upload>,
}
