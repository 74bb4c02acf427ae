//! Endpoint surface of the REST API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Deserialize;

use crate::config::ClientConfig;
use crate::error::{default_message, ApiError};
use crate::http::{Body, HttpClient, RequestOptions};
use crate::model::*;
use crate::token::TokenBridge;

/// Every call the client makes. Handlers depend on this trait, never on
/// the HTTP client directly.
#[async_trait]
pub trait SocialApi: Send + Sync {
    // Users
    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ApiError>;
    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError>;
    async fn me(&self) -> Result<User, ApiError>;
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;

    // Posts
    async fn feed(&self, cursor: Option<&str>, limit: u32) -> Result<FeedPage, ApiError>;
    async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError>;
    /// The server's copy of one post; keys it leaves out stay unset.
    async fn get_post(&self, id: &str) -> Result<PostPatch, ApiError>;
    async fn update_post(&self, id: &str, edit: &PostEdit) -> Result<PostPatch, ApiError>;
    async fn delete_post(&self, id: &str) -> Result<(), ApiError>;

    // Reactions
    async fn add_reaction(&self, req: &ReactionRequest) -> Result<(), ApiError>;
    async fn replace_reaction(&self, req: &ReactionRequest) -> Result<(), ApiError>;
    async fn remove_reaction(&self, req: &ReactionRequest) -> Result<(), ApiError>;
    async fn reactions(
        &self,
        target_type: TargetType,
        target_id: &str,
    ) -> Result<ReactionSnapshot, ApiError>;

    // Comments
    async fn comments(
        &self,
        post_id: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<CommentPage, ApiError>;
    async fn create_comment(&self, post_id: &str, content: &str) -> Result<Comment, ApiError>;
    async fn replies(&self, comment_id: &str) -> Result<Vec<Comment>, ApiError>;
    async fn create_reply(&self, comment_id: &str, content: &str) -> Result<Comment, ApiError>;
}

/// [`SocialApi`] over HTTP.
pub struct ApiClient {
    http: HttpClient,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, bridge: Arc<TokenBridge>) -> Result<Self, ApiError> {
        Ok(Self {
            http: HttpClient::new(config, bridge)?,
        })
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    fn to_json<T: serde::Serialize>(value: &T) -> Result<Body, ApiError> {
        serde_json::to_value(value)
            .map(Body::Json)
            .map_err(|e| ApiError::Decode(format!("request body: {e}")))
    }

    /// Multipart requests mirror the browser client and name the content
    /// type; the adapter replaces it with the real boundary.
    fn multipart_opts() -> RequestOptions {
        RequestOptions::default().header("Content-Type", "multipart/form-data")
    }
}

fn file_part(upload: &Upload) -> Result<Part, ApiError> {
    Part::bytes(upload.bytes.clone())
        .file_name(upload.file_name.clone())
        .mime_str(&upload.mime)
        .map_err(|_| ApiError::UnsupportedMedia(default_message(415)))
}

/// Replies come back as a bare array or wrapped like a comment page.
#[derive(Deserialize)]
#[serde(untagged)]
enum ReplyList {
    Bare(Vec<Comment>),
    Page(CommentPage),
}

#[async_trait]
impl SocialApi for ApiClient {
    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.http
            .json(
                Method::POST,
                "/users/register",
                Self::to_json(req)?,
                RequestOptions::anonymous(),
            )
            .await
    }

    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.http
            .json(
                Method::POST,
                "/users/login",
                Self::to_json(req)?,
                RequestOptions::anonymous(),
            )
            .await
    }

    async fn me(&self) -> Result<User, ApiError> {
        let env: UserEnvelope = self
            .http
            .json(Method::GET, "/users/me", Body::Empty, RequestOptions::default())
            .await?;
        Ok(env.into_user())
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let mut form = Form::new()
            .text("firstName", update.first_name.clone())
            .text("lastName", update.last_name.clone())
            .text("email", update.email.clone());
        if let Some(password) = &update.password {
            form = form.text("password", password.clone());
        }
        if let Some(avatar) = &update.avatar {
            form = form.part("avatar", file_part(avatar)?);
        }
        let env: UserEnvelope = self
            .http
            .json(
                Method::PATCH,
                "/users/update",
                Body::Multipart(form),
                Self::multipart_opts(),
            )
            .await?;
        Ok(env.into_user())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.http
            .empty(Method::POST, "/users/logout", Body::Empty, RequestOptions::default())
            .await
    }

    async fn feed(&self, cursor: Option<&str>, limit: u32) -> Result<FeedPage, ApiError> {
        let mut opts = RequestOptions::default();
        if let Some(cursor) = cursor {
            opts = opts.query("cursor", cursor);
        }
        opts = opts.query("limit", limit.to_string());
        self.http
            .json(Method::GET, "/posts/feed", Body::Empty, opts)
            .await
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError> {
        let mut form = Form::new().text("content", post.content.clone());
        if let Some(v) = post.visibility {
            form = form.text("visibility", v.as_str());
        }
        if let Some(image) = &post.image {
            form = form.part("image", file_part(image)?);
        }
        self.http
            .json(
                Method::POST,
                "/posts",
                Body::Multipart(form),
                Self::multipart_opts(),
            )
            .await
    }

    async fn get_post(&self, id: &str) -> Result<PostPatch, ApiError> {
        self.http
            .json(
                Method::GET,
                &format!("/posts/{id}"),
                Body::Empty,
                RequestOptions::default(),
            )
            .await
    }

    async fn update_post(&self, id: &str, edit: &PostEdit) -> Result<PostPatch, ApiError> {
        let mut form = Form::new();
        if let Some(content) = edit.content.as_deref().filter(|c| !c.is_empty()) {
            form = form.text("content", content.to_string());
        }
        if let Some(v) = edit.visibility {
            form = form.text("visibility", v.as_str());
        }
        if let Some(image) = &edit.image {
            form = form.part("image", file_part(image)?);
        }
        self.http
            .json(
                Method::PATCH,
                &format!("/posts/{id}"),
                Body::Multipart(form),
                Self::multipart_opts(),
            )
            .await
    }

    async fn delete_post(&self, id: &str) -> Result<(), ApiError> {
        self.http
            .empty(
                Method::DELETE,
                &format!("/posts/{id}"),
                Body::Empty,
                RequestOptions::default(),
            )
            .await
    }

    async fn add_reaction(&self, req: &ReactionRequest) -> Result<(), ApiError> {
        self.http
            .empty(Method::POST, "/likes", Self::to_json(req)?, RequestOptions::default())
            .await
    }

    async fn replace_reaction(&self, req: &ReactionRequest) -> Result<(), ApiError> {
        self.http
            .empty(Method::PATCH, "/likes", Self::to_json(req)?, RequestOptions::default())
            .await
    }

    async fn remove_reaction(&self, req: &ReactionRequest) -> Result<(), ApiError> {
        let body = ReactionRequest {
            reaction_type: None,
            ..req.clone()
        };
        self.http
            .empty(
                Method::DELETE,
                "/likes",
                Self::to_json(&body)?,
                RequestOptions::default(),
            )
            .await
    }

    async fn reactions(
        &self,
        target_type: TargetType,
        target_id: &str,
    ) -> Result<ReactionSnapshot, ApiError> {
        self.http
            .json(
                Method::GET,
                &format!("/likes/{}/{target_id}", target_type.as_str()),
                Body::Empty,
                RequestOptions::default(),
            )
            .await
    }

    async fn comments(
        &self,
        post_id: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<CommentPage, ApiError> {
        let mut opts = RequestOptions::default();
        if let Some(cursor) = cursor {
            opts = opts.query("cursor", cursor);
        }
        opts = opts.query("limit", limit.to_string());
        self.http
            .json(
                Method::GET,
                &format!("/comments/post/{post_id}"),
                Body::Empty,
                opts,
            )
            .await
    }

    async fn create_comment(&self, post_id: &str, content: &str) -> Result<Comment, ApiError> {
        let body = Self::to_json(&CommentRequest {
            content: content.to_string(),
        })?;
        self.http
            .json(
                Method::POST,
                &format!("/comments/post/{post_id}"),
                body,
                RequestOptions::default(),
            )
            .await
    }

    async fn replies(&self, comment_id: &str) -> Result<Vec<Comment>, ApiError> {
        let list: ReplyList = self
            .http
            .json(
                Method::GET,
                &format!("/comments/reply/{comment_id}"),
                Body::Empty,
                RequestOptions::default(),
            )
            .await?;
        Ok(match list {
            ReplyList::Bare(replies) => replies,
            ReplyList::Page(page) => page.comments,
        })
    }

    async fn create_reply(&self, comment_id: &str, content: &str) -> Result<Comment, ApiError> {
        let body = Self::to_json(&CommentRequest {
            content: content.to_string(),
        })?;
        self.http
            .json(
                Method::POST,
                &format!("/comments/reply/{comment_id}"),
                body,
                RequestOptions::default(),
            )
            .await
    }
}
