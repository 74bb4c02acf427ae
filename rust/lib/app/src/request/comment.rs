//! Comment and reply requests.

/// Fetch the first page of a post's comments.
#[derive(Debug, Clone)]
pub struct LoadCommentsReq {
    pub post_id: String,
}

#[derive(Debug, Clone)]
pub struct LoadMoreCommentsReq {
    pub post_id: String,
}

/// Fetch replies to a comment. A cached list is reused unless `force`.
#[derive(Debug, Clone)]
pub struct LoadRepliesReq {
    pub post_id: String,
    pub comment_id: String,
    pub force: bool,
}

#[derive(Debug, Clone)]
pub struct SetCommentDraftReq {
    pub post_id: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct SetReplyDraftReq {
    pub post_id: String,
    pub comment_id: String,
    pub text: String,
}

/// Submit a top-level comment.
#[derive(Debug, Clone)]
pub struct PostCommentReq {
    pub post_id: String,
    pub text: String,
}

/// Submit a reply to `comment_id` on `post_id`.
#[derive(Debug, Clone)]
pub struct PostReplyReq {
    pub post_id: String,
    pub comment_id: String,
    pub text: String,
}

requests! {
    LoadCommentsReq => "comment/load",
    LoadMoreCommentsReq => "comment/more",
    LoadRepliesReq => "comment/replies",
    SetCommentDraftReq => "comment/draft",
    SetReplyDraftReq => "comment/reply-draft",
    PostCommentReq => "comment/create",
    PostReplyReq => "comment/reply",
}
