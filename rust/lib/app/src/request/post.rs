//! Post requests.

use sociable_client::{Upload, Visibility};

#[derive(Debug, Clone, Default)]
pub struct CreatePostReq {
    pub content: String,
    pub visibility: Option<Visibility>,
    pub image: Option<Upload>,
}

/// Change some fields of an existing post. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct EditPostReq {
    pub post_id: String,
    pub content: Option<String>,
    pub visibility: Option<Visibility>,
    pub image: Option<Upload>,
}

#[derive(Debug, Clone)]
pub struct DeletePostReq {
    pub post_id: String,
}

/// Re-read one post from the server and merge it into the feed.
#[derive(Debug, Clone)]
pub struct RefreshPostReq {
    pub post_id: String,
}

requests! {
    CreatePostReq => "post/create",
    EditPostReq => "post/edit",
    DeletePostReq => "post/delete",
    RefreshPostReq => "post/refresh",
}
