//! Feed requests.

/// Fetch the first page, replacing the window.
#[derive(Debug, Clone)]
pub struct LoadFeedReq;

/// Fetch the page after `cursor` and append it.
///
/// Ignored when `cursor` is `None` or a load is already in flight.
#[derive(Debug, Clone)]
pub struct LoadMoreReq {
    pub cursor: Option<String>,
}

/// Clear the window. Sent when the feed view goes away.
#[derive(Debug, Clone)]
pub struct ResetFeedReq;

requests! {
    LoadFeedReq => "feed/load",
    LoadMoreReq => "feed/more",
    ResetFeedReq => "feed/reset",
}
