//! Client state definitions.
//!
//! Each type lives at one well-known path (a `PATH` const, or a `path()`
//! function for per-entity state). Handlers are the only writers.

pub mod app;
pub mod comments;
pub mod feed;
pub mod reactions;
pub mod session;

pub use app::{AppRoute, MountedSurfaces, Notice, NoticeLevel, Surface};
pub use comments::CommentThread;
pub use feed::FeedWindow;
pub use reactions::PendingReactions;
pub use session::SessionState;
