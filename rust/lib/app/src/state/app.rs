//! App-level state: route intent, mounted surfaces, user-visible notice.

use std::collections::BTreeSet;

/// Navigation intent, stored at `app/route`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppRoute(pub String);

impl AppRoute {
    pub const PATH: &'static str = "app/route";

    pub const LOGIN: &'static str = "/auth/login";
    pub const REGISTER: &'static str = "/auth/register";
    pub const FEED: &'static str = "/feed";
    pub const PROFILE: &'static str = "/profile";

    pub fn to(path: &str) -> Self {
        Self(path.to_string())
    }
}

/// A top-level view that bootstraps the session when it mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Surface {
    Feed,
    Profile,
}

/// Surfaces currently mounted, stored at `app/mounted`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountedSurfaces(pub BTreeSet<Surface>);

impl MountedSurfaces {
    pub const PATH: &'static str = "app/mounted";

    pub fn contains(&self, surface: Surface) -> bool {
        self.0.contains(&surface)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Last message for the user, stored at `ui/notice`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub const PATH: &'static str = "ui/notice";

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
