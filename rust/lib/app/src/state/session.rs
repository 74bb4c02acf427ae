//! Session state, stored at `session/state`.

use sociable_client::User;

/// Who is signed in.
///
/// `initialized` turns true on the first `set_user` or `clear` and never
/// goes back; until then the session is unknown, not signed out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub initialized: bool,
}

impl SessionState {
    pub const PATH: &'static str = "session/state";

    pub fn set_user(&mut self, user: User) {
        self.user = Some(user);
        self.is_authenticated = true;
        self.initialized = true;
    }

    pub fn clear(&mut self) {
        self.user = None;
        self.is_authenticated = false;
        self.initialized = true;
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }
}
