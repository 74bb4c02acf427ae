//! Session and surface requests.

use sociable_client::Upload;

use crate::state::Surface;

/// Sign in with email and password.
#[derive(Debug, Clone)]
pub struct LoginReq {
    pub email: String,
    pub password: String,
}

/// Create an account and sign in.
#[derive(Debug, Clone)]
pub struct RegisterReq {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Sign out, whatever the server says.
#[derive(Debug, Clone)]
pub struct LogoutReq;

/// Edit the signed-in user's profile.
///
/// `password` is only sent when it is at least 8 characters after trimming.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileReq {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub avatar: Option<Upload>,
}

/// A top-level surface mounted. Runs the session bootstrap once.
#[derive(Debug, Clone)]
pub struct MountSurfaceReq {
    pub surface: Surface,
}

#[derive(Debug, Clone)]
pub struct UnmountSurfaceReq {
    pub surface: Surface,
}

requests! {
    LoginReq => "session/login",
    RegisterReq => "session/register",
    LogoutReq => "session/logout",
    UpdateProfileReq => "session/profile",
    MountSurfaceReq => "app/mount",
    UnmountSurfaceReq => "app/unmount",
}
