//! Sign-in, sign-out, and profile commands.

use std::path::Path;

use anyhow::{bail, Result};
use sociable_app::request::{
    LoginReq, LogoutReq, MountSurfaceReq, RegisterReq, UpdateProfileReq,
};
use sociable_app::state::{SessionState, Surface};
use sociable_client::User;

use super::{print, Session};
use crate::commands::posts::read_upload;

pub async fn login(session: &Session, email: &str, password: &str) -> Result<()> {
    session
        .run(LoginReq {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await?;
    let user = signed_in(session)?;
    println!("Logged in as {}.", print::user_line(&user));
    Ok(())
}

pub async fn register(
    session: &Session,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> Result<()> {
    session
        .run(RegisterReq {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })
        .await?;
    let user = signed_in(session)?;
    println!("Registered and logged in as {}.", print::user_line(&user));
    Ok(())
}

pub async fn logout(session: &Session) -> Result<()> {
    if let Some(message) = session.run(LogoutReq).await? {
        println!("{message}.");
    }
    Ok(())
}

/// Bootstrap the session the way a mounted surface does.
pub async fn bootstrap(session: &Session, surface: Surface) -> Result<Option<User>> {
    session.run(MountSurfaceReq { surface }).await?;
    Ok(session
        .get::<SessionState>(SessionState::PATH)
        .and_then(|s| s.user))
}

pub async fn require_user(session: &Session, surface: Surface) -> Result<User> {
    match bootstrap(session, surface).await? {
        Some(user) => Ok(user),
        None => bail!("Not logged in. Run `sociable login`."),
    }
}

pub async fn whoami(session: &Session) -> Result<()> {
    match bootstrap(session, Surface::Profile).await? {
        Some(user) => println!("{}", print::user_line(&user)),
        None => println!("Not logged in."),
    }
    Ok(())
}

pub struct ProfileArgs<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
    pub avatar: Option<&'a Path>,
}

/// Edit the profile. Fields not given keep their current value.
pub async fn profile(session: &Session, args: ProfileArgs<'_>) -> Result<()> {
    let user = require_user(session, Surface::Profile).await?;
    let avatar = args.avatar.map(read_upload).transpose()?;
    let message = session
        .run(UpdateProfileReq {
            first_name: args.first_name.unwrap_or(&user.first_name).to_string(),
            last_name: args.last_name.unwrap_or(&user.last_name).to_string(),
            email: args.email.unwrap_or(&user.email).to_string(),
            password: args.password.unwrap_or_default().to_string(),
            avatar,
        })
        .await?;
    if let Some(message) = message {
        println!("{message}");
    }
    Ok(())
}

fn signed_in(session: &Session) -> Result<User> {
    session
        .get::<SessionState>(SessionState::PATH)
        .and_then(|s| s.user)
        .ok_or_else(|| anyhow::anyhow!("login did not complete"))
}
