//! Local input checks run before any request leaves the client.

use sociable_client::{ProfileUpdate, Upload, User};

/// Largest accepted avatar or post image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_PROFILE_PASSWORD_LEN: usize = 8;

const POST_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid email address")]
    Email,
    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),
    #[error("{0} is required")]
    Required(&'static str),
    #[error("Image size must be less than 5MB")]
    ImageTooLarge,
    #[error("Please select a valid image file")]
    NotAnImage,
    #[error("Please select a valid image file (JPG, PNG, GIF, or WebP).")]
    UnsupportedImage,
    #[error("No changes to save")]
    NoChanges,
    #[error("User data not available. Please refresh the page.")]
    NoUser,
    #[error("Post cannot be empty")]
    EmptyPost,
}

/// Loose `local@domain.tld` shape check.
pub fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || s.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

pub fn login(email: &str, password: &str) -> Result<(), ValidationError> {
    if !is_email(email) {
        return Err(ValidationError::Email);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    Ok(())
}

pub fn register(
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> Result<(), ValidationError> {
    if first_name.is_empty() {
        return Err(ValidationError::Required("First name"));
    }
    if last_name.is_empty() {
        return Err(ValidationError::Required("Last name"));
    }
    login(email, password)
}

/// Avatar rule: any `image/*` type up to 5 MB.
pub fn avatar(upload: &Upload) -> Result<(), ValidationError> {
    if upload.len() > MAX_IMAGE_BYTES {
        return Err(ValidationError::ImageTooLarge);
    }
    if !upload.is_image() {
        return Err(ValidationError::NotAnImage);
    }
    Ok(())
}

/// Post image rule: JPG, PNG, GIF or WebP up to 5 MB.
pub fn post_image(upload: &Upload) -> Result<(), ValidationError> {
    if !POST_IMAGE_TYPES.contains(&upload.mime.as_str()) {
        return Err(ValidationError::UnsupportedImage);
    }
    if upload.len() > MAX_IMAGE_BYTES {
        return Err(ValidationError::ImageTooLarge);
    }
    Ok(())
}

pub fn new_post(content: &str, image: Option<&Upload>) -> Result<(), ValidationError> {
    match image {
        Some(image) => post_image(image),
        None if content.trim().is_empty() => Err(ValidationError::EmptyPost),
        None => Ok(()),
    }
}

pub fn edited_content(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::Required("Content"));
    }
    Ok(())
}

/// Raw profile form input.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub avatar: Option<&'a Upload>,
}

/// Turn the profile form into an update, or say why not.
///
/// Fields are trimmed. The password goes out only when it is at least 8
/// characters after trimming; a shorter one is dropped silently. An update
/// identical to `current` with no password and no avatar is rejected.
pub fn profile_update(
    form: &ProfileForm<'_>,
    current: Option<&User>,
) -> Result<ProfileUpdate, ValidationError> {
    let email = form.email.trim();
    if email.is_empty() {
        return Err(ValidationError::Required("Email"));
    }
    if !is_email(email) {
        return Err(ValidationError::Email);
    }
    if let Some(avatar_upload) = form.avatar {
        avatar(avatar_upload)?;
    }

    let password = form.password.trim();
    let update = ProfileUpdate {
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        email: email.to_string(),
        password: (password.chars().count() >= MIN_PROFILE_PASSWORD_LEN)
            .then(|| password.to_string()),
        avatar: form.avatar.cloned(),
    };

    let changed = match current {
        Some(user) => {
            update.first_name != user.first_name
                || update.last_name != user.last_name
                || update.email != user.email
                || update.password.is_some()
                || update.avatar.is_some()
        }
        None => true,
    };
    if !changed {
        return Err(ValidationError::NoChanges);
    }
    if current.is_none() {
        return Err(ValidationError::NoUser);
    }
    Ok(update)
}
