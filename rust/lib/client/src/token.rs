//! Auth token persistence.
//!
//! The bearer token has two homes: a persistent store the HTTP client reads
//! from, and an `accessToken` cookie the route guard inspects. Only
//! [`TokenBridge`] writes either of them, and it always writes both.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Name of the cookie mirrored for the route guard.
pub const COOKIE_NAME: &str = "accessToken";

/// Lifetime of the mirrored cookie: 24 hours.
pub const COOKIE_MAX_AGE_SECS: i64 = 86_400;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token storage I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("token file is malformed: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("token file encode: {0}")]
    Encode(#[from] toml::ser::Error),
}

// ── Cookie ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    fn as_str(self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub max_age: i64,
    pub same_site: SameSite,
    pub issued_at: DateTime<Utc>,
}

impl AuthCookie {
    /// The cookie that mirrors `token`: path `/`, 24h, `SameSite=Lax`.
    pub fn session(token: &str) -> Self {
        Self {
            name: COOKIE_NAME.to_string(),
            value: token.to_string(),
            path: "/".to_string(),
            max_age: COOKIE_MAX_AGE_SECS,
            same_site: SameSite::Lax,
            issued_at: Utc::now(),
        }
    }

    /// The removal form: empty value, `Max-Age=0`.
    pub fn expired() -> Self {
        Self {
            value: String::new(),
            max_age: 0,
            ..Self::session("")
        }
    }

    /// Render as a `Set-Cookie` header value.
    pub fn to_set_cookie(&self) -> String {
        format!(
            "{}={}; Path={}; Max-Age={}; SameSite={}",
            self.name,
            self.value,
            self.path,
            self.max_age,
            self.same_site.as_str()
        )
    }

    pub fn is_removal(&self) -> bool {
        self.max_age <= 0
    }

    /// True while the cookie would still be sent by a browser at `now`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_removal()
            && !self.value.is_empty()
            && now < self.issued_at + Duration::seconds(self.max_age)
    }
}

// ── Storage traits ──────────────────────────────────────────────────

/// Persistent home of the token. The HTTP client reads only this.
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Result<Option<String>, TokenError>;
    fn store(&self, token: &str) -> Result<(), TokenError>;
    fn clear(&self) -> Result<(), TokenError>;
}

/// Cookie home of the token. A removal cookie deletes the entry.
pub trait CookieJar: Send + Sync {
    fn put(&self, cookie: AuthCookie) -> Result<(), TokenError>;
    fn get(&self, name: &str) -> Result<Option<AuthCookie>, TokenError>;
}

#[derive(Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<String>, TokenError> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn store(&self, token: &str) -> Result<(), TokenError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCookieJar {
    cookies: Mutex<BTreeMap<String, AuthCookie>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CookieJar for MemoryCookieJar {
    fn put(&self, cookie: AuthCookie) -> Result<(), TokenError> {
        let mut cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        if cookie.is_removal() {
            cookies.remove(&cookie.name);
        } else {
            cookies.insert(cookie.name.clone(), cookie);
        }
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<AuthCookie>, TokenError> {
        Ok(self
            .cookies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned())
    }
}

// ── File-backed ─────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

/// Token kept in a TOML file (`token = "..."`). A missing file means no
/// token.
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>, TokenError> {
        let file: SessionFile = read_toml(&self.path)?;
        Ok(file.token.filter(|t| !t.is_empty()))
    }

    fn store(&self, token: &str) -> Result<(), TokenError> {
        write_toml(
            &self.path,
            &SessionFile {
                token: Some(token.to_string()),
            },
        )
    }

    fn clear(&self) -> Result<(), TokenError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CookieFile {
    #[serde(default)]
    cookies: BTreeMap<String, AuthCookie>,
}

/// Cookies kept in a TOML file, one table per cookie name.
pub struct FileCookieJar {
    path: PathBuf,
}

impl FileCookieJar {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CookieJar for FileCookieJar {
    fn put(&self, cookie: AuthCookie) -> Result<(), TokenError> {
        let mut file: CookieFile = read_toml(&self.path)?;
        if cookie.is_removal() {
            file.cookies.remove(&cookie.name);
        } else {
            file.cookies.insert(cookie.name.clone(), cookie);
        }
        write_toml(&self.path, &file)
    }

    fn get(&self, name: &str) -> Result<Option<AuthCookie>, TokenError> {
        let mut file: CookieFile = read_toml(&self.path)?;
        Ok(file.cookies.remove(name))
    }
}

fn read_toml<T: Default + for<'de> Deserialize<'de>>(path: &Path) -> Result<T, TokenError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

fn write_toml<T: Serialize>(path: &Path, value: &T) -> Result<(), TokenError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(value)?)?;
    Ok(())
}

// ── Bridge ──────────────────────────────────────────────────────────

/// Single writer of both token copies.
///
/// `set_token` updates storage and cookie together; `get_token` reads the
/// storage copy only. The cookie exists for the route guard.
pub struct TokenBridge {
    storage: Arc<dyn TokenStorage>,
    cookies: Arc<dyn CookieJar>,
}

impl TokenBridge {
    pub fn new(storage: Arc<dyn TokenStorage>, cookies: Arc<dyn CookieJar>) -> Self {
        Self { storage, cookies }
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryTokenStorage::new()),
            Arc::new(MemoryCookieJar::new()),
        )
    }

    /// Store and mirror `token`, or remove both copies for `None`.
    ///
    /// An empty string clears. If the cookie cannot be written after the
    /// token was stored, the stored token is removed again and the error
    /// returned, so the two never disagree.
    pub fn set_token(&self, token: Option<&str>) -> Result<(), TokenError> {
        match token.filter(|t| !t.is_empty()) {
            Some(token) => {
                self.storage.store(token)?;
                if let Err(e) = self.cookies.put(AuthCookie::session(token)) {
                    warn!(error = %e, "cookie mirror failed; dropping stored token");
                    self.storage.clear()?;
                    return Err(e);
                }
                debug!("auth token stored and mirrored");
                Ok(())
            }
            None => {
                let stored = self.storage.clear();
                let mirrored = self.cookies.put(AuthCookie::expired());
                debug!("auth token cleared");
                stored.and(mirrored)
            }
        }
    }

    pub fn get_token(&self) -> Result<Option<String>, TokenError> {
        self.storage.load()
    }

    /// The live mirrored cookie, if any.
    pub fn cookie(&self) -> Result<Option<AuthCookie>, TokenError> {
        Ok(self
            .cookies
            .get(COOKIE_NAME)?
            .filter(|c| c.is_live_at(Utc::now())))
    }

    /// Whether the route guard would see an auth cookie.
    pub fn has_cookie(&self) -> bool {
        matches!(self.cookie(), Ok(Some(_)))
    }

    /// Re-mirror the stored token into the cookie. Returns `false` when no
    /// token is stored.
    pub fn resync_cookie(&self) -> Result<bool, TokenError> {
        match self.get_token()? {
            Some(token) => {
                self.cookies.put(AuthCookie::session(&token))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
