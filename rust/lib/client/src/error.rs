use std::collections::BTreeMap;

use serde::Deserialize;

use crate::token::TokenError;

pub const NETWORK_MESSAGE: &str = "Network Error: Please check your internet connection";
pub const TIMEOUT_MESSAGE: &str = "Request Timeout: The request took too long to complete";

// ── Error ───────────────────────────────────────────────────────────

/// Every failure an API call can produce, already reduced to one
/// human-readable message (`Display`).
///
/// Callers above the HTTP adapter never see transport errors; they match
/// on [`ApiError::kind`] or show the message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// No response was received. The payload is the transport detail.
    #[error("Network Error: Please check your internet connection")]
    Network(String),

    #[error("Request Timeout: The request took too long to complete")]
    Timeout,

    /// 400 with optional per-field messages.
    #[error("{message}")]
    Validation {
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    UnsupportedMedia(String),

    #[error("{0}")]
    Server(String),

    /// Any other non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The response arrived but its body did not have the expected shape.
    #[error("{0}")]
    Decode(String),

    /// The token could not be read from or written to local storage.
    #[error("{0}")]
    Storage(String),
}

/// Stable discriminant of [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Timeout,
    Validation,
    Unauthorized,
    Forbidden,
    NotFound,
    PayloadTooLarge,
    UnsupportedMedia,
    Server,
    Status,
    Decode,
    Storage,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Timeout => ErrorKind::Timeout,
            ApiError::Validation { .. } => ErrorKind::Validation,
            ApiError::Unauthorized(_) => ErrorKind::Unauthorized,
            ApiError::Forbidden(_) => ErrorKind::Forbidden,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::PayloadTooLarge(_) => ErrorKind::PayloadTooLarge,
            ApiError::UnsupportedMedia(_) => ErrorKind::UnsupportedMedia,
            ApiError::Server(_) => ErrorKind::Server,
            ApiError::Status { .. } => ErrorKind::Status,
            ApiError::Decode(_) => ErrorKind::Decode,
            ApiError::Storage(_) => ErrorKind::Storage,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// HTTP status behind this error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Validation { .. } => Some(400),
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::PayloadTooLarge(_) => Some(413),
            ApiError::UnsupportedMedia(_) => Some(415),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classify a non-success response.
    ///
    /// The message comes from the body when it carries one (`message`, then
    /// `error`, then every entry of `errors` joined with `", "`); otherwise a
    /// fixed per-status text is used.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .message()
            .unwrap_or_else(|| default_message(status));
        match status {
            400 => ApiError::Validation {
                message,
                fields: parsed.fields(),
            },
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            413 => ApiError::PayloadTooLarge(message),
            415 => ApiError::UnsupportedMedia(message),
            500..=599 => ApiError::Server(message),
            _ => ApiError::Status { status, message },
        }
    }

    /// Classify a transport-level failure from `reqwest`.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(format!("response body: {err}"))
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::Storage(err.to_string())
    }
}

/// Fallback text when the body carries no message.
pub fn default_message(status: u16) -> String {
    match status {
        401 => "Unauthorized: Please login again".to_string(),
        403 => "Forbidden: You do not have permission to access this resource".to_string(),
        404 => "Not Found: The requested resource was not found".to_string(),
        413 => "Payload Too Large: The uploaded file is too large".to_string(),
        415 => "Unsupported Media Type: The file type is not supported".to_string(),
        500 => "Server Error: Something went wrong on the server".to_string(),
        other => format!("Error {other}"),
    }
}

// ── Error body ──────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: Option<BTreeMap<String, FieldErrors>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldErrors {
    One(String),
    Many(Vec<String>),
}

impl FieldErrors {
    fn to_vec(&self) -> Vec<String> {
        match self {
            FieldErrors::One(m) => vec![m.clone()],
            FieldErrors::Many(ms) => ms.clone(),
        }
    }
}

impl ErrorBody {
    fn message(&self) -> Option<String> {
        if let Some(m) = self.message.as_deref().filter(|m| !m.is_empty()) {
            return Some(m.to_string());
        }
        if let Some(e) = self.error.as_deref().filter(|e| !e.is_empty()) {
            return Some(e.to_string());
        }
        let joined = self
            .fields()
            .into_values()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");
        (!joined.is_empty()).then_some(joined)
    }

    fn fields(&self) -> BTreeMap<String, Vec<String>> {
        let Some(errors) = &self.errors else {
            return BTreeMap::new();
        };
        errors
            .iter()
            .map(|(field, msgs)| (field.clone(), msgs.to_vec()))
            .collect()
    }
}
