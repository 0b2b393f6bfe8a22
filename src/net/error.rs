//! Error taxonomy for calls against the mind-map service.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Errors produced by [`crate::net::api::ApiClient`] and the polling routine.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("failed to {operation}: {message}")]
    Transport { operation: &'static str, message: String },

    /// The service answered with a non-success status.
    #[error("failed to {operation}: {status} {reason}{}", body_suffix(.body))]
    Http { operation: &'static str, status: u16, reason: String, body: String },

    /// The requested space, node or user does not exist.
    #[error("failed to {operation}: not found{}", body_suffix(.body))]
    NotFound { operation: &'static str, body: String },

    /// A 2xx body could not be parsed into the expected type.
    #[error("failed to {operation}: invalid response body: {message}")]
    Decode { operation: &'static str, message: String },

    /// The configured base URL is not an absolute http(s) URL.
    #[error("invalid base URL {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },

    /// Polling exhausted its attempt budget before content appeared.
    #[error("content generation timeout after {attempts} attempts")]
    ContentTimeout { attempts: u32 },
}

fn body_suffix(body: &str) -> String {
    if body.trim().is_empty() { String::new() } else { format!(" - {}", body.trim()) }
}

impl ApiError {
    /// HTTP status carried by the error, if the service responded.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            Self::Transport { .. } | Self::Decode { .. } | Self::InvalidBaseUrl { .. } | Self::ContentTimeout { .. } => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "E_TRANSPORT",
            Self::Http { .. } => "E_HTTP",
            Self::NotFound { .. } => "E_NOT_FOUND",
            Self::Decode { .. } => "E_DECODE",
            Self::InvalidBaseUrl { .. } => "E_BASE_URL",
            Self::ContentTimeout { .. } => "E_CONTENT_TIMEOUT",
        }
    }

    /// Whether a user-initiated retry could plausibly succeed.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::ContentTimeout { .. } | Self::Http { status: 429 | 500..=599, .. }
        )
    }
}
