//! Error types for wave-gitea.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during Gitea API operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Authentication failed or token rejected.
    #[error("Gitea authentication failed - check gitea_token or GITEA_TOKEN")]
    AuthenticationFailed,

    /// Token not found.
    #[error("no Gitea token found - set gitea_token or GITEA_TOKEN")]
    NoToken,

    /// API rate limit exceeded.
    #[error("Gitea API rate limit exceeded - wait and try again")]
    RateLimited,

    /// API error with status code.
    #[error("Gitea API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// Server URL can't be used as an API base.
    #[error("invalid Gitea URL '{0}'")]
    InvalidUrl(String),

    /// Network error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("failed to parse Gitea response: {0}")]
    Parse(#[from] serde_json::Error),

    /// File content was not valid base64 or UTF-8.
    #[error("failed to decode file content for '{path}': {message}")]
    Decode { path: String, message: String },
}

impl Error {
    /// Whether the remote answered 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Whether the remote refused because the target already exists.
    ///
    /// Only 409. Gitea uses 422 for validation failures.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::ApiError { status: 409, .. })
    }
}
