//! Error types for wave-core.

use std::path::PathBuf;

use crate::reconcile::OperationKind;
use crate::resource::ResourceKind;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error coming from a collaborator (remote client, transport).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur in wave-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Strategy value in the configuration is not one of replace/merge/append.
    #[error("invalid {kind} update strategy '{value}' (must be 'replace', 'merge', or 'append')")]
    UnknownStrategy {
        /// Resource kind the strategy was configured for.
        kind: ResourceKind,
        /// The rejected value.
        value: String,
    },

    /// Two desired items share the same identity.
    #[error("duplicate {kind} identity '{identity}' in local configuration")]
    DuplicateIdentity {
        /// Resource kind of the duplicated items.
        kind: ResourceKind,
        /// The repeated identity key.
        identity: String,
    },

    /// Repository reference is not in `owner/name` form.
    #[error("invalid repository '{0}' - must be owner/repo")]
    InvalidRepo(String),

    /// Any other configuration problem.
    #[error("configuration error: {0}")]
    Config(String),

    /// The observed set could not be retrieved.
    #[error("failed to fetch {kind}: {source}")]
    Fetch {
        /// Resource kind being fetched.
        kind: ResourceKind,
        /// Underlying client error.
        source: BoxError,
    },

    /// A single create/update/delete failed; earlier operations were kept.
    #[error(
        "failed to {operation} {kind} '{identity}' ({applied} applied, {remaining} not attempted): {source}"
    )]
    Apply {
        /// Resource kind being applied.
        kind: ResourceKind,
        /// Operation that failed.
        operation: OperationKind,
        /// Identity of the failing item.
        identity: String,
        /// Operations applied before the failure.
        applied: usize,
        /// Operations skipped after the failure.
        remaining: usize,
        /// Underlying client error.
        source: BoxError,
    },

    /// Local file could not be parsed.
    #[error("failed to parse {file}: {message}")]
    Parse { file: PathBuf, message: String },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Wrap a client error as a fetch failure for `kind`.
    pub fn fetch(kind: ResourceKind, source: impl Into<BoxError>) -> Self {
        Self::Fetch {
            kind,
            source: source.into(),
        }
    }

    /// Whether the error was raised before any remote call was attempted.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(
            self,
            Self::UnknownStrategy { .. }
                | Self::DuplicateIdentity { .. }
                | Self::InvalidRepo(_)
                | Self::Config(_)
        )
    }
}
