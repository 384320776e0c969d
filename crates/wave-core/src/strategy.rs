//! Update strategies governing how a push turns differences into operations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::resource::ResourceKind;

/// How desired items are reconciled against what the remote already has.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Delete everything remote, then create everything desired.
    Replace,
    /// Update matching items, create missing ones, leave remote-only items alone.
    Merge,
    /// Only create items the remote does not have yet.
    #[default]
    Append,
}

impl Strategy {
    /// Parse a configured strategy value for `kind`.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// `override` is accepted as an older spelling of `replace`.
    ///
    /// # Errors
    /// Returns [`Error::UnknownStrategy`] for any other value.
    pub fn parse(kind: ResourceKind, value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "replace" | "override" => Ok(Self::Replace),
            "merge" => Ok(Self::Merge),
            "append" => Ok(Self::Append),
            _ => Err(Error::UnknownStrategy {
                kind,
                value: value.to_string(),
            }),
        }
    }

    /// Lowercase name as written in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Merge => "merge",
            Self::Append => "append",
        }
    }

    /// Whether the strategy can remove remote items.
    #[must_use]
    pub const fn is_destructive(self) -> bool {
        matches!(self, Self::Replace)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
