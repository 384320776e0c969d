//! Gitea API types.
//!
//! Branch protections, tag protections and webhooks use the `wave-core` resource
//! types directly; only the shapes specific to the API live here.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use wave_core::RepoSettings;
use wave_core::templates::{FileChange, FileOperation};

use crate::error::{Error, Result};

/// A Gitea repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Repository {
    /// Repository name.
    pub name: String,

    /// `owner/name`.
    #[serde(default)]
    pub full_name: String,

    /// Whether the repository is archived (read-only).
    #[serde(default)]
    pub archived: bool,

    /// Settings as reported by the server. `default_branch` lives here.
    #[serde(flatten)]
    pub settings: RepoSettings,
}

impl Repository {
    /// The default branch, falling back to `main`.
    #[must_use]
    pub fn default_branch(&self) -> &str {
        self.settings.default_branch.as_deref().unwrap_or("main")
    }
}

/// A branch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Branch {
    /// Branch name.
    pub name: String,
}

/// An entry returned by the contents endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentEntry {
    /// File name.
    pub name: String,

    /// Path from the repository root.
    pub path: String,

    /// Blob SHA.
    pub sha: String,

    /// `file`, `dir`, `symlink` or `submodule`.
    #[serde(rename = "type")]
    pub entry_type: String,

    /// Base64 content; only present when a single file is requested.
    #[serde(default)]
    pub content: Option<String>,
}

impl ContentEntry {
    /// Whether this entry is a regular file.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.entry_type == "file"
    }

    /// Decode the content, if the server sent it.
    ///
    /// # Errors
    /// Returns [`Error::Decode`] if the content is not base64-encoded UTF-8.
    pub fn decoded_content(&self) -> Result<Option<String>> {
        let Some(encoded) = &self.content else {
            return Ok(None);
        };
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD.decode(compact).map_err(|e| Error::Decode {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        String::from_utf8(bytes).map(Some).map_err(|e| Error::Decode {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

/// One file operation inside a multi-file commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeFileOperation {
    pub operation: FileOperation,
    pub path: String,
    /// Base64 content.
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

impl From<&FileChange> for ChangeFileOperation {
    fn from(change: &FileChange) -> Self {
        Self {
            operation: change.operation,
            path: change.path.clone(),
            content: STANDARD.encode(change.content.as_bytes()),
            sha: change.sha.clone(),
        }
    }
}

/// Request body for a multi-file commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeFiles {
    /// Branch the commit is based on.
    pub branch: String,

    /// Branch to create for the commit; commits to `branch` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_branch: Option<String>,

    /// Commit message.
    pub message: String,

    /// File operations.
    pub files: Vec<ChangeFileOperation>,
}

/// Request body for creating a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePullRequest {
    pub title: String,
    pub body: String,
    /// Source branch.
    pub head: String,
    /// Target branch.
    pub base: String,
}

/// A pull request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    /// PR number.
    pub number: u64,

    /// PR URL.
    #[serde(default)]
    pub html_url: String,
}
