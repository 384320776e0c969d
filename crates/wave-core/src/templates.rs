//! Issue and pull request templates.
//!
//! Templates are not reconciled item by item. A push compares local file
//! contents against the remote and commits every difference at once on a
//! dedicated branch, then opens a pull request for review.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::resource::{Document, ResourceKind};

/// Branch that template changes are committed to.
pub const UPDATE_BRANCH: &str = "wave/update-templates";

/// Commit message and pull request title for template changes.
pub const UPDATE_TITLE: &str = "chore: update issue and pull request templates";

/// Pull request body for template changes.
pub const UPDATE_DESCRIPTION: &str =
    "Synchronizes issue and pull request templates with the organization defaults.";

/// Single-file pull request templates, checked in order.
pub const PR_TEMPLATE_FILES: &[&str] = &[
    "PULL_REQUEST_TEMPLATE.md",
    "PULL_REQUEST_TEMPLATE.yaml",
    "PULL_REQUEST_TEMPLATE.yml",
    "pull_request_template.md",
    "pull_request_template.yaml",
    "pull_request_template.yml",
    ".gitea/PULL_REQUEST_TEMPLATE.md",
    ".gitea/PULL_REQUEST_TEMPLATE.yaml",
    ".gitea/PULL_REQUEST_TEMPLATE.yml",
    ".gitea/pull_request_template.md",
    ".gitea/pull_request_template.yaml",
    ".gitea/pull_request_template.yml",
    ".github/PULL_REQUEST_TEMPLATE.md",
    ".github/PULL_REQUEST_TEMPLATE.yaml",
    ".github/PULL_REQUEST_TEMPLATE.yml",
    ".github/pull_request_template.md",
    ".github/pull_request_template.yaml",
    ".github/pull_request_template.yml",
];

/// Issue template chooser configuration files.
pub const ISSUE_CONFIG_FILES: &[&str] = &[
    ".gitea/ISSUE_TEMPLATE/config.yaml",
    ".gitea/ISSUE_TEMPLATE/config.yml",
    ".gitea/issue_template/config.yaml",
    ".gitea/issue_template/config.yml",
    ".github/ISSUE_TEMPLATE/config.yaml",
    ".github/ISSUE_TEMPLATE/config.yml",
    ".github/issue_template/config.yaml",
    ".github/issue_template/config.yml",
];

/// Single-file issue templates.
pub const ISSUE_TEMPLATE_FILES: &[&str] = &[
    "ISSUE_TEMPLATE.md",
    "ISSUE_TEMPLATE.yaml",
    "ISSUE_TEMPLATE.yml",
    "issue_template.md",
    "issue_template.yaml",
    "issue_template.yml",
    ".gitea/ISSUE_TEMPLATE.md",
    ".gitea/ISSUE_TEMPLATE.yaml",
    ".gitea/ISSUE_TEMPLATE.yml",
    ".gitea/issue_template.md",
    ".gitea/issue_template.yaml",
    ".gitea/issue_template.yml",
    ".github/ISSUE_TEMPLATE.md",
    ".github/ISSUE_TEMPLATE.yaml",
    ".github/ISSUE_TEMPLATE.yml",
    ".github/issue_template.md",
    ".github/issue_template.yaml",
    ".github/issue_template.yml",
];

/// Directories holding one issue template per file.
pub const ISSUE_TEMPLATE_DIRS: &[&str] = &[
    "ISSUE_TEMPLATE",
    "issue_template",
    ".gitea/ISSUE_TEMPLATE",
    ".gitea/issue_template",
    ".github/ISSUE_TEMPLATE",
    ".github/issue_template",
    ".gitlab/ISSUE_TEMPLATE",
    ".gitlab/issue_template",
];

/// Whether a file found in an issue template directory is a template.
///
/// Markdown and YAML files count; the chooser `config.yml` does not.
#[must_use]
pub fn is_issue_template_entry(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    if lower == "config.yml" || lower == "config.yaml" {
        return false;
    }
    [".md", ".yaml", ".yml"]
        .iter()
        .any(|ext| lower.ends_with(ext))
}

/// A template file at a repository path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFile {
    pub path: String,
    pub content: String,
}

/// Local templates file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issue_templates: Vec<TemplateFile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issue_configs: Vec<TemplateFile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pr_templates: Vec<TemplateFile>,
}

impl TemplatesConfig {
    /// All files keyed by path. A path listed twice keeps its last content.
    #[must_use]
    pub fn files(&self) -> BTreeMap<&str, &str> {
        self.pr_templates
            .iter()
            .chain(&self.issue_templates)
            .chain(&self.issue_configs)
            .map(|file| (file.path.as_str(), file.content.as_str()))
            .collect()
    }

    /// Check if no template is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issue_templates.is_empty() && self.issue_configs.is_empty() && self.pr_templates.is_empty()
    }
}

impl Document for TemplatesConfig {
    const KIND: ResourceKind = ResourceKind::Templates;
}

/// A file as it currently exists on the remote branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Blob SHA, required to update the file.
    pub sha: String,
    /// Decoded file content.
    pub content: String,
}

/// What a file change does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOperation {
    Create,
    Update,
}

/// A single file in a multi-file commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub operation: FileOperation,
    pub path: String,
    /// New file content, not yet encoded.
    pub content: String,
    /// SHA of the file being replaced, for updates.
    pub sha: Option<String>,
}

/// Compare local templates with the remote copies.
///
/// `remote` maps each local path that exists remotely to its current state.
/// Unchanged files are left out; updates come before creates, each group
/// sorted by path.
#[must_use]
pub fn diff_files(local: &TemplatesConfig, remote: &HashMap<String, RemoteFile>) -> Vec<FileChange> {
    let mut updates = Vec::new();
    let mut creates = Vec::new();

    for (path, content) in local.files() {
        match remote.get(path) {
            Some(existing) if existing.content == content => {}
            Some(existing) => updates.push(FileChange {
                operation: FileOperation::Update,
                path: path.to_string(),
                content: content.to_string(),
                sha: Some(existing.sha.clone()),
            }),
            None => creates.push(FileChange {
                operation: FileOperation::Create,
                path: path.to_string(),
                content: content.to_string(),
                sha: None,
            }),
        }
    }

    updates.extend(creates);
    updates
}
