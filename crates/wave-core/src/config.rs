//! Configuration management for wave.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::resource::ResourceKind;
use crate::strategy::Strategy;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "wave.yaml";

/// Default directory for pulled resource files.
pub const DEFAULT_OUTPUT_DIR: &str = ".gitea/defaults";

/// Environment variable overriding `gitea_url`.
pub const URL_ENV: &str = "GITEA_URL";

/// Environment variable overriding `gitea_token`.
pub const TOKEN_ENV: &str = "GITEA_TOKEN";

/// wave configuration loaded from `wave.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the Gitea instance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gitea_url: Option<String>,

    /// API token. Prefer the `GITEA_TOKEN` environment variable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gitea_token: Option<String>,

    /// Local store settings.
    #[serde(rename = "config")]
    pub store: StoreConfig,

    /// Kinds written by `wave pull`.
    pub pull: Toggles,

    /// Kinds applied by `wave push`.
    pub push: Toggles,

    /// Repositories a push applies to.
    pub targets: TargetsConfig,

    /// Report planned operations without changing anything.
    pub dry_run: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics_update_strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_protections_update_strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_protections_update_strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhooks_update_strategy: Option<String>,
}

impl Config {
    /// Load config from a YAML file.
    ///
    /// A missing or empty file yields the default configuration.
    ///
    /// # Errors
    /// Returns error if file can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|e| Error::Parse {
            file: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Save config to a YAML file.
    ///
    /// # Errors
    /// Returns error if serialization or write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Raw strategy value configured for `kind`, if any.
    #[must_use]
    pub fn strategy_value(&self, kind: ResourceKind) -> Option<&str> {
        match kind {
            ResourceKind::Topics => self.topics_update_strategy.as_deref(),
            ResourceKind::BranchProtections => self.branch_protections_update_strategy.as_deref(),
            ResourceKind::TagProtections => self.tag_protections_update_strategy.as_deref(),
            ResourceKind::Webhooks => self.webhooks_update_strategy.as_deref(),
            ResourceKind::RepoSettings | ResourceKind::Templates => None,
        }
    }

    /// Strategy for `kind`, or `None` for kinds that are not strategy-driven.
    ///
    /// Parsed on demand so an invalid value only fails the kind it belongs to.
    ///
    /// # Errors
    /// Returns [`Error::UnknownStrategy`] if the configured value is invalid.
    pub fn strategy_for(&self, kind: ResourceKind) -> Result<Option<Strategy>> {
        if !kind.has_strategy() {
            return Ok(None);
        }
        self.strategy_value(kind)
            .filter(|value| !value.trim().is_empty())
            .map_or(Ok(Strategy::default()), |value| Strategy::parse(kind, value))
            .map(Some)
    }

    /// Directory holding the resource files.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.store.output_dir
    }

    /// Path of the local file for `kind`.
    #[must_use]
    pub fn file_path(&self, kind: ResourceKind) -> PathBuf {
        self.store.output_dir.join(kind.file_name())
    }

    /// Gitea URL, with `GITEA_URL` taking precedence over the file.
    ///
    /// `lookup` resolves environment variables; pass `|k| std::env::var(k).ok()`.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if neither source provides a URL.
    pub fn gitea_url(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
        lookup(URL_ENV)
            .or_else(|| self.gitea_url.clone())
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::Config(format!("gitea_url is not set (set it in the config file or {URL_ENV})")))
    }

    /// Gitea token, with `GITEA_TOKEN` taking precedence over the file.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if neither source provides a token.
    pub fn gitea_token(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
        lookup(TOKEN_ENV)
            .or_else(|| self.gitea_token.clone())
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                Error::Config(format!("gitea_token is not set (set it in the config file or {TOKEN_ENV})"))
            })
    }

    /// Check settings that don't need the remote.
    ///
    /// # Errors
    /// Returns the first configuration problem found.
    pub fn validate(&self) -> Result<()> {
        for kind in ResourceKind::ALL {
            self.strategy_for(kind)?;
        }
        if self.targets.autodiscover && self.targets.organization.trim().is_empty() {
            return Err(Error::Config(
                "autodiscover is enabled but organization is not set".into(),
            ));
        }
        Ok(())
    }
}

/// Local store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory the resource files live in.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

/// Per-kind enablement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Toggles {
    pub repo_settings: bool,
    pub topics: bool,
    pub branch_protections: bool,
    pub tag_protections: bool,
    pub webhooks: bool,
    /// Off unless asked for: pushing templates opens pull requests.
    pub templates: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Self {
            repo_settings: true,
            topics: true,
            branch_protections: true,
            tag_protections: true,
            webhooks: true,
            templates: false,
        }
    }
}

impl Toggles {
    /// Whether `kind` is enabled.
    #[must_use]
    pub const fn enabled(&self, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::RepoSettings => self.repo_settings,
            ResourceKind::Topics => self.topics,
            ResourceKind::BranchProtections => self.branch_protections,
            ResourceKind::TagProtections => self.tag_protections,
            ResourceKind::Webhooks => self.webhooks,
            ResourceKind::Templates => self.templates,
        }
    }

    /// Enabled kinds in push order.
    #[must_use]
    pub fn kinds(&self) -> Vec<ResourceKind> {
        ResourceKind::ALL
            .into_iter()
            .filter(|kind| self.enabled(*kind))
            .collect()
    }
}

/// Which repositories a push applies to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetsConfig {
    /// Add every repository of `organization` matching `autodiscover_filter`.
    pub autodiscover: bool,
    pub organization: String,
    /// Repository name filter; `*` matches any run of characters.
    pub autodiscover_filter: String,
    /// Explicit `owner/name` targets.
    pub repos: Vec<String>,
    /// `owner/name` entries removed from the final list (case-insensitive).
    pub exclude_repos: Vec<String>,
}
