//! Resource model for the configuration kinds wave propagates.
//!
//! Each reconcilable kind has one item type (`BranchProtection`, `TagProtection`,
//! `Webhook`) implementing [`Resource`], and one document type that is the shape of
//! its local YAML file. The same structs are used on the wire: Gitea's JSON field
//! names match the YAML keys, so no per-kind field mapping is needed.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::identity::{self, IdentityKey};

/// The kinds of repository configuration wave knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    /// Repository-level settings (singleton).
    RepoSettings,
    /// Repository topics.
    Topics,
    /// Branch protection rules.
    BranchProtections,
    /// Tag protection rules.
    TagProtections,
    /// Webhooks.
    Webhooks,
    /// Issue and pull request templates.
    Templates,
}

impl ResourceKind {
    /// All kinds, in the order a push applies them.
    ///
    /// Repository settings come first so a default-branch rename lands before
    /// branch protections are touched.
    pub const ALL: [Self; 6] = [
        Self::RepoSettings,
        Self::Topics,
        Self::BranchProtections,
        Self::TagProtections,
        Self::Webhooks,
        Self::Templates,
    ];

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RepoSettings => "repository settings",
            Self::Topics => "topics",
            Self::BranchProtections => "branch protections",
            Self::TagProtections => "tag protections",
            Self::Webhooks => "webhooks",
            Self::Templates => "templates",
        }
    }

    /// Key used for this kind in the configuration file.
    #[must_use]
    pub const fn config_key(self) -> &'static str {
        match self {
            Self::RepoSettings => "repo_settings",
            Self::Topics => "topics",
            Self::BranchProtections => "branch_protections",
            Self::TagProtections => "tag_protections",
            Self::Webhooks => "webhooks",
            Self::Templates => "templates",
        }
    }

    /// File name of the local document inside the output directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::RepoSettings => "repo_settings.yaml",
            Self::Topics => "topics.yaml",
            Self::BranchProtections => "branch_protections.yaml",
            Self::TagProtections => "tag_protections.yaml",
            Self::Webhooks => "webhooks.yaml",
            Self::Templates => "templates.yaml",
        }
    }

    /// Whether pushes of this kind are governed by an update strategy.
    #[must_use]
    pub const fn has_strategy(self) -> bool {
        matches!(
            self,
            Self::Topics | Self::BranchProtections | Self::TagProtections | Self::Webhooks
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A reconcilable item: something with an identity that can be created,
/// updated and deleted on the remote one at a time.
pub trait Resource: Clone + PartialEq + fmt::Debug {
    /// Kind reported in errors and logs.
    const KIND: ResourceKind;

    /// Identity used to correlate desired and observed items.
    ///
    /// `None` means the item cannot be matched and is always created.
    fn identity(&self) -> Option<IdentityKey>;

    /// Build the item sent for an update: the desired fields laid over the
    /// observed item, keeping whatever the remote needs to address it.
    #[must_use]
    fn merge_onto(&self, observed: &Self) -> Self;
}

/// One configuration item of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceItem {
    /// The repository settings singleton.
    RepoSettings(RepoSettings),
    /// A single topic.
    Topic(String),
    /// A branch protection rule.
    BranchProtection(BranchProtection),
    /// A tag protection rule.
    TagProtection(TagProtection),
    /// A webhook.
    Webhook(Webhook),
}

impl ResourceItem {
    /// The kind this item belongs to.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::RepoSettings(_) => ResourceKind::RepoSettings,
            Self::Topic(_) => ResourceKind::Topics,
            Self::BranchProtection(_) => ResourceKind::BranchProtections,
            Self::TagProtection(_) => ResourceKind::TagProtections,
            Self::Webhook(_) => ResourceKind::Webhooks,
        }
    }
}

/// The shape of one local YAML file.
pub trait Document: Serialize + DeserializeOwned + Default {
    /// Kind stored in this document.
    const KIND: ResourceKind;

    /// The items declared in the document, in file order.
    fn items(&self) -> Vec<ResourceItem> {
        Vec::new()
    }
}

/// Deserialize `null` as the type's default (Gitea sends `null` for empty lists).
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

const fn default_true() -> bool {
    true
}

fn default_hook_type() -> String {
    "gitea".into()
}

// === Repository settings ===

/// External issue tracker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalTracker {
    /// URL of the external tracker.
    pub external_tracker_url: String,
    /// Issue URL format with `{user}`, `{repo}`, `{index}` placeholders.
    #[serde(default)]
    pub external_tracker_format: String,
    /// Style of issue numbers: `numeric`, `alphanumeric` or `regexp`.
    #[serde(default)]
    pub external_tracker_style: String,
    /// Pattern used when the style is `regexp`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub external_tracker_regexp_pattern: String,
}

/// Repository-level settings.
///
/// Every field is optional: only the fields present locally are pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_issues: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_tracker: Option<ExternalTracker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_wiki: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_pull_requests: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_projects: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_releases: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_packages: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_actions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_whitespace_conflicts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_merge_commits: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_rebase: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_rebase_explicit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_squash_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_delete_branch_after_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_merge_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_allow_maintainer_edit: Option<bool>,
}

impl RepoSettings {
    /// The subset of `self` that differs from `observed`.
    ///
    /// Fields unset in `self` are never part of the result.
    #[must_use]
    pub fn changes_from(&self, observed: &Self) -> Self {
        fn changed<T: Clone + PartialEq>(desired: &Option<T>, observed: &Option<T>) -> Option<T> {
            match desired {
                Some(value) if observed.as_ref() != Some(value) => Some(value.clone()),
                _ => None,
            }
        }

        Self {
            default_branch: changed(&self.default_branch, &observed.default_branch),
            has_issues: changed(&self.has_issues, &observed.has_issues),
            external_tracker: changed(&self.external_tracker, &observed.external_tracker),
            has_wiki: changed(&self.has_wiki, &observed.has_wiki),
            has_pull_requests: changed(&self.has_pull_requests, &observed.has_pull_requests),
            has_projects: changed(&self.has_projects, &observed.has_projects),
            has_releases: changed(&self.has_releases, &observed.has_releases),
            has_packages: changed(&self.has_packages, &observed.has_packages),
            has_actions: changed(&self.has_actions, &observed.has_actions),
            ignore_whitespace_conflicts: changed(
                &self.ignore_whitespace_conflicts,
                &observed.ignore_whitespace_conflicts,
            ),
            allow_merge_commits: changed(&self.allow_merge_commits, &observed.allow_merge_commits),
            allow_rebase: changed(&self.allow_rebase, &observed.allow_rebase),
            allow_rebase_explicit: changed(
                &self.allow_rebase_explicit,
                &observed.allow_rebase_explicit,
            ),
            allow_squash_merge: changed(&self.allow_squash_merge, &observed.allow_squash_merge),
            default_delete_branch_after_merge: changed(
                &self.default_delete_branch_after_merge,
                &observed.default_delete_branch_after_merge,
            ),
            default_merge_style: changed(&self.default_merge_style, &observed.default_merge_style),
            default_allow_maintainer_edit: changed(
                &self.default_allow_maintainer_edit,
                &observed.default_allow_maintainer_edit,
            ),
        }
    }

    /// Check if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Document for RepoSettings {
    const KIND: ResourceKind = ResourceKind::RepoSettings;

    fn items(&self) -> Vec<ResourceItem> {
        vec![ResourceItem::RepoSettings(self.clone())]
    }
}

// === Topics ===

/// Local topics file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicsConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub topics: Vec<String>,
}

impl Document for TopicsConfig {
    const KIND: ResourceKind = ResourceKind::Topics;

    fn items(&self) -> Vec<ResourceItem> {
        self.topics.iter().cloned().map(ResourceItem::Topic).collect()
    }
}

// === Branch protections ===

/// A branch protection rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchProtection {
    /// Branch the rule applies to (legacy identity).
    pub branch_name: String,
    /// Rule name, may be a glob.
    pub rule_name: String,
    pub enable_push: bool,
    pub enable_push_whitelist: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub push_whitelist_usernames: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub push_whitelist_teams: Vec<String>,
    pub push_whitelist_deploy_keys: bool,
    pub enable_merge_whitelist: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub merge_whitelist_usernames: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub merge_whitelist_teams: Vec<String>,
    pub enable_status_check: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub status_check_contexts: Vec<String>,
    pub required_approvals: i64,
    pub enable_approvals_whitelist: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub approvals_whitelist_usernames: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub approvals_whitelist_teams: Vec<String>,
    pub block_on_rejected_reviews: bool,
    pub block_on_official_review_requests: bool,
    pub block_on_outdated_branch: bool,
    pub dismiss_stale_approvals: bool,
    pub require_signed_commits: bool,
    /// Always sent: an omitted field leaves the remote value in place.
    pub protected_file_patterns: String,
    pub unprotected_file_patterns: String,
}

impl Resource for BranchProtection {
    const KIND: ResourceKind = ResourceKind::BranchProtections;

    fn identity(&self) -> Option<IdentityKey> {
        identity::branch_protection_identity(self)
    }

    fn merge_onto(&self, observed: &Self) -> Self {
        let mut merged = self.clone();
        if merged.rule_name.is_empty() {
            merged.rule_name.clone_from(&observed.rule_name);
        }
        if merged.branch_name.is_empty() {
            merged.branch_name.clone_from(&observed.branch_name);
        }
        merged
    }
}

/// Local branch protections file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchProtectionConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<BranchProtection>,
}

impl Document for BranchProtectionConfig {
    const KIND: ResourceKind = ResourceKind::BranchProtections;

    fn items(&self) -> Vec<ResourceItem> {
        self.rules
            .iter()
            .cloned()
            .map(ResourceItem::BranchProtection)
            .collect()
    }
}

// === Tag protections ===

/// A tag protection rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagProtection {
    /// Remote id, present on pulled rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Tag name pattern (glob or `/regex/`).
    pub name_pattern: String,
    #[serde(deserialize_with = "null_as_default")]
    pub whitelist_usernames: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub whitelist_teams: Vec<String>,
}

impl Resource for TagProtection {
    const KIND: ResourceKind = ResourceKind::TagProtections;

    fn identity(&self) -> Option<IdentityKey> {
        identity::tag_protection_identity(self)
    }

    fn merge_onto(&self, observed: &Self) -> Self {
        Self {
            id: observed.id,
            ..self.clone()
        }
    }
}

/// Local tag protections file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagProtectionConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<TagProtection>,
}

impl Document for TagProtectionConfig {
    const KIND: ResourceKind = ResourceKind::TagProtections;

    fn items(&self) -> Vec<ResourceItem> {
        self.rules
            .iter()
            .cloned()
            .map(ResourceItem::TagProtection)
            .collect()
    }
}

// === Webhooks ===

/// A repository webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Webhook {
    /// Remote id, present on pulled hooks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Hook type (`gitea`, `slack`, `discord`, ...).
    #[serde(rename = "type", default = "default_hook_type")]
    pub hook_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub branch_filter: String,
    /// Delivery configuration; `url` is the hook's identity.
    #[serde(default, deserialize_with = "null_as_default")]
    pub config: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub authorization_header: String,
}

impl Default for Webhook {
    fn default() -> Self {
        Self {
            id: None,
            hook_type: default_hook_type(),
            branch_filter: String::new(),
            config: BTreeMap::new(),
            events: Vec::new(),
            active: true,
            authorization_header: String::new(),
        }
    }
}

impl Webhook {
    /// Target URL from the delivery configuration.
    #[must_use]
    pub fn target_url(&self) -> Option<&str> {
        self.config.get("url").map(String::as_str)
    }
}

impl Resource for Webhook {
    const KIND: ResourceKind = ResourceKind::Webhooks;

    fn identity(&self) -> Option<IdentityKey> {
        identity::webhook_identity(self)
    }

    fn merge_onto(&self, observed: &Self) -> Self {
        // The hook type cannot be edited after creation. Config keys the remote
        // fills in on its own (e.g. `http_method`) are kept unless set locally.
        let mut config = observed.config.clone();
        config.extend(self.config.clone());
        Self {
            id: observed.id,
            hook_type: observed.hook_type.clone(),
            config,
            ..self.clone()
        }
    }
}

/// Local webhooks file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub hooks: Vec<Webhook>,
}

impl Document for WebhookConfig {
    const KIND: ResourceKind = ResourceKind::Webhooks;

    fn items(&self) -> Vec<ResourceItem> {
        self.hooks.iter().cloned().map(ResourceItem::Webhook).collect()
    }
}
