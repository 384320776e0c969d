//! Identity keys used to correlate desired items with observed ones.
//!
//! Extraction rules per kind:
//! - branch protection: `rule_name`, falling back to `branch_name`
//! - tag protection: `name_pattern`
//! - webhook: the `url` entry of the delivery configuration
//! - topic: the topic itself
//! - repository settings: a single fixed identity

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::resource::{BranchProtection, Resource, ResourceItem, TagProtection, Webhook};

/// Identity of the repository settings singleton.
pub const REPOSITORY_IDENTITY: &str = "repository";

/// A non-empty identity key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Create an identity key, returning `None` for blank values.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Get the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key and return the inner `String`.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for IdentityKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<&str> for IdentityKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Identity of a branch protection rule.
#[must_use]
pub fn branch_protection_identity(rule: &BranchProtection) -> Option<IdentityKey> {
    IdentityKey::new(rule.rule_name.as_str()).or_else(|| IdentityKey::new(rule.branch_name.as_str()))
}

/// Identity of a tag protection rule.
#[must_use]
pub fn tag_protection_identity(rule: &TagProtection) -> Option<IdentityKey> {
    IdentityKey::new(rule.name_pattern.as_str())
}

/// Identity of a webhook: its delivery URL.
#[must_use]
pub fn webhook_identity(hook: &Webhook) -> Option<IdentityKey> {
    hook.target_url().and_then(IdentityKey::new)
}

/// Identity of any resource item.
#[must_use]
pub fn identity_of(item: &ResourceItem) -> Option<IdentityKey> {
    match item {
        ResourceItem::RepoSettings(_) => IdentityKey::new(REPOSITORY_IDENTITY),
        ResourceItem::Topic(topic) => IdentityKey::new(topic.as_str()),
        ResourceItem::BranchProtection(rule) => branch_protection_identity(rule),
        ResourceItem::TagProtection(rule) => tag_protection_identity(rule),
        ResourceItem::Webhook(hook) => webhook_identity(hook),
    }
}

/// Verify that no two items share an identity.
///
/// Items without an identity are ignored. Topics are a set, so repeated topics
/// are not an error.
///
/// # Errors
/// Returns [`Error::DuplicateIdentity`] naming the first repeated key.
pub fn ensure_unique(items: &[ResourceItem]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for item in items {
        if matches!(item, ResourceItem::Topic(_)) {
            continue;
        }
        if let Some(key) = identity_of(item)
            && !seen.insert(key.clone())
        {
            return Err(Error::DuplicateIdentity {
                kind: item.kind(),
                identity: key.into_string(),
            });
        }
    }
    Ok(())
}

/// Verify that no two desired resources share an identity.
///
/// # Errors
/// Returns [`Error::DuplicateIdentity`] naming the first repeated key.
pub fn ensure_unique_resources<T: Resource>(desired: &[T]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for key in desired.iter().filter_map(Resource::identity) {
        if !seen.insert(key.clone()) {
            return Err(Error::DuplicateIdentity {
                kind: T::KIND,
                identity: key.into_string(),
            });
        }
    }
    Ok(())
}

/// Outcome of looking an identity up in the observed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match<'a, T> {
    /// No observed item has this identity.
    Absent,
    /// Exactly one observed item has this identity.
    Unique(&'a T),
    /// Several observed items share this identity.
    Ambiguous(usize),
}

/// Observed items grouped by identity.
#[derive(Debug)]
pub struct ObservedIndex<'a, T> {
    by_identity: HashMap<IdentityKey, Vec<&'a T>>,
}

impl<'a, T: Resource> ObservedIndex<'a, T> {
    /// Index `observed` by identity. Items without one are not indexed.
    #[must_use]
    pub fn new(observed: &'a [T]) -> Self {
        let mut by_identity: HashMap<IdentityKey, Vec<&'a T>> = HashMap::new();
        for item in observed {
            if let Some(key) = item.identity() {
                by_identity.entry(key).or_default().push(item);
            }
        }
        Self { by_identity }
    }

    /// Look up an identity.
    #[must_use]
    pub fn lookup(&self, key: &IdentityKey) -> Match<'a, T> {
        match self.by_identity.get(key).map(Vec::as_slice) {
            None | Some([]) => Match::Absent,
            Some([only]) => Match::Unique(*only),
            Some(many) => Match::Ambiguous(many.len()),
        }
    }
}
