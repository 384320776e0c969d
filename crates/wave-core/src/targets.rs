//! Target repository resolution.
//!
//! Command-line repositories win outright. Otherwise the target list is the
//! autodiscovered repositories followed by the configured ones, deduplicated
//! case-insensitively, minus the excluded ones.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::config::TargetsConfig;
use crate::error::{Error, Result};

/// An `owner/name` repository reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Parse `owner/name`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRepo`] unless the input is exactly two non-empty
    /// segments separated by `/`.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        match trimmed.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(Error::InvalidRepo(input.to_string())),
        }
    }

    /// Lowercased `owner/name`, used for comparisons.
    fn key(&self) -> String {
        format!("{}/{}", self.owner, self.name).to_lowercase()
    }
}

impl FromStr for RepoRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Check if `name` matches `filter`, where `*` matches any run of characters.
///
/// An empty filter matches everything. Matching is case-insensitive.
#[must_use]
pub fn matches_filter(filter: &str, name: &str) -> bool {
    let filter = filter.trim().to_lowercase();
    if filter.is_empty() {
        return true;
    }
    let name = name.to_lowercase();

    let parts: Vec<&str> = filter.split('*').collect();
    let Some((first, rest)) = parts.split_first() else {
        return false;
    };
    let Some(mut remaining) = name.strip_prefix(first) else {
        return false;
    };

    let Some((last, middle)) = rest.split_last() else {
        // No wildcard: exact match.
        return remaining.is_empty();
    };

    for part in middle {
        match remaining.find(part) {
            Some(pos) => remaining = &remaining[pos + part.len()..],
            None => return false,
        }
    }
    remaining.ends_with(last)
}

/// Repositories of `organization` whose names match `filter`, as `org/name`.
#[must_use]
pub fn discover<S: AsRef<str>>(organization: &str, names: &[S], filter: &str) -> Vec<String> {
    names
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| matches_filter(filter, name))
        .map(|name| format!("{organization}/{name}"))
        .collect()
}

/// Resolve the final target list.
///
/// `discovered` holds the autodiscovered repositories (empty when autodiscovery
/// is off); it is ignored when `cli` is non-empty.
///
/// # Errors
/// Returns [`Error::InvalidRepo`] for malformed entries and [`Error::Config`]
/// when the resulting list is empty.
pub fn resolve_targets(
    cli: &[String],
    discovered: &[String],
    config: &TargetsConfig,
) -> Result<Vec<RepoRef>> {
    let targets = if cli.is_empty() {
        let candidates = dedupe(discovered.iter().chain(&config.repos))?;
        let excluded: HashSet<String> = config
            .exclude_repos
            .iter()
            .map(|repo| repo.trim().to_lowercase())
            .collect();
        candidates
            .into_iter()
            .filter(|repo| !excluded.contains(&repo.key()))
            .collect()
    } else {
        dedupe(cli)?
    };

    if targets.is_empty() {
        return Err(Error::Config(
            "no target repositories (pass owner/repo arguments or configure targets)".into(),
        ));
    }
    tracing::debug!(count = targets.len(), "resolved target repositories");
    Ok(targets)
}

/// Parse and deduplicate case-insensitively, keeping the first spelling.
fn dedupe<'a>(repos: impl IntoIterator<Item = &'a String>) -> Result<Vec<RepoRef>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for repo in repos {
        let parsed = RepoRef::parse(repo)?;
        if seen.insert(parsed.key()) {
            out.push(parsed);
        }
    }
    Ok(out)
}
