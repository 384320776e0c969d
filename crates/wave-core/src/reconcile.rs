//! Reconciliation engine.
//!
//! Turns an observed set and a desired set into an ordered list of operations
//! according to a [`Strategy`]. Planning is pure: nothing here talks to the remote,
//! and the observed set is never modified.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::Result;
use crate::identity::{self, IdentityKey, Match, ObservedIndex};
use crate::resource::Resource;
use crate::strategy::Strategy;

/// The three kinds of change an operation can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Create a new remote item.
    Create,
    /// Edit an existing remote item in place.
    Update,
    /// Remove a remote item.
    Delete,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// A single planned change.
///
/// `Update` and `Delete` carry the observed item so the applier can address it
/// on the remote (e.g. by webhook id).
#[derive(Debug, Clone, PartialEq)]
pub enum Operation<T> {
    /// Create `item`.
    Create(T),
    /// Overwrite the remote item with this identity.
    Update {
        /// Identity shared by the desired and observed item.
        identity: IdentityKey,
        /// Desired fields merged onto the observed item.
        item: T,
    },
    /// Remove an observed item.
    Delete {
        /// Identity of the observed item, if it has one.
        identity: Option<IdentityKey>,
        /// The observed item.
        item: T,
    },
}

impl<T: Resource> Operation<T> {
    /// Which kind of change this is.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Create(_) => OperationKind::Create,
            Self::Update { .. } => OperationKind::Update,
            Self::Delete { .. } => OperationKind::Delete,
        }
    }

    /// The item sent to (or removed from) the remote.
    #[must_use]
    pub const fn item(&self) -> &T {
        match self {
            Self::Create(item) | Self::Update { item, .. } | Self::Delete { item, .. } => item,
        }
    }

    /// Identity used in messages; unkeyed items are shown as `<unnamed>`.
    #[must_use]
    pub fn label(&self) -> String {
        let identity = match self {
            Self::Create(item) => item.identity(),
            Self::Update { identity, .. } => Some(identity.clone()),
            Self::Delete { identity, .. } => identity.clone(),
        };
        identity.map_or_else(|| "<unnamed>".to_string(), IdentityKey::into_string)
    }
}

impl<T: Resource> fmt::Display for Operation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} '{}'", self.kind(), T::KIND, self.label())
    }
}

/// Ordered operations for one resource kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan<T> {
    /// Strategy the plan was computed with.
    pub strategy: Strategy,
    /// Operations in the order they must be applied.
    pub operations: Vec<Operation<T>>,
    /// Desired identities skipped because several observed items share them.
    pub ambiguous: Vec<IdentityKey>,
}

impl<T: Resource> Plan<T> {
    /// Check if the plan has nothing to apply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Number of operations of the given kind.
    #[must_use]
    pub fn count(&self, kind: OperationKind) -> usize {
        self.operations.iter().filter(|op| op.kind() == kind).count()
    }
}

/// Compute the operations that bring `observed` to `desired` under `strategy`.
///
/// - `Replace` deletes every observed item (in observed order) and then creates
///   every desired item (in desired order).
/// - `Append` creates desired items whose identity is not observed.
/// - `Merge` updates desired items whose identity is observed exactly once and
///   creates the rest; remote-only items are kept.
///
/// Desired items without an identity are always created. Identities observed more
/// than once are ambiguous: the matching desired items are skipped and recorded in
/// [`Plan::ambiguous`].
///
/// # Errors
/// Returns [`crate::Error::DuplicateIdentity`] if two desired items share an identity.
pub fn reconcile<T: Resource>(observed: &[T], desired: &[T], strategy: Strategy) -> Result<Plan<T>> {
    identity::ensure_unique_resources(desired)?;

    let mut plan = Plan {
        strategy,
        operations: Vec::new(),
        ambiguous: Vec::new(),
    };

    if strategy == Strategy::Replace {
        plan.operations.extend(observed.iter().map(|item| Operation::Delete {
            identity: item.identity(),
            item: item.clone(),
        }));
        plan.operations
            .extend(desired.iter().cloned().map(Operation::Create));
        log_plan(&plan);
        return Ok(plan);
    }

    let index = ObservedIndex::new(observed);
    for item in desired {
        let Some(key) = item.identity() else {
            plan.operations.push(Operation::Create(item.clone()));
            continue;
        };

        match index.lookup(&key) {
            Match::Absent => plan.operations.push(Operation::Create(item.clone())),
            Match::Ambiguous(count) => {
                tracing::warn!(
                    kind = %T::KIND,
                    identity = %key,
                    count,
                    "skipping ambiguous identity shared by several remote items"
                );
                plan.ambiguous.push(key);
            }
            Match::Unique(current) => {
                if strategy == Strategy::Merge {
                    let merged = item.merge_onto(current);
                    if merged != *current {
                        plan.operations.push(Operation::Update {
                            identity: key,
                            item: merged,
                        });
                    }
                }
            }
        }
    }

    log_plan(&plan);
    Ok(plan)
}

fn log_plan<T: Resource>(plan: &Plan<T>) {
    tracing::debug!(
        kind = %T::KIND,
        strategy = %plan.strategy,
        create = plan.count(OperationKind::Create),
        update = plan.count(OperationKind::Update),
        delete = plan.count(OperationKind::Delete),
        ambiguous = plan.ambiguous.len(),
        "computed plan"
    );
}

// === Topics ===

/// A change to the repository's topic set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicOperation {
    /// Replace the whole topic set.
    Set(Vec<String>),
    /// Add one topic; an already existing topic counts as success.
    Add(String),
}

impl fmt::Display for TopicOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set(topics) if topics.is_empty() => write!(f, "clear topics"),
            Self::Set(topics) => write!(f, "set topics to [{}]", topics.join(", ")),
            Self::Add(topic) => write!(f, "add topic '{topic}'"),
        }
    }
}

/// Topic changes for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPlan {
    /// Strategy the plan was computed with.
    pub strategy: Strategy,
    /// Operations in application order.
    pub operations: Vec<TopicOperation>,
}

impl TopicPlan {
    /// Check if the plan has nothing to apply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// The topic set the remote ends up with once the plan is applied to `observed`.
    #[must_use]
    pub fn outcome(&self, observed: &[String]) -> BTreeSet<String> {
        let mut topics = normalize(observed);
        for op in &self.operations {
            match op {
                TopicOperation::Set(all) => topics = all.iter().cloned().collect(),
                TopicOperation::Add(topic) => {
                    topics.insert(topic.clone());
                }
            }
        }
        topics
    }
}

/// Topics are compared the way the remote stores them: trimmed and lowercase.
fn normalize(topics: &[String]) -> BTreeSet<String> {
    topics
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Compute topic changes.
///
/// - `Merge` sets the remote to the union of observed and desired topics.
/// - `Replace` sets the remote to exactly the desired topics.
/// - `Append` adds each missing desired topic individually.
///
/// Nothing is planned when the outcome equals the observed set.
#[must_use]
pub fn reconcile_topics(observed: &[String], desired: &[String], strategy: Strategy) -> TopicPlan {
    let current = normalize(observed);
    let wanted = normalize(desired);

    let operations = match strategy {
        Strategy::Merge => {
            let union: BTreeSet<String> = current.union(&wanted).cloned().collect();
            if union == current {
                Vec::new()
            } else {
                vec![TopicOperation::Set(union.into_iter().collect())]
            }
        }
        Strategy::Replace => {
            if wanted == current {
                Vec::new()
            } else {
                vec![TopicOperation::Set(wanted.into_iter().collect())]
            }
        }
        Strategy::Append => wanted
            .difference(&current)
            .cloned()
            .map(TopicOperation::Add)
            .collect(),
    };

    TopicPlan {
        strategy,
        operations,
    }
}
