//! Applier: executes a plan against the remote, one operation at a time.
//!
//! Operations run strictly in plan order. The first failure stops the run for
//! that kind; operations already applied stay applied.

use std::future::Future;

use crate::error::{Error, Result};
use crate::identity::IdentityKey;
use crate::reconcile::{Operation, OperationKind, Plan, TopicOperation, TopicPlan};
use crate::resource::{Resource, ResourceKind};

/// Remote-side mutations for one keyed resource kind.
///
/// Implemented by the CLI's handlers on top of the HTTP client, and by
/// in-memory fakes in tests.
pub trait Remote<T: Resource> {
    /// Client error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create a new item.
    fn create(&self, item: &T) -> impl Future<Output = std::result::Result<(), Self::Error>> + Send;

    /// Overwrite the item with `identity`. `item` already carries the remote handle.
    fn update(
        &self,
        identity: &IdentityKey,
        item: &T,
    ) -> impl Future<Output = std::result::Result<(), Self::Error>> + Send;

    /// Delete an observed item.
    fn delete(&self, item: &T) -> impl Future<Output = std::result::Result<(), Self::Error>> + Send;
}

/// Remote-side mutations for topics.
pub trait TopicRemote {
    /// Client error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Replace the whole topic set.
    fn set_topics(
        &self,
        topics: &[String],
    ) -> impl Future<Output = std::result::Result<(), Self::Error>> + Send;

    /// Add a single topic. Must succeed if the topic already exists.
    fn add_topic(&self, topic: &str)
    -> impl Future<Output = std::result::Result<(), Self::Error>> + Send;
}

/// What an apply run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl ApplyReport {
    fn record(&mut self, kind: OperationKind) {
        match kind {
            OperationKind::Create => self.created += 1,
            OperationKind::Update => self.updated += 1,
            OperationKind::Delete => self.deleted += 1,
        }
    }

    /// Total operations applied.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.created + self.updated + self.deleted
    }
}

/// Apply `plan` through `remote`.
///
/// # Errors
/// Returns [`Error::Apply`] for the first failing operation, with counts of what
/// was applied before it and what was left unattempted.
pub async fn apply<T, R>(plan: &Plan<T>, remote: &R) -> Result<ApplyReport>
where
    T: Resource + Sync,
    R: Remote<T> + Sync,
{
    let total = plan.len();
    let mut report = ApplyReport::default();

    for (index, op) in plan.operations.iter().enumerate() {
        let outcome = match op {
            Operation::Create(item) => remote.create(item).await,
            Operation::Update { identity, item } => remote.update(identity, item).await,
            Operation::Delete { item, .. } => remote.delete(item).await,
        };

        if let Err(source) = outcome {
            return Err(Error::Apply {
                kind: T::KIND,
                operation: op.kind(),
                identity: op.label(),
                applied: index,
                remaining: total - index - 1,
                source: Box::new(source),
            });
        }

        tracing::debug!(operation = %op, "applied");
        report.record(op.kind());
    }

    Ok(report)
}

/// Apply a topic plan through `remote`.
///
/// # Errors
/// Returns [`Error::Apply`] for the first failing operation.
pub async fn apply_topics<R>(plan: &TopicPlan, remote: &R) -> Result<ApplyReport>
where
    R: TopicRemote + Sync,
{
    let total = plan.operations.len();
    let mut report = ApplyReport::default();

    for (index, op) in plan.operations.iter().enumerate() {
        let (operation, identity, outcome) = match op {
            TopicOperation::Set(topics) => (
                OperationKind::Update,
                "topics".to_string(),
                remote.set_topics(topics).await,
            ),
            TopicOperation::Add(topic) => (
                OperationKind::Create,
                topic.clone(),
                remote.add_topic(topic).await,
            ),
        };

        if let Err(source) = outcome {
            return Err(Error::Apply {
                kind: ResourceKind::Topics,
                operation,
                identity,
                applied: index,
                remaining: total - index - 1,
                source: Box::new(source),
            });
        }

        tracing::debug!(operation = %op, "applied");
        report.record(operation);
    }

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::reconcile::{reconcile, reconcile_topics};
    use crate::resource::BranchProtection;
    use crate::strategy::Strategy;

    #[derive(Debug, thiserror::Error)]
    #[error("remote refused")]
    struct Refused;

    /// Records calls and fails on the `fail_at`-th call (0-based).
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
        fail_at: Option<usize>,
    }

    impl Recorder {
        fn failing_at(index: usize) -> Self {
            Self {
                fail_at: Some(index),
                ..Self::default()
            }
        }

        fn record(&self, call: String) -> std::result::Result<(), Refused> {
            let mut calls = self.calls.lock().unwrap();
            if self.fail_at == Some(calls.len()) {
                return Err(Refused);
            }
            calls.push(call);
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Remote<BranchProtection> for Recorder {
        type Error = Refused;

        async fn create(&self, item: &BranchProtection) -> std::result::Result<(), Refused> {
            self.record(format!("create {}", item.rule_name))
        }

        async fn update(
            &self,
            identity: &IdentityKey,
            _item: &BranchProtection,
        ) -> std::result::Result<(), Refused> {
            self.record(format!("update {identity}"))
        }

        async fn delete(&self, item: &BranchProtection) -> std::result::Result<(), Refused> {
            self.record(format!("delete {}", item.rule_name))
        }
    }

    impl TopicRemote for Recorder {
        type Error = Refused;

        async fn set_topics(&self, topics: &[String]) -> std::result::Result<(), Refused> {
            self.record(format!("set {}", topics.join(",")))
        }

        async fn add_topic(&self, topic: &str) -> std::result::Result<(), Refused> {
            self.record(format!("add {topic}"))
        }
    }

    fn rule(name: &str) -> BranchProtection {
        BranchProtection {
            rule_name: name.into(),
            ..BranchProtection::default()
        }
    }

    #[tokio::test]
    async fn test_apply_runs_in_plan_order() {
        let observed = vec![rule("a"), rule("b")];
        let desired = vec![rule("c")];
        let plan = reconcile(&observed, &desired, Strategy::Replace).unwrap();

        let remote = Recorder::default();
        let report = apply(&plan, &remote).await.unwrap();

        assert_eq!(remote.calls(), vec!["delete a", "delete b", "create c"]);
        assert_eq!(report.deleted, 2);
        assert_eq!(report.created, 1);
        assert_eq!(report.total(), 3);
    }

    #[tokio::test]
    async fn test_apply_stops_at_first_failure() {
        let observed = vec![rule("a"), rule("b")];
        let desired = vec![rule("c")];
        let plan = reconcile(&observed, &desired, Strategy::Replace).unwrap();

        let remote = Recorder::failing_at(1);
        let err = apply(&plan, &remote).await.unwrap_err();

        assert_eq!(remote.calls(), vec!["delete a"]);
        match err {
            Error::Apply {
                operation,
                identity,
                applied,
                remaining,
                ..
            } => {
                assert_eq!(operation, OperationKind::Delete);
                assert_eq!(identity, "b");
                assert_eq!(applied, 1);
                assert_eq!(remaining, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_apply_empty_plan_makes_no_calls() {
        let plan = reconcile::<BranchProtection>(&[rule("a")], &[], Strategy::Append).unwrap();
        let remote = Recorder::default();
        let report = apply(&plan, &remote).await.unwrap();
        assert_eq!(report, ApplyReport::default());
        assert!(remote.calls().is_empty());
    }

    #[tokio::test]
    async fn test_apply_topics_append() {
        let observed = vec!["rust".to_string()];
        let desired = vec!["cli".to_string(), "rust".to_string(), "gitea".to_string()];
        let plan = reconcile_topics(&observed, &desired, Strategy::Append);

        let remote = Recorder::default();
        let report = apply_topics(&plan, &remote).await.unwrap();

        assert_eq!(remote.calls(), vec!["add cli", "add gitea"]);
        assert_eq!(report.created, 2);
    }

    #[tokio::test]
    async fn test_apply_topics_failure_names_topic() {
        let plan = reconcile_topics(&[], &["a".to_string(), "b".to_string()], Strategy::Append);
        let remote = Recorder::failing_at(0);
        let err = apply_topics(&plan, &remote).await.unwrap_err();
        assert!(err.to_string().starts_with("failed to create topics 'a' (0 applied, 1 not attempted)"));
    }
}
