//! One handler per resource kind.
//!
//! A handler knows where its local file lives, how to read the observed state
//! from Gitea, and how to push a desired document through the reconciliation
//! engine. Runners sequence handlers; handlers never call each other.

use std::future::Future;
use std::path::PathBuf;

use wave_core::store::load_document;
use wave_core::{
    ApplyReport, Config, Document, OperationKind, Plan, Remote, RepoRef, Resource, ResourceKind,
    Result, Strategy, apply, reconcile,
};
use wave_gitea::GiteaApi;

mod branch_protections;
mod repo_settings;
mod tag_protections;
mod templates;
mod topics;
mod webhooks;

pub use branch_protections::BranchProtectionsHandler;
pub use repo_settings::RepoSettingsHandler;
pub use tag_protections::TagProtectionsHandler;
pub use templates::TemplatesHandler;
pub use topics::TopicsHandler;
pub use webhooks::WebhooksHandler;

/// Pull, push, and locate one resource kind.
pub trait Handler {
    /// Shape of the local file.
    type Document: Document;

    /// Kind handled.
    fn kind(&self) -> ResourceKind {
        <Self::Document as Document>::KIND
    }

    /// Path of the local file.
    fn path(&self, config: &Config) -> PathBuf {
        config.file_path(self.kind())
    }

    /// Load the local file. `None` if it doesn't exist.
    ///
    /// # Errors
    /// Returns error if the file exists but can't be read or parsed.
    fn load(&self, config: &Config) -> Result<Option<Self::Document>> {
        let path = self.path(config);
        if !path.exists() {
            return Ok(None);
        }
        load_document(&path).map(Some)
    }

    /// Read the observed state of `repo` as a document.
    fn pull<G: GiteaApi>(
        &self,
        api: &G,
        repo: &RepoRef,
    ) -> impl Future<Output = Result<Self::Document>>;

    /// Reconcile `repo` towards `desired`.
    ///
    /// `strategy` is already validated; kinds without a strategy get `None`.
    fn push<G: GiteaApi>(
        &self,
        api: &G,
        repo: &RepoRef,
        desired: &Self::Document,
        strategy: Option<Strategy>,
        dry_run: bool,
    ) -> impl Future<Output = Result<KindReport>>;
}

/// One operation as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChange {
    pub operation: OperationKind,
    pub description: String,
}

impl PlannedChange {
    pub fn new(operation: OperationKind, description: impl Into<String>) -> Self {
        Self {
            operation,
            description: description.into(),
        }
    }
}

/// Outcome of pushing one kind to one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindReport {
    pub kind: ResourceKind,
    pub strategy: Option<Strategy>,
    pub planned: Vec<PlannedChange>,
    pub applied: ApplyReport,
    /// Identities skipped because several observed items share them.
    pub ambiguous: Vec<String>,
    /// Why the kind was not pushed at all.
    pub skipped: Option<String>,
    /// Pull request opened for the change, if any.
    pub link: Option<String>,
}

impl KindReport {
    #[must_use]
    pub fn new(kind: ResourceKind, strategy: Option<Strategy>) -> Self {
        Self {
            kind,
            strategy,
            planned: Vec::new(),
            applied: ApplyReport::default(),
            ambiguous: Vec::new(),
            skipped: None,
            link: None,
        }
    }

    #[must_use]
    pub fn skipped(kind: ResourceKind, reason: impl Into<String>) -> Self {
        Self {
            skipped: Some(reason.into()),
            ..Self::new(kind, None)
        }
    }

    /// Whether nothing needed to change.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.planned.is_empty()
    }
}

/// Plan and apply a keyed kind.
#[allow(clippy::future_not_send)]
async fn push_keyed<T, R>(
    remote: &R,
    observed: &[T],
    desired: &[T],
    strategy: Strategy,
    dry_run: bool,
) -> Result<KindReport>
where
    T: Resource + Sync,
    R: Remote<T> + Sync,
{
    let plan: Plan<T> = reconcile(observed, desired, strategy)?;

    let mut report = KindReport::new(T::KIND, Some(strategy));
    report.planned = plan
        .operations
        .iter()
        .map(|op| PlannedChange::new(op.kind(), op.label()))
        .collect();
    report.ambiguous = plan.ambiguous.iter().map(ToString::to_string).collect();

    if !dry_run && !plan.is_empty() {
        report.applied = apply(&plan, remote).await?;
    }
    Ok(report)
}

/// Strategy for a keyed kind; the runner resolves it before calling the handler.
fn keyed_strategy(strategy: Option<Strategy>) -> Strategy {
    strategy.unwrap_or_default()
}
