//! Push service: reconcile every target repository with the local files.

use wave_core::targets::{self, RepoRef};
use wave_core::{Config, Error, ResourceKind, Result};
use wave_gitea::GiteaApi;

use super::handlers::{
    BranchProtectionsHandler, Handler, KindReport, RepoSettingsHandler, TagProtectionsHandler,
    TemplatesHandler, TopicsHandler, WebhooksHandler,
};

/// Options for a push run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PushOptions {
    /// Plan only; never call a mutating endpoint.
    pub dry_run: bool,
    /// Record failures and continue with the next kind and repository.
    pub keep_going: bool,
}

/// Reports for one repository, in push order.
#[derive(Debug)]
pub struct RepoReport {
    pub repo: RepoRef,
    pub kinds: Vec<KindReport>,
}

/// A kind that failed for a repository.
#[derive(Debug)]
pub struct Failure {
    pub repo: RepoRef,
    pub kind: ResourceKind,
    pub error: Error,
}

/// Outcome of a push run.
#[derive(Debug, Default)]
pub struct PushSummary {
    pub repos: Vec<RepoReport>,
    pub failures: Vec<Failure>,
}

impl PushSummary {
    /// Check if every kind of every repository went through.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Service for push operations with trait-based dependencies.
pub struct PushService<'a, G: GiteaApi> {
    api: &'a G,
    config: &'a Config,
    options: PushOptions,
}

#[allow(clippy::future_not_send)]
impl<'a, G: GiteaApi> PushService<'a, G> {
    /// Create a new push service.
    #[must_use]
    pub const fn new(api: &'a G, config: &'a Config, options: PushOptions) -> Self {
        Self {
            api,
            config,
            options,
        }
    }

    /// Resolve the repositories to push to.
    ///
    /// Explicit `repos` win; otherwise autodiscovery (if enabled) and the
    /// configured list are combined.
    ///
    /// # Errors
    /// Returns error if autodiscovery fails or no valid target remains.
    pub async fn resolve_targets(&self, repos: &[String]) -> Result<Vec<RepoRef>> {
        let settings = &self.config.targets;
        let mut discovered = Vec::new();

        if repos.is_empty() && settings.autodiscover {
            if settings.organization.trim().is_empty() {
                return Err(Error::Config(
                    "autodiscover is enabled but organization is not set".into(),
                ));
            }
            let org_repos = self
                .api
                .list_org_repos(&settings.organization)
                .await
                .map_err(|e| {
                    Error::Config(format!(
                        "failed to list repositories of {}: {e}",
                        settings.organization
                    ))
                })?;
            let names: Vec<&str> = org_repos
                .iter()
                .filter(|repo| !repo.archived)
                .map(|repo| repo.name.as_str())
                .collect();
            discovered = targets::discover(
                &settings.organization,
                &names,
                &settings.autodiscover_filter,
            );
            tracing::debug!(
                organization = %settings.organization,
                found = org_repos.len(),
                matched = discovered.len(),
                "autodiscovered repositories"
            );
        }

        targets::resolve_targets(repos, &discovered, settings)
    }

    /// Push every enabled kind to every target.
    ///
    /// Stops at the first failure unless `keep_going` is set.
    pub async fn push_all(&self, targets: &[RepoRef]) -> PushSummary {
        let mut summary = PushSummary::default();

        for repo in targets {
            let mut report = RepoReport {
                repo: repo.clone(),
                kinds: Vec::new(),
            };

            for kind in self.config.push.kinds() {
                match self.push_kind(kind, repo).await {
                    Ok(kind_report) => report.kinds.push(kind_report),
                    Err(error) => {
                        tracing::warn!(repo = %repo, kind = %kind, error = %error, "push failed");
                        summary.failures.push(Failure {
                            repo: repo.clone(),
                            kind,
                            error,
                        });
                        if !self.options.keep_going {
                            summary.repos.push(report);
                            return summary;
                        }
                    }
                }
            }

            summary.repos.push(report);
        }

        summary
    }

    /// Push one kind to one repository. Repository settings must go first so
    /// a default-branch rename lands before protections reference it.
    pub async fn push_kind(&self, kind: ResourceKind, repo: &RepoRef) -> Result<KindReport> {
        match kind {
            ResourceKind::RepoSettings => self.run(&RepoSettingsHandler, repo).await,
            ResourceKind::Topics => self.run(&TopicsHandler, repo).await,
            ResourceKind::BranchProtections => self.run(&BranchProtectionsHandler, repo).await,
            ResourceKind::TagProtections => self.run(&TagProtectionsHandler, repo).await,
            ResourceKind::Webhooks => self.run(&WebhooksHandler, repo).await,
            ResourceKind::Templates => self.run(&TemplatesHandler, repo).await,
        }
    }

    async fn run<H: Handler>(&self, handler: &H, repo: &RepoRef) -> Result<KindReport> {
        let kind = handler.kind();
        // Resolved before anything touches the remote.
        let strategy = self.config.strategy_for(kind)?;

        let Some(desired) = handler.load(self.config)? else {
            let path = handler.path(self.config);
            tracing::debug!(kind = %kind, path = %path.display(), "no local file");
            return Ok(KindReport::skipped(
                kind,
                format!("{} not found", path.display()),
            ));
        };

        handler
            .push(self.api, repo, &desired, strategy, self.options.dry_run)
            .await
    }
}
