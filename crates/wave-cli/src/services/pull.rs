//! Pull service: snapshot a repository into the local files.

use std::path::PathBuf;

use wave_core::store::save_document;
use wave_core::{Config, RepoRef, ResourceKind, Result};
use wave_gitea::GiteaApi;

use super::handlers::{
    BranchProtectionsHandler, Handler, RepoSettingsHandler, TagProtectionsHandler,
    TemplatesHandler, TopicsHandler, WebhooksHandler,
};

/// Service for pull operations with trait-based dependencies.
pub struct PullService<'a, G: GiteaApi> {
    api: &'a G,
    config: &'a Config,
    dry_run: bool,
}

#[allow(clippy::future_not_send)]
impl<'a, G: GiteaApi> PullService<'a, G> {
    /// Create a new pull service.
    #[must_use]
    pub const fn new(api: &'a G, config: &'a Config) -> Self {
        Self {
            api,
            config,
            dry_run: false,
        }
    }

    /// Fetch without writing any local file.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Pull every enabled kind of `repo`. Returns the files written, in kind order.
    /// In dry-run mode these are the files that would have been written.
    ///
    /// # Errors
    /// Returns the first fetch or write failure; files written before it stay.
    pub async fn pull(&self, repo: &RepoRef) -> Result<Vec<(ResourceKind, PathBuf)>> {
        let mut written = Vec::new();
        for kind in self.config.pull.kinds() {
            let path = match kind {
                ResourceKind::RepoSettings => self.run(&RepoSettingsHandler, repo).await?,
                ResourceKind::Topics => self.run(&TopicsHandler, repo).await?,
                ResourceKind::BranchProtections => {
                    self.run(&BranchProtectionsHandler, repo).await?
                }
                ResourceKind::TagProtections => self.run(&TagProtectionsHandler, repo).await?,
                ResourceKind::Webhooks => self.run(&WebhooksHandler, repo).await?,
                ResourceKind::Templates => self.run(&TemplatesHandler, repo).await?,
            };
            written.push((kind, path));
        }
        Ok(written)
    }

    async fn run<H: Handler>(&self, handler: &H, repo: &RepoRef) -> Result<PathBuf> {
        let document = handler.pull(self.api, repo).await?;
        let path = handler.path(self.config);
        if self.dry_run {
            tracing::debug!(path = %path.display(), "dry run, not writing");
        } else {
            save_document(&path, &document)?;
        }
        Ok(path)
    }
}
