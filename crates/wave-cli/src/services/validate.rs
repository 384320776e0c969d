//! Validate service: check configuration and local files offline.

use wave_core::identity::ensure_unique;
use wave_core::targets::RepoRef;
use wave_core::{Config, Document, Error, ResourceKind};

use super::handlers::{
    BranchProtectionsHandler, Handler, RepoSettingsHandler, TagProtectionsHandler,
    TemplatesHandler, TopicsHandler, WebhooksHandler,
};

/// Result of checking one kind.
#[derive(Debug)]
pub enum CheckOutcome {
    /// File parsed; holds the number of items.
    Valid { items: usize },
    /// No local file.
    Missing,
    /// Unreadable file, duplicate identity, or bad strategy.
    Invalid(Error),
}

#[derive(Debug)]
pub struct KindCheck {
    pub kind: ResourceKind,
    pub outcome: CheckOutcome,
}

/// Service for validation. Never talks to the remote.
pub struct ValidateService<'a> {
    config: &'a Config,
}

impl<'a> ValidateService<'a> {
    #[must_use]
    pub const fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Problems with the configuration file itself.
    #[must_use]
    pub fn check_config(&self) -> Vec<Error> {
        let mut problems = Vec::new();
        if let Err(e) = self.config.validate() {
            problems.push(e);
        }
        let targets = &self.config.targets;
        for repo in targets.repos.iter().chain(&targets.exclude_repos) {
            if let Err(e) = RepoRef::parse(repo) {
                problems.push(e);
            }
        }
        problems
    }

    /// Check the local file of every kind enabled for push.
    #[must_use]
    pub fn check_files(&self) -> Vec<KindCheck> {
        self.config
            .push
            .kinds()
            .into_iter()
            .map(|kind| KindCheck {
                kind,
                outcome: self.check_kind(kind),
            })
            .collect()
    }

    fn check_kind(&self, kind: ResourceKind) -> CheckOutcome {
        match kind {
            ResourceKind::RepoSettings => self.check(&RepoSettingsHandler),
            ResourceKind::Topics => self.check(&TopicsHandler),
            ResourceKind::BranchProtections => self.check(&BranchProtectionsHandler),
            ResourceKind::TagProtections => self.check(&TagProtectionsHandler),
            ResourceKind::Webhooks => self.check(&WebhooksHandler),
            ResourceKind::Templates => self.check(&TemplatesHandler),
        }
    }

    fn check<H: Handler>(&self, handler: &H) -> CheckOutcome {
        if let Err(e) = self.config.strategy_for(handler.kind()) {
            return CheckOutcome::Invalid(e);
        }
        match handler.load(self.config) {
            Ok(None) => CheckOutcome::Missing,
            Ok(Some(document)) => {
                let items = document.items();
                match ensure_unique(&items) {
                    Ok(()) => CheckOutcome::Valid { items: items.len() },
                    Err(e) => CheckOutcome::Invalid(e),
                }
            }
            Err(e) => CheckOutcome::Invalid(e),
        }
    }
}
