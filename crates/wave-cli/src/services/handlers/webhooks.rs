//! Webhooks, keyed by delivery URL and addressed by id.

use wave_core::{Error, RepoRef, ResourceKind, Result, Strategy, WebhookConfig};
use wave_gitea::GiteaApi;

use super::{Handler, KindReport, keyed_strategy, push_keyed};
use crate::services::remote::RepoRemote;

pub struct WebhooksHandler;

impl WebhooksHandler {
    async fn observed<G: GiteaApi>(api: &G, repo: &RepoRef) -> Result<WebhookConfig> {
        let hooks = api
            .list_hooks(&repo.owner, &repo.name)
            .await
            .map_err(|e| Error::fetch(ResourceKind::Webhooks, e))?;
        Ok(WebhookConfig { hooks })
    }
}

impl Handler for WebhooksHandler {
    type Document = WebhookConfig;

    async fn pull<G: GiteaApi>(&self, api: &G, repo: &RepoRef) -> Result<WebhookConfig> {
        let mut config = Self::observed(api, repo).await?;
        for hook in &mut config.hooks {
            hook.id = None;
        }
        Ok(config)
    }

    async fn push<G: GiteaApi>(
        &self,
        api: &G,
        repo: &RepoRef,
        desired: &WebhookConfig,
        strategy: Option<Strategy>,
        dry_run: bool,
    ) -> Result<KindReport> {
        let observed = Self::observed(api, repo).await?;
        push_keyed(
            &RepoRemote::new(api, repo),
            &observed.hooks,
            &desired.hooks,
            keyed_strategy(strategy),
            dry_run,
        )
        .await
    }
}
