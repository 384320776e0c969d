//! Tag protection rules, keyed by name pattern and addressed by id.

use wave_core::{Error, RepoRef, ResourceKind, Result, Strategy, TagProtectionConfig};
use wave_gitea::GiteaApi;

use super::{Handler, KindReport, keyed_strategy, push_keyed};
use crate::services::remote::RepoRemote;

pub struct TagProtectionsHandler;

impl TagProtectionsHandler {
    async fn observed<G: GiteaApi>(api: &G, repo: &RepoRef) -> Result<TagProtectionConfig> {
        let rules = api
            .list_tag_protections(&repo.owner, &repo.name)
            .await
            .map_err(|e| Error::fetch(ResourceKind::TagProtections, e))?;
        Ok(TagProtectionConfig { rules })
    }
}

impl Handler for TagProtectionsHandler {
    type Document = TagProtectionConfig;

    /// Ids are server-assigned and differ between repositories, so they are dropped.
    async fn pull<G: GiteaApi>(&self, api: &G, repo: &RepoRef) -> Result<TagProtectionConfig> {
        let mut config = Self::observed(api, repo).await?;
        for rule in &mut config.rules {
            rule.id = None;
        }
        Ok(config)
    }

    async fn push<G: GiteaApi>(
        &self,
        api: &G,
        repo: &RepoRef,
        desired: &TagProtectionConfig,
        strategy: Option<Strategy>,
        dry_run: bool,
    ) -> Result<KindReport> {
        let observed = Self::observed(api, repo).await?;
        push_keyed(
            &RepoRemote::new(api, repo),
            &observed.rules,
            &desired.rules,
            keyed_strategy(strategy),
            dry_run,
        )
        .await
    }
}
