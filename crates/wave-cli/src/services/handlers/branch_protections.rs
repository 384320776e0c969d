//! Branch protection rules, keyed by rule name.

use wave_core::{BranchProtectionConfig, Error, RepoRef, ResourceKind, Result, Strategy};
use wave_gitea::GiteaApi;

use super::{Handler, KindReport, keyed_strategy, push_keyed};
use crate::services::remote::RepoRemote;

pub struct BranchProtectionsHandler;

impl Handler for BranchProtectionsHandler {
    type Document = BranchProtectionConfig;

    async fn pull<G: GiteaApi>(&self, api: &G, repo: &RepoRef) -> Result<BranchProtectionConfig> {
        let rules = api
            .list_branch_protections(&repo.owner, &repo.name)
            .await
            .map_err(|e| Error::fetch(ResourceKind::BranchProtections, e))?;
        Ok(BranchProtectionConfig { rules })
    }

    async fn push<G: GiteaApi>(
        &self,
        api: &G,
        repo: &RepoRef,
        desired: &BranchProtectionConfig,
        strategy: Option<Strategy>,
        dry_run: bool,
    ) -> Result<KindReport> {
        let observed = self.pull(api, repo).await?;
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
