//! Repository settings: a singleton, pushed as a partial edit of the fields
//! that differ.

use wave_core::identity::REPOSITORY_IDENTITY;
use wave_core::{
    Error, OperationKind, RepoRef, RepoSettings, ResourceKind, Result, Strategy,
};
use wave_gitea::GiteaApi;

use super::{Handler, KindReport, PlannedChange};

pub struct RepoSettingsHandler;

impl Handler for RepoSettingsHandler {
    type Document = RepoSettings;

    async fn pull<G: GiteaApi>(&self, api: &G, repo: &RepoRef) -> Result<RepoSettings> {
        let remote = api
            .get_repo(&repo.owner, &repo.name)
            .await
            .map_err(|e| Error::fetch(ResourceKind::RepoSettings, e))?;
        Ok(remote.settings)
    }

    async fn push<G: GiteaApi>(
        &self,
        api: &G,
        repo: &RepoRef,
        desired: &RepoSettings,
        _strategy: Option<Strategy>,
        dry_run: bool,
    ) -> Result<KindReport> {
        let observed = self.pull(api, repo).await?;
        let changes = desired.changes_from(&observed);

        let mut report = KindReport::new(ResourceKind::RepoSettings, None);
        if changes.is_empty() {
            return Ok(report);
        }

        let fields = changed_fields(&changes)?;
        report.planned.push(PlannedChange::new(
            OperationKind::Update,
            format!("{REPOSITORY_IDENTITY} ({})", fields.join(", ")),
        ));
        if dry_run {
            return Ok(report);
        }

        api.edit_repo(&repo.owner, &repo.name, &changes)
            .await
            .map_err(|e| Error::Apply {
                kind: ResourceKind::RepoSettings,
                operation: OperationKind::Update,
                identity: REPOSITORY_IDENTITY.to_string(),
                applied: 0,
                remaining: 0,
                source: Box::new(e),
            })?;
        tracing::debug!(repo = %repo, fields = ?fields, "edited repository settings");
        report.applied.updated = 1;
        Ok(report)
    }
}

/// Names of the fields set in `changes`, in declaration order.
fn changed_fields(changes: &RepoSettings) -> Result<Vec<String>> {
    let value = serde_yaml::to_value(changes)?;
    Ok(value
        .as_mapping()
        .map(|mapping| {
            mapping
                .keys()
                .filter_map(|key| key.as_str().map(ToString::to_string))
                .collect()
        })
        .unwrap_or_default())
}
