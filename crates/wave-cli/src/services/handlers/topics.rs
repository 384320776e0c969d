//! Topics: a flat set, reconciled with set/add calls instead of per-item CRUD.

use wave_core::{
    Error, OperationKind, RepoRef, ResourceKind, Result, Strategy, TopicOperation, TopicsConfig,
    apply_topics, reconcile_topics,
};
use wave_gitea::GiteaApi;

use super::{Handler, KindReport, PlannedChange};
use crate::services::remote::RepoRemote;

pub struct TopicsHandler;

impl Handler for TopicsHandler {
    type Document = TopicsConfig;

    async fn pull<G: GiteaApi>(&self, api: &G, repo: &RepoRef) -> Result<TopicsConfig> {
        let topics = api
            .list_topics(&repo.owner, &repo.name)
            .await
            .map_err(|e| Error::fetch(ResourceKind::Topics, e))?;
        Ok(TopicsConfig { topics })
    }

    async fn push<G: GiteaApi>(
        &self,
        api: &G,
        repo: &RepoRef,
        desired: &TopicsConfig,
        strategy: Option<Strategy>,
        dry_run: bool,
    ) -> Result<KindReport> {
        let strategy = super::keyed_strategy(strategy);
        let observed = self.pull(api, repo).await?;
        let plan = reconcile_topics(&observed.topics, &desired.topics, strategy);

        let mut report = KindReport::new(ResourceKind::Topics, Some(strategy));
        report.planned = plan
            .operations
            .iter()
            .map(|op| match op {
                TopicOperation::Set(topics) => {
                    PlannedChange::new(OperationKind::Update, format!("[{}]", topics.join(", ")))
                }
                TopicOperation::Add(topic) => PlannedChange::new(OperationKind::Create, topic),
            })
            .collect();

        if !dry_run && !plan.is_empty() {
            report.applied = apply_topics(&plan, &RepoRemote::new(api, repo)).await?;
        }
        Ok(report)
    }
}
