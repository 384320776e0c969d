//! Adapters from [`GiteaApi`] to the reconciliation engine's remote traits.

use std::future::Future;

use wave_core::{
    BranchProtection, IdentityKey, Remote, RepoRef, Resource, ResourceKind, TagProtection,
    TopicRemote, Webhook,
};
use wave_gitea::GiteaApi;

/// Errors raised while applying an operation.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error(transparent)]
    Api(#[from] wave_gitea::Error),

    /// Observed item lacks the id the API addresses it by.
    #[error("{kind} item has no remote id")]
    MissingHandle { kind: ResourceKind },
}

type RemoteResult = Result<(), RemoteError>;

/// One repository seen through the API.
pub struct RepoRemote<'a, G: GiteaApi> {
    api: &'a G,
    repo: &'a RepoRef,
}

impl<'a, G: GiteaApi> RepoRemote<'a, G> {
    #[must_use]
    pub const fn new(api: &'a G, repo: &'a RepoRef) -> Self {
        Self { api, repo }
    }

    fn owner(&self) -> &str {
        &self.repo.owner
    }

    fn name(&self) -> &str {
        &self.repo.name
    }
}

fn remote_id<T: Resource>(id: Option<u64>) -> Result<u64, RemoteError> {
    id.ok_or(RemoteError::MissingHandle { kind: T::KIND })
}

/// Branch protections are addressed by rule name; older servers only set the branch name.
fn rule_name(rule: &BranchProtection) -> Result<&str, RemoteError> {
    [rule.rule_name.as_str(), rule.branch_name.as_str()]
        .into_iter()
        .find(|name| !name.is_empty())
        .ok_or(RemoteError::MissingHandle {
            kind: BranchProtection::KIND,
        })
}

impl<G: GiteaApi> Remote<BranchProtection> for RepoRemote<'_, G> {
    type Error = RemoteError;

    fn create(&self, item: &BranchProtection) -> impl Future<Output = RemoteResult> + Send {
        async move {
            self.api
                .create_branch_protection(self.owner(), self.name(), item)
                .await?;
            Ok(())
        }
    }

    fn update(
        &self,
        identity: &IdentityKey,
        item: &BranchProtection,
    ) -> impl Future<Output = RemoteResult> + Send {
        async move {
            let name = rule_name(item).unwrap_or(identity.as_str());
            self.api
                .edit_branch_protection(self.owner(), self.name(), name, item)
                .await?;
            Ok(())
        }
    }

    fn delete(&self, item: &BranchProtection) -> impl Future<Output = RemoteResult> + Send {
        async move {
            let name = rule_name(item)?;
            self.api
                .delete_branch_protection(self.owner(), self.name(), name)
                .await?;
            Ok(())
        }
    }
}

impl<G: GiteaApi> Remote<TagProtection> for RepoRemote<'_, G> {
    type Error = RemoteError;

    fn create(&self, item: &TagProtection) -> impl Future<Output = RemoteResult> + Send {
        async move {
            self.api
                .create_tag_protection(self.owner(), self.name(), item)
                .await?;
            Ok(())
        }
    }

    fn update(
        &self,
        _identity: &IdentityKey,
        item: &TagProtection,
    ) -> impl Future<Output = RemoteResult> + Send {
        async move {
            let id = remote_id::<TagProtection>(item.id)?;
            self.api
                .edit_tag_protection(self.owner(), self.name(), id, item)
                .await?;
            Ok(())
        }
    }

    fn delete(&self, item: &TagProtection) -> impl Future<Output = RemoteResult> + Send {
        async move {
            let id = remote_id::<TagProtection>(item.id)?;
            self.api
                .delete_tag_protection(self.owner(), self.name(), id)
                .await?;
            Ok(())
        }
    }
}

impl<G: GiteaApi> Remote<Webhook> for RepoRemote<'_, G> {
    type Error = RemoteError;

    fn create(&self, item: &Webhook) -> impl Future<Output = RemoteResult> + Send {
        async move {
            self.api.create_hook(self.owner(), self.name(), item).await?;
            Ok(())
        }
    }

    fn update(
        &self,
        _identity: &IdentityKey,
        item: &Webhook,
    ) -> impl Future<Output = RemoteResult> + Send {
        async move {
            let id = remote_id::<Webhook>(item.id)?;
            self.api
                .edit_hook(self.owner(), self.name(), id, item)
                .await?;
            Ok(())
        }
    }

    fn delete(&self, item: &Webhook) -> impl Future<Output = RemoteResult> + Send {
        async move {
            let id = remote_id::<Webhook>(item.id)?;
            self.api.delete_hook(self.owner(), self.name(), id).await?;
            Ok(())
        }
    }
}

impl<G: GiteaApi> TopicRemote for RepoRemote<'_, G> {
    type Error = RemoteError;

    fn set_topics(&self, topics: &[String]) -> impl Future<Output = RemoteResult> + Send {
        async move {
            self.api
                .set_topics(self.owner(), self.name(), topics)
                .await?;
            Ok(())
        }
    }

    fn add_topic(&self, topic: &str) -> impl Future<Output = RemoteResult> + Send {
        async move {
            self.api.add_topic(self.owner(), self.name(), topic).await?;
            Ok(())
        }
    }
}
