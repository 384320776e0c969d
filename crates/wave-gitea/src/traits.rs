//! Trait abstractions for Gitea API operations.
//!
//! This module defines the `GiteaApi` trait which abstracts Gitea API operations,
//! enabling dependency injection and testability.

use wave_core::{BranchProtection, RepoSettings, TagProtection, Webhook};

use crate::Result;
use crate::types::{Branch, ChangeFiles, ContentEntry, CreatePullRequest, PullRequest, Repository};

/// Trait for Gitea API operations.
///
/// All repository-scoped methods take `owner` and `repo` so one client can
/// serve every target repository of a push.
pub trait GiteaApi: Send + Sync {
    // === Repository ===

    /// Get a repository.
    fn get_repo(
        &self,
        owner: &str,
        repo: &str,
    ) -> impl std::future::Future<Output = Result<Repository>> + Send;

    /// Edit repository settings. Only the fields set in `settings` are sent.
    fn edit_repo(
        &self,
        owner: &str,
        repo: &str,
        settings: &RepoSettings,
    ) -> impl std::future::Future<Output = Result<Repository>> + Send;

    /// List every repository of an organization.
    fn list_org_repos(
        &self,
        org: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Repository>>> + Send;

    // === Topics ===

    /// List repository topics.
    fn list_topics(
        &self,
        owner: &str,
        repo: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;

    /// Replace all repository topics.
    fn set_topics(
        &self,
        owner: &str,
        repo: &str,
        topics: &[String],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Add one topic.
    fn add_topic(
        &self,
        owner: &str,
        repo: &str,
        topic: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    // === Branch protections ===

    /// List branch protection rules.
    fn list_branch_protections(
        &self,
        owner: &str,
        repo: &str,
    ) -> impl std::future::Future<Output = Result<Vec<BranchProtection>>> + Send;

    /// Create a branch protection rule.
    fn create_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        rule: &BranchProtection,
    ) -> impl std::future::Future<Output = Result<BranchProtection>> + Send;

    /// Edit the branch protection rule called `name`.
    fn edit_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        rule: &BranchProtection,
    ) -> impl std::future::Future<Output = Result<BranchProtection>> + Send;

    /// Delete the branch protection rule called `name`.
    fn delete_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    // === Tag protections ===

    /// List tag protection rules.
    fn list_tag_protections(
        &self,
        owner: &str,
        repo: &str,
    ) -> impl std::future::Future<Output = Result<Vec<TagProtection>>> + Send;

    /// Create a tag protection rule.
    fn create_tag_protection(
        &self,
        owner: &str,
        repo: &str,
        rule: &TagProtection,
    ) -> impl std::future::Future<Output = Result<TagProtection>> + Send;

    /// Edit a tag protection rule by id.
    fn edit_tag_protection(
        &self,
        owner: &str,
        repo: &str,
        id: u64,
        rule: &TagProtection,
    ) -> impl std::future::Future<Output = Result<TagProtection>> + Send;

    /// Delete a tag protection rule by id.
    fn delete_tag_protection(
        &self,
        owner: &str,
        repo: &str,
        id: u64,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    // === Webhooks ===

    /// List webhooks.
    fn list_hooks(
        &self,
        owner: &str,
        repo: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Webhook>>> + Send;

    /// Create a webhook.
    fn create_hook(
        &self,
        owner: &str,
        repo: &str,
        hook: &Webhook,
    ) -> impl std::future::Future<Output = Result<Webhook>> + Send;

    /// Edit a webhook by id.
    fn edit_hook(
        &self,
        owner: &str,
        repo: &str,
        id: u64,
        hook: &Webhook,
    ) -> impl std::future::Future<Output = Result<Webhook>> + Send;

    /// Delete a webhook by id.
    fn delete_hook(
        &self,
        owner: &str,
        repo: &str,
        id: u64,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    // === Contents ===

    /// Get a branch. Returns `None` if it does not exist.
    fn get_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> impl std::future::Future<Output = Result<Option<Branch>>> + Send;

    /// Get a single file at `git_ref`. Returns `None` if it does not exist.
    fn get_file(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
        path: &str,
    ) -> impl std::future::Future<Output = Result<Option<ContentEntry>>> + Send;

    /// List a directory at `git_ref`. A missing directory is empty.
    fn list_dir(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
        path: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ContentEntry>>> + Send;

    /// Commit several file changes at once.
    fn change_files(
        &self,
        owner: &str,
        repo: &str,
        request: &ChangeFiles,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Open a pull request.
    fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr: &CreatePullRequest,
    ) -> impl std::future::Future<Output = Result<PullRequest>> + Send;
}
