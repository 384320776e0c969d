//! Issue and pull request templates.
//!
//! Templates are files, not API objects: a push commits the differing files to
//! a dedicated branch and opens a pull request instead of editing in place.

use std::collections::HashMap;

use wave_core::templates::{
    self, FileChange, FileOperation, ISSUE_CONFIG_FILES, ISSUE_TEMPLATE_DIRS, ISSUE_TEMPLATE_FILES,
    PR_TEMPLATE_FILES, RemoteFile, TemplateFile, UPDATE_BRANCH, UPDATE_DESCRIPTION, UPDATE_TITLE,
};
use wave_core::{Error, OperationKind, RepoRef, ResourceKind, Result, Strategy, TemplatesConfig};
use wave_gitea::{ChangeFiles, ContentEntry, CreatePullRequest, GiteaApi};

use super::{Handler, KindReport, PlannedChange};

const KIND: ResourceKind = ResourceKind::Templates;

pub struct TemplatesHandler;

impl TemplatesHandler {
    async fn default_branch<G: GiteaApi>(api: &G, repo: &RepoRef) -> Result<String> {
        let remote = api
            .get_repo(&repo.owner, &repo.name)
            .await
            .map_err(|e| Error::fetch(KIND, e))?;
        Ok(remote.default_branch().to_string())
    }

    async fn read_file<G: GiteaApi>(
        api: &G,
        repo: &RepoRef,
        git_ref: &str,
        path: &str,
    ) -> Result<Option<(ContentEntry, String)>> {
        let Some(entry) = api
            .get_file(&repo.owner, &repo.name, git_ref, path)
            .await
            .map_err(|e| Error::fetch(KIND, e))?
        else {
            return Ok(None);
        };
        if !entry.is_file() {
            return Ok(None);
        }
        let content = entry.decoded_content().map_err(|e| Error::fetch(KIND, e))?;
        Ok(content.map(|content| (entry, content)))
    }

    async fn read_files<G: GiteaApi>(
        api: &G,
        repo: &RepoRef,
        git_ref: &str,
        paths: &[&str],
    ) -> Result<Vec<TemplateFile>> {
        let mut found = Vec::new();
        for path in paths {
            if let Some((_, content)) = Self::read_file(api, repo, git_ref, path).await? {
                found.push(TemplateFile {
                    path: (*path).to_string(),
                    content,
                });
            }
        }
        Ok(found)
    }

    /// Current remote copies of the local files that exist on `git_ref`.
    async fn remote_files<G: GiteaApi>(
        api: &G,
        repo: &RepoRef,
        git_ref: &str,
        desired: &TemplatesConfig,
    ) -> Result<HashMap<String, RemoteFile>> {
        let mut remote = HashMap::new();
        for path in desired.files().keys() {
            if let Some((entry, content)) = Self::read_file(api, repo, git_ref, path).await? {
                remote.insert(
                    (*path).to_string(),
                    RemoteFile {
                        sha: entry.sha,
                        content,
                    },
                );
            }
        }
        Ok(remote)
    }

    /// Commit `changes` and open the pull request. Returns the PR URL, if one was opened.
    async fn open_change_request<G: GiteaApi>(
        api: &G,
        repo: &RepoRef,
        default_branch: &str,
        branch_exists: bool,
        changes: &[FileChange],
    ) -> Result<Option<String>> {
        let request = ChangeFiles {
            branch: if branch_exists {
                UPDATE_BRANCH.to_string()
            } else {
                default_branch.to_string()
            },
            new_branch: (!branch_exists).then(|| UPDATE_BRANCH.to_string()),
            message: UPDATE_TITLE.to_string(),
            files: changes.iter().map(Into::into).collect(),
        };

        api.change_files(&repo.owner, &repo.name, &request)
            .await
            .map_err(|e| Error::Apply {
                kind: KIND,
                operation: OperationKind::Update,
                identity: UPDATE_BRANCH.to_string(),
                applied: 0,
                remaining: changes.len(),
                source: Box::new(e),
            })?;

        let pr = CreatePullRequest {
            title: UPDATE_TITLE.to_string(),
            body: UPDATE_DESCRIPTION.to_string(),
            head: UPDATE_BRANCH.to_string(),
            base: default_branch.to_string(),
        };
        match api.create_pull_request(&repo.owner, &repo.name, &pr).await {
            Ok(pr) => Ok(Some(pr.html_url)),
            Err(e) if e.is_conflict() => {
                tracing::debug!(repo = %repo, "template pull request already open");
                Ok(None)
            }
            Err(e) => Err(Error::Apply {
                kind: KIND,
                operation: OperationKind::Create,
                identity: format!("pull request {UPDATE_BRANCH}"),
                applied: changes.len(),
                remaining: 0,
                source: Box::new(e),
            }),
        }
    }
}

impl Handler for TemplatesHandler {
    type Document = TemplatesConfig;

    async fn pull<G: GiteaApi>(&self, api: &G, repo: &RepoRef) -> Result<TemplatesConfig> {
        let branch = Self::default_branch(api, repo).await?;

        let mut config = TemplatesConfig {
            issue_templates: Self::read_files(api, repo, &branch, ISSUE_TEMPLATE_FILES).await?,
            issue_configs: Self::read_files(api, repo, &branch, ISSUE_CONFIG_FILES).await?,
            pr_templates: Self::read_files(api, repo, &branch, PR_TEMPLATE_FILES).await?,
        };

        for dir in ISSUE_TEMPLATE_DIRS {
            let entries = api
                .list_dir(&repo.owner, &repo.name, &branch, dir)
                .await
                .map_err(|e| Error::fetch(KIND, e))?;
            let paths: Vec<&str> = entries
                .iter()
                .filter(|entry| entry.is_file() && templates::is_issue_template_entry(&entry.name))
                .map(|entry| entry.path.as_str())
                .collect();
            config
                .issue_templates
                .extend(Self::read_files(api, repo, &branch, &paths).await?);
        }

        tracing::debug!(
            repo = %repo,
            files = config.files().len(),
            "collected templates"
        );
        Ok(config)
    }

    async fn push<G: GiteaApi>(
        &self,
        api: &G,
        repo: &RepoRef,
        desired: &TemplatesConfig,
        _strategy: Option<Strategy>,
        dry_run: bool,
    ) -> Result<KindReport> {
        let mut report = KindReport::new(KIND, None);
        if desired.is_empty() {
            return Ok(report);
        }

        let default_branch = Self::default_branch(api, repo).await?;
        let branch_exists = api
            .get_branch(&repo.owner, &repo.name, UPDATE_BRANCH)
            .await
            .map_err(|e| Error::fetch(KIND, e))?
            .is_some();
        // A pending update branch already carries earlier changes; diff against it.
        let base = if branch_exists {
            UPDATE_BRANCH
        } else {
            default_branch.as_str()
        };

        let remote = Self::remote_files(api, repo, base, desired).await?;
        let changes = templates::diff_files(desired, &remote);
        report.planned = changes
            .iter()
            .map(|change| {
                let operation = match change.operation {
                    FileOperation::Create => OperationKind::Create,
                    FileOperation::Update => OperationKind::Update,
                };
                PlannedChange::new(operation, change.path.clone())
            })
            .collect();

        if dry_run || changes.is_empty() {
            return Ok(report);
        }

        report.link =
            Self::open_change_request(api, repo, &default_branch, branch_exists, &changes).await?;
        for change in &changes {
            match change.operation {
                FileOperation::Create => report.applied.created += 1,
                FileOperation::Update => report.applied.updated += 1,
            }
        }
        Ok(report)
    }
}
