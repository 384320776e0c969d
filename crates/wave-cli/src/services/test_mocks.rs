//! Mock implementation of `GiteaApi` for testing services.
//!
//! The mock serves fixed observed state and records every call as
//! `"<method> <owner>/<repo> [detail]"` so tests can assert on what was sent.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::future::{Future, ready};
use std::sync::Mutex;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use wave_core::{BranchProtection, RepoSettings, TagProtection, Webhook};
use wave_gitea::{
    Branch, ChangeFiles, ContentEntry, CreatePullRequest, Error, GiteaApi, PullRequest, Repository,
    Result,
};

/// Mock implementation of `GiteaApi`.
#[derive(Default)]
pub struct MockGiteaApi {
    pub repo: Repository,
    pub org_repos: Vec<Repository>,
    pub topics: Vec<String>,
    pub branch_protections: Vec<BranchProtection>,
    pub tag_protections: Vec<TagProtection>,
    pub hooks: Vec<Webhook>,
    pub branches: HashSet<String>,
    /// Files keyed by `(ref, path)`.
    pub files: HashMap<(String, String), ContentEntry>,
    /// Directory listings keyed by path, independent of ref.
    pub dirs: HashMap<String, Vec<ContentEntry>>,
    /// Methods that answer with a 500.
    pub failures: HashSet<String>,
    pub invalid_topics: HashSet<String>,
    pub pull_request_error: Option<(u16, &'static str)>,
    calls: Mutex<Vec<String>>,
    edits: Mutex<Vec<RepoSettings>>,
    commits: Mutex<Vec<ChangeFiles>>,
}

impl MockGiteaApi {
    pub fn new() -> Self {
        Self {
            repo: Repository {
                name: "api".into(),
                full_name: "acme/api".into(),
                settings: RepoSettings {
                    default_branch: Some("main".into()),
                    ..RepoSettings::default()
                },
                ..Repository::default()
            },
            ..Self::default()
        }
    }

    pub fn with_settings(mut self, settings: RepoSettings) -> Self {
        self.repo.settings = settings;
        self
    }

    pub fn with_org_repo(mut self, name: &str, archived: bool) -> Self {
        self.org_repos.push(Repository {
            name: name.into(),
            archived,
            ..Repository::default()
        });
        self
    }

    pub fn with_topics(mut self, topics: &[&str]) -> Self {
        self.topics = topics.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_branch_protection(mut self, rule: BranchProtection) -> Self {
        self.branch_protections.push(rule);
        self
    }

    pub fn with_tag_protection(mut self, rule: TagProtection) -> Self {
        self.tag_protections.push(rule);
        self
    }

    pub fn with_hook(mut self, hook: Webhook) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn with_branch(mut self, name: &str) -> Self {
        self.branches.insert(name.into());
        self
    }

    pub fn with_file(mut self, git_ref: &str, path: &str, content: &str) -> Self {
        let entry = content_entry(path, Some(content));
        self.files.insert((git_ref.into(), path.into()), entry);
        self
    }

    /// Add a directory listing; each listed file also becomes fetchable on `git_ref`.
    pub fn with_dir(mut self, git_ref: &str, dir: &str, files: &[(&str, &str)]) -> Self {
        let mut listing = Vec::new();
        for (name, content) in files {
            let path = format!("{dir}/{name}");
            listing.push(content_entry(&path, None));
            self = self.with_file(git_ref, &path, content);
        }
        self.dirs.insert(dir.into(), listing);
        self
    }

    pub fn with_failure(mut self, method: &str) -> Self {
        self.failures.insert(method.into());
        self
    }

    /// Gitea rejects `topic` with 422.
    pub fn with_invalid_topic(mut self, topic: &str) -> Self {
        self.invalid_topics.insert(topic.into());
        self
    }

    /// A pull request for the head branch is already open.
    pub fn with_pull_request_conflict(mut self) -> Self {
        self.pull_request_error = Some((409, "pull request already exists"));
        self
    }

    /// Gitea rejects the pull request as invalid.
    pub fn with_pull_request_rejected(mut self) -> Self {
        self.pull_request_error = Some((422, "Invalid PullRequest"));
        self
    }

    /// Every call made so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that change remote state.
    pub fn mutations(&self) -> Vec<String> {
        const READS: &[&str] = &["get_", "list_"];
        self.calls()
            .into_iter()
            .filter(|call| !READS.iter().any(|prefix| call.starts_with(prefix)))
            .collect()
    }

    /// Settings sent through `edit_repo`.
    pub fn edits(&self) -> Vec<RepoSettings> {
        self.edits.lock().unwrap().clone()
    }

    /// Requests sent through `change_files`.
    pub fn commits(&self) -> Vec<ChangeFiles> {
        self.commits.lock().unwrap().clone()
    }

    fn call(&self, method: &str, owner: &str, repo: &str, detail: &str) -> Result<()> {
        let line = format!("{method} {owner}/{repo} {detail}");
        self.calls.lock().unwrap().push(line.trim_end().to_string());
        if self.failures.contains(method) {
            return Err(Error::ApiError {
                status: 500,
                message: format!("{method} failed"),
            });
        }
        Ok(())
    }
}

fn content_entry(path: &str, content: Option<&str>) -> ContentEntry {
    ContentEntry {
        name: path.rsplit('/').next().unwrap_or(path).to_string(),
        path: path.to_string(),
        sha: format!("sha-{path}"),
        entry_type: "file".into(),
        content: content.map(|c| STANDARD.encode(c)),
    }
}

impl GiteaApi for MockGiteaApi {
    fn get_repo(&self, owner: &str, repo: &str) -> impl Future<Output = Result<Repository>> + Send {
        ready(self.call("get_repo", owner, repo, "").map(|()| self.repo.clone()))
    }

    fn edit_repo(
        &self,
        owner: &str,
        repo: &str,
        settings: &RepoSettings,
    ) -> impl Future<Output = Result<Repository>> + Send {
        let result = self.call("edit_repo", owner, repo, "").map(|()| {
            self.edits.lock().unwrap().push(settings.clone());
            self.repo.clone()
        });
        ready(result)
    }

    fn list_org_repos(&self, org: &str) -> impl Future<Output = Result<Vec<Repository>>> + Send {
        let line = format!("list_org_repos {org}");
        self.calls.lock().unwrap().push(line);
        ready(Ok(self.org_repos.clone()))
    }

    fn list_topics(&self, owner: &str, repo: &str) -> impl Future<Output = Result<Vec<String>>> + Send {
        ready(self.call("list_topics", owner, repo, "").map(|()| self.topics.clone()))
    }

    fn set_topics(
        &self,
        owner: &str,
        repo: &str,
        topics: &[String],
    ) -> impl Future<Output = Result<()>> + Send {
        ready(self.call("set_topics", owner, repo, &topics.join(",")))
    }

    fn add_topic(&self, owner: &str, repo: &str, topic: &str) -> impl Future<Output = Result<()>> + Send {
        let result = self.call("add_topic", owner, repo, topic).and_then(|()| {
            if self.invalid_topics.contains(topic) {
                Err(Error::ApiError {
                    status: 422,
                    message: "Topic name is invalid".into(),
                })
            } else {
                Ok(())
            }
        });
        ready(result)
    }

    fn list_branch_protections(
        &self,
        owner: &str,
        repo: &str,
    ) -> impl Future<Output = Result<Vec<BranchProtection>>> + Send {
        ready(
            self.call("list_branch_protections", owner, repo, "")
                .map(|()| self.branch_protections.clone()),
        )
    }

    fn create_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        rule: &BranchProtection,
    ) -> impl Future<Output = Result<BranchProtection>> + Send {
        ready(
            self.call("create_branch_protection", owner, repo, &rule.rule_name)
                .map(|()| rule.clone()),
        )
    }

    fn edit_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        rule: &BranchProtection,
    ) -> impl Future<Output = Result<BranchProtection>> + Send {
        ready(
            self.call("edit_branch_protection", owner, repo, name)
                .map(|()| rule.clone()),
        )
    }

    fn delete_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
    ) -> impl Future<Output = Result<()>> + Send {
        ready(self.call("delete_branch_protection", owner, repo, name))
    }

    fn list_tag_protections(
        &self,
        owner: &str,
        repo: &str,
    ) -> impl Future<Output = Result<Vec<TagProtection>>> + Send {
        ready(
            self.call("list_tag_protections", owner, repo, "")
                .map(|()| self.tag_protections.clone()),
        )
    }

    fn create_tag_protection(
        &self,
        owner: &str,
        repo: &str,
        rule: &TagProtection,
    ) -> impl Future<Output = Result<TagProtection>> + Send {
        ready(
            self.call("create_tag_protection", owner, repo, &rule.name_pattern)
                .map(|()| rule.clone()),
        )
    }

    fn edit_tag_protection(
        &self,
        owner: &str,
        repo: &str,
        id: u64,
        rule: &TagProtection,
    ) -> impl Future<Output = Result<TagProtection>> + Send {
        ready(
            self.call("edit_tag_protection", owner, repo, &id.to_string())
                .map(|()| rule.clone()),
        )
    }

    fn delete_tag_protection(
        &self,
        owner: &str,
        repo: &str,
        id: u64,
    ) -> impl Future<Output = Result<()>> + Send {
        ready(self.call("delete_tag_protection", owner, repo, &id.to_string()))
    }

    fn list_hooks(&self, owner: &str, repo: &str) -> impl Future<Output = Result<Vec<Webhook>>> + Send {
        ready(self.call("list_hooks", owner, repo, "").map(|()| self.hooks.clone()))
    }

    fn create_hook(
        &self,
        owner: &str,
        repo: &str,
        hook: &Webhook,
    ) -> impl Future<Output = Result<Webhook>> + Send {
        let url = hook.target_url().unwrap_or_default();
        ready(self.call("create_hook", owner, repo, url).map(|()| hook.clone()))
    }

    fn edit_hook(
        &self,
        owner: &str,
        repo: &str,
        id: u64,
        hook: &Webhook,
    ) -> impl Future<Output = Result<Webhook>> + Send {
        ready(
            self.call("edit_hook", owner, repo, &id.to_string())
                .map(|()| hook.clone()),
        )
    }

    fn delete_hook(&self, owner: &str, repo: &str, id: u64) -> impl Future<Output = Result<()>> + Send {
        ready(self.call("delete_hook", owner, repo, &id.to_string()))
    }

    fn get_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> impl Future<Output = Result<Option<Branch>>> + Send {
        let result = self.call("get_branch", owner, repo, branch).map(|()| {
            self.branches.contains(branch).then(|| Branch {
                name: branch.to_string(),
            })
        });
        ready(result)
    }

    fn get_file(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
        path: &str,
    ) -> impl Future<Output = Result<Option<ContentEntry>>> + Send {
        let result = self.call("get_file", owner, repo, path).map(|()| {
            self.files
                .get(&(git_ref.to_string(), path.to_string()))
                .cloned()
        });
        ready(result)
    }

    fn list_dir(
        &self,
        owner: &str,
        repo: &str,
        _git_ref: &str,
        path: &str,
    ) -> impl Future<Output = Result<Vec<ContentEntry>>> + Send {
        let result = self
            .call("list_dir", owner, repo, path)
            .map(|()| self.dirs.get(path).cloned().unwrap_or_default());
        ready(result)
    }

    fn change_files(
        &self,
        owner: &str,
        repo: &str,
        request: &ChangeFiles,
    ) -> impl Future<Output = Result<()>> + Send {
        let detail = format!(
            "{} -> {}",
            request.branch,
            request.new_branch.as_deref().unwrap_or(&request.branch)
        );
        let result = self.call("change_files", owner, repo, &detail).map(|()| {
            self.commits.lock().unwrap().push(request.clone());
        });
        ready(result)
    }

    fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr: &CreatePullRequest,
    ) -> impl Future<Output = Result<PullRequest>> + Send {
        let result = self
            .call("create_pull_request", owner, repo, &pr.head)
            .and_then(|()| {
                if let Some((status, message)) = self.pull_request_error {
                    return Err(Error::ApiError {
                        status,
                        message: message.into(),
                    });
                }
                Ok(PullRequest {
                    number: 7,
                    html_url: format!("https://gitea.example.com/{owner}/{repo}/pulls/7"),
                })
            });
        ready(result)
    }
}
