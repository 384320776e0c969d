//! Gitea API client.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use wave_core::{BranchProtection, RepoSettings, TagProtection, Webhook};

use crate::auth::Auth;
use crate::error::{Error, Result};
use crate::traits::GiteaApi;
use crate::types::{Branch, ChangeFiles, ContentEntry, CreatePullRequest, PullRequest, Repository};

/// Page size for list endpoints.
const PAGE_LIMIT: usize = 50;

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(serde::Deserialize)]
struct TopicsResponse {
    #[serde(default)]
    topics: Option<Vec<String>>,
}

#[derive(Serialize)]
struct TopicsRequest<'a> {
    topics: &'a [String],
}

#[derive(serde::Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Gitea API client.
pub struct GiteaClient {
    client: Client,
    base_url: Url,
    /// Token stored as `SecretString` for automatic zeroization on drop.
    token: SecretString,
}

impl GiteaClient {
    /// Path of the v1 API below the server URL.
    pub const API_PATH: &'static str = "/api/v1";

    /// Create a client for the Gitea server at `server_url`.
    ///
    /// # Errors
    /// Returns error if authentication fails or the URL is unusable.
    pub fn new(auth: &Auth, server_url: &str) -> Result<Self> {
        let base = format!("{}{}", server_url.trim().trim_end_matches('/'), Self::API_PATH);
        Self::with_base_url(auth, base)
    }

    /// Create a client with an explicit API base URL.
    ///
    /// # Errors
    /// Returns error if authentication fails or the URL is unusable.
    pub fn with_base_url(auth: &Auth, base_url: impl Into<String>) -> Result<Self> {
        let token = auth.resolve()?;
        let base_url = base_url.into();
        let parsed = Url::parse(&base_url).map_err(|_| Error::InvalidUrl(base_url.clone()))?;
        if parsed.cannot_be_a_base() {
            return Err(Error::InvalidUrl(base_url));
        }

        let client = Client::builder()
            .default_headers(
                [
                    (ACCEPT, HeaderValue::from_static("application/json")),
                    (USER_AGENT, HeaderValue::from_static("wave-cli")),
                ]
                .into_iter()
                .collect(),
            )
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: parsed,
            token,
        })
    }

    /// Build an endpoint URL; each segment is percent-encoded on its own.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL below `/repos/{owner}/{repo}`.
    fn repo_url(&self, owner: &str, repo: &str, rest: &[&str]) -> Result<Url> {
        let mut segments = vec!["repos", owner, repo];
        segments.extend_from_slice(rest);
        self.url(&segments)
    }

    /// URL of a path in the contents API, at `git_ref`.
    fn contents_url(&self, owner: &str, repo: &str, git_ref: &str, path: &str) -> Result<Url> {
        let mut rest = vec!["contents"];
        rest.extend(path.split('/').filter(|s| !s.is_empty()));
        let mut url = self.repo_url(owner, repo, &rest)?;
        url.query_pairs_mut().append_pair("ref", git_ref);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::trace!(%method, %url, "gitea request");
        self.client.request(method, url).header(
            AUTHORIZATION,
            format!("token {}", self.token.expose_secret()),
        )
    }

    /// Make a GET request.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.request(Method::GET, url).send().await?;
        self.handle_response(response).await
    }

    /// Make a GET request, mapping 404 to `None`.
    async fn get_optional<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        match self.get(url).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// GET every page of a list endpoint.
    async fn get_paginated<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1_u32;
        loop {
            let mut page_url = url.clone();
            page_url
                .query_pairs_mut()
                .append_pair("page", &page.to_string())
                .append_pair("limit", &PAGE_LIMIT.to_string());

            let batch: Vec<T> = self.get(page_url).await?;
            let last = batch.len() < PAGE_LIMIT;
            items.extend(batch);
            if last {
                return Ok(items);
            }
            page += 1;
        }
    }

    /// Make a request with a JSON body and parse the JSON response.
    async fn send_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<T> {
        let response = self.request(method, url).json(body).send().await?;
        self.handle_response(response).await
    }

    /// Send a request whose response body is ignored.
    async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::error_from(response).await)
    }

    /// Make a DELETE request.
    async fn delete(&self, url: Url) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, url)).await
    }

    /// Handle API response.
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        if response.status().is_success() {
            let bytes = response.bytes().await?;
            return Ok(serde_json::from_slice(&bytes)?);
        }
        Err(Self::error_from(response).await)
    }

    /// Map an unsuccessful response to an error.
    async fn error_from(response: Response) -> Error {
        let status_code = response.status().as_u16();

        match status_code {
            401 => Error::AuthenticationFailed,
            429 => Error::RateLimited,
            403 if response
                .headers()
                .get("x-ratelimit-remaining")
                .is_some_and(|v| v == "0") =>
            {
                Error::RateLimited
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiErrorBody>(&text)
                    .map(|body| body.message)
                    .unwrap_or(text);
                Error::ApiError {
                    status: status_code,
                    message,
                }
            }
        }
    }

    // === Repository ===

    /// Get a repository.
    ///
    /// # Errors
    /// Returns error if the repository is not found or the API call fails.
    pub async fn get_repo(&self, owner: &str, repo: &str) -> Result<Repository> {
        self.get(self.repo_url(owner, repo, &[])?).await
    }

    /// Edit repository settings.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn edit_repo(
        &self,
        owner: &str,
        repo: &str,
        settings: &RepoSettings,
    ) -> Result<Repository> {
        self.send_json(Method::PATCH, self.repo_url(owner, repo, &[])?, settings)
            .await
    }

    /// List every repository of an organization.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn list_org_repos(&self, org: &str) -> Result<Vec<Repository>> {
        self.get_paginated(self.url(&["orgs", org, "repos"])?).await
    }

    // === Topics ===

    /// List repository topics.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn list_topics(&self, owner: &str, repo: &str) -> Result<Vec<String>> {
        let response: TopicsResponse = self.get(self.repo_url(owner, repo, &["topics"])?).await?;
        Ok(response.topics.unwrap_or_default())
    }

    /// Replace all repository topics.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn set_topics(&self, owner: &str, repo: &str, topics: &[String]) -> Result<()> {
        let url = self.repo_url(owner, repo, &["topics"])?;
        self.send_empty(self.request(Method::PUT, url).json(&TopicsRequest { topics }))
            .await
    }

    /// Add one topic.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn add_topic(&self, owner: &str, repo: &str, topic: &str) -> Result<()> {
        let url = self.repo_url(owner, repo, &["topics", topic])?;
        self.send_empty(self.request(Method::PUT, url)).await
    }

    // === Branch protections ===

    /// List branch protection rules.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn list_branch_protections(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<BranchProtection>> {
        self.get(self.repo_url(owner, repo, &["branch_protections"])?)
            .await
    }

    /// Create a branch protection rule.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn create_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        rule: &BranchProtection,
    ) -> Result<BranchProtection> {
        let url = self.repo_url(owner, repo, &["branch_protections"])?;
        self.send_json(Method::POST, url, rule).await
    }

    /// Edit a branch protection rule by name.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn edit_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        rule: &BranchProtection,
    ) -> Result<BranchProtection> {
        let url = self.repo_url(owner, repo, &["branch_protections", name])?;
        self.send_json(Method::PATCH, url, rule).await
    }

    /// Delete a branch protection rule by name.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn delete_branch_protection(&self, owner: &str, repo: &str, name: &str) -> Result<()> {
        self.delete(self.repo_url(owner, repo, &["branch_protections", name])?)
            .await
    }

    // === Tag protections ===

    /// List tag protection rules.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn list_tag_protections(&self, owner: &str, repo: &str) -> Result<Vec<TagProtection>> {
        self.get(self.repo_url(owner, repo, &["tag_protections"])?)
            .await
    }

    /// Create a tag protection rule.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn create_tag_protection(
        &self,
        owner: &str,
        repo: &str,
        rule: &TagProtection,
    ) -> Result<TagProtection> {
        let url = self.repo_url(owner, repo, &["tag_protections"])?;
        self.send_json(Method::POST, url, rule).await
    }

    /// Edit a tag protection rule by id.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn edit_tag_protection(
        &self,
        owner: &str,
        repo: &str,
        id: u64,
        rule: &TagProtection,
    ) -> Result<TagProtection> {
        let id = id.to_string();
        let url = self.repo_url(owner, repo, &["tag_protections", &id])?;
        self.send_json(Method::PATCH, url, rule).await
    }

    /// Delete a tag protection rule by id.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn delete_tag_protection(&self, owner: &str, repo: &str, id: u64) -> Result<()> {
        let id = id.to_string();
        self.delete(self.repo_url(owner, repo, &["tag_protections", &id])?)
            .await
    }

    // === Webhooks ===

    /// List webhooks.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn list_hooks(&self, owner: &str, repo: &str) -> Result<Vec<Webhook>> {
        self.get_paginated(self.repo_url(owner, repo, &["hooks"])?)
            .await
    }

    /// Create a webhook.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn create_hook(&self, owner: &str, repo: &str, hook: &Webhook) -> Result<Webhook> {
        let url = self.repo_url(owner, repo, &["hooks"])?;
        self.send_json(Method::POST, url, hook).await
    }

    /// Edit a webhook by id.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn edit_hook(
        &self,
        owner: &str,
        repo: &str,
        id: u64,
        hook: &Webhook,
    ) -> Result<Webhook> {
        let id = id.to_string();
        let url = self.repo_url(owner, repo, &["hooks", &id])?;
        self.send_json(Method::PATCH, url, hook).await
    }

    /// Delete a webhook by id.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn delete_hook(&self, owner: &str, repo: &str, id: u64) -> Result<()> {
        let id = id.to_string();
        self.delete(self.repo_url(owner, repo, &["hooks", &id])?)
            .await
    }

    // === Contents ===

    /// Get a branch, or `None` if it does not exist.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn get_branch(&self, owner: &str, repo: &str, branch: &str) -> Result<Option<Branch>> {
        self.get_optional(self.repo_url(owner, repo, &["branches", branch])?)
            .await
    }

    /// Get a single file, or `None` if it does not exist.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn get_file(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
        path: &str,
    ) -> Result<Option<ContentEntry>> {
        self.get_optional(self.contents_url(owner, repo, git_ref, path)?)
            .await
    }

    /// List a directory; a missing directory is empty.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn list_dir(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
        path: &str,
    ) -> Result<Vec<ContentEntry>> {
        Ok(self
            .get_optional(self.contents_url(owner, repo, git_ref, path)?)
            .await?
            .unwrap_or_default())
    }

    /// Commit several file changes at once.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn change_files(&self, owner: &str, repo: &str, request: &ChangeFiles) -> Result<()> {
        let url = self.repo_url(owner, repo, &["contents"])?;
        self.send_empty(self.request(Method::POST, url).json(request))
            .await
    }

    /// Open a pull request.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr: &CreatePullRequest,
    ) -> Result<PullRequest> {
        let url = self.repo_url(owner, repo, &["pulls"])?;
        self.send_json(Method::POST, url, pr).await
    }
}

// === Trait Implementation ===

impl GiteaApi for GiteaClient {
    async fn get_repo(&self, owner: &str, repo: &str) -> Result<Repository> {
        self.get_repo(owner, repo).await
    }

    async fn edit_repo(&self, owner: &str, repo: &str, settings: &RepoSettings) -> Result<Repository> {
        self.edit_repo(owner, repo, settings).await
    }

    async fn list_org_repos(&self, org: &str) -> Result<Vec<Repository>> {
        self.list_org_repos(org).await
    }

    async fn list_topics(&self, owner: &str, repo: &str) -> Result<Vec<String>> {
        self.list_topics(owner, repo).await
    }

    async fn set_topics(&self, owner: &str, repo: &str, topics: &[String]) -> Result<()> {
        self.set_topics(owner, repo, topics).await
    }

    async fn add_topic(&self, owner: &str, repo: &str, topic: &str) -> Result<()> {
        self.add_topic(owner, repo, topic).await
    }

    async fn list_branch_protections(&self, owner: &str, repo: &str) -> Result<Vec<BranchProtection>> {
        self.list_branch_protections(owner, repo).await
    }

    async fn create_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        rule: &BranchProtection,
    ) -> Result<BranchProtection> {
        self.create_branch_protection(owner, repo, rule).await
    }

    async fn edit_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        rule: &BranchProtection,
    ) -> Result<BranchProtection> {
        self.edit_branch_protection(owner, repo, name, rule).await
    }

    async fn delete_branch_protection(&self, owner: &str, repo: &str, name: &str) -> Result<()> {
        self.delete_branch_protection(owner, repo, name).await
    }

    async fn list_tag_protections(&self, owner: &str, repo: &str) -> Result<Vec<TagProtection>> {
        self.list_tag_protections(owner, repo).await
    }

    async fn create_tag_protection(
        &self,
        owner: &str,
        repo: &str,
        rule: &TagProtection,
    ) -> Result<TagProtection> {
        self.create_tag_protection(owner, repo, rule).await
    }

    async fn edit_tag_protection(
        &self,
        owner: &str,
        repo: &str,
        id: u64,
        rule: &TagProtection,
    ) -> Result<TagProtection> {
        self.edit_tag_protection(owner, repo, id, rule).await
    }

    async fn delete_tag_protection(&self, owner: &str, repo: &str, id: u64) -> Result<()> {
        self.delete_tag_protection(owner, repo, id).await
    }

    async fn list_hooks(&self, owner: &str, repo: &str) -> Result<Vec<Webhook>> {
        self.list_hooks(owner, repo).await
    }

    async fn create_hook(&self, owner: &str, repo: &str, hook: &Webhook) -> Result<Webhook> {
        self.create_hook(owner, repo, hook).await
    }

    async fn edit_hook(&self, owner: &str, repo: &str, id: u64, hook: &Webhook) -> Result<Webhook> {
        self.edit_hook(owner, repo, id, hook).await
    }

    async fn delete_hook(&self, owner: &str, repo: &str, id: u64) -> Result<()> {
        self.delete_hook(owner, repo, id).await
    }

    async fn get_branch(&self, owner: &str, repo: &str, branch: &str) -> Result<Option<Branch>> {
        self.get_branch(owner, repo, branch).await
    }

    async fn get_file(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
        path: &str,
    ) -> Result<Option<ContentEntry>> {
        self.get_file(owner, repo, git_ref, path).await
    }

    async fn list_dir(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
        path: &str,
    ) -> Result<Vec<ContentEntry>> {
        self.list_dir(owner, repo, git_ref, path).await
    }

    async fn change_files(&self, owner: &str, repo: &str, request: &ChangeFiles) -> Result<()> {
        self.change_files(owner, repo, request).await
    }

    async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr: &CreatePullRequest,
    ) -> Result<PullRequest> {
        self.create_pull_request(owner, repo, pr).await
    }
}
