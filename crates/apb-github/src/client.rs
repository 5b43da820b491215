use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use serde_json::json;

use apb_core::{RepoHost, Repository, WorkflowRun};

use crate::{Error, Result};

const GITHUB_API: &str = "https://api.github.com";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const RETRY_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// GitHub-backed implementation of [`RepoHost`].
///
/// Repository search goes through octocrab. The workflow-runs and
/// repository-dispatch endpoints are called directly over reqwest.
pub struct GitHubHost {
    search: octocrab::Octocrab,
    http: reqwest::Client,
    api_base: String,
}

impl GitHubHost {
    pub fn new(token: String) -> Result<Self> {
        Self::with_base_url(token, GITHUB_API)
    }

    /// Point the client at a different API root (GHES, tests).
    pub fn with_base_url(token: String, api_base: &str) -> Result<Self> {
        let search = octocrab::Octocrab::builder()
            .base_uri(api_base)?
            .personal_token(token.clone())
            .build()?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        let http = reqwest::Client::builder()
            .user_agent(concat!("apb/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(HTTP_TIMEOUT)
            .build()?;

        Ok(Self {
            search,
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a search query to the full candidate set, following
    /// pagination to the end.
    pub async fn search_repositories(&self, query: &str) -> Result<Vec<Repository>> {
        let mut page = self
            .search
            .search()
            .repositories(query)
            .per_page(100)
            .send()
            .await?;

        let mut repos: Vec<Repository> = page.items.iter().map(to_repository).collect();
        while let Some(next) = self.search.get_page(&page.next).await? {
            page = next;
            repos.extend(page.items.iter().map(to_repository));
        }

        tracing::debug!("Search '{}' matched {} repositories", query, repos.len());
        Ok(repos)
    }

    /// Latest run of a workflow file. Any non-success status means the
    /// repository has no runs of that workflow on record.
    pub async fn latest_workflow_run(
        &self,
        repo: &Repository,
        workflow_id: &str,
    ) -> Result<Option<WorkflowRun>> {
        let url = format!(
            "{}/repos/{}/actions/workflows/{}/runs",
            self.api_base,
            repo.full_name(),
            workflow_id
        );

        let response = self
            .send_with_retry(self.http.get(&url).query(&[("per_page", "1")]))
            .await?;
        if !response.status().is_success() {
            tracing::debug!(
                "No previous runs of {} in {} ({})",
                workflow_id,
                repo.full_name(),
                response.status()
            );
            return Ok(None);
        }

        let body: WorkflowRunsResponse = response.json().await?;
        Ok(body.workflow_runs.into_iter().next().map(|run| WorkflowRun {
            status: run.status,
            conclusion: run.conclusion,
            created_at: run.created_at,
        }))
    }

    /// Send a repository_dispatch event.
    pub async fn send_dispatch(&self, repo: &Repository, event_type: &str) -> Result<()> {
        let url = format!("{}/repos/{}/dispatches", self.api_base, repo.full_name());

        let response = self
            .send_with_retry(self.http.post(&url).json(&json!({ "event_type": event_type })))
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::Api(format!(
                "dispatch returned {} for {}",
                status,
                repo.full_name()
            )))
        }
    }

    /// Retry transient failures (connect/timeout errors and 5xx) with
    /// exponential backoff. The last attempt's outcome is returned as is.
    async fn send_with_retry(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let mut attempt = 0;
        let mut delay = RETRY_BASE_DELAY;
        loop {
            attempt += 1;
            let current = request
                .try_clone()
                .ok_or_else(|| Error::Api("request is not cloneable".to_string()))?;
            let retryable = attempt < RETRY_ATTEMPTS;

            match current.send().await {
                Ok(response) if retryable && response.status().is_server_error() => {
                    tracing::debug!(
                        "Attempt {} returned {}, retrying in {:?}",
                        attempt,
                        response.status(),
                        delay
                    );
                }
                Ok(response) => return Ok(response),
                Err(err) if retryable && (err.is_timeout() || err.is_connect()) => {
                    tracing::debug!("Attempt {} failed: {}, retrying in {:?}", attempt, err, delay);
                }
                Err(err) => return Err(err.into()),
            }

            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }
}

fn to_repository(repo: &octocrab::models::Repository) -> Repository {
    let owner = repo
        .owner
        .as_ref()
        .map(|o| o.login.clone())
        .or_else(|| {
            repo.full_name
                .as_ref()
                .and_then(|f| f.split('/').next().map(str::to_string))
        })
        .unwrap_or_default();

    let mut mapped = Repository::new(owner, repo.name.clone());
    if let Some(branch) = &repo.default_branch {
        mapped = mapped.with_branch(branch.clone());
    }
    mapped
}

#[derive(Debug, Deserialize)]
struct WorkflowRunsResponse {
    workflow_runs: Vec<ApiWorkflowRun>,
}

#[derive(Debug, Deserialize)]
struct ApiWorkflowRun {
    status: String,
    conclusion: Option<String>,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl RepoHost for GitHubHost {
    async fn search(&self, query: &str) -> apb_core::Result<Vec<Repository>> {
        self.search_repositories(query)
            .await
            .map_err(|e| apb_core::Error::Query(e.to_string()))
    }

    async fn latest_run(
        &self,
        repo: &Repository,
        workflow_id: &str,
    ) -> apb_core::Result<Option<WorkflowRun>> {
        self.latest_workflow_run(repo, workflow_id)
            .await
            .map_err(|e| apb_core::Error::Status {
                repository: repo.full_name(),
                cause: e.to_string(),
            })
    }

    async fn dispatch(&self, repo: &Repository, event_type: &str) -> apb_core::Result<()> {
        self.send_dispatch(repo, event_type)
            .await
            .map_err(|e| apb_core::Error::Dispatch {
                repository: repo.full_name(),
                cause: e.to_string(),
            })
    }
}
