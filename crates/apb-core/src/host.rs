use async_trait::async_trait;

use crate::{Repository, Result, WorkflowRun};

/// Narrow view of the repository hosting API. The dispatcher only ever
/// needs these three calls, so fakes can stand in for the real host.
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// Resolve the candidate set for a search query.
    async fn search(&self, query: &str) -> Result<Vec<Repository>>;

    /// Latest recorded run of `workflow_id` in `repo`. `None` means the
    /// repository has never run the workflow.
    async fn latest_run(&self, repo: &Repository, workflow_id: &str)
        -> Result<Option<WorkflowRun>>;

    /// Send a rebuild event of `event_type` to `repo`.
    async fn dispatch(&self, repo: &Repository, event_type: &str) -> Result<()>;
}

#[async_trait]
impl<T: RepoHost + ?Sized> RepoHost for std::sync::Arc<T> {
    async fn search(&self, query: &str) -> Result<Vec<Repository>> {
        (**self).search(query).await
    }

    async fn latest_run(
        &self,
        repo: &Repository,
        workflow_id: &str,
    ) -> Result<Option<WorkflowRun>> {
        (**self).latest_run(repo, workflow_id).await
    }

    async fn dispatch(&self, repo: &Repository, event_type: &str) -> Result<()> {
        (**self).dispatch(repo, event_type).await
    }
}
