pub mod config;
pub mod decision;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod repo;

// Re-exports
pub use config::RunConfig;
pub use decision::{Outcome, Reason, RebuildDecision, RunResult};
pub use dispatcher::Dispatcher;
pub use error::{Error, Result};
pub use host::RepoHost;
pub use repo::{Repository, WorkflowRun};
