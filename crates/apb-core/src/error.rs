use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Repository search failed: {0}")]
    Query(String),

    #[error("Workflow status lookup failed for {repository}: {cause}")]
    Status { repository: String, cause: String },

    #[error("Dispatch to {repository} failed: {cause}")]
    Dispatch { repository: String, cause: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
