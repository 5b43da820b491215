pub mod client;
pub mod error;

// Re-exports
pub use client::GitHubHost;
pub use error::{Error, Result};
