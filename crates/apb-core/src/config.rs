use chrono::Duration;

use crate::{Error, Result};

/// One run's worth of configuration, built once at entry and passed by
/// reference into the dispatcher.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Hosting-API search query identifying the candidate set.
    pub repo_query: String,
    /// Workflow file to monitor in each candidate, e.g. `build.yml`.
    pub workflow_id: String,
    /// Event type sent with each rebuild dispatch.
    pub event_type: String,
    /// Upper bound on dispatches per run. Zero means uncapped.
    pub max_rebuilds: usize,
    /// Age threshold beyond which a repository is considered stale.
    pub build_age: Duration,
    /// The threshold as originally written, kept for the report.
    pub build_age_label: String,
}

impl RunConfig {
    pub fn new(
        repo_query: String,
        workflow_id: String,
        build_age: &str,
        event_type: String,
        max_rebuilds: usize,
    ) -> Result<Self> {
        if repo_query.trim().is_empty() {
            return Err(Error::Config(
                "repository query must not be empty".to_string(),
            ));
        }
        if workflow_id.trim().is_empty() {
            return Err(Error::Config("workflow id must not be empty".to_string()));
        }

        let parsed = humantime::parse_duration(build_age)
            .map_err(|e| Error::Config(format!("invalid build age '{}': {}", build_age, e)))?;
        let threshold = Duration::from_std(parsed)
            .map_err(|e| Error::Config(format!("build age '{}' out of range: {}", build_age, e)))?;

        Ok(Self {
            repo_query,
            workflow_id,
            event_type,
            max_rebuilds,
            build_age: threshold,
            build_age_label: build_age.to_string(),
        })
    }

    pub fn build_age_seconds(&self) -> u64 {
        self.build_age.num_seconds().max(0) as u64
    }
}
