use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a repository was or was not considered in need of a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// Last run is older than the configured threshold.
    AgeExceeded,
    /// No run of the monitored workflow on record.
    NeverBuilt,
    /// Last run is within the threshold.
    UpToDate,
}

/// What happened to a repository after the eligibility decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Dispatched,
    DispatchFailed { error: String },
    SkippedCap,
    NotEligible,
}

impl Outcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Outcome::Dispatched)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebuildDecision {
    pub repository: String,
    pub eligible: bool,
    pub reason: Reason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_age_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_conclusion: Option<String>,
    pub outcome: Outcome,
}

/// Everything a run decided, in the order it was decided, plus the
/// parameters the run was decided against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub ran_at: DateTime<Utc>,
    pub repository_query: String,
    pub workflow_id: String,
    pub build_age: String,
    pub build_age_seconds: u64,
    pub candidates: usize,
    pub dispatched: usize,
    pub decisions: Vec<RebuildDecision>,
}

impl RunResult {
    pub fn dispatch_failures(&self) -> impl Iterator<Item = &RebuildDecision> {
        self.decisions
            .iter()
            .filter(|d| matches!(d.outcome, Outcome::DispatchFailed { .. }))
    }
}
