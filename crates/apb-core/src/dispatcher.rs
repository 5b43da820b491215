use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use crate::{Outcome, Reason, RebuildDecision, RepoHost, Repository, Result, RunConfig, RunResult};

/// Evaluates candidates and sends rebuild events, stalest repositories
/// first. Stateless: each run is a function of the config, the host's
/// responses and the clock.
pub struct Dispatcher<H: RepoHost> {
    host: H,
}

struct Candidate {
    repo: Repository,
    /// Age of the latest run. `None` means the workflow never ran, which
    /// sorts ahead of any finite age.
    run_age: Option<Duration>,
    last_conclusion: Option<String>,
}

impl Candidate {
    fn stalest_first(&self, other: &Self) -> Ordering {
        match (self.run_age, other.run_age) {
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (a, b) => b
                .cmp(&a)
                .then_with(|| self.repo.full_name().cmp(&other.repo.full_name())),
        }
    }
}

impl<H: RepoHost> Dispatcher<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub async fn run(&self, config: &RunConfig) -> Result<RunResult> {
        self.run_at(config, Utc::now()).await
    }

    /// Run against an explicit clock instant.
    pub async fn run_at(&self, config: &RunConfig, now: DateTime<Utc>) -> Result<RunResult> {
        let cutoff = now - config.build_age;
        tracing::info!(
            "Rebuilding repositories that haven't run {} since {}",
            config.workflow_id,
            cutoff
        );

        tracing::info!("Querying for repositories: {}", config.repo_query);
        let repos = self.host.search(&config.repo_query).await?;

        let mut seen = HashSet::new();
        let mut evaluated = Vec::with_capacity(repos.len());
        for repo in repos {
            // Each repository is examined at most once per run.
            if !seen.insert(repo.full_name()) {
                continue;
            }
            let run = self.host.latest_run(&repo, &config.workflow_id).await?;
            let candidate = match run {
                None => {
                    tracing::info!(
                        "{} does not have a run of workflow {}",
                        repo.full_name(),
                        config.workflow_id
                    );
                    Candidate {
                        repo,
                        run_age: None,
                        last_conclusion: None,
                    }
                }
                Some(run) => Candidate {
                    run_age: Some(now - run.created_at),
                    last_conclusion: run.conclusion,
                    repo,
                },
            };
            evaluated.push(candidate);
        }

        evaluated.sort_by(Candidate::stalest_first);
        let candidates = evaluated.len();

        let mut dispatched = 0usize;
        let mut decisions = Vec::with_capacity(evaluated.len());
        for candidate in evaluated {
            let full_name = candidate.repo.full_name();
            let reason = match candidate.run_age {
                None => Reason::NeverBuilt,
                Some(age) if age >= config.build_age => Reason::AgeExceeded,
                Some(_) => Reason::UpToDate,
            };
            let eligible = reason != Reason::UpToDate;

            let outcome = if !eligible {
                tracing::info!(
                    "{} is OK: {}",
                    full_name,
                    format_age(candidate.run_age.unwrap_or_else(Duration::zero))
                );
                Outcome::NotEligible
            } else if config.max_rebuilds != 0 && dispatched >= config.max_rebuilds {
                Outcome::SkippedCap
            } else {
                match candidate.run_age {
                    Some(age) => {
                        tracing::info!("{} needs a rebuild: {}", full_name, format_age(age))
                    }
                    None => tracing::info!("{} needs a rebuild: never built", full_name),
                }
                match self
                    .host
                    .dispatch(&candidate.repo, &config.event_type)
                    .await
                {
                    Ok(()) => {
                        dispatched += 1;
                        tracing::info!(
                            "Sent {} event #{} to {}",
                            config.event_type,
                            dispatched,
                            full_name
                        );
                        if dispatched == config.max_rebuilds {
                            tracing::warn!("Max rebuild events sent");
                        }
                        Outcome::Dispatched
                    }
                    Err(err) => {
                        tracing::error!("Dispatch to {} failed: {}", full_name, err);
                        Outcome::DispatchFailed {
                            error: err.to_string(),
                        }
                    }
                }
            };

            decisions.push(RebuildDecision {
                repository: full_name,
                eligible,
                reason,
                run_age_seconds: candidate.run_age.map(|age| age.num_seconds()),
                run_age: candidate.run_age.map(format_age),
                last_conclusion: candidate.last_conclusion,
                outcome,
            });
        }

        Ok(RunResult {
            ran_at: now,
            repository_query: config.repo_query.clone(),
            workflow_id: config.workflow_id.clone(),
            build_age: config.build_age_label.clone(),
            build_age_seconds: config.build_age_seconds(),
            candidates,
            dispatched,
            decisions,
        })
    }
}

fn format_age(age: Duration) -> String {
    let seconds = age.num_seconds().max(0) as u64;
    humantime::format_duration(std::time::Duration::from_secs(seconds)).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::days(10)), "10days");
        assert_eq!(format_age(Duration::seconds(90)), "1m 30s");
        // Clock skew can produce a negative age; render it as zero.
        assert_eq!(format_age(Duration::seconds(-5)), "0s");
    }
}
