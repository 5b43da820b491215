use anyhow::{Context, Result};

use apb_core::{Dispatcher, Outcome, RunConfig, RunResult};
use apb_github::GitHubHost;

use crate::cli::Cli;

pub async fn execute(cli: Cli) -> Result<()> {
    let config = RunConfig::new(
        cli.repo_query,
        cli.workflow_id,
        &cli.build_age,
        cli.event_type,
        cli.max_rebuilds,
    )?;

    let host = GitHubHost::new(cli.access_token)?;
    let dispatcher = Dispatcher::new(host);

    let result = dispatcher.run(&config).await?;

    let report_path = cli.workspace_dir.join(&cli.write_filename);
    tracing::info!("Writing status file to {}", report_path.display());
    let report = serde_json::to_string_pretty(&result)?;
    std::fs::write(&report_path, report)
        .with_context(|| format!("failed to write report to {}", report_path.display()))?;

    print_summary(&result);
    println!("  Report written to {}", report_path.display());

    Ok(())
}

fn print_summary(result: &RunResult) {
    println!(
        "✓ Examined {} candidate(s), dispatched {} rebuild event(s)",
        result.candidates, result.dispatched
    );

    for decision in &result.decisions {
        match &decision.outcome {
            Outcome::Dispatched => {
                println!("  ✓ {} rebuild dispatched", decision.repository)
            }
            Outcome::DispatchFailed { error } => {
                println!("  ✗ {} dispatch failed: {}", decision.repository, error)
            }
            Outcome::SkippedCap => {
                println!("  - {} eligible but over the cap", decision.repository)
            }
            Outcome::NotEligible => {}
        }
    }
}
