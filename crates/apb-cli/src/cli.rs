use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "apb")]
#[command(about = "Rebuild repositories that haven't been built in a while", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Hosting-API token used for search, status and dispatch calls
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub access_token: String,

    /// Repository search query identifying the candidate set
    #[arg(long, env = "APB_REPO_QUERY")]
    pub repo_query: String,

    /// Workflow file to monitor in each candidate
    #[arg(long, env = "APB_WORKFLOW_ID", default_value = "build.yml")]
    pub workflow_id: String,

    /// Age threshold beyond which a repository is rebuilt, e.g. "7d" or "12h 30m"
    #[arg(long, env = "APB_BUILD_AGE", default_value = "7d")]
    pub build_age: String,

    /// Event type sent with each rebuild dispatch
    #[arg(long, env = "APB_EVENT_TYPE", default_value = "apb")]
    pub event_type: String,

    /// Maximum rebuild events per run; 0 removes the cap
    #[arg(long, env = "APB_MAX_REBUILDS", default_value_t = 10)]
    pub max_rebuilds: usize,

    /// File the JSON run report is written to
    #[arg(long, env = "APB_WRITE_FILENAME", default_value = "apb.json")]
    pub write_filename: String,

    /// Directory the report file is placed in
    #[arg(long, env = "GITHUB_WORKSPACE", default_value = ".")]
    pub workspace_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from([
            "apb",
            "--access-token",
            "token",
            "--repo-query",
            "org:example",
        ])
        .unwrap();

        assert_eq!(cli.workflow_id, "build.yml");
        assert_eq!(cli.build_age, "7d");
        assert_eq!(cli.event_type, "apb");
        assert_eq!(cli.max_rebuilds, 10);
        assert_eq!(cli.write_filename, "apb.json");
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "apb",
            "--access-token",
            "token",
            "--repo-query",
            "org:example",
            "--build-age",
            "48h",
            "--max-rebuilds",
            "0",
            "--write-filename",
            "report.json",
        ])
        .unwrap();

        assert_eq!(cli.build_age, "48h");
        assert_eq!(cli.max_rebuilds, 0);
        assert_eq!(cli.write_filename, "report.json");
    }
}
