//! Top-level argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Pull models through a llama.cpp runner with live progress.
#[derive(Parser, Debug)]
#[command(name = "llpull")]
#[command(about = "Pull models through a llama.cpp runner")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Runner binary to execute (name on PATH or a path)
    #[arg(long, global = true)]
    pub runner: Option<PathBuf>,

    /// Directory the runner executes in
    #[arg(long = "work-dir", global = true)]
    pub work_dir: Option<PathBuf>,

    /// Print a JSON report instead of progress output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_pull_with_short_model_flag() {
        let cli = Cli::parse_from(["llpull", "pull", "-m", "gemma3:1b"]);
        match cli.command {
            Some(Commands::Pull { model }) => assert_eq!(model.as_deref(), Some("gemma3:1b")),
            other => panic!("expected pull, got {other:?}"),
        }
    }

    #[test]
    fn test_pull_without_model_still_parses() {
        let cli = Cli::parse_from(["llpull", "pull"]);
        assert!(matches!(cli.command, Some(Commands::Pull { model: None })));
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let cli = Cli::parse_from([
            "llpull",
            "pull",
            "--model",
            "gemma3:1b",
            "-v",
            "--json",
            "--runner",
            "/opt/llama/llama-run",
            "--work-dir",
            "/tmp/models",
        ]);
        assert!(cli.verbose);
        assert!(cli.json);
        assert_eq!(cli.runner, Some(PathBuf::from("/opt/llama/llama-run")));
        assert_eq!(cli.work_dir, Some(PathBuf::from("/tmp/models")));
    }
}
