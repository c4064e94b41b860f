//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Run Go toolchain tasks with supervised, streamed output.
#[derive(Parser)]
#[command(name = "gobuild")]
#[command(about = "Run go build/test/install/... with streamed, cancellable output")]
#[command(version)]
pub struct Cli {
    /// JSON settings file
    #[arg(long, global = true, env = "GOBUILD_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Name or path of the go executable
    #[arg(long, global = true, env = "GOBUILD_GO", default_value = "go")]
    pub go: String,

    /// Directory to run in (defaults to the current directory)
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Write the completion record as JSON to this file
    #[arg(long, global = true)]
    pub report: Option<PathBuf>,

    /// Answer yes to confirmations
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
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
    fn test_global_args() {
        let cli = Cli::parse_from([
            "gobuild",
            "--verbose",
            "--go",
            "/usr/local/go/bin/go",
            "build",
            "--cwd",
            "/src/hello",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.go, "/usr/local/go/bin/go");
        assert_eq!(cli.cwd, Some(PathBuf::from("/src/hello")));
    }
}
