//! Subcommands, one per Go task plus the terminal helper.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use gobuild_core::{BuildTask, TaskOptions};

/// Flags shared by every task.
#[derive(Args, Debug, Clone, Default)]
pub struct TaskArgs {
    /// Flags passed to the go subcommand, replacing the configured defaults
    #[arg(long, num_args = 1.., allow_hyphen_values = true, value_name = "FLAG")]
    pub flags: Option<Vec<String>>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// go build
    Build(TaskArgs),

    /// go test
    Test(TaskArgs),

    /// go test -bench=.
    Benchmark(TaskArgs),

    /// go install
    Install(TaskArgs),

    /// go clean
    Clean(TaskArgs),

    /// go run on a file
    Run {
        #[command(flatten)]
        task: TaskArgs,
        /// File to run when no flag names one
        file: Option<PathBuf>,
    },

    /// go build for another GOOS/GOARCH
    CrossCompile {
        #[command(flatten)]
        task: TaskArgs,
        /// Target operating system (prompted for when omitted)
        #[arg(long)]
        os: Option<String>,
        /// Target architecture
        #[arg(long, requires = "os")]
        arch: Option<String>,
    },

    /// go get a package
    Get {
        #[command(flatten)]
        task: TaskArgs,
        /// Package URL (prompted for when omitted)
        url: Option<String>,
    },

    /// Open a shell with the configured Go environment
    Terminal,
}

impl Commands {
    /// The Go task this command runs, `None` for the terminal.
    pub const fn task(&self) -> Option<BuildTask> {
        match self {
            Self::Build(_) => Some(BuildTask::Build),
            Self::Test(_) => Some(BuildTask::Test),
            Self::Benchmark(_) => Some(BuildTask::Benchmark),
            Self::Install(_) => Some(BuildTask::Install),
            Self::Clean(_) => Some(BuildTask::Clean),
            Self::Run { .. } => Some(BuildTask::Run),
            Self::CrossCompile { .. } => Some(BuildTask::CrossCompile),
            Self::Get { .. } => Some(BuildTask::Get),
            Self::Terminal => None,
        }
    }

    /// Flags given on the command line, if any.
    pub fn flags(&self) -> Option<Vec<String>> {
        match self {
            Self::Build(task)
            | Self::Test(task)
            | Self::Benchmark(task)
            | Self::Install(task)
            | Self::Clean(task)
            | Self::Run { task, .. }
            | Self::CrossCompile { task, .. }
            | Self::Get { task, .. } => task.flags.clone(),
            Self::Terminal => None,
        }
    }

    /// Task options taken directly from the arguments.
    pub fn options(&self) -> TaskOptions {
        match self {
            Self::Run { file, .. } => TaskOptions {
                active_file: file.clone(),
                ..TaskOptions::default()
            },
            Self::CrossCompile {
                os: Some(os),
                arch: Some(arch),
                ..
            } => TaskOptions {
                platform: Some((os.clone(), arch.clone())),
                ..TaskOptions::default()
            },
            Self::Get { url, .. } => TaskOptions {
                url: url.clone(),
                ..TaskOptions::default()
            },
            _ => TaskOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Cli;
    use clap::Parser;

    #[test]
    fn test_flags_accept_hyphen_values() {
        let cli = Cli::parse_from(["gobuild", "test", "--flags", "-v", "-run", "TestFoo"]);
        assert_eq!(cli.command.task(), Some(BuildTask::Test));
        assert_eq!(
            cli.command.flags(),
            Some(vec!["-v".to_string(), "-run".to_string(), "TestFoo".to_string()])
        );
    }

    #[test]
    fn test_cross_compile_platform() {
        let cli = Cli::parse_from(["gobuild", "cross-compile", "--os", "linux", "--arch", "arm"]);
        let opts = cli.command.options();
        assert_eq!(opts.platform, Some(("linux".to_string(), "arm".to_string())));
        assert_eq!(cli.command.flags(), None);
    }

    #[test]
    fn test_run_file_and_terminal() {
        let cli = Cli::parse_from(["gobuild", "run", "main.go"]);
        assert_eq!(cli.command.options().active_file, Some(PathBuf::from("main.go")));

        let cli = Cli::parse_from(["gobuild", "terminal"]);
        assert_eq!(cli.command.task(), None);
    }
}
