//! Command-line front end for gobuild.
//!
//! Wires terminal adapters for every core port, runs one Go task through the
//! build supervisor and maps the terminal result to an exit code.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the binary only
use dotenvy as _;

pub mod adapters;
pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

// Re-export primary types for convenient access
pub use bootstrap::{CLI_TARGET, CliConfig, CliContext, bootstrap, init_logging, load_settings};
pub use commands::{Commands, TaskArgs};
pub use error::CliError;
pub use parser::Cli;
