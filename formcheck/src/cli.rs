// formcheck/src/cli.rs
//! Command-line interface definition for the `formcheck` application.
//! License: MIT OR Apache-2.0

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "formcheck",
    author = "Obscura Tech",
    version = env!("CARGO_PKG_VERSION"),
    about = "Validate a submitted form payload against a declarative rule set",
    long_about = "formcheck runs a form's validation rules against a JSON payload, the way a web handler would on submission, and reports one error message per invalid field. Rule sets are YAML files, given by path or by name from the local forms directories.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all log output.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'd', global = true, conflicts_with = "quiet", help = "Enable debug logging.")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validates a JSON payload against a rule set.
    #[command(about = "Validate a JSON payload against a rule set.")]
    Validate(ValidateCommand),

    /// Lists the built-in rules.
    #[command(about = "List the built-in validation rules.")]
    Rules,
}

/// Arguments for the `validate` command.
#[derive(Parser, Debug)]
pub struct ValidateCommand {
    /// Rule set: a YAML file path or a form name.
    #[arg(long, short = 'r', value_name = "FILE|NAME", help = "A YAML rule set path, or a form name looked up in the forms directories.")]
    pub rules: String,

    /// Path to the JSON payload (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read the JSON payload from a file instead of stdin.")]
    pub input: Option<PathBuf>,

    /// Request method; only POST counts as a submission.
    #[arg(long, short = 'm', default_value = "POST", env = "FORMCHECK_METHOD", help = "Request method to simulate. Only POST counts as a submission.")]
    pub method: String,

    /// Remove backslash escaping before validating.
    #[arg(long = "strip-slashes", help = "Remove one level of backslash escaping from submitted values.")]
    pub strip_slashes: bool,

    #[arg(long, short = 'f', value_enum, default_value = "text", help = "Output format.")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// A table of field errors.
    Text,
    /// A JSON report with the submission flag, validity, errors and clean values.
    Json,
}
