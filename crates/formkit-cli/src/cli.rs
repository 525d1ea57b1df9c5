//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Inspect, check and validate formkit form documents.
#[derive(Debug, Parser)]
#[command(name = "formkit", version, about, long_about = None)]
pub struct Cli {
    /// Output format for reports.
    #[arg(long, short, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log filter, e.g. `warn` or `formkit_runtime=debug`.
    #[arg(long, global = true, env = "FORMKIT_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log line format (logs go to stderr).
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the fields of a document and the rules derived for each.
    Inspect {
        /// Document path, or `-` for stdin.
        document: PathBuf,
    },
    /// Check that a document parses and every field's rules derive.
    Check {
        /// Document path, or `-` for stdin.
        document: PathBuf,
    },
    /// Validate filled-in values against a document.
    Validate {
        /// Document path, or `-` for stdin.
        document: PathBuf,
        /// JSON object mapping field ids to a string or an array of strings.
        #[arg(long)]
        values: PathBuf,
    },
    /// Build a new document from field types.
    New {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// A field as `type` or `type:label`; repeatable, in order.
        #[arg(long = "field", value_name = "TYPE[:LABEL]")]
        fields: Vec<String>,
        /// Write the document here instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}
