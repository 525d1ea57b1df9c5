#![forbid(unsafe_code)]

//! The `formkit` command-line tool.
//!
//! The binary is a thin shell over [`commands::run`], so the whole tool can
//! be driven in-process with a parsed [`Cli`] and any writer.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

pub use cli::{Cli, Command, LogFormat, OutputFormat};
pub use commands::{Outcome, run};
pub use error::CliError;
