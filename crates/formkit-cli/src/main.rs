#![forbid(unsafe_code)]

use std::process::ExitCode;

use clap::Parser;
use formkit_cli::{Cli, logging};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_format);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match formkit_cli::run(&cli, &mut out) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
