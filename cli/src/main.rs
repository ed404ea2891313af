//! enable-ci - put a maven project on OpenShift under Jenkins CI

#![cfg_attr(test, allow(clippy::expect_used))]

use std::process::ExitCode;

use shiftci_cli::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse_or_report(std::env::args_os()) {
        Ok(cli) => cli.run().await,
        Err(code) => code,
    }
}
