//! CLI argument parsing with clap derive

use std::ffi::OsString;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory as _, Parser};

use crate::app::{AppContext, OutputFlags};
use crate::commands;
use crate::domain::EnableCiError;

/// Put a maven project on OpenShift under Jenkins CI
#[derive(Parser, Debug)]
#[command(name = "enable-ci", version)]
pub struct Cli {
    #[command(flatten)]
    pub enable: commands::EnableArgs,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output (also set by `NO_COLOR`)
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Execute the CLI and render any failure.
    ///
    /// Returns `ExitCode::FAILURE` after the failure has been printed.
    pub async fn run(self) -> ExitCode {
        let Cli {
            enable,
            json,
            quiet,
            no_color,
        } = self;
        let app = AppContext::new(&OutputFlags {
            no_color,
            quiet,
            json,
        });

        let Err(e) = commands::enable::run(&app, &enable).await else {
            return ExitCode::SUCCESS;
        };
        tracing::debug!(error = ?e, "enable-ci failed");
        report(&app, &e)
    }

    /// Parse `args`, or render the parse failure as a validation error.
    ///
    /// `--help` and `--version` are printed by clap and exit.
    ///
    /// # Errors
    ///
    /// Returns the exit code to terminate with once the failure is printed.
    pub fn parse_or_report<I, T>(args: I) -> Result<Self, ExitCode>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        match Self::try_parse_from(&args) {
            Ok(cli) => Ok(cli),
            Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                err.exit()
            }
            Err(err) => {
                let app = AppContext::new(&raw_output_flags(&args));
                let e: anyhow::Error = EnableCiError::Validation(parse_error_message(&err)).into();
                Err(report(&app, &e))
            }
        }
    }
}

fn report(app: &AppContext, e: &anyhow::Error) -> ExitCode {
    let usage = Cli::command().render_usage().to_string();
    if let Err(render_err) = app.renderer().render_error(e, Some(&usage)) {
        eprintln!("Error: {render_err}");
    }
    ExitCode::FAILURE
}

/// Output flags read straight from the argument list when parsing failed.
fn raw_output_flags(args: &[OsString]) -> OutputFlags {
    let has = |flags: &[&str]| args.iter().skip(1).any(|a| flags.iter().any(|f| a == f));
    OutputFlags {
        no_color: has(&["--no-color"]),
        quiet: has(&["-q", "--quiet"]),
        json: has(&["--json"]),
    }
}

/// clap's rendered error up to its first blank line, on one line and without
/// the `error: ` prefix.
fn parse_error_message(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    let message = rendered
        .lines()
        .take_while(|line| !line.trim().is_empty())
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ");
    message
        .strip_prefix("error: ")
        .map_or_else(|| message.clone(), str::to_string)
}
