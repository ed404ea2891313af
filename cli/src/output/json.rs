//! JSON output helpers.
//!
//! Provides the error-object formatter used by `--json` when a run fails and
//! the summary object printed when it succeeds.

use anyhow::{Context, Result};

use crate::application::services::enable_ci::EnableOutcome;
use crate::domain::error::classify;

/// Error code used for failures outside the workflow taxonomy.
pub const UNKNOWN_CODE: &str = "internal";

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Format the summary of a successful run.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_outcome(outcome: &EnableOutcome) -> Result<String> {
    serde_json::to_string_pretty(outcome).context("JSON serialization failed")
}

/// Renders results as JSON on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_outcome(&self, outcome: &EnableOutcome) -> Result<()> {
        println!("{}", format_outcome(outcome)?);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_error(&self, err: &anyhow::Error) -> Result<()> {
        let code = classify(err).map_or(UNKNOWN_CODE, |e| e.code());
        println!("{}", format_error(&format!("{err:#}"), code)?);
        Ok(())
    }
}
