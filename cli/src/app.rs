//! Application context: state shared by the command handler and error path.
//!
//! Built once in `Cli::run()` so that a failure can be rendered in the same
//! output mode the run was started in.

use std::io::IsTerminal as _;

use anyhow::Result;

use crate::domain::EnableCiError;
use crate::infra::config::YamlConfigStore;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags from the top-level CLI.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Unified application context passed to the command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Source of `~/.shiftci/config.yaml`.
    pub config_store: YamlConfigStore,
    /// When `true`, never prompt.
    ///
    /// Set when stdin is not a terminal or the `CI` environment variable is
    /// present.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &OutputFlags) -> Self {
        let non_interactive = !std::io::stdin().is_terminal() || std::env::var_os("CI").is_some();
        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        // Progress lines would corrupt the JSON document on stdout.
        let quiet = flags.quiet || flags.json;

        Self {
            output: OutputContext::new(flags.no_color, quiet),
            mode,
            config_store: YamlConfigStore::new(),
            non_interactive,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Ask for the account password without echoing it.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error when prompting is not possible, or an
    /// error if the terminal prompt fails.
    pub fn prompt_password(&self, user: &str) -> Result<String> {
        if self.non_interactive {
            return Err(EnableCiError::Validation(
                "No password given: pass --password or set OPENSHIFT_PASSWORD".to_string(),
            )
            .into());
        }
        let password = dialoguer::Password::new()
            .with_prompt(format!("OpenShift password for {user}"))
            .interact()?;
        Ok(password)
    }
}
