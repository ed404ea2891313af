//! Output formatting module

pub mod human;
pub mod json;
pub mod progress;
pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::OwoColorize as _;
pub use human::HumanRenderer;
pub use json::JsonRenderer;
pub use reporter::TerminalReporter;
pub use styles::Styles;

use crate::application::services::enable_ci::EnableOutcome;

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Check if spinners should be shown.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    /// Print a success message prefixed with `✓`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// Print a step message prefixed with `→`. Suppressed when `quiet`.
    pub fn step(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "→".style(self.styles.info));
        }
    }

    /// Print a warning message prefixed with `⚠`. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Print a failure message. Never suppressed.
    ///
    /// Failures go to stdout: callers script against it.
    pub fn error(&self, msg: &str) {
        println!("{}", msg.style(self.styles.error));
    }

    /// Print indented supplementary text. Suppressed when `quiet`.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            for line in msg.lines() {
                println!("    {}", line.style(self.styles.dim));
            }
        }
    }

    /// Print a section header. Suppressed when `quiet`.
    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.header));
        }
    }

    /// Print a key-value pair with the key dimmed. Suppressed when `quiet`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {:<14} {value}", key.style(self.styles.dim));
        }
    }
}

/// Output rendering for the selected mode.
pub enum Renderer<'a> {
    Human(HumanRenderer<'a>),
    Json(JsonRenderer),
}

impl Renderer<'_> {
    /// Render a successful run.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_outcome(&self, outcome: &EnableOutcome) -> anyhow::Result<()> {
        match self {
            Self::Human(r) => {
                r.render_outcome(outcome);
                Ok(())
            }
            Self::Json(r) => r.render_outcome(outcome),
        }
    }

    /// Render a failed run.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_error(&self, err: &anyhow::Error, usage: Option<&str>) -> anyhow::Result<()> {
        match self {
            Self::Human(r) => {
                r.render_error(err, usage);
                Ok(())
            }
            Self::Json(r) => r.render_error(err),
        }
    }
}
