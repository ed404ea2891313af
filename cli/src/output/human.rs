//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;

use crate::application::services::enable_ci::{EnableOutcome, Tracked};
use crate::application::services::provision::Provisioned;
use crate::domain::EnableCiError;
use crate::domain::error::classify;
use crate::domain::platform::Application;
use crate::output::OutputContext;

/// Renders results as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the summary printed after a successful run.
    pub fn render_outcome(&self, outcome: &EnableOutcome) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.header(&format!("CI enabled for {}", outcome.application.resource.name));
        self.ctx.kv("Account:", &outcome.login);
        self.ctx.kv(
            "Domain:",
            &format!(
                "{} {}",
                outcome.domain.resource.name,
                self.status_tag(outcome.domain.status)
            ),
        );
        self.render_application("Application:", &outcome.application);
        self.render_application("Builder:", &outcome.builder);
        if let Some(url) = &outcome.ci_client.resource.url {
            self.ctx.kv("Build job:", &format!("{}", url.style(self.ctx.styles.url)));
        }
    }

    /// Render a failure the way every code path reports it: the message, the
    /// usage line for input errors, then `Exiting...`.
    pub fn render_error(&self, err: &anyhow::Error, usage: Option<&str>) {
        self.ctx.error(&format!("{err:#}"));
        if let (Some(EnableCiError::Validation(_)), Some(usage)) = (classify(err), usage) {
            println!("{usage}");
        }
        println!("Exiting...");
    }

    fn render_application(&self, label: &str, app: &Tracked<Application>) {
        self.ctx.kv(
            label,
            &format!(
                "{} ({}) {}",
                app.resource.name,
                app.resource.cartridge,
                self.status_tag(app.status)
            ),
        );
        if !app.resource.app_url.is_empty() {
            self.ctx.kv("", &format!("{}", app.resource.app_url.style(self.ctx.styles.url)));
        }
    }

    fn status_tag(&self, status: Provisioned) -> String {
        match status {
            Provisioned::Created => format!("{}", "[created]".style(self.ctx.styles.created)),
            Provisioned::Reused => format!("{}", "[existing]".style(self.ctx.styles.reused)),
        }
    }
}
