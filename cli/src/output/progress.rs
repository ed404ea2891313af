//! Progress indicators using indicatif

#![allow(clippy::expect_used)] // Templates are compile-time constants

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Create a spinner for a workflow step that is still running.
///
/// # Panics
///
/// Panics if the spinner template string is invalid (it is a compile-time constant and will not panic).
#[must_use]
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "→"])
            .template("  {spinner:.cyan} {msg} {elapsed:.dim}")
            .expect("valid template"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Finish a spinner, replacing it with `✓ {msg}`.
pub fn finish_ok(pb: &ProgressBar, msg: &str) {
    finish_with(pb, "✓", msg);
}

/// Finish a spinner, replacing it with `✗ {msg}`.
pub fn finish_error(pb: &ProgressBar, msg: &str) {
    finish_with(pb, "✗", msg);
}

fn finish_with(pb: &ProgressBar, prefix: &str, msg: &str) {
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {prefix} {msg}")
            .expect("valid template"),
    );
    pb.set_prefix(prefix.to_string());
    pb.finish_with_message(msg.to_string());
}
