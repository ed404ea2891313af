//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly.

use std::cell::RefCell;

use indicatif::ProgressBar;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, progress};

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// On a TTY each `step()` shows a spinner that the next `success()` turns into
/// a `✓` line. Elsewhere steps and successes are printed as plain lines so
/// logs stay readable. Everything except `fail()` is suppressed when
/// `ctx.quiet`.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    active: RefCell<Option<ProgressBar>>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            active: RefCell::new(None),
        }
    }

    /// Mark the in-flight step, if any, as failed.
    pub fn fail(&self, message: &str) {
        if let Some(pb) = self.active.borrow_mut().take() {
            progress::finish_error(&pb, message);
        }
    }

    fn clear_active(&self) {
        if let Some(pb) = self.active.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        self.clear_active();
        if self.ctx.show_progress() {
            *self.active.borrow_mut() = Some(progress::spinner(message));
        } else {
            self.ctx.step(message);
        }
    }

    fn success(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        match self.active.borrow_mut().take() {
            Some(pb) => progress::finish_ok(&pb, message),
            None => self.ctx.success(message),
        }
    }

    fn info(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        match self.active.borrow().as_ref() {
            Some(pb) => pb.suspend(|| self.ctx.info(message)),
            None => self.ctx.info(message),
        }
    }

    fn warn(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        match self.active.borrow().as_ref() {
            Some(pb) => pb.suspend(|| self.ctx.warn(message)),
            None => self.ctx.warn(message),
        }
    }
}

impl Drop for TerminalReporter<'_> {
    fn drop(&mut self) {
        self.clear_active();
    }
}
