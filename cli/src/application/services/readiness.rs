//! Application service: wait for an application to become reachable.
//!
//! The probe runs on a background task owned by a [`ReadinessWaiter`]. The
//! waiter aborts any in-flight probe when it is dropped, so the orchestrator
//! can bail out at any point without leaving work behind.

use std::time::Duration;

use anyhow::Result;
use tokio::task::JoinSet;

use crate::application::ports::{PlatformSession, ProgressReporter};
use crate::domain::EnableCiError;
use crate::domain::platform::Application;

/// Default bound on each readiness probe.
pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(180);

/// Slack on top of the probe's own bound before the caller gives up on it.
const JOIN_GRACE: Duration = Duration::from_secs(5);

/// Owns the background task a readiness probe runs on.
pub struct ReadinessWaiter {
    probes: JoinSet<Result<bool>>,
    timeout: Duration,
}

impl ReadinessWaiter {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            probes: JoinSet::new(),
            timeout,
        }
    }

    /// Number of probes still running.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.probes.len()
    }

    /// Wait until `application` is reachable.
    ///
    /// A `false` probe result, a probe error, and an expired wait are all
    /// reported the same way. There is no retry.
    ///
    /// # Errors
    ///
    /// Returns a `Timeout` error if the application did not become reachable
    /// within the configured bound.
    pub async fn await_reachable<S: PlatformSession>(
        &mut self,
        session: &S,
        application: &Application,
        reporter: &impl ProgressReporter,
    ) -> Result<()> {
        reporter.step(&format!(
            "Waiting for application {} to become reachable...",
            application.name
        ));

        // A probe left over from an abandoned wait must not answer for this one.
        self.probes.shutdown().await;

        let timeout = self.timeout;
        let session = session.clone();
        let app = application.clone();
        self.probes
            .spawn(async move { session.wait_until_reachable(&app, timeout).await });

        let joined = tokio::time::timeout(timeout + JOIN_GRACE, self.probes.join_next()).await;
        let reachable = match joined {
            Ok(Some(Ok(Ok(reachable)))) => reachable,
            Ok(Some(Ok(Err(e)))) => {
                tracing::warn!(application = %application.name, error = %e, "readiness probe failed");
                false
            }
            Ok(Some(Err(join_err))) => {
                tracing::warn!(application = %application.name, error = %join_err, "readiness probe did not complete");
                false
            }
            Ok(None) => false,
            Err(_elapsed) => {
                self.probes.shutdown().await;
                false
            }
        };

        if !reachable {
            return Err(EnableCiError::Timeout {
                application: application.name.clone(),
                seconds: timeout.as_secs(),
            }
            .into());
        }
        reporter.success(&format!("application {} ready", application.name));
        Ok(())
    }

    /// Abort every outstanding probe and wait for the aborts to land.
    pub async fn shutdown(&mut self) {
        self.probes.shutdown().await;
    }
}

impl Default for ReadinessWaiter {
    fn default() -> Self {
        Self::new(DEFAULT_READINESS_TIMEOUT)
    }
}
