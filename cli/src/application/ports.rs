//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::future::Future;
use std::path::Path;
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::ShiftCiConfig;
use crate::domain::platform::{
    Account, Application, Cartridge, Credentials, Domain, EmbeddableCartridge, EmbeddedCapability,
    RegisteredKey,
};
use crate::domain::ssh::SshPublicKey;

// ── Platform Ports ────────────────────────────────────────────────────────────

/// Opens authenticated sessions against the hosting platform.
#[allow(async_fn_in_trait)]
pub trait PlatformConnector {
    type Session: PlatformSession;

    /// Authenticate `credentials` against `endpoint` and return a session.
    async fn connect(
        &self,
        client_id: &str,
        credentials: &Credentials,
        endpoint: &str,
    ) -> Result<Self::Session>;
}

/// Resource operations available on an open session.
///
/// Every call is one round trip. Idempotence is the caller's job: look up
/// before you create.
#[allow(async_fn_in_trait)]
pub trait PlatformSession: Clone + Send + Sync + 'static {
    /// The account the session is authenticated as.
    async fn current_user(&self) -> Result<Account>;

    /// The account's domain, if one has been created.
    async fn default_domain(&self) -> Result<Option<Domain>>;

    async fn create_domain(&self, name: &str) -> Result<Domain>;

    /// All applications in `domain`, in the platform's listing order.
    async fn applications(&self, domain: &Domain) -> Result<Vec<Application>>;

    async fn application_by_name(
        &self,
        domain: &Domain,
        name: &str,
    ) -> Result<Option<Application>> {
        Ok(self
            .applications(domain)
            .await?
            .into_iter()
            .find(|app| app.name == name))
    }

    /// Applications running `cartridge`, preserving listing order.
    async fn applications_by_cartridge(
        &self,
        domain: &Domain,
        cartridge: &Cartridge,
    ) -> Result<Vec<Application>> {
        Ok(self
            .applications(domain)
            .await?
            .into_iter()
            .filter(|app| &app.cartridge == cartridge)
            .collect())
    }

    async fn create_application(
        &self,
        domain: &Domain,
        name: &str,
        cartridge: &Cartridge,
    ) -> Result<Application>;

    /// Block until `application` answers or `timeout` elapses.
    ///
    /// Returns `Ok(false)` when the deadline passes. The future is `Send` so
    /// the readiness waiter can run it on a background task.
    fn wait_until_reachable(
        &self,
        application: &Application,
        timeout: Duration,
    ) -> impl Future<Output = Result<bool>> + Send;

    async fn embedded_capability(
        &self,
        domain: &Domain,
        application: &Application,
        cartridge: &EmbeddableCartridge,
    ) -> Result<Option<EmbeddedCapability>>;

    async fn add_embedded_capability(
        &self,
        domain: &Domain,
        application: &Application,
        cartridge: &EmbeddableCartridge,
    ) -> Result<EmbeddedCapability>;

    /// Public keys registered with the account.
    async fn ssh_keys(&self) -> Result<Vec<RegisteredKey>>;

    async fn add_ssh_key(&self, name: &str, key: &SshPublicKey) -> Result<RegisteredKey>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program in `dir`, streaming its output to the console and
    /// capturing it.
    ///
    /// Implementations should delegate to `run_in_with_timeout` using the
    /// instance's configured default timeout.
    async fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<Output>;

    /// Run a program in `dir` with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_in_with_timeout(
        &self,
        dir: &Path,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message, closing the current step.
    fn success(&self, message: &str);
    /// Emit supplementary output such as a platform creation log.
    fn info(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Filesystem and Config Ports ───────────────────────────────────────────────

/// Abstracts the small amount of local filesystem access the workflow needs.
pub trait LocalFs {
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn read_to_string(&self, path: &Path) -> Result<String>;
}

/// Abstracts loading the user configuration.
pub trait ConfigStore {
    /// Load the configuration, returning defaults when no file exists.
    fn load(&self) -> Result<ShiftCiConfig>;
}
