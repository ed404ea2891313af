//! Application service: the end-to-end enable-ci use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::application::ports::{
    CommandRunner, LocalFs, PlatformConnector, PlatformSession as _, ProgressReporter,
};
use crate::application::services::deploy::deploy;
use crate::application::services::provision::{
    Provisioned, ensure_application, ensure_domain, ensure_embedded, ensure_quota_not_reached,
    ensure_singleton_application,
};
use crate::application::services::readiness::ReadinessWaiter;
use crate::application::services::ssh_key::ensure_public_key;
use crate::domain::platform::{
    APPLICATION_QUOTA, Application, CLIENT_ID, Cartridge, Credentials, Domain,
    EmbeddableCartridge, EmbeddedCapability,
};
use crate::domain::project::Project;

/// Inputs for one `enable_ci` run.
pub struct EnableOptions<'a, R: ProgressReporter> {
    pub reporter: &'a R,
    pub project: &'a Project,
    pub credentials: &'a Credentials,
    /// Broker host the session is opened against.
    pub endpoint: &'a str,
    /// Domain created when the account has none.
    pub domain_name: &'a str,
    /// Name for a new CI server application.
    pub builder_name: &'a str,
    pub readiness_timeout: Duration,
    /// Public key to register before the first domain is created. `None` skips
    /// key registration.
    pub ssh_key: Option<&'a Path>,
}

/// A resource together with whether this run created it.
#[derive(Debug, Clone, Serialize)]
pub struct Tracked<T> {
    #[serde(flatten)]
    pub resource: T,
    pub status: Provisioned,
}

impl<T> From<(T, Provisioned)> for Tracked<T> {
    fn from((resource, status): (T, Provisioned)) -> Self {
        Self { resource, status }
    }
}

/// Outcome of the `enable_ci` use-case.
#[derive(Debug, Clone, Serialize)]
pub struct EnableOutcome {
    pub login: String,
    pub domain: Tracked<Domain>,
    pub application: Tracked<Application>,
    pub builder: Tracked<Application>,
    pub ci_client: Tracked<EmbeddedCapability>,
}

/// Provision CI for the project and deploy it.
///
/// Phases run strictly in order and the first error ends the run. Resources
/// created before the failure are left in place; a re-run picks them up.
/// Any readiness probe still running when this returns is aborted.
///
/// # Errors
///
/// Returns the first phase failure.
pub async fn enable_ci(
    connector: &impl PlatformConnector,
    runner: &impl CommandRunner,
    fs: &impl LocalFs,
    opts: EnableOptions<'_, impl ProgressReporter>,
) -> Result<EnableOutcome> {
    let mut waiter = ReadinessWaiter::new(opts.readiness_timeout);
    let result = run_phases(connector, runner, fs, &opts, &mut waiter).await;
    waiter.shutdown().await;
    result
}

async fn run_phases<R: ProgressReporter>(
    connector: &impl PlatformConnector,
    runner: &impl CommandRunner,
    fs: &impl LocalFs,
    opts: &EnableOptions<'_, R>,
    waiter: &mut ReadinessWaiter,
) -> Result<EnableOutcome> {
    let reporter = opts.reporter;

    // Step 1: Connect.
    reporter.step("Connecting to OpenShift...");
    let session = connector
        .connect(CLIENT_ID, opts.credentials, opts.endpoint)
        .await
        .with_context(|| format!("connecting to {}", opts.endpoint))?;
    let account = session.current_user().await.context("resolving account")?;
    reporter.success(&format!("Connected as {}", account.login));

    // Step 2: Domain, registering the ssh key when one has to be created.
    let domain = ensure_domain(&session, opts.domain_name, reporter, async || {
        match opts.ssh_key {
            Some(path) => ensure_public_key(&session, fs, path, reporter).await.map(drop),
            None => Ok(()),
        }
    })
    .await?;

    // Step 3: Project application and the CI builder.
    let application = ensure_application(
        &session,
        &domain.0,
        opts.project.name(),
        &Cartridge::JbossAs7,
        reporter,
    )
    .await?;
    let builder = ensure_singleton_application(
        &session,
        &domain.0,
        &Cartridge::Jenkins14,
        opts.builder_name,
        reporter,
    )
    .await?;

    // Step 4: Both must answer before the client can be embedded.
    waiter.await_reachable(&session, &builder.0, reporter).await?;
    waiter
        .await_reachable(&session, &application.0, reporter)
        .await?;

    // Step 5: CI client on the project application.
    let ci_client = ensure_embedded(
        &session,
        &domain.0,
        &application.0,
        &EmbeddableCartridge::JenkinsClient14,
        reporter,
    )
    .await?;

    // Step 6: Quota, then deployment.
    ensure_quota_not_reached(&session, &domain.0, APPLICATION_QUOTA, reporter).await?;
    deploy(runner, opts.project, &application.0, reporter).await?;
    reporter.success("Done.");

    Ok(EnableOutcome {
        login: account.login,
        domain: domain.into(),
        application: application.into(),
        builder: builder.into(),
        ci_client: ci_client.into(),
    })
}
