//! Application service: create-or-reuse over the platform resource hierarchy.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! Nothing here deletes or re-creates a resource that already exists.

use anyhow::{Context, Result};

use crate::application::ports::{PlatformSession, ProgressReporter};
use crate::domain::EnableCiError;
use crate::domain::platform::{
    Application, Cartridge, Domain, EmbeddableCartridge, EmbeddedCapability,
};

/// Whether a resource was found or had to be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provisioned {
    Created,
    Reused,
}

/// Return the account's default domain, creating `name` when there is none.
///
/// `before_create` runs only when a domain is about to be created; the
/// orchestrator uses it to register the SSH key first.
///
/// # Errors
///
/// Returns an error if a platform call or `before_create` fails.
pub async fn ensure_domain<S, F>(
    session: &S,
    name: &str,
    reporter: &impl ProgressReporter,
    before_create: F,
) -> Result<(Domain, Provisioned)>
where
    S: PlatformSession,
    F: AsyncFnOnce() -> Result<()>,
{
    reporter.step("Looking up domain...");
    if let Some(domain) = session
        .default_domain()
        .await
        .context("looking up default domain")?
    {
        reporter.success(&format!("using existing domain {}", domain.name));
        return Ok((domain, Provisioned::Reused));
    }

    before_create().await?;
    reporter.step(&format!("Creating domain {name}..."));
    let domain = session
        .create_domain(name)
        .await
        .with_context(|| format!("creating domain {name}"))?;
    reporter.success(&format!("domain {} created", domain.name));
    Ok((domain, Provisioned::Created))
}

/// Return the application called `name`, creating it with `cartridge` if absent.
///
/// # Errors
///
/// Returns a `Precondition` error if the application exists with a different
/// cartridge, or any platform error.
pub async fn ensure_application(
    session: &impl PlatformSession,
    domain: &Domain,
    name: &str,
    cartridge: &Cartridge,
    reporter: &impl ProgressReporter,
) -> Result<(Application, Provisioned)> {
    reporter.step(&format!("Creating application {name}..."));
    let existing = session
        .application_by_name(domain, name)
        .await
        .with_context(|| format!("looking up application {name}"))?;

    match existing {
        Some(app) if &app.cartridge == cartridge => {
            reporter.success(&format!("application {name}: using existing"));
            Ok((app, Provisioned::Reused))
        }
        Some(app) => Err(EnableCiError::Precondition(format!(
            "Application {name} already exists with cartridge {}, expected {cartridge}",
            app.cartridge
        ))
        .into()),
        None => {
            let app = session
                .create_application(domain, name, cartridge)
                .await
                .with_context(|| format!("creating application {name}"))?;
            reporter.success(&format!("application {name} created"));
            Ok((app, Provisioned::Created))
        }
    }
}

/// Return the first application running `cartridge`, creating `default_name`
/// when the domain has none.
///
/// Duplicates are tolerated: the first in listing order wins.
///
/// # Errors
///
/// Returns an error if a platform call fails.
pub async fn ensure_singleton_application(
    session: &impl PlatformSession,
    domain: &Domain,
    cartridge: &Cartridge,
    default_name: &str,
    reporter: &impl ProgressReporter,
) -> Result<(Application, Provisioned)> {
    reporter.step(&format!("Creating {cartridge} application..."));
    let mut candidates = session
        .applications_by_cartridge(domain, cartridge)
        .await
        .with_context(|| format!("listing {cartridge} applications"))?;

    if candidates.is_empty() {
        let app = session
            .create_application(domain, default_name, cartridge)
            .await
            .with_context(|| format!("creating application {default_name}"))?;
        reporter.success(&format!("application {} created", app.name));
        if let Some(log) = app.creation_log.as_deref().filter(|l| !l.trim().is_empty()) {
            reporter.info(log);
        }
        return Ok((app, Provisioned::Created));
    }

    let app = candidates.swap_remove(0);
    if !candidates.is_empty() {
        tracing::debug!(count = candidates.len() + 1, %cartridge, "several singleton candidates, taking the first");
        reporter.warn(&format!(
            "{} {cartridge} applications found, using {}",
            candidates.len() + 1,
            app.name
        ));
    }
    reporter.success(&format!("application {}: using existing", app.name));
    Ok((app, Provisioned::Reused))
}

/// Attach `cartridge` to `application` unless it is already embedded.
///
/// # Errors
///
/// Returns an error if a platform call fails.
pub async fn ensure_embedded(
    session: &impl PlatformSession,
    domain: &Domain,
    application: &Application,
    cartridge: &EmbeddableCartridge,
    reporter: &impl ProgressReporter,
) -> Result<(EmbeddedCapability, Provisioned)> {
    reporter.step(&format!("Embedding {cartridge} into {}...", application.name));
    let existing = session
        .embedded_capability(domain, application, cartridge)
        .await
        .with_context(|| format!("looking up {cartridge} on {}", application.name))?;

    if let Some(capability) = existing {
        let at = capability.url.as_deref().unwrap_or("(no url reported)");
        reporter.success(&format!("{cartridge}: using existing at {at}"));
        return Ok((capability, Provisioned::Reused));
    }

    let capability = session
        .add_embedded_capability(domain, application, cartridge)
        .await
        .with_context(|| format!("embedding {cartridge} into {}", application.name))?;
    reporter.success(&format!("{cartridge} embedded"));
    if let Some(log) = capability.creation_log.as_deref().filter(|l| !l.trim().is_empty()) {
        reporter.info(log);
    }
    Ok((capability, Provisioned::Created))
}

/// Fail when `domain` has no free slot left for the builder application.
///
/// # Errors
///
/// Returns a `Quota` error when the domain holds `limit` or more applications.
pub async fn ensure_quota_not_reached(
    session: &impl PlatformSession,
    domain: &Domain,
    limit: usize,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    reporter.step("Checking for free application slot...");
    let count = session
        .applications(domain)
        .await
        .context("listing applications")?
        .len();
    if count >= limit {
        return Err(EnableCiError::Quota { count, limit }.into());
    }
    reporter.success(&format!("{count} of {limit} application slots used"));
    Ok(())
}
