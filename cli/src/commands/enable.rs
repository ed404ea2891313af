//! `enable-ci`: provision CI for a local maven project and deploy it.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::enable_ci::{EnableOptions, EnableOutcome, enable_ci};
use crate::application::services::project::load_project;
use crate::domain::ShiftCiConfig;
use crate::domain::platform::Credentials;
use crate::domain::project::validate_resource_name;
use crate::infra::command_runner::{Echo, TokioCommandRunner};
use crate::infra::fs::{LocalFs, default_public_key, expand_home};
use crate::infra::openshift::BrokerConnector;
use crate::output::TerminalReporter;

/// Arguments for the enable command.
#[derive(Args, Debug)]
pub struct EnableArgs {
    /// Path to the maven project to put under CI
    #[arg(short, long, value_name = "PROJECT")]
    pub project: PathBuf,

    /// OpenShift login
    #[arg(short, long, value_name = "USER")]
    pub user: String,

    /// OpenShift password (prompted for when omitted)
    #[arg(long, alias = "pw", env = "OPENSHIFT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Broker host [default: openshift.redhat.com]
    #[arg(long, value_name = "HOST")]
    pub server: Option<String>,

    /// Seconds to wait for each application to become reachable
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Do not register the local public key with the account
    #[arg(long)]
    pub skip_ssh_key: bool,
}

/// Run the enable command.
///
/// # Errors
///
/// Returns the first validation or workflow failure.
pub async fn run(app: &AppContext, args: &EnableArgs) -> Result<()> {
    let config = resolve_config(app, args)?;
    validate_resource_name(&config.domain)?;
    validate_resource_name(&config.builder_name)?;

    let path = resolve_project_path(&args.project);
    let project = load_project(&LocalFs, &path)?;

    let password = match &args.password {
        Some(password) => password.clone(),
        None => app.prompt_password(&args.user)?,
    };
    let credentials = Credentials {
        user: args.user.clone(),
        password,
    };
    let ssh_key = resolve_ssh_key(&config, args)?;
    tracing::debug!(
        project = %project.path().display(),
        server = %config.server,
        ssh_key = ?ssh_key,
        "starting enable-ci"
    );

    let echo = if app.is_json() || app.output.quiet {
        Echo::Silent
    } else {
        Echo::Console
    };
    let runner = TokioCommandRunner::new(config.deploy.command_timeout()).with_echo(echo);
    let reporter = TerminalReporter::new(&app.output);

    let outcome: EnableOutcome = match enable_ci(
        &BrokerConnector,
        &runner,
        &LocalFs,
        EnableOptions {
            reporter: &reporter,
            project: &project,
            credentials: &credentials,
            endpoint: &config.server,
            domain_name: &config.domain,
            builder_name: &config.builder_name,
            readiness_timeout: config.readiness_timeout(),
            ssh_key: ssh_key.as_deref(),
        },
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            reporter.fail("failed");
            return Err(e);
        }
    };
    drop(reporter);

    app.renderer().render_outcome(&outcome)
}

/// Canonical form of `path`, so `..` and symlinks resolve. A path that does
/// not exist is only made absolute and left for `load_project` to reject.
fn resolve_project_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Layer the stored config, environment overrides, and command-line flags.
fn resolve_config(app: &AppContext, args: &EnableArgs) -> Result<ShiftCiConfig> {
    let mut config = app
        .config_store
        .load()?
        .with_env_overrides(|key| std::env::var(key).ok());
    if let Some(server) = &args.server {
        config.server.clone_from(server);
    }
    if let Some(secs) = args.timeout {
        config.readiness_timeout_secs = secs;
    }
    Ok(config)
}

fn resolve_ssh_key(config: &ShiftCiConfig, args: &EnableArgs) -> Result<Option<PathBuf>> {
    if args.skip_ssh_key || !config.ssh.register_key {
        return Ok(None);
    }
    let path = match &config.ssh.public_key {
        Some(path) => expand_home(path, dirs::home_dir().as_deref()),
        None => default_public_key()?,
    };
    Ok(Some(path))
}
