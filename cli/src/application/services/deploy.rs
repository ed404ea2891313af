//! Application service: hand the project over to the platform's git remote.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All process execution is routed through the injected `CommandRunner`.

use anyhow::Result;

use crate::application::ports::{CommandRunner, ProgressReporter};
use crate::domain::EnableCiError;
use crate::domain::platform::{Application, GIT_REMOTE};
use crate::domain::project::Project;

/// Message used for the commit that picks up local changes.
pub const COMMIT_MESSAGE: &str = "deploying";

/// The git invocations `deploy` runs, in order.
///
/// The merge prefers local content on conflict so that the scaffolding the
/// platform put into its repository never overwrites project files.
#[must_use]
pub fn deploy_commands(git_url: &str) -> Vec<Vec<String>> {
    let remote_branch = format!("{GIT_REMOTE}/master");
    [
        vec!["add", "."],
        vec!["commit", "-a", "-m", COMMIT_MESSAGE],
        vec!["remote", "add", GIT_REMOTE, "-f", git_url],
        vec!["merge", remote_branch.as_str(), "-s", "recursive", "-X", "ours"],
        vec!["push", GIT_REMOTE, "HEAD", "-f", "--progress"],
    ]
    .into_iter()
    .map(|args| args.into_iter().map(str::to_owned).collect())
    .collect()
}

/// Commit, merge the platform remote, and force-push the current branch.
///
/// Every command runs with the project as working directory and must succeed
/// before the next one starts.
///
/// # Errors
///
/// Returns a `Transport` error naming the first command that could not be
/// run or exited non-zero.
pub async fn deploy(
    runner: &impl CommandRunner,
    project: &Project,
    application: &Application,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    reporter.info(&format!(
        "Pushing project {} to OpenShift application {}:",
        project.name(),
        application.name
    ));

    for args in deploy_commands(&application.git_url) {
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let cmd_display = format!("git {}", args.join(" "));
        tracing::debug!(command = %cmd_display, dir = %project.path().display(), "running");

        let output = runner
            .run_in(project.path(), "git", &arg_refs)
            .await
            .map_err(|e| EnableCiError::Transport(format!("{cmd_display}: {e:#}")))?;
        if !output.status.success() {
            let code = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            return Err(EnableCiError::Transport(format!("{cmd_display} failed (exit {code})")).into());
        }
    }

    reporter.success(&format!("pushed to {}", application.git_url));
    Ok(())
}
