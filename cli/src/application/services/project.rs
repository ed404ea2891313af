//! Application service: load and validate the local project.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::LocalFs;
use crate::domain::EnableCiError;
use crate::domain::project::{BUILD_DESCRIPTOR, Project, VCS_DIR};

/// Check that `path` is a maven project under git and load it.
///
/// # Errors
///
/// Returns a `Validation` error naming the first check that failed: the
/// directory is missing, has no `pom.xml`, has no `.git`, or its name is not a
/// legal application name.
pub fn load_project(fs: &impl LocalFs, path: &Path) -> Result<Project> {
    if !fs.is_dir(path) {
        return Err(
            EnableCiError::Validation(format!("Could not find directory {}", path.display())).into(),
        );
    }
    if !fs.exists(&path.join(BUILD_DESCRIPTOR)) {
        return Err(EnableCiError::Validation(format!(
            "Project {} is not a maven project",
            path.display()
        ))
        .into());
    }
    if !fs.exists(&path.join(VCS_DIR)) {
        return Err(EnableCiError::Validation(format!(
            "Project {} is not committed to a git repository",
            path.display()
        ))
        .into());
    }
    Project::new(path.to_path_buf())
}
