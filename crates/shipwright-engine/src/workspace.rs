//! Per-project workspace provisioning: credentials, clone, checkout, pull.

use std::path::Path;
use tracing::{debug, info};

use shipwright_core::{Error, Job, JobStatus, Pipe, Project, Result};

use crate::pipe::PipeRunner;

/// Subdirectory of the workspace root holding one key file per repository.
pub const CREDENTIALS_DIR: &str = ".ssh";

/// Single-quote a path for interpolation into a shell command, so roots
/// containing spaces survive the `cd`.
pub(crate) fn quoted(path: &Path) -> String {
    format!("'{}'", path.display().to_string().replace('\'', r"'\''"))
}

/// Prepare the project's workspace for a run.
///
/// Returns `Ok(true)` when the project's own run steps may proceed and
/// `Ok(false)` when a git step failed; in the latter case the job is already
/// marked `Fail` and the failing step recorded. Errors cover filesystem and
/// permission setup, which happen before any pipe exists.
pub async fn initialize(
    runner: &PipeRunner,
    root: &Path,
    job: &mut Job,
    project: &Project,
) -> Result<bool> {
    let creds_dir = root.join(CREDENTIALS_DIR);
    tokio::fs::create_dir_all(&creds_dir).await?;

    // Always rewrite the key file so it reflects the latest stored
    // credential.
    let key_file = creds_dir.join(&project.repo.name);
    tokio::fs::write(&key_file, &project.repo.ssh_key).await?;
    restrict_to_owner(&key_file)
        .await
        .map_err(|e| Error::PermissionSetupFailed(e.to_string()))?;
    debug!(path = %key_file.display(), "credential file written");

    let repo_dir = root.join(&project.repo.name);
    let mut cloned = false;
    if !tokio::fs::try_exists(&repo_dir).await? {
        info!(repo = %project.repo.name, "repository not present, cloning");
        let cmd = format!(
            "cd {} && git clone {} --config core.sshCommand=\"ssh -i {}\"",
            quoted(root),
            project.repo.url,
            quoted(&key_file),
        );
        let pipe = Pipe::new("Clone git repository", cmd, false);
        if runner.run(pipe, job).await == JobStatus::Fail {
            job.status = JobStatus::Fail;
            return Ok(false);
        }
        cloned = true;
    }

    // The branch may not exist yet on a fresh clone, or may already be
    // checked out; either way this never fails the job.
    let checkout = Pipe::new(
        format!("Checkout {}", project.repo.branch),
        format!(
            "cd {} && git checkout {}",
            quoted(&repo_dir),
            project.repo.branch
        ),
        true,
    );
    runner.run(checkout, job).await;

    if !cloned {
        let pull = Pipe::new(
            "Pull changes",
            format!("cd {} && git pull", quoted(&repo_dir)),
            false,
        );
        if runner.run(pull, job).await == JobStatus::Fail {
            job.status = JobStatus::Fail;
            return Ok(false);
        }
    }

    Ok(true)
}

#[cfg(unix)]
async fn restrict_to_owner(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await
}

#[cfg(not(unix))]
async fn restrict_to_owner(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
