//! File synchronization: push the working copy to the remote
//! project directory and verify the manifest arrived.

use std::path::Path;

use crate::error::{DeployError, DeployResult};
use crate::source::MANIFEST_FILES;
use crate::ssh::{SshSession, shell_quote};

/// Create the remote project directory if needed and rsync the
/// local working copy into it. The transfer is additive: files
/// removed from the source are left in place on the remote side.
pub fn push_source(ssh: &SshSession, local_dir: &Path, remote_dir: &str) -> DeployResult<()> {
    tracing::info!("syncing {} -> {remote_dir}", local_dir.display());

    ssh.exec(&format!("mkdir -p {}", shell_quote(remote_dir)))?;
    ssh.sync_dir(local_dir, remote_dir)
        .map_err(|e| DeployError::Validation(format!("file transfer failed: {e}")))?;

    verify_manifest(ssh, remote_dir)
}

/// Post-transfer check: the remote directory must hold a
/// Dockerfile or compose file.
fn verify_manifest(ssh: &SshSession, remote_dir: &str) -> DeployResult<()> {
    let listing = ssh.exec(&format!("ls -1 {}", shell_quote(remote_dir)))?;
    let present = listing
        .lines()
        .any(|line| MANIFEST_FILES.contains(&line.trim()));

    if present {
        Ok(())
    } else {
        Err(DeployError::Validation(format!(
            "no Dockerfile or compose file in {remote_dir} after transfer"
        )))
    }
}
