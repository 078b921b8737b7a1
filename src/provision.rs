//! Remote environment provisioning: Docker, the compose plugin,
//! and Nginx, installed only when absent.

use crate::error::{DeployError, DeployResult};
use crate::ssh::SshSession;

const PROVISION_SCRIPT: &str = include_str!("../scripts/provision.sh");

/// Run the provisioning batch on the remote host. The script is
/// piped over SSH as a single session; every install step checks
/// for the command first, so a provisioned host is a no-op.
pub fn ensure_remote_stack(ssh: &SshSession) -> DeployResult<()> {
    tracing::info!("provisioning remote stack on {}", ssh.destination());

    let output = ssh
        .exec_script(PROVISION_SCRIPT, &[])
        .map_err(|e| DeployError::Provision(e.to_string()))?;

    for line in output.lines() {
        tracing::info!("remote: {line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::PROVISION_SCRIPT;

    #[test]
    fn script_guards_every_install() {
        // Each tool is installed behind an existence check.
        assert!(PROVISION_SCRIPT.contains("command -v docker"));
        assert!(PROVISION_SCRIPT.contains("docker compose version"));
        assert!(PROVISION_SCRIPT.contains("command -v nginx"));
        assert!(PROVISION_SCRIPT.contains("set -euo pipefail"));
        assert!(PROVISION_SCRIPT.contains("usermod -aG docker"));
    }
}
