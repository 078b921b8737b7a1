//! Post-deployment verification: service health is fatal, HTTP
//! reachability is advisory.

use crate::cmd;
use crate::error::{DeployError, DeployResult};
use crate::ssh::SshSession;

/// Confirm docker and nginx are active, then probe the proxy
/// from both sides. Non-200 probes only warn: once the service
/// is running and the proxy configured, external reachability is
/// the network's problem (firewalls, security groups), not ours.
pub fn verify(ssh: &SshSession, remote_host: &str) -> DeployResult<()> {
    for unit in ["docker", "nginx"] {
        let state = ssh.exec(&state_probe(unit)).unwrap_or_default();
        require_active(unit, state.trim())?;
    }

    // Probe through the proxy on the remote loopback.
    match ssh.exec("curl -s -o /dev/null -w '%{http_code}' -m 10 http://127.0.0.1/") {
        Ok(code) if code == "200" => {
            tracing::info!("local probe through proxy: 200");
        }
        Ok(code) => {
            tracing::warn!("local probe through proxy returned {code}");
        }
        Err(e) => {
            tracing::warn!("local probe through proxy failed: {e}");
        }
    }

    // Probe from the invoking machine.
    let url = format!("http://{remote_host}/");
    match cmd::run(
        "curl",
        &["-s", "-o", "/dev/null", "-w", "%{http_code}", "-m", "10", &url],
    ) {
        Ok(code) if code == "200" => {
            tracing::info!("remote probe {url}: 200");
        }
        Ok(code) => {
            tracing::warn!(
                "remote probe {url} returned {code} - \
                 a firewall or security group may be blocking port 80"
            );
        }
        Err(e) => {
            tracing::warn!(
                "remote probe {url} failed ({e}) - \
                 a firewall or security group may be blocking port 80"
            );
        }
    }

    Ok(())
}

/// `systemctl is-active` exits non-zero for every state except
/// `active`; the trailing `true` keeps the SSH session's exit
/// status clean so the real state lands on stdout instead of
/// vanishing into a command error.
fn state_probe(unit: &str) -> String {
    format!("systemctl is-active {unit}; true")
}

fn require_active(unit: &str, state: &str) -> DeployResult<()> {
    if state == "active" {
        return Ok(());
    }
    let state = if state.is_empty() { "unknown" } else { state };
    let message = format!("{unit} service is not active (state: {state})");
    if unit == "nginx" {
        Err(DeployError::Proxy(message))
    } else {
        Err(DeployError::Runtime(message))
    }
}

#[cfg(test)]
mod tests {
    use super::{require_active, state_probe};
    use crate::error::DeployError;

    #[test]
    fn probe_tolerates_inactive_exit_status() {
        assert_eq!(state_probe("docker"), "systemctl is-active docker; true");
        assert_eq!(state_probe("nginx"), "systemctl is-active nginx; true");
    }

    #[test]
    fn inactive_states_are_reported_verbatim() {
        let err = require_active("docker", "inactive").unwrap_err();
        assert!(err.to_string().contains("state: inactive"));
        assert_eq!(err.exit_code(), 5);

        let err = require_active("nginx", "failed").unwrap_err();
        assert!(matches!(err, DeployError::Proxy(_)));
        assert!(err.to_string().contains("state: failed"));
        assert_eq!(err.exit_code(), 6);
    }

    #[test]
    fn active_passes_and_lost_state_reads_unknown() {
        assert!(require_active("docker", "active").is_ok());

        let err = require_active("docker", "").unwrap_err();
        assert!(err.to_string().contains("state: unknown"));
    }
}
