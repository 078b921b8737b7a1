//! Remote build & run: tear down the previous container, build
//! the new image, start it bound to loopback, and wait for it to
//! come up.

use std::thread;
use std::time::Duration;

use serde::Deserialize;

use crate::config::Identifiers;
use crate::error::{DeployError, DeployResult};
use crate::source::Manifest;
use crate::ssh::{SshSession, shell_quote};

const START_POLL_ATTEMPTS: u32 = 30;
const START_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Stop, remove, and delete any previous container/image for
/// this application. Absence of any of them counts as success.
pub fn teardown(ssh: &SshSession, ids: &Identifiers) -> DeployResult<()> {
    ssh.exec(&teardown_command(ids))
        .map_err(|e| DeployError::Runtime(format!("container teardown failed: {e}")))?;
    Ok(())
}

/// Each removal tolerates "already absent"; the trailing `true`
/// keeps the session's exit status clean so only a transport
/// failure can surface as an error.
fn teardown_command(ids: &Identifiers) -> String {
    format!(
        "docker stop {name} 2>/dev/null; \
         docker rm {name} 2>/dev/null; \
         docker rmi {tag} 2>/dev/null; \
         true",
        name = ids.container_name(),
        tag = ids.image_tag()
    )
}

/// Build the image and start the container in one remote
/// session. The published port is bound to `127.0.0.1` only;
/// the reverse proxy is the single outward-facing surface.
pub fn build_and_run(
    ssh: &SshSession,
    ids: &Identifiers,
    manifest: Manifest,
    port: u16,
) -> DeployResult<()> {
    teardown(ssh, ids)?;

    let dir = shell_quote(&ids.remote_dir());

    match manifest {
        Manifest::Dockerfile => {
            tracing::info!("building image {}", ids.image_tag());
            ssh.exec_streamed(&format!("cd {dir} && docker build -t {} .", ids.image_tag()))
                .map_err(|e| DeployError::Runtime(format!("image build failed: {e}")))?;

            tracing::info!("starting container {}", ids.container_name());
            ssh.exec(&format!(
                "docker run -d --restart always \
                 -p 127.0.0.1:{port}:{port} \
                 --name {} {}",
                ids.container_name(),
                ids.image_tag()
            ))
            .map_err(|e| DeployError::Runtime(format!("container start failed: {e}")))?;
        }
        Manifest::Compose => {
            tracing::info!("bringing compose project up in {}", ids.remote_dir());
            ssh.exec_streamed(&format!("cd {dir} && docker compose up -d --build"))
                .map_err(|e| DeployError::Runtime(format!("compose up failed: {e}")))?;
        }
    }

    wait_running(ssh, ids, manifest)
}

#[derive(Debug, Deserialize)]
struct Inspection {
    #[serde(rename = "State")]
    state: ContainerState,
}

#[derive(Debug, Deserialize)]
struct ContainerState {
    #[serde(rename = "Running")]
    running: bool,
}

/// Bounded poll against the asynchronous container start: one
/// probe per second, up to [`START_POLL_ATTEMPTS`]. On timeout
/// the container logs are surfaced before failing.
fn wait_running(ssh: &SshSession, ids: &Identifiers, manifest: Manifest) -> DeployResult<()> {
    let name = ids.container_name();

    for attempt in 1..=START_POLL_ATTEMPTS {
        if is_running(ssh, ids, manifest) {
            tracing::info!("container up after {attempt} probe(s)");
            return Ok(());
        }
        tracing::debug!("container not up yet ({attempt}/{START_POLL_ATTEMPTS})");
        thread::sleep(START_POLL_INTERVAL);
    }

    let logs = ssh
        .exec(&format!("docker logs --tail 50 {name} 2>&1; true"))
        .unwrap_or_default();
    if logs.is_empty() {
        tracing::error!("no logs available for {name}");
    } else {
        tracing::error!("last container output:\n{logs}");
    }

    Err(DeployError::StartTimeout(
        name.to_string(),
        START_POLL_ATTEMPTS,
    ))
}

fn is_running(ssh: &SshSession, ids: &Identifiers, manifest: Manifest) -> bool {
    match manifest {
        Manifest::Dockerfile => ssh
            .exec(&format!("docker inspect {}", ids.container_name()))
            .ok()
            .and_then(|raw| parse_running(&raw))
            .unwrap_or(false),
        Manifest::Compose => ssh
            .exec(&format!(
                "cd {} && docker compose ps --status running -q",
                shell_quote(&ids.remote_dir())
            ))
            .is_ok_and(|out| !out.trim().is_empty()),
    }
}

/// `docker inspect` prints a JSON array of matches.
fn parse_running(raw: &str) -> Option<bool> {
    let inspections: Vec<Inspection> = serde_json::from_str(raw).ok()?;
    inspections.first().map(|i| i.state.running)
}

#[cfg(test)]
mod tests {
    use super::{parse_running, teardown_command};
    use crate::config::Identifiers;

    #[test]
    fn teardown_tolerates_absent_resources() {
        let ids = Identifiers::from_repo_url("https://example.com/foo.git");
        let command = teardown_command(&ids);

        assert!(command.contains("docker stop foo 2>/dev/null"));
        assert!(command.contains("docker rm foo 2>/dev/null"));
        assert!(command.contains("docker rmi foo:latest 2>/dev/null"));
        assert!(command.ends_with("true"));
    }

    #[test]
    fn parse_running_state() {
        let raw = r#"[{"Id": "abc", "State": {"Running": true, "Status": "running"}}]"#;
        assert_eq!(parse_running(raw), Some(true));

        let raw = r#"[{"State": {"Running": false}}]"#;
        assert_eq!(parse_running(raw), Some(false));
    }

    #[test]
    fn parse_rejects_garbage_and_empty() {
        assert_eq!(parse_running("[]"), None);
        assert_eq!(parse_running("Error: no such object"), None);
    }
}
