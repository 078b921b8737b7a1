//! Thin wrappers around [`std::process::Command`] for the local
//! tools the pipeline shells out to (`git`, `ssh`, `rsync`,
//! `curl`).

use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::{DeployError, DeployResult};

/// Run a command and capture trimmed stdout. A non-zero exit
/// code is an error; stderr goes to the debug log.
pub fn run(program: &str, args: &[&str]) -> DeployResult<String> {
    tracing::debug!(program, ?args, "exec");

    let output = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| spawn_error(program, &e))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::debug!(%stderr, "command stderr");
        Err(DeployError::CommandFailed {
            command: render(program, args),
            status: output.status,
        })
    }
}

/// Run a command with stdio inherited, so the user sees its
/// output live (builds, rsync progress).
pub fn run_streamed(program: &str, args: &[&str]) -> DeployResult<()> {
    tracing::debug!(program, ?args, "exec (streamed)");

    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| spawn_error(program, &e))?;

    if status.success() {
        Ok(())
    } else {
        Err(DeployError::CommandFailed {
            command: render(program, args),
            status,
        })
    }
}

/// Run a command feeding `stdin_data` to its stdin and capturing
/// stdout. Used to pipe scripts and generated files over SSH.
pub fn run_with_stdin(program: &str, args: &[&str], stdin_data: &[u8]) -> DeployResult<String> {
    tracing::debug!(program, ?args, "exec (piped stdin)");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_error(program, &e))?;

    if let Some(stdin) = &mut child.stdin {
        stdin.write_all(stdin_data)?;
    }
    drop(child.stdin.take());

    let output = child.wait_with_output()?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::debug!(%stderr, "command stderr");
        Err(DeployError::CommandFailed {
            command: render(program, args),
            status: output.status,
        })
    }
}

/// Check whether a command exists on the local PATH.
#[must_use]
pub fn command_exists(program: &str) -> bool {
    Command::new("which")
        .arg(program)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

fn spawn_error(program: &str, err: &std::io::Error) -> DeployError {
    if err.kind() == std::io::ErrorKind::NotFound {
        DeployError::CommandNotFound(program.to_string())
    } else {
        DeployError::Io(std::io::Error::new(err.kind(), err.to_string()))
    }
}

fn render(program: &str, args: &[&str]) -> String {
    let mut parts = vec![program];
    parts.extend_from_slice(args);
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_joins_program_and_args() {
        assert_eq!(render("ssh", &["-i", "key", "host"]), "ssh -i key host");
        assert_eq!(render("git", &[]), "git");
    }

    #[test]
    fn command_exists_distinguishes_present_and_absent() {
        assert!(command_exists("sh"));
        assert!(!command_exists("definitely-not-a-real-binary-xyz"));
    }

    #[test]
    fn missing_program_is_command_not_found() {
        let err = run("definitely-not-a-real-binary-xyz", &[]).unwrap_err();
        assert!(matches!(err, DeployError::CommandNotFound(_)));
    }
}
