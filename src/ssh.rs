//! SSH session plumbing: remote command execution, scripted
//! batches, and rsync file transfer.

use std::path::Path;

use crate::cmd;
use crate::error::{DeployError, DeployResult};

/// A remote host reachable as `user@host` with a private key.
///
/// Every remote mutation in the pipeline goes through one of
/// these; commands are passed as explicit argument vectors, and
/// multi-step batches are piped to `bash -s` with shell-quoted
/// positional parameters rather than interpolated into the
/// command line.
pub struct SshSession {
    host: String,
    user: String,
    key: String,
}

impl SshSession {
    #[must_use]
    pub fn new(host: &str, user: &str, key: &Path) -> Self {
        Self {
            host: host.to_string(),
            user: user.to_string(),
            key: key.to_string_lossy().to_string(),
        }
    }

    /// Verify that an SSH session can be established at all.
    pub fn check_connection(&self) -> DeployResult<()> {
        self.exec("true").map_err(|_| {
            DeployError::Connectivity(format!("cannot reach {}", self.destination()))
        })?;
        Ok(())
    }

    /// Execute a command on the remote host and capture output.
    pub fn exec(&self, command: &str) -> DeployResult<String> {
        let args = self.build_args(command);
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        cmd::run("ssh", &refs)
    }

    /// Execute a command on the remote host with output streamed
    /// to the terminal (image builds, package installs).
    pub fn exec_streamed(&self, command: &str) -> DeployResult<()> {
        let args = self.build_args(command);
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        cmd::run_streamed("ssh", &refs)
    }

    /// Pipe a script to `bash -s` on the remote host, passing
    /// `script_args` as quoted positional parameters.
    pub fn exec_script(&self, script: &str, script_args: &[&str]) -> DeployResult<String> {
        let mut command = String::from("bash -s --");
        for arg in script_args {
            command.push(' ');
            command.push_str(&shell_quote(arg));
        }
        let args = self.build_args(&command);
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        cmd::run_with_stdin("ssh", &refs, script.as_bytes())
    }

    /// Feed `content` to a remote command's stdin, e.g.
    /// `sudo tee /etc/nginx/sites-available/app`.
    pub fn exec_with_stdin(&self, command: &str, content: &str) -> DeployResult<String> {
        let args = self.build_args(command);
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        cmd::run_with_stdin("ssh", &refs, content.as_bytes())
    }

    /// Synchronize a local directory's contents into a remote
    /// one with rsync. Version-control metadata and log files
    /// are excluded; nothing is deleted on the remote side
    /// (additive deploys).
    pub fn sync_dir(&self, local_dir: &Path, remote_dir: &str) -> DeployResult<()> {
        let source = format!("{}/", local_dir.to_string_lossy());
        let dest = format!("{}:{remote_dir}/", self.destination());
        let transport = format!("ssh {}", self.base_options().join(" "));

        cmd::run_streamed(
            "rsync",
            &[
                "-az",
                "--exclude=.git",
                "--exclude=*.log",
                "-e",
                &transport,
                &source,
                &dest,
            ],
        )
    }

    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    fn build_args(&self, command: &str) -> Vec<String> {
        let mut args = self.base_options();
        args.push(self.destination());
        args.push(command.to_string());
        args
    }

    fn base_options(&self) -> Vec<String> {
        vec![
            "-i".to_string(),
            self.key.clone(),
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
            "-o".to_string(),
            "ConnectTimeout=10".to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
        ]
    }
}

/// Single-quote a string for a POSIX shell.
#[must_use]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SshSession {
        SshSession::new("198.51.100.7", "deploy", Path::new("/home/me/.ssh/id_ed25519"))
    }

    #[test]
    fn destination_is_user_at_host() {
        assert_eq!(session().destination(), "deploy@198.51.100.7");
    }

    #[test]
    fn command_args_carry_key_and_options() {
        let args = session().build_args("docker ps");
        assert_eq!(args[0], "-i");
        assert_eq!(args[1], "/home/me/.ssh/id_ed25519");
        assert!(args.contains(&"StrictHostKeyChecking=accept-new".to_string()));
        assert!(args.contains(&"BatchMode=yes".to_string()));
        assert_eq!(args.last().unwrap(), "docker ps");
        assert_eq!(args[args.len() - 2], "deploy@198.51.100.7");
    }

    #[test]
    fn quote_plain_and_embedded_quote() {
        assert_eq!(shell_quote("apps/foo"), "'apps/foo'");
        assert_eq!(shell_quote("it's"), "'it'\\''s'");
    }
}
