//! The deployment pipeline: a strictly sequential chain of
//! stages, each of which must succeed before the next runs.

use secrecy::SecretString;

use crate::cleanup;
use crate::cmd;
use crate::config::{DeploymentConfig, Identifiers};
use crate::error::{DeployError, DeployResult};
use crate::nginx;
use crate::provision;
use crate::runtime;
use crate::source;
use crate::ssh::SshSession;
use crate::sync;
use crate::verify;

/// Owns the validated config and derived identifiers for one
/// run. Stages short-circuit on the first error; idempotency in
/// every mutating step means re-running after a fix converges to
/// the same end state.
pub struct Pipeline {
    config: DeploymentConfig,
    ids: Identifiers,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: DeploymentConfig) -> Self {
        let ids = Identifiers::from_repo_url(&config.repo_url);
        Self { config, ids }
    }

    /// Run the full deployment. The token is moved into the
    /// source stage and dropped (zeroized) there, before the
    /// first remote step.
    pub fn deploy(&self, token: SecretString) -> DeployResult<()> {
        ensure_tools(&["git", "ssh", "rsync", "curl"])?;

        let (workdir, manifest) = source::acquire(&self.config, token)?;

        let ssh = self.session();
        ssh.check_connection()?;

        provision::ensure_remote_stack(&ssh)?;
        sync::push_source(&ssh, &workdir, &self.ids.remote_dir())?;
        runtime::build_and_run(&ssh, &self.ids, manifest, self.config.app_port)?;
        nginx::configure(&ssh, &self.ids, &self.config.remote_host, self.config.app_port)?;
        verify::verify(&ssh, &self.config.remote_host)?;

        tracing::info!(
            "deployment of '{}' complete: http://{}/ -> 127.0.0.1:{}",
            self.ids.slug,
            self.config.remote_host,
            self.config.app_port
        );
        Ok(())
    }

    fn session(&self) -> SshSession {
        SshSession::new(
            &self.config.remote_host,
            &self.config.remote_user,
            &self.config.key_path,
        )
    }
}

/// Everything the pipeline shells out to locally must be on
/// PATH before any stage runs.
fn ensure_tools(tools: &[&str]) -> DeployResult<()> {
    for tool in tools {
        if !cmd::command_exists(tool) {
            return Err(DeployError::CommandNotFound((*tool).to_string()));
        }
    }
    Ok(())
}

/// Alternate path: tear down whatever a previous run left for
/// this application.
pub fn run_cleanup(
    remote_host: &str,
    remote_user: &str,
    key_path: &std::path::Path,
    ids: &Identifiers,
) -> DeployResult<()> {
    let ssh = SshSession::new(remote_host, remote_user, key_path);
    cleanup::run(&ssh, ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deploy_consumes_the_token() {
        // Signature guard: the token must move into deploy so
        // its zeroizing drop fires inside the source stage,
        // before any remote step. Reverting to a borrow makes
        // this fail to compile.
        let _: fn(&Pipeline, SecretString) -> DeployResult<()> = Pipeline::deploy;
    }

    #[test]
    fn tool_check_flags_the_missing_binary() {
        assert!(ensure_tools(&["sh"]).is_ok());

        let err = ensure_tools(&["sh", "definitely-not-a-real-binary-xyz"]).unwrap_err();
        assert!(matches!(err, DeployError::CommandNotFound(ref t) if t.contains("xyz")));
    }
}
