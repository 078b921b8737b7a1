//! Teardown path: best-effort removal of everything a deployment
//! created for one application.

use crate::config::Identifiers;
use crate::error::DeployResult;
use crate::runtime;
use crate::ssh::{SshSession, shell_quote};

/// Remove the container, image, nginx site, and project
/// directory for `ids`. Every step treats "already absent" as
/// success, and individual failures are reported but never abort
/// the path - it exists to clear possibly-partial state.
pub fn run(ssh: &SshSession, ids: &Identifiers) -> DeployResult<()> {
    ssh.check_connection()?;

    tracing::info!("tearing down '{}' on {}", ids.slug, ssh.destination());

    if let Err(e) = runtime::teardown(ssh, ids) {
        tracing::warn!("container teardown incomplete: {e}");
    }

    let site_file = ids.nginx_site_file();
    let enabled_link = ids.nginx_enabled_link();
    if let Err(e) = ssh.exec(&format!("sudo rm -f {enabled_link} {site_file}")) {
        tracing::warn!("nginx site removal incomplete: {e}");
    }

    // Reload only if what's left still validates.
    if let Err(e) = ssh.exec("sudo nginx -t && sudo systemctl reload nginx; true") {
        tracing::warn!("nginx reload skipped: {e}");
    }

    if let Err(e) = ssh.exec(&format!("rm -rf {}", shell_quote(&ids.remote_dir()))) {
        tracing::warn!("project directory removal incomplete: {e}");
    }

    tracing::info!("cleanup finished for '{}'", ids.slug);
    Ok(())
}
