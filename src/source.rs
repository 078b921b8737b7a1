//! Local source acquisition: clone or refresh the repository,
//! then make sure it actually ships a container manifest.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};

use crate::cmd;
use crate::config::DeploymentConfig;
use crate::error::{DeployError, DeployResult};

/// Container manifests recognized at the repository root.
pub const MANIFEST_FILES: [&str; 5] = [
    "Dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

/// What kind of build the deployed repository asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Manifest {
    Dockerfile,
    Compose,
}

impl Manifest {
    /// Look for a recognized manifest at the root of `dir`.
    #[must_use]
    pub fn detect(dir: &Path) -> Option<Self> {
        MANIFEST_FILES
            .iter()
            .find(|name| dir.join(name).is_file())
            .map(|name| {
                if *name == "Dockerfile" {
                    Self::Dockerfile
                } else {
                    Self::Compose
                }
            })
    }
}

/// Ensure a clean local working copy of the target branch and
/// return its path plus the detected manifest kind.
///
/// The token is consumed here: it is embedded into the clone
/// URL, used once, and its zeroizing drop fires before this
/// function returns - no remote stage ever sees it. An existing
/// checkout is hard-reset to the remote tip, deleting local
/// edits - reproducibility wins over preservation.
pub fn acquire(config: &DeploymentConfig, token: SecretString) -> DeployResult<(PathBuf, Manifest)> {
    let ids = crate::config::Identifiers::from_repo_url(&config.repo_url);
    let workdir = std::env::current_dir()?.join(&ids.repo_name);

    if workdir.join(".git").is_dir() {
        tracing::info!("refreshing existing clone at {}", workdir.display());
        refresh(&workdir, &config.branch)?;
    } else {
        tracing::info!("cloning {} (branch {})", config.repo_url, config.branch);
        clone(&config.repo_url, &token, &config.branch, &workdir)?;
    }
    drop(token);

    let manifest = Manifest::detect(&workdir).ok_or_else(|| {
        DeployError::Validation(format!(
            "no Dockerfile or compose file at the root of {}",
            workdir.display()
        ))
    })?;

    Ok((workdir, manifest))
}

/// Build a clone URL with the token embedded. Only `https` URLs
/// get a credential; anything else (ssh remotes) passes through.
fn authenticated_url(repo_url: &str, token: &SecretString) -> String {
    repo_url.strip_prefix("https://").map_or_else(
        || repo_url.to_string(),
        |rest| format!("https://{}@{rest}", token.expose_secret()),
    )
}

fn clone(repo_url: &str, token: &SecretString, branch: &str, dir: &Path) -> DeployResult<()> {
    let url = authenticated_url(repo_url, token);

    // Invoked directly rather than through cmd::run: the URL
    // carries the credential, and git echoes failing URLs to
    // stderr, so neither the command line nor the output may
    // reach logs or error text.
    let output = std::process::Command::new("git")
        .args(["clone", "--branch", branch, &url])
        .arg(dir)
        .output()?;
    drop(url);

    if output.status.success() {
        Ok(())
    } else {
        Err(DeployError::Source(format!(
            "git clone failed for {repo_url} ({branch}) - check URL, token, and branch"
        )))
    }
}

/// Discard local edits and untracked files, then reset to the
/// remote branch tip.
fn refresh(dir: &Path, branch: &str) -> DeployResult<()> {
    let dir_str = dir.to_string_lossy().to_string();
    let remote_ref = format!("origin/{branch}");

    let steps: [&[&str]; 5] = [
        &["checkout", "--", "."],
        &["clean", "-fd"],
        &["fetch", "origin"],
        &["checkout", branch],
        &["reset", "--hard", &remote_ref],
    ];

    for step in steps {
        let mut args = vec!["-C", dir_str.as_str()];
        args.extend_from_slice(step);
        cmd::run("git", &args)
            .map_err(|e| DeployError::Source(format!("git {} failed: {e}", step[0])))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn https_url_gains_credential() {
        let token = SecretString::from("tok123".to_string());
        assert_eq!(
            authenticated_url("https://example.com/foo.git", &token),
            "https://tok123@example.com/foo.git"
        );
    }

    #[test]
    fn ssh_url_passes_through() {
        let token = SecretString::from("tok123".to_string());
        assert_eq!(
            authenticated_url("git@github.com:org/foo.git", &token),
            "git@github.com:org/foo.git"
        );
    }

    #[test]
    fn acquire_consumes_the_token() {
        // Signature guard: acquire owns the token, so it cannot
        // survive into any later stage.
        let _: fn(&DeploymentConfig, SecretString) -> DeployResult<(PathBuf, Manifest)> = acquire;
    }

    #[test]
    fn detect_dockerfile_and_compose() {
        let base = std::env::temp_dir().join(format!("trebuchet-manifest-{}", std::process::id()));

        let docker_dir = base.join("docker");
        std::fs::create_dir_all(&docker_dir).unwrap();
        std::fs::write(docker_dir.join("Dockerfile"), "FROM scratch\n").unwrap();
        assert_eq!(Manifest::detect(&docker_dir), Some(Manifest::Dockerfile));

        let compose_dir = base.join("compose");
        std::fs::create_dir_all(&compose_dir).unwrap();
        std::fs::write(compose_dir.join("compose.yaml"), "services: {}\n").unwrap();
        assert_eq!(Manifest::detect(&compose_dir), Some(Manifest::Compose));

        let empty_dir = base.join("empty");
        std::fs::create_dir_all(&empty_dir).unwrap();
        assert_eq!(Manifest::detect(&empty_dir), None);

        std::fs::remove_dir_all(&base).unwrap();
    }
}
