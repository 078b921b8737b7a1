//! Validated deployment parameters and the identifiers derived
//! from them.

use std::path::PathBuf;

use crate::error::{DeployError, DeployResult};

/// Everything a deployment run needs, validated up front. The
/// access token is deliberately absent: it lives in a
/// [`secrecy::SecretString`] owned by the source-acquisition
/// stage and is dropped before any remote step.
#[derive(Debug, Clone)]
pub struct DeploymentConfig {
    pub repo_url: String,
    pub branch: String,
    pub remote_user: String,
    pub remote_host: String,
    pub key_path: PathBuf,
    pub app_port: u16,
}

impl DeploymentConfig {
    /// Validate raw prompt input into a usable config.
    ///
    /// Required fields must be non-empty, the port must be a
    /// digits-only integer in `1..=65535`, and the key file must
    /// exist. The key is normalized to owner-only permissions
    /// and a non-IPv4 host gets a warning; both are non-fatal.
    pub fn from_input(
        repo_url: &str,
        branch: &str,
        remote_user: &str,
        remote_host: &str,
        key_path: &str,
        port: &str,
    ) -> DeployResult<Self> {
        for (label, value) in [
            ("repository URL", repo_url),
            ("remote user", remote_user),
            ("remote host", remote_host),
            ("SSH key path", key_path),
            ("application port", port),
        ] {
            if value.trim().is_empty() {
                return Err(DeployError::InvalidInput(format!("{label} is required")));
            }
        }

        let app_port = parse_port(port)?;

        let key_path = PathBuf::from(key_path);
        if !key_path.is_file() {
            return Err(DeployError::InvalidInput(format!(
                "SSH key not found: {}",
                key_path.display()
            )));
        }
        restrict_key_permissions(&key_path);

        if !is_ipv4(remote_host) {
            tracing::warn!("'{remote_host}' is not an IPv4 address, assuming a resolvable hostname");
        }

        let branch = if branch.trim().is_empty() {
            "main".to_string()
        } else {
            branch.trim().to_string()
        };

        Ok(Self {
            repo_url: repo_url.trim().to_string(),
            branch,
            remote_user: remote_user.trim().to_string(),
            remote_host: remote_host.trim().to_string(),
            key_path,
            app_port,
        })
    }
}

/// Accept digits-only port strings in `1..=65535`.
pub fn parse_port(value: &str) -> DeployResult<u16> {
    let value = value.trim();
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(DeployError::InvalidInput(format!(
            "port must be numeric, got '{value}'"
        )));
    }
    match value.parse::<u32>() {
        Ok(p) if (1..=65535).contains(&p) => Ok(u16::try_from(p).unwrap_or_default()),
        _ => Err(DeployError::InvalidInput(format!(
            "port must be between 1 and 65535, got '{value}'"
        ))),
    }
}

/// Dotted-quad check. Hostnames are allowed through; this only
/// drives a warning for values that look like broken addresses.
#[must_use]
pub fn is_ipv4(host: &str) -> bool {
    let octets: Vec<&str> = host.split('.').collect();
    octets.len() == 4
        && octets.iter().all(|o| {
            !o.is_empty()
                && o.len() <= 3
                && o.chars().all(|c| c.is_ascii_digit())
                && o.parse::<u16>().is_ok_and(|n| n <= 255)
        })
}

#[cfg(unix)]
fn restrict_key_permissions(path: &std::path::Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Err(err) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
        tracing::warn!("could not restrict permissions on {}: {err}", path.display());
    }
}

#[cfg(not(unix))]
fn restrict_key_permissions(_path: &std::path::Path) {}

/// Names derived deterministically from the repository URL.
/// Re-computed each run, never persisted.
#[derive(Debug, Clone)]
pub struct Identifiers {
    pub repo_name: String,
    pub slug: String,
}

impl Identifiers {
    #[must_use]
    pub fn from_repo_url(repo_url: &str) -> Self {
        let repo_name = repo_name_from_url(repo_url);
        let slug = slugify(&repo_name);
        Self { repo_name, slug }
    }

    #[must_use]
    pub fn from_app_name(name: &str) -> Self {
        Self {
            repo_name: name.to_string(),
            slug: slugify(name),
        }
    }

    #[must_use]
    pub fn container_name(&self) -> &str {
        &self.slug
    }

    #[must_use]
    pub fn image_tag(&self) -> String {
        format!("{}:latest", self.slug)
    }

    /// Remote project directory, relative to the remote user's
    /// home.
    #[must_use]
    pub fn remote_dir(&self) -> String {
        format!("apps/{}", self.slug)
    }

    #[must_use]
    pub fn nginx_site_file(&self) -> String {
        format!("/etc/nginx/sites-available/{}", self.slug)
    }

    #[must_use]
    pub fn nginx_enabled_link(&self) -> String {
        format!("/etc/nginx/sites-enabled/{}", self.slug)
    }
}

/// Basename of the repository URL, minus any `.git` suffix.
#[must_use]
pub fn repo_name_from_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let base = trimmed.rsplit('/').next().unwrap_or(trimmed);
    base.strip_suffix(".git").unwrap_or(base).to_string()
}

/// Lowercase, docker-tag and filesystem-safe slug. Anything
/// outside `[a-z0-9_.-]` becomes `-`; the result must start
/// with an alphanumeric.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mapped: String = name
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();

    let slug = mapped.trim_matches(|c: char| !c.is_ascii_alphanumeric());
    if slug.is_empty() {
        "app".to_string()
    } else {
        slug.to_string()
    }
}
