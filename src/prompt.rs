//! Interactive parameter collection. All deployment inputs come
//! from prompts; only the cleanup flag lives on the command
//! line.

use std::io::Write;

use secrecy::SecretString;

use crate::config::{DeploymentConfig, Identifiers};
use crate::error::{DeployError, DeployResult};

/// Raw answers for a deployment run, pre-validation. The token
/// is separated from the config so it can be dropped right
/// after the clone URL is built.
pub struct DeployInput {
    pub config: DeploymentConfig,
    pub token: SecretString,
}

/// Collect and validate everything a deployment needs.
pub fn collect_deploy() -> DeployResult<DeployInput> {
    let repo_url = ask("Repository URL")?;
    let token = ask_secret("Access token (input hidden)")?;
    let branch = ask_with_default("Branch", "main")?;
    let remote_user = ask("Remote user")?;
    let remote_host = ask("Remote host")?;
    let key_path = ask("SSH private key path")?;
    let port = ask("Application port")?;

    let config = DeploymentConfig::from_input(
        &repo_url,
        &branch,
        &remote_user,
        &remote_host,
        &key_path,
        &port,
    )?;

    Ok(DeployInput { config, token })
}

/// Inputs for the cleanup path: just enough to address the host
/// and name the application being torn down.
pub struct CleanupInput {
    pub remote_user: String,
    pub remote_host: String,
    pub key_path: std::path::PathBuf,
    pub ids: Identifiers,
}

pub fn collect_cleanup() -> DeployResult<CleanupInput> {
    let remote_user = ask("Remote user")?;
    let remote_host = ask("Remote host")?;
    let key_path = ask("SSH private key path")?;
    let app_name = ask("Application name (repository name)")?;

    for (label, value) in [
        ("remote user", remote_user.as_str()),
        ("remote host", remote_host.as_str()),
        ("SSH key path", key_path.as_str()),
        ("application name", app_name.as_str()),
    ] {
        if value.is_empty() {
            return Err(DeployError::InvalidInput(format!("{label} is required")));
        }
    }

    let key_path = std::path::PathBuf::from(key_path);
    if !key_path.is_file() {
        return Err(DeployError::InvalidInput(format!(
            "SSH key not found: {}",
            key_path.display()
        )));
    }

    Ok(CleanupInput {
        remote_user,
        remote_host,
        key_path,
        ids: Identifiers::from_app_name(&app_name),
    })
}

fn ask(label: &str) -> DeployResult<String> {
    print!("{label}: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn ask_with_default(label: &str, default: &str) -> DeployResult<String> {
    print!("{label} [{default}]: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let answer = line.trim();
    Ok(if answer.is_empty() {
        default.to_string()
    } else {
        answer.to_string()
    })
}

fn ask_secret(label: &str) -> DeployResult<SecretString> {
    let value = rpassword::prompt_password(format!("{label}: "))?;
    Ok(SecretString::from(value))
}
