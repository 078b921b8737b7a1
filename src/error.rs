use std::process::ExitStatus;

pub type DeployResult<T> = Result<T, DeployError>;

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("source acquisition failed: {0}")]
    Source(String),

    #[error("SSH connection failed: {0}")]
    Connectivity(String),

    #[error("remote provisioning failed: {0}")]
    Provision(String),

    #[error("container runtime error: {0}")]
    Runtime(String),

    #[error("proxy configuration error: {0}")]
    Proxy(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("command failed: {command}")]
    CommandFailed { command: String, status: ExitStatus },

    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("container '{0}' did not start after {1} attempts")]
    StartTimeout(String, u32),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DeployError {
    /// Process exit code for the stage this error belongs to.
    /// Anything not tied to a specific stage falls into the
    /// generic validation bucket.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidInput(_) => 2,
            Self::Source(_) => 3,
            Self::Connectivity(_) => 4,
            Self::Provision(_) | Self::Runtime(_) | Self::StartTimeout(..) => 5,
            Self::Proxy(_) => 6,
            Self::Validation(_)
            | Self::CommandFailed { .. }
            | Self::CommandNotFound(_)
            | Self::Io(_)
            | Self::Json(_) => 7,
        }
    }
}
