//! Interactive deployment CLI for containerized applications.
//!
//! Trebuchet takes a git repository with a `Dockerfile` (or
//! compose file) at its root and puts it live on a remote Linux
//! host: it clones the repo, provisions Docker and Nginx over
//! SSH when they are missing, rsyncs the source tree, builds and
//! runs the container bound to loopback, and fronts it with a
//! per-application Nginx reverse proxy on port 80.
//!
//! # Overview
//!
//! A run is a strictly sequential [`Pipeline`] of stages:
//!
//! 1. Interactive parameter collection and validation
//! 2. Source acquisition (clone or hard-refresh the branch)
//! 3. SSH connectivity check
//! 4. Remote provisioning (Docker, compose plugin, Nginx)
//! 5. File synchronization (rsync, additive)
//! 6. Build & run (loopback-bound container, always-restart)
//! 7. Reverse-proxy configuration (validated before reload)
//! 8. Verification (service state fatal, HTTP probes advisory)
//!
//! Every mutating step checks current state first, so re-running
//! the pipeline after a failure converges to the same end state.
//! A `--cleanup` flag selects the alternate teardown path
//! instead.
//!
//! Each stage maps to its own exit code on fatal failure (see
//! [`DeployError::exit_code`]), and every run writes a
//! timestamped log file next to the invocation.

// Allow noisy pedantic lints that don't add value for a
// deployment tool crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod cleanup;
pub mod cmd;
pub mod config;
pub mod error;
pub mod logging;
pub mod nginx;
pub mod pipeline;
pub mod prompt;
pub mod provision;
pub mod runtime;
pub mod source;
pub mod ssh;
pub mod sync;
pub mod verify;

pub use config::{DeploymentConfig, Identifiers};
pub use error::{DeployError, DeployResult};
pub use pipeline::Pipeline;
pub use source::Manifest;
pub use ssh::SshSession;
