use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use trebuchet::pipeline::{Pipeline, run_cleanup};
use trebuchet::{DeployResult, logging, prompt};

#[derive(Parser)]
#[command(name = "trebuchet", version)]
#[command(about = "Deploy a containerized application to a remote Linux host")]
struct Cli {
    /// Tear down a previous deployment instead of deploying
    #[arg(long)]
    cleanup: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_path = match logging::init(Path::new(".")) {
        Ok(path) => path,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::from(7);
        }
    };
    tracing::info!("logging to {}", log_path.display());

    let result = if cli.cleanup { cleanup() } else { deploy() };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            // Exit codes are stage-specific and documented on
            // DeployError::exit_code.
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
        }
    }
}

fn deploy() -> DeployResult<()> {
    // Destructured so the token moves into the pipeline and is
    // dropped by the source stage, not held here for the whole
    // run.
    let prompt::DeployInput { config, token } = prompt::collect_deploy()?;
    Pipeline::new(config).deploy(token)
}

fn cleanup() -> DeployResult<()> {
    let input = prompt::collect_cleanup()?;
    run_cleanup(
        &input.remote_host,
        &input.remote_user,
        &input.key_path,
        &input.ids,
    )
}
