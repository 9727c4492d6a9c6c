//! Sentinel deployment readiness CLI.
//!
//! Watches EKS node groups, CloudFormation stacks, LoadBalancer services
//! and Deployment rollouts until they are ready, then verifies the
//! deployed classifier API over HTTP.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod settings;
mod ui;

use commands::deploy::DeployCommand;
use commands::preflight::PreflightCommand;
use commands::protect::ProtectCommand;
use commands::verify::VerifyCommand;
use commands::wait::WaitCommand;

/// Sentinel - deployment readiness watcher.
#[derive(Parser)]
#[command(
    name = "sentinel",
    version,
    about = "Wait for deployment resources to become ready, then verify them",
    long_about = "Watch EKS node groups, CloudFormation stacks, LoadBalancer services\n\
                  and Deployment rollouts until they reach a terminal state, then run\n\
                  HTTP probes against the deployed API.\n\n\
                  Exit code is 0 only when the watched resource became ready and\n\
                  every verification probe passed."
)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait for a resource to become ready.
    ///
    /// Polls the resource's status at a fixed interval until it is ready,
    /// fails, or the deadline passes.
    Wait(WaitCommand),

    /// Run the verification probes against a deployed endpoint.
    Verify(VerifyCommand),

    /// Run the full deploy-wait-verify pipeline.
    ///
    /// Applies manifests, waits for the rollout and the load balancer,
    /// then probes the API.
    Deploy(DeployCommand),

    /// Toggle CloudFormation termination protection for a stack.
    Protect(ProtectCommand),

    /// Check that required tools and credentials are available.
    Preflight(PreflightCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("info,sentinel=debug,sentinel_cli=debug")
    } else {
        EnvFilter::new("warn,sentinel=info,sentinel_cli=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Wait(cmd) => cmd.run().await,
        Commands::Verify(cmd) => cmd.run().await,
        Commands::Deploy(cmd) => cmd.run().await,
        Commands::Protect(cmd) => cmd.run().await,
        Commands::Preflight(cmd) => cmd.run(),
    }
}
