//! `sealctl` — operator CLI for secrets sealed with the system secrets.
//!
//! Startup sequence:
//! 1. Parse the subcommand.
//! 2. Load and validate [`Config`](config::Config) from environment variables.
//! 3. Initialise structured JSON logging on stderr.
//! 4. Derive keys from the configured system secrets and build the manager.
//! 5. Wire Ctrl-C to the cancellation token.
//! 6. Read stdin, run the subcommand, write the result to stdout.

mod commands;
mod config;
mod secrets;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use seal_core::AeadManager;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Encrypt, decrypt and rewrap secrets with the configured system secrets
#[derive(Parser)]
#[command(name = "sealctl", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Command line
    // -----------------------------------------------------------------------
    let cli = Cli::parse();

    // -----------------------------------------------------------------------
    // 2. Configuration
    // -----------------------------------------------------------------------
    let cfg = config::Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: sealctl configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 3. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;

    // -----------------------------------------------------------------------
    // 4. Keys
    // -----------------------------------------------------------------------
    let secrets = cfg.secrets();
    let manager = AeadManager::new(secrets::key_source(&secrets))
        .with_fetch_timeout(cfg.key_fetch_timeout());
    info!(
        version = env!("CARGO_PKG_VERSION"),
        keys = secrets.len(),
        command = ?cli.command,
        "sealctl starting"
    );

    // -----------------------------------------------------------------------
    // 5. Cancellation
    // -----------------------------------------------------------------------
    let ctx = CancellationToken::new();
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; cancelling");
            interrupt.cancel();
        }
    });

    // -----------------------------------------------------------------------
    // 6. Execute
    // -----------------------------------------------------------------------
    let mut input = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut input)
        .await
        .context("failed to read stdin")?;

    let output = commands::execute(cli.command, &manager, &ctx, &input).await?;

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(&output)
        .await
        .context("failed to write stdout")?;
    stdout.flush().await.context("failed to flush stdout")?;

    Ok(())
}
