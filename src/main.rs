// BPAgen - BPA batch file generator
// Copyright (c) 2025 BPAgen Contributors
// Licensed under the MIT License

use bpagen::cli::commands::{EXIT_CANCELLED, EXIT_FATAL};
use bpagen::cli::{Cli, Commands};
use bpagen::config::load_config;
use bpagen::logging::init_logging;
use clap::Parser;
use std::process;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logging settings come from the configuration file when it loads;
    // commands report configuration errors themselves
    let file_config = match &cli.command {
        Commands::Init(_) => None,
        _ => load_config(&cli.config).ok(),
    };
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| file_config.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let logging_config = file_config.map(|c| c.logging).unwrap_or_default();

    let logging_guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "BPAgen - BPA batch file generator"
    );

    let cancellation = CancellationToken::new();
    spawn_signal_handler(cancellation.clone());

    let exit_code = match execute_command(&cli, cancellation.clone()).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FATAL
        }
    };
    let exit_code = if cancellation.is_cancelled() && exit_code != 0 {
        EXIT_CANCELLED
    } else {
        exit_code
    };

    // Flush file logs before exiting
    drop(logging_guard);
    process::exit(exit_code);
}

/// Cancels the token on SIGINT or SIGTERM; the running job stops at its next checkpoint
fn spawn_signal_handler(cancellation: CancellationToken) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                    if tokio::signal::ctrl_c().await.is_ok() {
                        tracing::info!("Received SIGINT (Ctrl+C), cancelling job...");
                        cancellation.cancel();
                    }
                    return;
                }
            };

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received SIGINT (Ctrl+C), cancelling job...");
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, cancelling job...");
                }
            }
            println!("\n⚠️  Shutdown signal received, stopping at the next checkpoint...");
            cancellation.cancel();
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            } else {
                tracing::info!("Received SIGINT (Ctrl+C), cancelling job...");
                println!("\n⚠️  Shutdown signal received, stopping at the next checkpoint...");
                cancellation.cancel();
            }
        }
    });
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, cancellation: CancellationToken) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Generate(args) => args.execute(&cli.config, cancellation).await,
        Commands::RepairAddresses(args) => args.execute(&cli.config, cancellation).await,
        Commands::SetAddress(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
