//! pingwatch Binary Entry Point
//!
//! Runs a one-shot management command, or the monitoring loop when no
//! command is given. Core functionality is provided by the `pingwatch`
//! library crate.

use std::process::ExitCode;

use pingwatch::cli::{self, Cli, ParsedArgs};
use pingwatch::{AppConfig, Monitor};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing; stdout is reserved for command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = match cli::parse_args(std::env::args_os()) {
        ParsedArgs::Run(cli) => cli,
        ParsedArgs::Message(message) => {
            println!("{message}");
            return ExitCode::FAILURE;
        }
        ParsedArgs::Clap(err) => err.exit(),
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "pingwatch stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.resolve_config()?;
    tracing::debug!(?config, "Configuration resolved");

    match cli.command {
        Some(command) => {
            let registry = config.registry();
            let log = config.availability_log();
            tokio::task::spawn_blocking(move || {
                let stdin = std::io::stdin();
                let stdout = std::io::stdout();
                cli::execute(
                    &command,
                    &registry,
                    &log,
                    &mut stdin.lock(),
                    &mut stdout.lock(),
                )
            })
            .await?
        }
        None => monitor(&config).await,
    }
}

async fn monitor(config: &AppConfig) -> anyhow::Result<()> {
    let monitor = Monitor::new(
        config.registry(),
        config.availability_log(),
        config.monitor.prober(),
    )
    .with_schedule(config.monitor.schedule())
    .with_concurrency(config.monitor.concurrency);

    tracing::info!("Press Ctrl+C to shutdown");

    tokio::select! {
        result = monitor.run() => result?,
        () = shutdown_signal() => tracing::info!("Shutdown complete"),
    }
    Ok(())
}

/// Resolve when the process is asked to stop.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}
