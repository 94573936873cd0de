//! Chronicle - reStructuredText changelog tooling

mod cli;
mod exit_codes;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use chronicle_core::{ChangelogError, ChronicleError, ConfigError};

use cli::{output, Cli};

fn main() {
    let _guard = init_tracing();

    let cli = Cli::parse();
    if let Err(err) = cli.execute() {
        tracing::error!(error = %err, "command failed");
        output::error(format!("{:#}", err));
        std::process::exit(exit_code(&err));
    }
}

/// Map an error to the process exit code
fn exit_code(err: &anyhow::Error) -> i32 {
    let mut changelog = err.downcast_ref::<ChangelogError>();
    let mut config = err.downcast_ref::<ConfigError>();
    match err.downcast_ref::<ChronicleError>() {
        Some(ChronicleError::Changelog(e)) => changelog = Some(e),
        Some(ChronicleError::Config(e)) => config = Some(e),
        _ => {}
    }

    if config.is_some() {
        return exit_codes::CONFIG_ERROR;
    }
    match changelog {
        Some(ChangelogError::MalformedDocument { .. }) => exit_codes::PARSE_ERROR,
        Some(ChangelogError::UnresolvedReference(_) | ChangelogError::UnresolvedSubstitution(_)) => {
            exit_codes::VALIDATION_ERROR
        }
        _ => exit_codes::ERROR,
    }
}

/// Set up tracing with two layers:
/// - Console: controlled by RUST_LOG (default: warn)
/// - File: always debug-level JSON to ~/.chronicle/logs/
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if let Some(log_dir) = log_directory() {
        let file_appender = tracing_appender::rolling::daily(&log_dir, "chronicle.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_filter(console_filter),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_target(true)
                    .with_filter(EnvFilter::new("debug")),
            )
            .init();

        return Some(guard);
    }

    // Fallback: console only
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(console_filter),
        )
        .init();

    None
}

/// Returns the log directory path, creating it if needed.
fn log_directory() -> Option<std::path::PathBuf> {
    let log_dir = dirs::home_dir()?.join(".chronicle").join("logs");
    std::fs::create_dir_all(&log_dir).ok()?;
    Some(log_dir)
}
