use std::path::PathBuf;
use anyhow::{Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use portfolio_chat::Config;

const LOG_FILE: &str = "portfolio.log";

fn filter(config: &Config, default_level: &str) -> EnvFilter {
    let default_filter = config.log_level.as_deref().unwrap_or(default_level);
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

pub fn log_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow!("Could not determine local data directory"))?;
    Ok(data_dir.join("portfolio-chat"))
}

/// Log to a file while the terminal UI owns the screen.
///
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init_file(config: &Config) -> Result<WorkerGuard> {
    let dir = log_dir()?;
    std::fs::create_dir_all(&dir)?;

    let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter(config, "info"))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(writer),
        )
        .init();

    Ok(guard)
}

/// Log warnings to stderr for one-shot commands.
pub fn init_stderr(config: &Config) {
    tracing_subscriber::registry()
        .with(filter(config, "warn"))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
