use anyhow::{anyhow, Result};
use fieldquote_core::config::{AppConfig, LogFormat};
use tracing::Level;

/// Installs the global subscriber. Logs go to stderr; stdout is reserved for
/// command output.
pub fn init_logging(config: &AppConfig) -> Result<()> {
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let installed = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|error| anyhow!("failed to install tracing subscriber: {error}"))
}
