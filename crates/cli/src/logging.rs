use anyhow::{anyhow, Result};
use pricebook_core::config::{AppConfig, LoadOptions, LogFormat, LoggingConfig};
use tracing::Level;

/// Installs the stderr subscriber. Stdout carries command output only.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let log_level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|error| anyhow!(error))
}

/// Falls back to default logging when the config does not load; the command
/// itself reports the config error.
pub fn init_from_options(options: &LoadOptions) -> Result<()> {
    let logging = AppConfig::load(options.clone())
        .map(|config| config.logging)
        .unwrap_or_else(|_| AppConfig::default().logging);
    init(&logging)
}
