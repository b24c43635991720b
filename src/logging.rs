//! Logging setup for the `extconf` binary
//!
//! Installs a `tracing` subscriber writing to stderr. Priority order
//! (highest to lowest):
//! 1. `EXTCONF_LOG` / `EXTCONF_LOG_FORMAT` environment variables
//! 2. `[logging]` in the settings file
//! 3. Defaults (`warn`, text)

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::settings::{LogFormat, LoggingSettings, SettingsError};

/// Environment variable holding an `EnvFilter` directive
pub const LOG_ENV: &str = "EXTCONF_LOG";

/// Environment variable selecting `text` or `json` output
pub const LOG_FORMAT_ENV: &str = "EXTCONF_LOG_FORMAT";

/// Initialize the global subscriber
pub fn init_logging(config: &LoggingSettings) -> Result<(), SettingsError> {
    let filter = build_env_filter(config)?;
    let format = determine_format(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    installed.map_err(|e| SettingsError::Invalid(format!("Failed to install logger: {}", e)))
}

/// Build the filter from the environment, falling back to the settings level
fn build_env_filter(config: &LoggingSettings) -> Result<EnvFilter, SettingsError> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }

    EnvFilter::try_new(&config.level).map_err(|e| {
        SettingsError::Invalid(format!("Invalid log level '{}': {}", config.level, e))
    })
}

/// Output format from the environment, falling back to the settings format
fn determine_format(config: &LoggingSettings) -> Result<LogFormat, SettingsError> {
    match std::env::var(LOG_FORMAT_ENV) {
        Ok(format) => format.parse(),
        Err(_) => Ok(config.format),
    }
}
