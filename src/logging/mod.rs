pub mod config;
mod filters;
mod formatter;
pub mod handle;

pub use config::{ConsoleConfig, FileConfig, LogFormat, LoggingConfig, LoggingConfigError, Rotation};
pub use formatter::LayerOptions;
pub use handle::{LoggingHandle, LoggingStats};

use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes logging from `config`.
///
/// Installs the global subscriber. Fails if the configuration is invalid,
/// the log directory cannot be created, or a subscriber is already set.
pub fn init_logging(
    mut config: LoggingConfig
) -> Result<LoggingHandle, Box<dyn std::error::Error>> {
    config.apply_env_overrides();
    config.validate()?;
    config.ensure_log_dir()?;

    let env_filter = filters::build_filter_from_config(&config);
    let mut layers = Vec::new();

    // Console layer
    if config.console.enabled {
        layers.push(formatter::build_layer(
            config.console.format,
            LayerOptions::from(&config.console),
            std::io::stdout,
        ));
    }

    // File layer
    let file_guard = if config.file.enabled {
        let appender = match config.file.rotation {
            Rotation::Never => rolling::never(&config.file.directory, &config.file.filename),
            Rotation::Hourly => rolling::hourly(&config.file.directory, &config.file.filename),
            Rotation::Daily => rolling::daily(&config.file.directory, &config.file.filename),
        };
        let (writer, guard) = non_blocking(appender);
        let options = LayerOptions {
            with_ansi: false,
            ..LayerOptions::from(&config.console)
        };
        layers.push(formatter::build_layer(config.file.format, options, writer));
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = %config.level,
        console_enabled = config.console.enabled,
        file_enabled = config.file.enabled,
        "Logging system initialized"
    );

    Ok(LoggingHandle::new(file_guard))
}
