use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::{Config, LogFormat};

/// `RUST_LOG` wins over the configured level.
pub fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
}

/// Initialize logging. Output goes to stderr so generated code can be piped.
pub fn init(config: &Config) -> Result<()> {
    let filter = env_filter(config);
    match config.log_format {
        LogFormat::Json => Registry::default()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Text => Registry::default()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()?,
    }
    Ok(())
}

/// Log configuration (without credentials)
pub fn log_config(config: &Config) {
    tracing::debug!(
        package = %config.package_name,
        function = %config.function_name,
        mode = ?config.mode,
        output_dir = %config.output_dir.display(),
        store_dir = %config.store_dir.display(),
        remote_key = %config.remote_key,
        credentials = config.credentials.is_some(),
        "configuration loaded"
    );
}
