use tracing::Level;
use tracing_subscriber::{
    fmt::format::FmtSpan,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Once;
use anyhow::Result;

use crate::config;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Level,
    /// Log file path (if None, logs only to stdout)
    pub file_path: Option<PathBuf>,
    /// Whether to include file/line info in logs
    pub include_location: bool,
    /// Environment filter override (e.g., "yuniserver=debug")
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            file_path: None,
            include_location: false,
            env_filter: None,
        }
    }
}

impl From<&config::LoggingConfig> for LoggingConfig {
    fn from(settings: &config::LoggingConfig) -> Self {
        Self {
            level: Level::from_str(&settings.level).unwrap_or(Level::INFO),
            file_path: settings.file_path.clone(),
            ..Self::default()
        }
    }
}

/// Initialize the global tracing subscriber
static INIT: Once = Once::new();

pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let mut result = Ok(());
    INIT.call_once(|| {
        result = setup_tracing(config);
    });
    result
}

fn setup_tracing(config: LoggingConfig) -> Result<()> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    // Daily-rolling file layer if configured
    let file_layer = config.file_path.as_ref().map(|file_path| {
        let file_appender = tracing_appender::rolling::daily(
            file_path.parent().unwrap_or_else(|| std::path::Path::new(".")),
            file_path.file_name().and_then(|n| n.to_str()).unwrap_or("yuniserver.log"),
        );
        tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_ansi(false)
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
    });

    let env_filter = match &config.env_filter {
        Some(filter_str) => EnvFilter::try_new(filter_str)?,
        None => EnvFilter::from_default_env()
            .add_directive(format!("yuniserver={}", config.level).parse()?),
    };

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        level = ?config.level,
        file = ?config.file_path,
        "Logging initialized"
    );

    Ok(())
}
