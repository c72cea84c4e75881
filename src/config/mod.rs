pub mod app_config;

// Re-export main configuration types
pub use app_config::{
    resolve_base_dir, AppConfig, LoggingConfig, RcloneConfig, TransferConfig, CONFIG_FILE_NAME,
};
