use anyhow::Result;

use yuniserver::config::{resolve_base_dir, AppConfig};
use yuniserver::{gui, logging};

fn main() -> Result<()> {
    let base_dir = resolve_base_dir(&std::env::current_dir()?);
    std::env::set_current_dir(&base_dir)?;

    let config = AppConfig::load(&base_dir)?;
    logging::init_logging(logging::LoggingConfig::from(&config.logging))?;
    tracing::info!(working_dir = %config.working_dir.display(), "starting");

    gui::run_app(config).map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}
