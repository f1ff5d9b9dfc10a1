//! Check command - validates configuration the same way `serve` does at startup

use tracing::{error, info};

use crate::config::AppConfig;
use crate::infrastructure::observability::init_tracing;

pub fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_tracing(&config.logging, &config.observability.tracing);

    match crate::check_config(&config) {
        Ok(()) => {
            info!("Configuration OK");
            Ok(())
        }
        Err(e) => {
            error!("Configuration invalid: {}", e);
            Err(e.into())
        }
    }
}
