//! Init command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::ChunkStore;
use std::path::PathBuf;
use tracing::info;

/// Write the default configuration and create the chunk database
pub async fn cmd_init(base_dir: Option<PathBuf>, force: bool) -> Result<Config> {
    let config = Config::load_from(base_dir)?;

    if config.paths.config_file.exists() && !force {
        return Err(Error::Config(format!(
            "Config file already exists at {} (use --force to overwrite)",
            config.paths.config_file.display()
        )));
    }

    config.save()?;

    // Creating the store also creates the database and its schema
    ChunkStore::connect(&config).await?;

    info!("Initialized docqa at {:?}", config.paths.base_dir);
    Ok(config)
}
