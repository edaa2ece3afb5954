//! CLI command implementations

pub mod init;
pub mod news;
pub mod serve;
pub mod status;

use std::path::Path;

use anyhow::Result;
use memedrop::config::Config;
use memedrop::store::Store;

/// Load config and open its database
pub(crate) fn open(config_path: Option<&Path>) -> Result<(Config, Store)> {
    let config = Config::load(config_path)?;
    let store = Store::open(&config.database_path())?;
    Ok((config, store))
}
