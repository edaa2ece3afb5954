//! Init command implementation

use anyhow::{bail, Result};
use std::path::Path;

use memedrop::config::Config;

/// Write a default config (with a fresh admin token) to `config_path`
/// or ~/.memedrop/config.toml
pub fn init_command(config_path: Option<&Path>, force: bool) -> Result<()> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::global_config_path);

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::with_defaults();
    config.save_to_file(&config_path)?;

    println!("Created: {}", config_path.display());
    println!("Admin token: {}", config.settings.admin_token);
    println!("Tasks: {}", config.airdrop.tasks.len());

    Ok(())
}
