//! Serve command implementation

use anyhow::{anyhow, Result};
use std::path::Path;
use tokio::runtime::Handle;
use tracing::info;

use memedrop::api::start_http_server;
use memedrop::service::AirdropService;

/// Run the REST API until the server stops or Ctrl-C is pressed
pub async fn serve_command(config_path: Option<&Path>, port: Option<u16>) -> Result<()> {
    let (mut config, store) = super::open(config_path)?;
    if let Some(port) = port {
        config.settings.http_port = port;
    }

    let bind_addr = format!("{}:{}", config.settings.bind_address, config.settings.http_port);
    info!(
        "[memedrop:serve] Database {}, {} tasks, claim reward {}",
        config.database_path().display(),
        config.airdrop.tasks.len(),
        config.airdrop.claim_reward
    );

    let service = AirdropService::new(config, store, Handle::current())?;
    let (addr, server) = start_http_server(service, &bind_addr)?;
    println!("Serving on http://{}", addr);

    let server = tokio::task::spawn_blocking(move || server.join());
    tokio::select! {
        joined = server => {
            joined?.map_err(|_| anyhow!("HTTP server thread panicked"))?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("[memedrop:serve] Shutting down");
        }
    }

    Ok(())
}
