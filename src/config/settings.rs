//! Settings configuration types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// General server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Port of the REST API
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Interface the REST API binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// SQLite database file. Defaults to ~/.memedrop/memedrop.db
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Token required in the X-Memedrop-Admin header for admin endpoints.
    /// Admin endpoints are disabled while this is empty.
    #[serde(default)]
    pub admin_token: String,
}

fn default_http_port() -> u16 {
    8787
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            bind_address: default_bind_address(),
            database_path: None,
            admin_token: String::new(),
        }
    }
}
