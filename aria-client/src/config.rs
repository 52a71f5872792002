//! Client-side configuration loading
//!
//! Resolves which backend to talk to from, in order: the CLI argument
//! (either a URL or a named remote alias), the `server` key in
//! config.toml, and finally the default local address.

use std::collections::HashMap;
use std::path::Path;

/// Default backend address
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:7860";

/// Client configuration file (subset relevant to the client)
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
struct ClientConfig {
    /// Default backend URL
    server: Option<String>,
    /// Named server aliases: `aria --server gaming-pc`
    remotes: HashMap<String, String>,
}

fn load_client_config(path: &Path) -> ClientConfig {
    if !path.exists() {
        tracing::debug!("Config file not found, using defaults");
        return ClientConfig::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str::<ClientConfig>(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to parse config file: {}, using defaults", e);
                ClientConfig::default()
            }
        },
        Err(e) => {
            tracing::warn!("Failed to read config file: {}, using defaults", e);
            ClientConfig::default()
        }
    }
}

/// Resolve the backend server URL from the CLI argument and config file
pub fn resolve_server(cli_server: Option<&str>) -> String {
    resolve_server_with(cli_server, &load_client_config(&aria_utils::config_file()))
}

fn resolve_server_with(cli_server: Option<&str>, config: &ClientConfig) -> String {
    if let Some(name) = cli_server {
        // A known alias wins; anything else is taken as a URL
        if let Some(target) = config.remotes.get(name) {
            tracing::debug!("Resolved remote alias '{}' to {}", name, target);
            return target.clone();
        }
        return name.to_string();
    }

    config
        .server
        .clone()
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
}
