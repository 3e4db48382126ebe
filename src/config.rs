//! Command-line and environment configuration.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings for the registry service.
///
/// Every flag can also come from the environment (a `.env` file is loaded
/// first by the binary).
#[derive(Debug, Clone, Parser)]
#[command(name = "tag-registry")]
#[command(about = "Maps game-platform account ids to chat tags over HTTP")]
#[command(version)]
pub struct Config {
    /// Location of the storage file
    #[arg(long, env = "TAG_REGISTRY_STORAGE", default_value = "storage.json")]
    pub storage: PathBuf,

    /// HTTP listening interface (empty for all interfaces)
    #[arg(long, env = "TAG_REGISTRY_INTERFACE", default_value = "")]
    pub interface: String,

    /// HTTP listening port
    #[arg(long, env = "TAG_REGISTRY_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Value the Authorization header must carry
    #[arg(long, env = "TAG_REGISTRY_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    /// Write the storage file as indented JSON
    #[arg(long, env = "TAG_REGISTRY_PRETTY")]
    pub pretty: bool,

    /// Emit log lines as JSON
    #[arg(long, env = "TAG_REGISTRY_JSON_LOGS")]
    pub json_logs: bool,

    /// Seconds to wait for in-flight requests on shutdown
    #[arg(long, env = "TAG_REGISTRY_SHUTDOWN_TIMEOUT", default_value_t = 5)]
    pub shutdown_timeout: u64,
}

impl Config {
    /// Host part of the listen address. An empty interface binds every one.
    pub fn host(&self) -> &str {
        if self.interface.is_empty() {
            "0.0.0.0"
        } else {
            &self.interface
        }
    }

    /// Grace period for shutdown.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }
}
