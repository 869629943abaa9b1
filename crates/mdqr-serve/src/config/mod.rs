//! Server configuration with multi-source loading.
//!
//! Merges settings from CLI args, environment variables, and config files.
//! Priority: CLI > Environment (`MDQR_*`) > File (`mdqr.config.json`) > Defaults

mod defaults;
mod loading;
mod validation;

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

pub use defaults::*;
pub use loading::{CliOverrides, DEFAULT_CONFIG_FILE, ENV_PREFIX};

/// Server configuration - loaded from mdqr.config.json, `MDQR_*` or CLI args.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServeConfig {
    /// Address to listen on
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// First port to try; the next nine are tried if it is taken
    #[serde(default = "default_port")]
    pub port: u16,

    /// Window in which bursts of file events collapse into one reload
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Interval between SSE keep-alive comments
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    /// How long `stop` waits for open connections before aborting the server
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,

    /// Interface names tried first when advertising the LAN address
    #[serde(default = "default_preferred_interfaces")]
    pub preferred_interfaces: Vec<String>,
}

impl ServeConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            debounce_ms: default_debounce_ms(),
            keep_alive_secs: default_keep_alive_secs(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            preferred_interfaces: default_preferred_interfaces(),
        }
    }
}
