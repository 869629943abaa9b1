use crate::config::ServeConfig;
use crate::error::{ConfigError, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use serde::Serialize;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "mdqr.config.json";

/// Prefix for environment overrides (`MDQR_PORT`, `MDQR_DEBOUNCE_MS`, ...).
pub const ENV_PREFIX: &str = "MDQR_";

const ENV_KEYS: &[&str] = &[
    "host",
    "port",
    "debounce_ms",
    "keep_alive_secs",
    "shutdown_timeout_ms",
    "preferred_interfaces",
];

/// Values given on the command line; only the ones present override.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl ServeConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    pub fn load(overrides: &CliOverrides, config_path: Option<&Path>) -> Result<Self> {
        let config_file = match config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()).into());
            }
            Some(path) => Some(path.to_path_buf()),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                default_path.exists().then_some(default_path)
            }
        };

        let config = Self::figment(overrides, config_file.as_deref())
            .extract::<Self>()
            .map_err(|e| ConfigError::InvalidValue {
                field: "configuration".to_string(),
                value: e.to_string(),
                hint: format!("Check {DEFAULT_CONFIG_FILE} syntax and {ENV_PREFIX}* variables"),
            })?;

        config.validate()?;
        tracing::debug!(?config, file = ?config_file, "loaded configuration");
        Ok(config)
    }

    fn figment(overrides: &CliOverrides, config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = config_file {
            figment = figment.merge(Json::file(path));
        }

        figment
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .only(ENV_KEYS)
                    .map(|key| env_key_to_field(key.as_str()).into())
                    .lowercase(false),
            )
            .merge(Serialized::defaults(overrides))
    }
}

/// `DEBOUNCE_MS` -> `debounceMs`, matching the serialized field names.
fn env_key_to_field(key: &str) -> String {
    let mut field = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '_' {
            upper_next = !field.is_empty();
        } else if upper_next {
            field.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            field.push(ch.to_ascii_lowercase());
        }
    }
    field
}
