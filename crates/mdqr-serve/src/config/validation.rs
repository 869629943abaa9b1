use crate::config::ServeConfig;
use crate::error::{ConfigError, Result};

const MAX_DEBOUNCE_MS: u64 = 10_000;

impl ServeConfig {
    /// Validate configuration values that deserialize fine but cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.keep_alive_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "keepAliveSecs".to_string(),
                value: "0".to_string(),
                hint: "Keep-alive interval must be at least 1 second".to_string(),
            }
            .into());
        }

        if self.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::InvalidValue {
                field: "debounceMs".to_string(),
                value: self.debounce_ms.to_string(),
                hint: format!("Debounce window can be at most {MAX_DEBOUNCE_MS}ms"),
            }
            .into());
        }

        if self.shutdown_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "shutdownTimeoutMs".to_string(),
                value: "0".to_string(),
                hint: "Give open connections at least 1ms to close".to_string(),
            }
            .into());
        }

        if let Some(name) = self
            .preferred_interfaces
            .iter()
            .find(|name| name.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                field: "preferredInterfaces".to_string(),
                value: format!("{name:?}"),
                hint: "Interface names cannot be empty".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
