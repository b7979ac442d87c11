//! Application-level form configuration.

use std::time::Duration;

use formbind_path::{validate_storage_path, PathError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid log root: {0}")]
    LogRoot(#[from] PathError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// How long a session notification stays visible.
    pub notice_timeout_ms: u64,
    /// Storage path under which audit log entries are written.
    pub log_root: String,
    /// Wrapper class applied to every bound field.
    pub wrap_class: Option<String>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            notice_timeout_ms: 4_000,
            log_root: "log".to_string(),
            wrap_class: None,
        }
    }
}

impl FormConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: FormConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_storage_path(&self.log_root)?;
        Ok(())
    }

    pub fn notice_timeout(&self) -> Duration {
        Duration::from_millis(self.notice_timeout_ms)
    }
}
