//! Configuration for grin

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GrinError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrinConfig {
    /// Capacity of the buffered reader/writer wrapped around files.
    pub buffer_size: usize,
    /// Largest input, in bytes, that `encode` accepts.
    pub max_input_size: u64,
}

impl Default for GrinConfig {
    fn default() -> Self {
        Self {
            buffer_size: 64 * 1024,
            max_input_size: 1024 * 1024 * 1024, // 1 GiB
        }
    }
}

impl GrinConfig {
    /// Load a configuration from a JSON file. Absent fields keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GrinError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: GrinConfig = serde_json::from_str(&raw)
            .map_err(|e| GrinError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GrinError> {
        if self.buffer_size == 0 {
            return Err(GrinError::Config("buffer_size must be non-zero".into()));
        }
        Ok(())
    }
}
