// ## 📂 File: `src/config.rs`

//! config.rs
//! Serialisable ceiling configuration.
//!
//! ```json
//! { "read_max": 1048576, "write_max": null }
//! ```
//!
//! A missing field or `null` means unlimited.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::limit::Ceilings;
use crate::types::Ceiling;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid limit config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read and write ceilings for a [`Limit`](crate::limit::Limit).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitConfig {
    pub read_max: Ceiling,
    pub write_max: Ceiling,
}

impl LimitConfig {
    pub fn new(read_max: impl Into<Ceiling>, write_max: impl Into<Ceiling>) -> Self {
        Self {
            read_max: read_max.into(),
            write_max: write_max.into(),
        }
    }

    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_reader<Rd: Read>(rd: Rd) -> Result<Self, ConfigError> {
        Ok(serde_json::from_reader(rd)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Overwrites both ceilings of a running limit.
    pub fn apply(&self, ceilings: &Ceilings) {
        ceilings.set_read(self.read_max);
        ceilings.set_write(self.write_max);
        tracing::debug!(read_max = %self.read_max, write_max = %self.write_max, "applied limit config");
    }
}
