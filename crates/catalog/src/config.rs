//! Catalog configuration
//!
//! Mirrors a `loam.toml` file. Everything defaults so a bare `Catalog::new`
//! works for a single-process deployment.

use loam_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Process-level configuration for a catalog instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// This process's slot in the id-generator partition
    pub machine_id: u64,
    /// Total number of catalog processes sharing the store
    pub machine_count: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            machine_id: 0,
            machine_count: 1,
        }
    }
}

impl CatalogConfig {
    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    /// Fails on malformed TOML, unknown fields, or invalid partitioning.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: CatalogConfig = toml::from_str(text)
            .map_err(|e| Error::InvalidOperation(format!("invalid catalog config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency.
    ///
    /// # Errors
    /// Fails if the machine partition is empty or the id is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.machine_count == 0 {
            return Err(Error::InvalidOperation(
                "machine-count must be at least 1".into(),
            ));
        }
        if self.machine_id >= self.machine_count {
            return Err(Error::InvalidOperation(format!(
                "machine-id {} is out of range for machine-count {}",
                self.machine_id, self.machine_count
            )));
        }
        Ok(())
    }
}
