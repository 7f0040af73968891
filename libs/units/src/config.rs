//! Unit system configuration
//!
//! The configuration object is the single input to
//! [`UnitResolver::new`](crate::UnitResolver::new): prefix families, ordered
//! base units, seed unit entries and the cache tuning knobs. A built-in
//! configuration is embedded in the crate and exposed through
//! [`UnitsConfig::default_units`].

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

static DEFAULT_UNITS: Lazy<UnitsConfig> = Lazy::new(|| {
    serde_json::from_str(include_str!("../units-default.json"))
        .expect("failed to parse embedded units-default.json")
});

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnitsConfig {
    /// Prefix families: family name -> prefix -> multiplicative factor.
    pub prefixes: HashMap<String, HashMap<String, f64>>,

    /// Ordered base units; the order fixes every exponent vector and must
    /// stay stable for the life of a resolver.
    pub base_units: Vec<String>,

    /// Seed unit entries, resolved in declaration order. Keys are
    /// comma-separated name lists with optional `[family,...]` tags; values
    /// are unit expressions over base units and earlier entries.
    pub units: serde_json::Map<String, serde_json::Value>,

    /// How long an untouched cache entry survives, in seconds.
    pub sliding_expiration_secs: u64,

    /// Memory pressure percentage at which the cache sheds entries.
    pub high_memory_pressure_threshold: u8,

    /// Percentage of entries dropped when the pressure threshold is hit.
    pub high_memory_pressure_clear_percentage: u8,
}

impl Default for UnitsConfig {
    fn default() -> Self {
        Self {
            prefixes: HashMap::new(),
            base_units: Vec::new(),
            units: serde_json::Map::new(),
            sliding_expiration_secs: 5 * 60,
            high_memory_pressure_threshold: 90,
            high_memory_pressure_clear_percentage: 50,
        }
    }
}

impl UnitsConfig {
    /// The configuration shipped with the crate: SI prefixes, the common
    /// metric/imperial units and the affine temperature scales.
    pub fn default_units() -> UnitsConfig {
        DEFAULT_UNITS.clone()
    }

    pub fn sliding_expiration(&self) -> Duration {
        Duration::from_secs(self.sliding_expiration_secs)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.base_units.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one base unit is required".into(),
            ));
        }
        if self.high_memory_pressure_threshold > 100 {
            return Err(Error::InvalidConfig(format!(
                "highMemoryPressureThreshold must be 0..=100, got {}",
                self.high_memory_pressure_threshold
            )));
        }
        if self.high_memory_pressure_clear_percentage > 100 {
            return Err(Error::InvalidConfig(format!(
                "highMemoryPressureClearPercentage must be 0..=100, got {}",
                self.high_memory_pressure_clear_percentage
            )));
        }
        Ok(())
    }
}
