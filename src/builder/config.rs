//! Serializable machine configuration.

use crate::builder::error::BuildError;
use crate::core::{Cadence, DEFAULT_HISTORY_CAPACITY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Settings that can live outside the code, typically in a JSON file.
///
/// `cadences` overrides the cadence of named states at build time.
///
/// # Example
///
/// ```rust
/// use coop_fsm::builder::MachineConfig;
///
/// let config = MachineConfig::from_json(r#"{
///     "history_capacity": 8,
///     "cadences": { "ON": { "interval_ms": 10, "timeout_ms": 5000 } }
/// }"#).unwrap();
///
/// assert_eq!(config.history_capacity, 8);
/// assert_eq!(config.cadences["ON"].timeout_ms, Some(5000));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub history_capacity: usize,
    pub cadences: BTreeMap<String, Cadence>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            cadences: BTreeMap::new(),
        }
    }
}

impl MachineConfig {
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        serde_json::from_str(json).map_err(|e| BuildError::InvalidConfig(e.to_string()))
    }
}
