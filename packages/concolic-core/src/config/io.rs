//! Configuration I/O (YAML loading)
//!
//! YAML schema v1:
//!
//! ```text
//! version: 1
//! search:
//!   initial_width: 32
//!   max_width: 128
//! bounded_solver:
//!   max_candidates: 65536
//! ```

use super::error::{ConfigError, ConfigResult};
use super::search_config::{BoundedSolverConfig, SearchConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Schema versions this build understands
pub const SUPPORTED_VERSIONS: &[u32] = &[1];

/// YAML Schema v1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConcolicConfig {
    /// Schema version (always 1 for v1)
    pub version: u32,

    /// Width escalation / bound widening budgets
    #[serde(default)]
    pub search: SearchConfig,

    /// Budget of the pure-Rust model finder
    #[serde(default)]
    pub bounded_solver: BoundedSolverConfig,
}

impl Default for ConcolicConfig {
    fn default() -> Self {
        Self {
            version: 1,
            search: SearchConfig::default(),
            bounded_solver: BoundedSolverConfig::default(),
        }
    }
}

impl ConcolicConfig {
    /// Load and validate a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate YAML text
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        // Version before the typed parse: a missing field is MissingVersion, not a serde error
        let raw: serde_yaml::Value = serde_yaml::from_str(content)?;
        let version = raw
            .get("version")
            .and_then(serde_yaml::Value::as_u64)
            .ok_or(ConfigError::MissingVersion)?;

        let supported = u32::try_from(version)
            .ok()
            .filter(|version| SUPPORTED_VERSIONS.contains(version));
        if supported.is_none() {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let config: ConcolicConfig = serde_yaml::from_value(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate every section
    pub fn validate(&self) -> ConfigResult<()> {
        self.search.validate()?;
        self.bounded_solver.validate()
    }
}
