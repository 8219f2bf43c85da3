//! Configuration System
//!
//! Two levels:
//! - Level 1: Defaults / builder setters on [`SearchConfig`] and [`BoundedSolverConfig`]
//! - Level 2: Versioned YAML file ([`ConcolicConfig`]) for complete control
//!
//! # Examples
//!
//! ```rust,ignore
//! use concolic_core::config::{ConcolicConfig, SearchConfig};
//!
//! // Level 1: tighten the width budget
//! let search = SearchConfig::default().max_width(64);
//! search.validate()?;
//!
//! // Level 2: YAML
//! let config = ConcolicConfig::from_yaml("search.yaml")?;
//! ```

pub mod error;
pub mod io;
pub mod search_config;

// Re-exports
pub use error::{ConfigError, ConfigResult};
pub use io::{ConcolicConfig, SUPPORTED_VERSIONS};
pub use search_config::{BoundedSolverConfig, SearchConfig};
