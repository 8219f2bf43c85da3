//! Search budget configurations
//!
//! Width escalation and bound widening are the only cancellation mechanism of
//! the counterexample search, so every knob here is range-checked.

use super::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Widest bit-vector the engine will try. Model values are read back as `i128`.
pub const MAX_SUPPORTED_WIDTH: u32 = 128;

/// Counterexample search budgets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Bit width of the first escalation round (8..=128)
    #[serde(default = "default_initial_width")]
    pub initial_width: u32,

    /// Last width tried before giving up (initial_width..=128)
    #[serde(default = "default_max_width")]
    pub max_width: u32,

    /// Width increment after a concrete/solver mismatch (1..=64)
    #[serde(default = "default_width_step")]
    pub width_step: u32,

    /// First bound is 2^initial_bound_bits - 1 (1..=16, below initial_width)
    #[serde(default = "default_initial_bound_bits")]
    pub initial_bound_bits: u32,
}

fn default_initial_width() -> u32 {
    32
}
fn default_max_width() -> u32 {
    MAX_SUPPORTED_WIDTH
}
fn default_width_step() -> u32 {
    8
}
fn default_initial_bound_bits() -> u32 {
    4
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            initial_width: default_initial_width(),
            max_width: default_max_width(),
            width_step: default_width_step(),
            initial_bound_bits: default_initial_bound_bits(),
        }
    }
}

impl SearchConfig {
    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.initial_width < 8 || self.initial_width > MAX_SUPPORTED_WIDTH {
            return Err(ConfigError::range_with_hint(
                "initial_width",
                self.initial_width,
                8,
                MAX_SUPPORTED_WIDTH,
                "Bit width must leave room for the initial bound",
            ));
        }

        if self.max_width < self.initial_width || self.max_width > MAX_SUPPORTED_WIDTH {
            return Err(ConfigError::range_with_hint(
                "max_width",
                self.max_width,
                self.initial_width,
                MAX_SUPPORTED_WIDTH,
                "Solver variables are read back as i128",
            ));
        }

        if self.width_step == 0 || self.width_step > 64 {
            return Err(ConfigError::range_with_hint(
                "width_step",
                self.width_step,
                1,
                64,
                "Escalation must make progress",
            ));
        }

        if self.initial_bound_bits == 0 || self.initial_bound_bits > 16 {
            return Err(ConfigError::range_with_hint(
                "initial_bound_bits",
                self.initial_bound_bits,
                1,
                16,
                "Bound widening starts from small magnitudes",
            ));
        }

        if self.initial_bound_bits >= self.initial_width {
            return Err(ConfigError::Validation(format!(
                "initial_bound_bits ({}) must be smaller than initial_width ({})",
                self.initial_bound_bits, self.initial_width
            )));
        }

        Ok(())
    }

    /// First bound of the widening loop
    pub fn initial_bound(&self) -> u128 {
        (1u128 << self.initial_bound_bits) - 1
    }

    /// Widths visited by the escalation loop, in order
    pub fn widths(&self) -> impl Iterator<Item = u32> {
        let step = self.width_step.max(1) as usize;
        (self.initial_width..=self.max_width).step_by(step)
    }

    /// Builder: Set initial_width
    pub fn initial_width(mut self, v: u32) -> Self {
        self.initial_width = v;
        self
    }

    /// Builder: Set max_width
    pub fn max_width(mut self, v: u32) -> Self {
        self.max_width = v;
        self
    }

    /// Builder: Set width_step
    pub fn width_step(mut self, v: u32) -> Self {
        self.width_step = v;
        self
    }

    /// Builder: Set initial_bound_bits
    pub fn initial_bound_bits(mut self, v: u32) -> Self {
        self.initial_bound_bits = v;
        self
    }
}

/// Bounded model finder budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoundedSolverConfig {
    /// Largest candidate space enumerated before answering UNKNOWN (1..=2^32)
    #[serde(default = "default_max_candidates")]
    pub max_candidates: u64,
}

fn default_max_candidates() -> u64 {
    1 << 16
}

impl Default for BoundedSolverConfig {
    fn default() -> Self {
        Self {
            max_candidates: default_max_candidates(),
        }
    }
}

impl BoundedSolverConfig {
    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_candidates == 0 || self.max_candidates > 1 << 32 {
            return Err(ConfigError::range_with_hint(
                "max_candidates",
                self.max_candidates,
                1,
                1u64 << 32,
                "Enumeration must stay finite",
            ));
        }
        Ok(())
    }

    /// Builder: Set max_candidates
    pub fn max_candidates(mut self, v: u64) -> Self {
        self.max_candidates = v;
        self
    }
}
