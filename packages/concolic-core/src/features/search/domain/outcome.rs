//! Search Outcome Models

use std::collections::BTreeMap;

/// Variable name → signed value; ordered so models print deterministically
pub type CounterexampleModel = BTreeMap<String, i128>;

/// Result of one counterexample search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Assignment satisfying every assertion and falsifying the query
    Counterexample {
        model: CounterexampleModel,
        width: u32,
    },

    /// Solver proved no counterexample exists at `width`
    NoCounterexample { width: u32 },

    /// Solver gave up at `width`
    Inconclusive { width: u32 },

    /// Every model up to `max_width` disagreed with native evaluation
    BudgetExhausted { max_width: u32 },
}

impl SearchOutcome {
    /// Counterexample model, if one was found
    pub fn model(&self) -> Option<&CounterexampleModel> {
        match self {
            Self::Counterexample { model, .. } => Some(model),
            _ => None,
        }
    }

    /// Consume into the counterexample model
    pub fn into_model(self) -> Option<CounterexampleModel> {
        match self {
            Self::Counterexample { model, .. } => Some(model),
            _ => None,
        }
    }

    pub fn is_counterexample(&self) -> bool {
        matches!(self, Self::Counterexample { .. })
    }

    /// Width at which the search stopped
    pub fn width(&self) -> u32 {
        match self {
            Self::Counterexample { width, .. }
            | Self::NoCounterexample { width }
            | Self::Inconclusive { width } => *width,
            Self::BudgetExhausted { max_width } => *max_width,
        }
    }
}

/// Search statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchStats {
    /// Total find_counterexample calls
    pub queries: usize,

    /// Width rounds started (one per width tried per query)
    pub width_rounds: usize,

    /// Width escalations caused by spurious models
    pub escalations: usize,

    /// Solver check() calls
    pub solver_checks: usize,

    /// Outcome counts
    pub counterexamples: usize,
    pub unsat_results: usize,
    pub unknown_results: usize,
}

impl SearchStats {
    /// Average solver checks per query
    pub fn checks_per_query(&self) -> f64 {
        if self.queries == 0 {
            return 0.0;
        }
        self.solver_checks as f64 / self.queries as f64
    }
}
