//! Expression Model
//!
//! Immutable expression trees plus the concolic value wrapper that pairs each
//! tree with the concrete value observed at runtime.
//!
//! ## Architecture
//!
//! ```text
//! expression
//! └── domain/
//!     ├── operator        # Closed operator tag set + native i128 semantics
//!     ├── expression      # Variable | Literal | Binary tree, Rc-shared
//!     └── symbolic_value  # Concolic wrapper: name, expression, concrete shadow
//! ```
//!
//! ## Usage
//!
//! ```text
//! use concolic_core::features::expression::SymbolicValue;
//!
//! let x = SymbolicValue::variable("x");
//! x.set_concrete_value(10);
//!
//! let cond = x.greater_than(5)?;          // (x > 5), concrete 1
//! let bumped = cond.add(1)?;              // ((x > 5) + 1), concrete 2
//! assert_eq!(bumped.collect_variables(), vec!["x"]);
//! ```

pub mod domain;

pub use domain::{Expression, Operand, Operator, SymbolicValue};
