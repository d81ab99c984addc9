//! Single import point for evaluation error types and constructors.
//!
//! ```text
//! use kiln_eval::errors::{undefined_variable, index_out_of_bounds};
//! ```

pub use kiln_value::errors::*;
