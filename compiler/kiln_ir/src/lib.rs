//! Kiln IR - identifiers shared across the expression core.
//!
//! Everything that names a binding (variables, parameters, class members)
//! uses the interned [`Name`] handle.

mod interner;
mod name;

pub use interner::{global as global_interner, InternError, StringInterner};
pub use name::Name;
