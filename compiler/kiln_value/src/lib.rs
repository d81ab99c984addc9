//! Kiln Value - runtime values and the collaborators of the expression core.
//!
//! This crate provides everything the evaluator consumes but does not
//! define itself:
//! - `Value` and the `Variable` cell
//! - `Type` descriptors (cast, union, containment)
//! - truthiness and numeric coercions
//! - the `Function`/`Operator` callable traits and `NativeFunction`
//! - host reflection traits (`HostObject`, `HostClass`)
//! - `EvalError`, `EvalResult` and the error factories

pub mod coerce;
pub mod errors;
mod function;
mod host;
mod ty;
mod value;
mod variable;

pub use errors::{ControlFlow, EvalError, EvalErrorKind, EvalResult};
pub use function::{Arity, Function, FunctionRef, NativeFn, NativeFunction, Operator, OperatorRef};
pub use host::{signature_of, HostClass, HostClassRef, HostError, HostObject, HostRef};
pub use ty::{cast_with_context, Type, TypeKind};
pub use value::{ArrayValue, Heap, ObjectLayout, ObjectValue, Shared, Value};
pub use variable::Variable;
