//! Host reflection.
//!
//! Host objects and classes are reached by member name and runtime argument
//! types. Implementations report failures as [`HostError`]; the evaluator
//! wraps every one of them into the language error type so interpreted code
//! never sees a raw host fault.

use std::fmt;
use std::sync::Arc;

use crate::ty::Type;
use crate::value::Value;

/// Shared handle to a host object.
pub type HostRef = Arc<dyn HostObject>;

/// Shared handle to a host class.
pub type HostClassRef = Arc<dyn HostClass>;

/// Failure of a reflective host operation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("no field `{field}` on {class}")]
    NoSuchField { class: String, field: String },
    #[error("no method `{method}({signature})` on {class}")]
    NoSuchMethod {
        class: String,
        method: String,
        signature: String,
    },
    #[error("no constructor `{class}({signature})`")]
    NoSuchConstructor { class: String, signature: String },
    #[error("illegal access to `{member}` on {class}")]
    IllegalAccess { class: String, member: String },
    #[error("{class}.{member} threw: {message}")]
    TargetThrew {
        class: String,
        member: String,
        message: String,
    },
}

/// An instance of a host class.
pub trait HostObject: Send + Sync + fmt::Debug {
    fn class_name(&self) -> &str;

    fn get_field(&self, field: &str) -> Result<Value, HostError>;

    fn set_field(&self, field: &str, value: Value) -> Result<(), HostError>;

    /// Look up a method by name and the runtime types of `args`, then call it.
    fn invoke_method(&self, method: &str, args: &[Value]) -> Result<Value, HostError>;
}

/// A host class: constructors and static members.
pub trait HostClass: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn construct(&self, args: &[Value]) -> Result<Value, HostError>;

    fn get_static(&self, field: &str) -> Result<Value, HostError>;

    fn set_static(&self, field: &str, value: Value) -> Result<(), HostError>;

    fn invoke_static(&self, method: &str, args: &[Value]) -> Result<Value, HostError>;
}

/// Comma-separated runtime types of `args`, for overload diagnostics.
pub fn signature_of(args: &[Value]) -> String {
    args.iter()
        .map(|arg| Type::of(arg).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
