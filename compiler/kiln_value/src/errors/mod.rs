//! Language-level errors.
//!
//! Every fault raised while evaluating a tree, whether it comes from a
//! failed cast, an operator, a host reflective call or an interpreted
//! callee, is an [`EvalError`]. Interpreted code can therefore catch all of
//! them uniformly. Host faults keep their original error as the `cause`.
//!
//! Factory functions (e.g. [`division_by_zero`]) are the public way to build
//! errors; they populate both the structured `kind` and the `message`.

use std::fmt;
use std::sync::Arc;

use crate::host::HostError;
use crate::value::Value;

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Non-error control transfer carried through the error channel.
///
/// Signals unwind exactly like errors but are never intercepted by
/// language-level `catch` handlers.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlFlow {
    /// Early return from the innermost `let` block or closure body.
    Return(Value),
}

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Arithmetic
    DivisionByZero,
    IntegerOverflow {
        operation: String,
    },

    // Type/Operator
    TypeMismatch {
        expected: String,
        got: String,
    },
    InvalidOperand {
        op: String,
        type_name: String,
    },
    BinaryTypeMismatch {
        op: String,
        left: String,
        right: String,
    },

    // Access
    UndefinedVariable {
        name: String,
    },
    ImmutableBinding {
        name: String,
    },
    IndexOutOfBounds {
        index: i64,
        length: usize,
    },
    CannotIndex {
        type_name: String,
    },
    CannotAssignIndex {
        type_name: String,
    },
    NullReference {
        operation: String,
    },
    NoSuchMember {
        member: String,
        type_name: String,
    },
    MapKeysMustBeStrings {
        got: String,
    },
    InvalidAssignmentTarget,

    // Function
    ArityMismatch {
        name: String,
        expected: String,
        got: usize,
    },
    NotCallable {
        type_name: String,
    },

    // Host
    HostDispatch {
        operation: String,
    },

    /// Raised by interpreted code.
    Thrown {
        message: String,
    },

    /// Catch-all for errors without a structured kind.
    Custom {
        message: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::IntegerOverflow { operation } => write!(f, "integer overflow in {operation}"),

            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::InvalidOperand { op, type_name } => {
                write!(f, "operator `{op}` cannot be applied to {type_name}")
            }
            Self::BinaryTypeMismatch { op, left, right } => {
                write!(f, "operator `{op}` cannot be applied to `{left}` and `{right}`")
            }

            Self::UndefinedVariable { name } => write!(f, "undefined variable: {name}"),
            Self::ImmutableBinding { name } => {
                write!(f, "cannot assign to final variable: {name}")
            }
            Self::IndexOutOfBounds { index, length } => {
                write!(f, "index {index} out of bounds for length {length}")
            }
            Self::CannotIndex { type_name } => write!(f, "cannot index into {type_name}"),
            Self::CannotAssignIndex { type_name } => {
                write!(f, "cannot assign through an index into {type_name}")
            }
            Self::NullReference { operation } => write!(f, "null reference in {operation}"),
            Self::NoSuchMember { member, type_name } => {
                write!(f, "no member `{member}` on {type_name}")
            }
            Self::MapKeysMustBeStrings { got } => {
                write!(f, "map keys must be strings, got {got}")
            }
            Self::InvalidAssignmentTarget => write!(f, "invalid assignment target"),

            Self::ArityMismatch {
                name,
                expected,
                got,
            } => write!(f, "{name} expects {expected} arguments, got {got}"),
            Self::NotCallable { type_name } => write!(f, "{type_name} is not callable"),

            Self::HostDispatch { operation } => write!(f, "host call failed: {operation}"),
            Self::Thrown { message } | Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()` for factory-built errors.
    pub message: String,
    /// Underlying host fault, if any.
    pub cause: Option<Arc<dyn std::error::Error + Send + Sync>>,
    /// Set when this "error" is really a control transfer.
    pub control_flow: Option<ControlFlow>,
    /// Additional context, innermost first.
    pub notes: Vec<String>,
}

impl EvalError {
    /// Create an error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::from_kind(EvalErrorKind::Custom { message })
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            cause: None,
            control_flow: None,
            notes: Vec::new(),
        }
    }

    /// Create an early-return signal carrying `value`.
    pub fn return_with(value: Value) -> Self {
        let mut signal = Self::from_kind(EvalErrorKind::Custom {
            message: "return".to_string(),
        });
        signal.control_flow = Some(ControlFlow::Return(value));
        signal
    }

    /// Attach the underlying fault.
    #[must_use]
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// Add a context note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// True for control-flow signals.
    #[inline]
    pub fn is_control_flow(&self) -> bool {
        self.control_flow.is_some()
    }

    /// If this is a `return` signal, take its value.
    pub fn into_return_value(self) -> Result<Value, EvalError> {
        match self.control_flow {
            Some(ControlFlow::Return(value)) => Ok(value),
            None => Err(self),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        for note in &self.notes {
            write!(f, "\n  note: {note}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

// Arithmetic Errors

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn integer_overflow(operation: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerOverflow {
        operation: operation.to_string(),
    })
}

// Type/Operator Errors

/// A value could not be converted to the statically required type.
#[cold]
pub fn type_mismatch(expected: impl fmt::Display, got: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

#[cold]
pub fn invalid_operand(op: &str, type_name: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidOperand {
        op: op.to_string(),
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn binary_type_mismatch(
    op: &str,
    left: impl fmt::Display,
    right: impl fmt::Display,
) -> EvalError {
    EvalError::from_kind(EvalErrorKind::BinaryTypeMismatch {
        op: op.to_string(),
        left: left.to_string(),
        right: right.to_string(),
    })
}

// Access Errors

#[cold]
pub fn undefined_variable(name: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn cannot_assign_immutable(name: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ImmutableBinding {
        name: name.to_string(),
    })
}

#[cold]
pub fn index_out_of_bounds(index: i64, length: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfBounds { index, length })
}

#[cold]
pub fn cannot_index(type_name: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::CannotIndex {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn cannot_assign_index(type_name: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::CannotAssignIndex {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn null_reference(operation: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NullReference {
        operation: operation.to_string(),
    })
}

#[cold]
pub fn no_such_member(member: impl fmt::Display, type_name: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoSuchMember {
        member: member.to_string(),
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn map_keys_must_be_strings(got: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MapKeysMustBeStrings {
        got: got.to_string(),
    })
}

#[cold]
pub fn invalid_assignment_target() -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidAssignmentTarget)
}

// Function Errors

#[cold]
pub fn wrong_arg_count(name: &str, expected: impl fmt::Display, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected: expected.to_string(),
        got,
    })
}

#[cold]
pub fn not_callable(type_name: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: type_name.to_string(),
    })
}

// Host Errors

/// Wrap a failed host reflective call, keeping the host fault as the cause.
#[cold]
pub fn host_dispatch_failed(operation: impl fmt::Display, cause: HostError) -> EvalError {
    let mut error = EvalError::from_kind(EvalErrorKind::HostDispatch {
        operation: operation.to_string(),
    });
    error.message = format!("{}: {cause}", error.message);
    error.with_cause(cause)
}

// Raised by interpreted code

#[cold]
pub fn thrown(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Thrown {
        message: message.into(),
    })
}
