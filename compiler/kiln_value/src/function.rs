//! Callable values.
//!
//! Everything an `Apply` node can call implements [`Function`]: host-provided
//! natives, closures created by lambda expressions, and the operators used
//! by the unary/binary/ternary nodes (which additionally implement
//! [`Operator`] so that nodes can infer their static type at construction).

use std::fmt;
use std::sync::Arc;

use crate::errors::{wrong_arg_count, EvalError, EvalResult};
use crate::ty::{cast_with_context, Type};
use crate::value::Value;

/// Shared handle to a callable.
pub type FunctionRef = Arc<dyn Function>;

/// Shared handle to an operator.
pub type OperatorRef = Arc<dyn Operator>;

/// Accepted argument counts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Arity {
    /// Arguments without a default.
    pub required: usize,
    /// Upper bound; `None` when a variadic tail is accepted.
    pub max: Option<usize>,
}

impl Arity {
    pub const fn exact(n: usize) -> Self {
        Arity {
            required: n,
            max: Some(n),
        }
    }

    pub const fn range(required: usize, max: usize) -> Self {
        Arity {
            required,
            max: Some(max),
        }
    }

    pub const fn at_least(required: usize) -> Self {
        Arity {
            required,
            max: None,
        }
    }

    pub fn accepts(self, n: usize) -> bool {
        n >= self.required && self.max.map_or(true, |max| n <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.required => write!(f, "{max}"),
            Some(max) => write!(f, "{} to {max}", self.required),
            None => write!(f, "at least {}", self.required),
        }
    }
}

/// A callable value.
pub trait Function: Send + Sync + fmt::Debug {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    fn arity(&self) -> Arity;

    /// Declared return type. `Type::Void` makes `Apply` discard the result.
    fn return_type(&self) -> Type;

    /// Check the argument count, fill defaults and coerce every argument to
    /// its declared parameter type.
    fn validate_args(&self, args: Vec<Value>) -> Result<Vec<Value>, EvalError>;

    /// Call with arguments already passed through `validate_args`.
    fn invoke(&self, args: Vec<Value>) -> EvalResult;
}

/// A function whose result type can be computed from its argument types.
pub trait Operator: Function {
    /// Static result type for arguments of the given types.
    fn infer_type(&self, arg_types: &[Type]) -> Result<Type, EvalError>;

    /// Pure operators over constant operands may be folded by the optimizer.
    fn is_pure(&self) -> bool {
        true
    }
}

/// Host function body.
pub type NativeFn = dyn Fn(&[Value]) -> EvalResult + Send + Sync;

/// Function implemented by the host.
pub struct NativeFunction {
    name: String,
    params: Vec<Type>,
    rest: Option<Type>,
    ret: Type,
    body: Arc<NativeFn>,
}

impl NativeFunction {
    /// A function with fixed parameters.
    pub fn new(
        name: impl Into<String>,
        params: Vec<Type>,
        ret: Type,
        body: impl Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    ) -> Self {
        NativeFunction {
            name: name.into(),
            params,
            rest: None,
            ret,
            body: Arc::new(body),
        }
    }

    /// Accept any number of extra arguments of type `rest`.
    #[must_use]
    pub fn with_rest(mut self, rest: Type) -> Self {
        self.rest = Some(rest);
        self
    }

    /// Wrap into a shareable handle.
    pub fn into_ref(self) -> FunctionRef {
        Arc::new(self)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("rest", &self.rest)
            .field("ret", &self.ret)
            .finish_non_exhaustive()
    }
}

impl Function for NativeFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> Arity {
        if self.rest.is_some() {
            Arity::at_least(self.params.len())
        } else {
            Arity::exact(self.params.len())
        }
    }

    fn return_type(&self) -> Type {
        self.ret.clone()
    }

    fn validate_args(&self, args: Vec<Value>) -> Result<Vec<Value>, EvalError> {
        let arity = self.arity();
        if !arity.accepts(args.len()) {
            return Err(wrong_arg_count(&self.name, arity, args.len()));
        }
        args.into_iter()
            .enumerate()
            .map(|(i, arg)| {
                let ty = self.params.get(i).or(self.rest.as_ref()).unwrap_or(&Type::Any);
                cast_with_context(ty, arg, &format!("argument {} of {}", i + 1, self.name))
            })
            .collect()
    }

    fn invoke(&self, args: Vec<Value>) -> EvalResult {
        tracing::trace!(function = %self.name, argc = args.len(), "native call");
        (self.body)(&args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sum() -> NativeFunction {
        NativeFunction::new("sum", vec![Type::Double], Type::Double, |args| {
            let mut total = 0.0;
            for arg in args {
                if let Value::Double(d) = arg {
                    total += d;
                }
            }
            Ok(Value::Double(total))
        })
        .with_rest(Type::Double)
    }

    #[test]
    fn test_arity_display() {
        assert_eq!(Arity::exact(2).to_string(), "2");
        assert_eq!(Arity::range(1, 3).to_string(), "1 to 3");
        assert_eq!(Arity::at_least(1).to_string(), "at least 1");
    }

    #[test]
    fn test_validate_casts_every_argument() {
        let f = sum();
        let args = f.validate_args(vec![Value::Int(1), Value::Int(2), Value::Double(0.5)]);
        assert_eq!(
            args.ok(),
            Some(vec![Value::Double(1.0), Value::Double(2.0), Value::Double(0.5)])
        );
    }

    #[test]
    fn test_validate_rejects_bad_arity() {
        let f = sum();
        let err = f.validate_args(vec![]).err().map(|e| e.message);
        assert_eq!(err.as_deref(), Some("sum expects at least 1 arguments, got 0"));
    }

    #[test]
    fn test_invoke() {
        let f = sum();
        let result = f
            .validate_args(vec![Value::Int(2), Value::Int(3)])
            .and_then(|args| f.invoke(args));
        assert_eq!(result.ok(), Some(Value::Double(5.0)));
    }
}
