//! Closures created by lambda expressions.
//!
//! Evaluating a `Lambda` node resolves its body again against the frames
//! that are live at that moment, then captures those frames. Every
//! instantiation pays for that resolution; the resulting closure keeps
//! observing the captured cells after the creating block has finished.

use std::fmt;
use std::sync::Arc;

use kiln_value::errors::wrong_arg_count;
use kiln_value::{Arity, EvalError, EvalResult, Function, Type, Value};

use crate::environment::Environment;
use crate::expr::{ExprRef, LambdaDef};
use crate::resolve::link_vars;
use crate::scope::CompileEnv;
use crate::stack::ensure_sufficient_stack;

/// A lambda bound to the frames it was created in.
pub struct Closure {
    def: Arc<LambdaDef>,
    /// Body resolved against `env`.
    body: ExprRef,
    env: Environment,
}

/// Create a closure for `def` over `env`.
pub(crate) fn instantiate(def: &Arc<LambdaDef>, env: &Environment) -> Value {
    let scope = CompileEnv::runtime(env.clone()).function(Arc::clone(&def.layout));
    let body = link_vars(&def.body, &scope, 1);
    Value::function(Arc::new(Closure {
        def: Arc::clone(def),
        body,
        env: env.clone(),
    }))
}

impl Closure {
    pub fn definition(&self) -> &LambdaDef {
        &self.def
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("name", &self.name())
            .field("arity", &self.arity())
            .field("ret", &self.def.ret)
            .finish_non_exhaustive()
    }
}

impl Function for Closure {
    fn name(&self) -> &str {
        self.def.name.map_or("<lambda>", |name| name.as_str())
    }

    /// Parameters up to the first one with a default are required.
    fn arity(&self) -> Arity {
        let params = &self.def.params;
        let required = params
            .iter()
            .position(|param| param.default.is_some())
            .unwrap_or(params.len());
        if self.def.rest.is_some() {
            Arity::at_least(required)
        } else {
            Arity::range(required, params.len())
        }
    }

    fn return_type(&self) -> Type {
        self.def.ret.clone()
    }

    fn validate_args(&self, mut args: Vec<Value>) -> Result<Vec<Value>, EvalError> {
        let arity = self.arity();
        if !arity.accepts(args.len()) {
            return Err(wrong_arg_count(self.name(), arity, args.len()));
        }
        let params = &self.def.params;
        let extra = if args.len() > params.len() {
            args.split_off(params.len())
        } else {
            Vec::new()
        };
        let mut supplied = args.into_iter();
        let mut validated = Vec::with_capacity(self.def.layout.len());
        for (i, param) in params.iter().enumerate() {
            let arg = supplied
                .next()
                .or_else(|| param.default.clone())
                .unwrap_or(Value::Null);
            let arg = param.ty.cast(arg).map_err(|e| {
                e.with_note(format!("argument {} of {}", i + 1, self.name()))
            })?;
            validated.push(arg);
        }
        if self.def.rest.is_some() {
            validated.push(Value::list(extra));
        }
        Ok(validated)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(function = %self.name()))]
    fn invoke(&self, args: Vec<Value>) -> EvalResult {
        let frame = self.env.child(Arc::clone(&self.def.layout));
        for (address, arg) in args.into_iter().enumerate() {
            if let Some(cell) = frame.get(address) {
                cell.set(arg);
            }
        }
        let result = ensure_sufficient_stack(|| self.body.evaluate(&frame))
            .or_else(EvalError::into_return_value)?;
        self.def
            .ret
            .cast(result)
            .map_err(|e| e.with_note(format!("return value of {}", self.name())))
    }
}
