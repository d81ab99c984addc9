//! Interpreter facade: resolve, optimize and evaluate against a global frame.
//!
//! ```text
//! let interpreter = Interpreter::builder()
//!     .global("x", Type::Int, Value::Int(1))
//!     .build()?;
//! let value = interpreter.run(&expr)?;
//! ```

mod builder;
mod options;

pub use builder::InterpreterBuilder;
pub use options::{EvalOptions, LINK_LEVEL_VAR, OPT_LEVEL_VAR};

use kiln_ir::Name;
use kiln_value::{EvalError, EvalResult, Value};

use crate::environment::Environment;
use crate::expr::{Expr, ExprRef};
use crate::optimize::optimize_tree;
use crate::resolve::link_vars;
use crate::scope::CompileEnv;

/// Runs expression trees against one global frame.
#[derive(Debug)]
pub struct Interpreter {
    options: EvalOptions,
    globals: Environment,
}

impl Interpreter {
    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    #[inline]
    pub fn options(&self) -> EvalOptions {
        self.options
    }

    #[inline]
    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    /// Compile-time view of the global frame.
    pub fn compile_env(&self) -> CompileEnv {
        CompileEnv::runtime(self.globals.clone())
    }

    /// Current value of the global `name`.
    pub fn global(&self, name: impl Into<Name>) -> Option<Value> {
        let (address, _) = self.globals.layout().lookup(name.into())?;
        self.globals.get(address).map(kiln_value::Variable::get)
    }

    /// Resolve free variables against the globals, then optimize.
    pub fn prepare(&self, expr: &ExprRef) -> ExprRef {
        let linked = link_vars(expr, &self.compile_env(), self.options.max_link_level);
        optimize_tree(&linked, self.options.optimization_level)
    }

    /// Prepare and evaluate `expr`.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&self, expr: &ExprRef) -> EvalResult {
        let prepared = self.prepare(expr);
        self.eval(&prepared)
    }

    /// Evaluate an already prepared tree. A top-level `return` yields its
    /// value.
    pub fn eval(&self, expr: &Expr) -> EvalResult {
        expr.evaluate(&self.globals)
            .or_else(EvalError::into_return_value)
    }
}

#[cfg(test)]
mod tests;
