//! Kiln Eval - expression trees and their evaluator.
//!
//! # Pipeline
//!
//! A front end builds an [`Expr`] tree with free variables as `Name` nodes.
//! Then:
//! 1. [`link_vars`] resolves names against a [`CompileEnv`] into
//!    slot-addressed `Var` nodes;
//! 2. [`optimize_tree`] folds and simplifies;
//! 3. [`Expr::evaluate`] walks the tree against a runtime [`Environment`].
//!
//! [`Interpreter`] bundles the three steps around a global frame.
//!
//! Both rewrite passes are persistent: they return the same `Arc` when
//! nothing changed and never mutate a node another tree may share.

mod closure;
mod environment;
pub mod errors;
mod exec;
mod expr;
mod indexable;
pub mod interpreter;
mod lvalue;
pub mod operators;
mod optimize;
mod resolve;
mod scope;
mod stack;

pub use closure::Closure;
pub use environment::{Environment, FrameLayout, Modifiers, Slot};
pub use exec::evaluate;
pub use expr::{
    ClassMemberExpr, Expr, ExprKind, ExprRef, HostFieldExpr, IncDecOp, IndexExpr, LambdaDef,
    LetBlock, MapMemberExpr, Param, StaticFieldExpr, VarRef,
};
pub use indexable::Indexable;
pub use interpreter::{EvalOptions, Interpreter, InterpreterBuilder};
pub use lvalue::{LValue, Place};
pub use optimize::optimize_tree;
pub use resolve::link_vars;
pub use scope::{Binding, CompileEnv};
pub use stack::ensure_sufficient_stack;

pub use kiln_value::{EvalError, EvalResult, Type, Value};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set,
/// e.g. `RUST_LOG=kiln_eval=debug`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

#[cfg(test)]
mod tests;
