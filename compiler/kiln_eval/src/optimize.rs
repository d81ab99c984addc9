//! Advisory simplification (`optimize_tree`).
//!
//! Children are simplified first, then the node itself. Every rewrite keeps
//! the node's static type, so parents re-infer to the same type.
//!
//! | level | rewrites |
//! |-------|----------|
//! | 0 | none |
//! | 1 | fold constant subtrees with immutable results; drop casts to the operand's own type |
//! | 2 | also: literal conditions pick their branch; literal items drop out of sequences; `before` with a literal second operand; `and`/`or` with a literal left operand |
//!
//! Folding evaluates the subtree once against an empty environment. Only
//! subtrees with a scalar static type are tried, and a subtree whose
//! evaluation fails is left alone so the error still happens at run time.
//!
//! A cast is dropped only when its operand is known to produce values of
//! its static type. Element reads, member reads and calls are not: a list
//! stores whatever it is given, and a callee may return anything.

use std::sync::Arc;

use kiln_value::coerce::to_bool;
use kiln_value::{Type, Value};

use crate::environment::Environment;
use crate::expr::{Expr, ExprKind, ExprRef};
use crate::stack::ensure_sufficient_stack;

/// Simplify `expr` with effort `level`.
#[tracing::instrument(level = "debug", skip(expr))]
pub fn optimize_tree(expr: &ExprRef, level: u8) -> ExprRef {
    if level == 0 {
        return Arc::clone(expr);
    }
    optimize(expr, level)
}

fn optimize(expr: &ExprRef, level: u8) -> ExprRef {
    ensure_sufficient_stack(|| {
        let mut node = match expr.map_children(&mut |child| optimize(child, level)) {
            Some(kind) => Expr::rebuilt(kind),
            None => Arc::clone(expr),
        };
        // A rewrite can expose another one (a picked branch wrapped in a
        // cast folds); every step shrinks the node or turns it into a literal.
        while let Some(next) = simplify(&node, level) {
            node = next;
        }
        node
    })
}

fn simplify(node: &ExprRef, level: u8) -> Option<ExprRef> {
    if let Some(folded) = fold(node) {
        return Some(folded);
    }
    if let ExprKind::Cast { target, operand } = node.kind() {
        if operand.inferred_type() == target && holds_static_type(operand) {
            return Some(Arc::clone(operand));
        }
    }
    if level >= 2 {
        return prune(node);
    }
    None
}

/// Values a folded literal may carry. Containers are excluded: a literal is
/// shared by every evaluation.
fn is_immutable(value: &Value) -> bool {
    matches!(
        value,
        Value::Void
            | Value::Null
            | Value::Bool(_)
            | Value::Char(_)
            | Value::Int(_)
            | Value::Long(_)
            | Value::Double(_)
            | Value::Str(_)
    )
}

/// Static types whose values [`is_immutable`] may accept.
fn is_scalar(ty: &Type) -> bool {
    matches!(
        ty,
        Type::Void
            | Type::Null
            | Type::Bool
            | Type::Char
            | Type::Int
            | Type::Long
            | Type::Double
            | Type::Str
            | Type::Any
    )
}

/// True when every value `expr` evaluates to already has its static type,
/// so a cast to that type is the identity.
fn holds_static_type(expr: &ExprRef) -> bool {
    match expr.kind() {
        ExprKind::Literal(_)
        | ExprKind::Var(_)
        | ExprKind::Cast { .. }
        | ExprKind::Unary { .. }
        | ExprKind::Binary { .. }
        | ExprKind::Ternary { .. }
        | ExprKind::And { .. }
        | ExprKind::Or { .. }
        | ExprKind::InstanceOf { .. }
        | ExprKind::IfThenElse { .. }
        | ExprKind::Let(_)
        | ExprKind::TryCatch { .. } => true,
        ExprKind::Sequence(items) => items.last().map_or(true, holds_static_type),
        ExprKind::Before { first, .. } => holds_static_type(first),
        _ => false,
    }
}

fn fold(node: &ExprRef) -> Option<ExprRef> {
    if node.as_literal().is_some() || !node.is_constant() || !is_scalar(node.inferred_type()) {
        return None;
    }
    match node.evaluate(&Environment::empty()) {
        Ok(value) if is_immutable(&value) => {
            tracing::trace!(%value, "folded");
            Expr::typed_literal(value, node.inferred_type().clone()).ok()
        }
        Ok(_) => None,
        Err(error) => {
            tracing::trace!(%error, "left unfolded");
            None
        }
    }
}

/// Keep `expr` at the static type `ty`.
fn at_type(expr: &ExprRef, ty: &Type) -> ExprRef {
    if expr.inferred_type() == ty && holds_static_type(expr) {
        Arc::clone(expr)
    } else {
        Expr::cast(ty.clone(), Arc::clone(expr))
    }
}

/// `rhs` yields a `Bool` on every evaluation.
fn is_bool(rhs: &ExprRef) -> bool {
    *rhs.inferred_type() == Type::Bool && holds_static_type(rhs)
}

fn prune(node: &ExprRef) -> Option<ExprRef> {
    match node.kind() {
        ExprKind::IfThenElse {
            cond,
            then_branch,
            else_branch,
        } => {
            let cond = cond.as_literal()?;
            let branch = if to_bool(cond) {
                then_branch
            } else {
                else_branch
            };
            Some(at_type(branch, node.inferred_type()))
        }

        ExprKind::Sequence(items) => {
            let last = items.len().checked_sub(1)?;
            let kept: Vec<ExprRef> = items
                .iter()
                .enumerate()
                .filter(|(i, item)| *i == last || item.as_literal().is_none())
                .map(|(_, item)| Arc::clone(item))
                .collect();
            match kept.as_slice() {
                [only] => Some(Arc::clone(only)),
                _ if kept.len() < items.len() => Some(Expr::sequence(kept)),
                _ => None,
            }
        }

        ExprKind::Before { first, second } => {
            second.as_literal()?;
            Some(Arc::clone(first))
        }

        ExprKind::And { lhs, rhs } => {
            if to_bool(lhs.as_literal()?) {
                is_bool(rhs).then(|| Arc::clone(rhs))
            } else {
                Some(Expr::literal(Value::Bool(false)))
            }
        }

        ExprKind::Or { lhs, rhs } => {
            if to_bool(lhs.as_literal()?) {
                Some(Expr::literal(Value::Bool(true)))
            } else {
                is_bool(rhs).then(|| Arc::clone(rhs))
            }
        }

        _ => None,
    }
}
