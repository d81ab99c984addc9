//! Free-variable resolution (`link_vars`).
//!
//! Replaces `Name` placeholders with slot-addressed `Var` nodes. The pass is
//! persistent: a subtree with nothing to resolve comes back as the same
//! `Arc`, so callers detect "no change" with `Arc::ptr_eq`.
//!
//! # Levels
//!
//! Every closure scope opens a new function-nesting level. A name resolves
//! only when the distance between the current level and the level of its
//! declaring scope is at most `max_level`; otherwise it stays a `Name` and
//! is resolved later, when the closure is created and its body is resolved
//! again against the live frames.

use std::sync::Arc;

use crate::expr::{ClassMemberExpr, Expr, ExprKind, ExprRef};
use crate::scope::CompileEnv;
use crate::stack::ensure_sufficient_stack;

/// Resolve the free variables of `expr` against `env`.
#[tracing::instrument(level = "debug", skip(expr, env))]
pub fn link_vars(expr: &ExprRef, env: &CompileEnv, max_level: u32) -> ExprRef {
    link(expr, env, max_level)
}

fn link(expr: &ExprRef, env: &CompileEnv, max_level: u32) -> ExprRef {
    ensure_sufficient_stack(|| match expr.kind() {
        ExprKind::Name(name) => match env.lookup(*name) {
            Some(binding) if env.level().saturating_sub(binding.level) <= max_level => {
                tracing::trace!(
                    name = %name,
                    depth = binding.depth,
                    address = binding.address,
                    "resolved"
                );
                Expr::var(binding.into())
            }
            _ => Arc::clone(expr),
        },

        ExprKind::ClassMember(ClassMemberExpr { object, member })
            if matches!(object.kind(), ExprKind::ScopeRef { .. }) =>
        {
            object
                .link(*member, env)
                .unwrap_or_else(|| Arc::clone(expr))
        }

        ExprKind::Lambda(def) => {
            let scope = env.function(Arc::clone(&def.layout));
            let body = link(&def.body, &scope, max_level);
            if Arc::ptr_eq(&body, &def.body) {
                Arc::clone(expr)
            } else {
                Expr::rebuilt(ExprKind::Lambda(Arc::new(def.with_body(body))))
            }
        }

        ExprKind::Let(block) => {
            let scope = env.block(Arc::clone(&block.layout));
            let mut changed = false;
            let body: Box<[ExprRef]> = block
                .body
                .iter()
                .map(|item| {
                    let linked = link(item, &scope, max_level);
                    changed |= !Arc::ptr_eq(&linked, item);
                    linked
                })
                .collect();
            if changed {
                Expr::rebuilt(ExprKind::Let(Arc::new(block.with_body(body))))
            } else {
                Arc::clone(expr)
            }
        }

        _ => match expr.map_children(&mut |child| link(child, env, max_level)) {
            Some(kind) => Expr::rebuilt(kind),
            None => Arc::clone(expr),
        },
    })
}
