//! Tree-walking evaluation.
//!
//! [`evaluate`] dispatches on the node kind; the per-family logic lives in
//! the submodules:
//! - `access`: variable reads, indexing and member reads
//! - `assign`: plain, compound and increment/decrement assignment
//! - `call`: operators, function application and host calls
//! - `construct`: array, list and map literals
//! - `control`: conditionals, sequencing, blocks, loops and exceptions

mod access;
mod assign;
mod call;
mod construct;
mod control;

use kiln_value::errors::undefined_variable;
use kiln_value::EvalResult;

use crate::closure;
use crate::environment::Environment;
use crate::expr::{Expr, ExprKind};
use crate::stack::ensure_sufficient_stack;

/// Evaluate `expr` against `env`.
pub fn evaluate(expr: &Expr, env: &Environment) -> EvalResult {
    ensure_sufficient_stack(|| eval_kind(expr, env))
}

fn eval_kind(expr: &Expr, env: &Environment) -> EvalResult {
    let ty = expr.inferred_type();
    match expr.kind() {
        ExprKind::Literal(value) => Ok(value.clone()),
        ExprKind::Name(name) => Err(undefined_variable(name)),
        ExprKind::Var(var) => access::eval_var(var, env),
        ExprKind::ScopeRef { length } => {
            unreachable!("scope placeholder ({length} frames out) reached evaluation unlinked")
        }

        ExprKind::Unary { op, operand } => call::eval_operator(op, &[operand], ty, env),
        ExprKind::Binary { op, lhs, rhs } => call::eval_operator(op, &[lhs, rhs], ty, env),
        ExprKind::Ternary {
            op,
            first,
            second,
            third,
        } => match third {
            Some(third) => call::eval_operator(op, &[first, second, third], ty, env),
            None => call::eval_operator(op, &[first, second], ty, env),
        },
        ExprKind::And { lhs, rhs } => control::eval_and(lhs, rhs, env),
        ExprKind::Or { lhs, rhs } => control::eval_or(lhs, rhs, env),
        ExprKind::IfThenElse {
            cond,
            then_branch,
            else_branch,
        } => control::eval_if(cond, then_branch, else_branch, ty, env),
        ExprKind::Sequence(items) => control::eval_sequence(items, env),
        ExprKind::Before { first, second } => control::eval_before(first, second, env),
        ExprKind::Cast { target, operand } => target.cast(operand.evaluate(env)?),
        ExprKind::InstanceOf { operand, target } => control::eval_instance_of(operand, target, env),

        ExprKind::Assign { target, value } => assign::eval_assign(target, value, env),
        ExprKind::Declare { target, value } => assign::eval_declare(target, value, env),
        ExprKind::CompoundAssign {
            op,
            target,
            value,
            cast,
        } => assign::eval_compound(op, target, value, cast.as_ref(), env),
        ExprKind::IncDec { op, target } => assign::eval_inc_dec(*op, target, env),

        ExprKind::Index(index) => access::read(index, env),
        ExprKind::IndexRange { base, lo, hi } => access::eval_index_range(base, lo, hi, env),
        ExprKind::HostField(field) => access::read(field, env),
        ExprKind::StaticField(field) => access::read(field, env),
        ExprKind::MapMember(member) => access::read(member, env),
        ExprKind::ClassMember(member) => access::read(member, env),
        ExprKind::MethodCall {
            receiver,
            method,
            args,
        } => call::eval_method_call(receiver, *method, args, env),
        ExprKind::StaticCall {
            class,
            method,
            args,
        } => call::eval_static_call(class, *method, args, env),
        ExprKind::New { class, args } => call::eval_new(class, args, env),

        ExprKind::Apply { callee, args } => call::eval_apply(callee, args, env),
        ExprKind::Lambda(def) => Ok(closure::instantiate(def, env)),
        ExprKind::Let(block) => control::eval_let(block, env),
        ExprKind::Return(value) => control::eval_return(value, env),

        ExprKind::ArrayLiteral { elem, items } => construct::eval_array_literal(elem, items, env),
        ExprKind::ArrayAlloc { elem, len } => construct::eval_array_alloc(elem, len, env),
        ExprKind::ListLiteral {
            create,
            elem,
            items,
        } => construct::eval_list_literal(create.as_ref(), elem, items, env),
        ExprKind::MapLiteral {
            create,
            value_ty,
            entries,
        } => construct::eval_map_literal(create.as_ref(), value_ty, entries, env),

        ExprKind::While { cond, body } => control::eval_while(cond, body, env),
        ExprKind::TryCatch {
            body,
            binding,
            handler,
        } => control::eval_try_catch(body, binding, handler, ty, env),
        ExprKind::Throw(value) => control::eval_throw(value, env),
    }
}
