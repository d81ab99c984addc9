//! Assignment family.
//!
//! Every form addresses its target once through [`LValue::resolve_target`]
//! and then reads and writes the resulting place.

use kiln_value::{EvalResult, OperatorRef, Type, Value};

use crate::environment::Environment;
use crate::expr::{ExprRef, IncDecOp};
use crate::lvalue::target_of;
use crate::operators::add_values;

/// `target = value`. The target is addressed before the value runs.
pub(super) fn eval_assign(target: &ExprRef, value: &ExprRef, env: &Environment) -> EvalResult {
    let lvalue = target_of(target)?;
    let place = lvalue.resolve_target(env)?;
    let value = value.evaluate(env)?;
    lvalue.write(&place, value)
}

/// Initialising assignment; bypasses `FINAL`.
pub(super) fn eval_declare(target: &ExprRef, value: &ExprRef, env: &Environment) -> EvalResult {
    let lvalue = target_of(target)?;
    let place = lvalue.resolve_target(env)?;
    let value = value.evaluate(env)?;
    lvalue.initialize(&place, value)
}

/// `target op= value`.
pub(super) fn eval_compound(
    op: &OperatorRef,
    target: &ExprRef,
    value: &ExprRef,
    cast: Option<&Type>,
    env: &Environment,
) -> EvalResult {
    let lvalue = target_of(target)?;
    let place = lvalue.resolve_target(env)?;
    let old = lvalue.read(&place)?;
    let rhs = value.evaluate(env)?;
    let args = op.validate_args(vec![old, rhs])?;
    let mut result = op.invoke(args)?;
    if let Some(ty) = cast {
        result = ty.cast(result)?;
    }
    lvalue.write(&place, result)
}

/// `++x`, `x--` and friends. Prefix forms yield the stored value, postfix
/// forms the value read before the update.
pub(super) fn eval_inc_dec(op: IncDecOp, target: &ExprRef, env: &Environment) -> EvalResult {
    let lvalue = target_of(target)?;
    let place = lvalue.resolve_target(env)?;
    let old = lvalue.read(&place)?;
    let updated = add_values(&old, &Value::Int(op.delta()))?;
    let written = lvalue.write(&place, updated)?;
    Ok(if op.is_prefix() { written } else { old })
}
