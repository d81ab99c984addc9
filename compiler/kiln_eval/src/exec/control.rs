//! Conditionals, sequencing, blocks, loops and exceptions.

use kiln_value::coerce::to_bool;
use kiln_value::errors::thrown;
use kiln_value::{EvalError, EvalResult, Type, TypeKind, Value};

use crate::environment::Environment;
use crate::expr::{ExprRef, LetBlock};
use crate::lvalue::target_of;

pub(super) fn eval_and(lhs: &ExprRef, rhs: &ExprRef, env: &Environment) -> EvalResult {
    if !to_bool(&lhs.evaluate(env)?) {
        return Ok(Value::Bool(false));
    }
    Ok(Value::Bool(to_bool(&rhs.evaluate(env)?)))
}

pub(super) fn eval_or(lhs: &ExprRef, rhs: &ExprRef, env: &Environment) -> EvalResult {
    if to_bool(&lhs.evaluate(env)?) {
        return Ok(Value::Bool(true));
    }
    Ok(Value::Bool(to_bool(&rhs.evaluate(env)?)))
}

/// Runs exactly one branch and casts its value to the branches' union.
pub(super) fn eval_if(
    cond: &ExprRef,
    then_branch: &ExprRef,
    else_branch: &ExprRef,
    ty: &Type,
    env: &Environment,
) -> EvalResult {
    let branch = if to_bool(&cond.evaluate(env)?) {
        then_branch
    } else {
        else_branch
    };
    ty.cast(branch.evaluate(env)?)
        .map_err(|e| e.with_note("result of conditional"))
}

pub(super) fn eval_sequence(items: &[ExprRef], env: &Environment) -> EvalResult {
    let mut last = Value::Void;
    for item in items {
        last = item.evaluate(env)?;
    }
    Ok(last)
}

pub(super) fn eval_before(first: &ExprRef, second: &ExprRef, env: &Environment) -> EvalResult {
    let value = first.evaluate(env)?;
    second.evaluate(env)?;
    Ok(value)
}

pub(super) fn eval_instance_of(operand: &ExprRef, target: &Type, env: &Environment) -> EvalResult {
    let value = operand.evaluate(env)?;
    Ok(Value::Bool(is_instance(&value, target)))
}

/// Runtime type test. `null` is an instance of nothing.
fn is_instance(value: &Value, target: &Type) -> bool {
    if matches!(value, Value::Null | Value::Void) {
        return false;
    }
    let actual = Type::of(value);
    match target.kind() {
        TypeKind::Any => true,
        TypeKind::List | TypeKind::Map | TypeKind::Function => actual.kind() == target.kind(),
        TypeKind::Array => target.contains(&actual),
        _ => actual.is_equivalent_to(target),
    }
}

/// A `let` block: new frame, statements in order, `return` caught here.
pub(super) fn eval_let(block: &LetBlock, env: &Environment) -> EvalResult {
    let frame = env.child(block.layout.clone());
    let result = eval_sequence(&block.body, &frame).or_else(EvalError::into_return_value)?;
    block
        .ret
        .cast(result)
        .map_err(|e| e.with_note("result of let block"))
}

pub(super) fn eval_return(value: &ExprRef, env: &Environment) -> EvalResult {
    Err(EvalError::return_with(value.evaluate(env)?))
}

pub(super) fn eval_while(cond: &ExprRef, body: &ExprRef, env: &Environment) -> EvalResult {
    while to_bool(&cond.evaluate(env)?) {
        body.evaluate(env)?;
    }
    Ok(Value::Void)
}

/// Language errors bind their message and run the handler; control-flow
/// signals pass through untouched.
pub(super) fn eval_try_catch(
    body: &ExprRef,
    binding: &ExprRef,
    handler: &ExprRef,
    ty: &Type,
    env: &Environment,
) -> EvalResult {
    let value = match body.evaluate(env) {
        Ok(value) => value,
        Err(error) if error.is_control_flow() => return Err(error),
        Err(error) => {
            tracing::debug!(%error, "caught");
            let target = target_of(binding)?;
            let place = target.resolve_target(env)?;
            target.initialize(&place, Value::string(&error.message))?;
            handler.evaluate(env)?
        }
    };
    ty.cast(value)
}

pub(super) fn eval_throw(value: &ExprRef, env: &Environment) -> EvalResult {
    let value = value.evaluate(env)?;
    Err(thrown(value.to_string()))
}
