//! Operator application, function calls and host dispatch.

use kiln_ir::Name;
use kiln_value::errors::{
    host_dispatch_failed, no_such_member, not_callable, null_reference,
};
use kiln_value::{
    signature_of, EvalError, EvalResult, FunctionRef, HostClassRef, OperatorRef, Type, Value,
};

use crate::environment::Environment;
use crate::expr::ExprRef;

/// Evaluate operands left to right.
fn eval_args(args: &[ExprRef], env: &Environment) -> Result<Vec<Value>, EvalError> {
    args.iter().map(|arg| arg.evaluate(env)).collect()
}

/// Apply `op` and cast the result to the node's static type.
pub(super) fn eval_operator(
    op: &OperatorRef,
    operands: &[&ExprRef],
    ty: &Type,
    env: &Environment,
) -> EvalResult {
    let args = operands
        .iter()
        .map(|operand| operand.evaluate(env))
        .collect::<Result<Vec<_>, _>>()?;
    let args = op.validate_args(args)?;
    let result = op.invoke(args)?;
    ty.cast(result)
        .map_err(|e| e.with_note(format!("result of `{}`", op.name())))
}

/// Validate, invoke, and drop the result of a `void` callable.
fn call_function(function: &FunctionRef, args: Vec<Value>) -> EvalResult {
    let args = function.validate_args(args)?;
    let result = function.invoke(args)?;
    if function.return_type() == Type::Void {
        Ok(Value::Void)
    } else {
        Ok(result)
    }
}

pub(super) fn eval_apply(callee: &ExprRef, args: &[ExprRef], env: &Environment) -> EvalResult {
    let function = match callee.evaluate(env)? {
        Value::Function(function) => function,
        Value::Null => return Err(null_reference("call")),
        other => return Err(not_callable(other.type_name())),
    };
    let args = eval_args(args, env)?;
    call_function(&function, args)
}

/// `receiver.method(args)` on a host object or an interpreted-class
/// instance whose member holds a function.
pub(super) fn eval_method_call(
    receiver: &ExprRef,
    method: Name,
    args: &[ExprRef],
    env: &Environment,
) -> EvalResult {
    let receiver = receiver.evaluate(env)?;
    let args = eval_args(args, env)?;
    match receiver {
        Value::Host(object) => object.invoke_method(method.as_str(), &args).map_err(|e| {
            host_dispatch_failed(
                format!("{}.{method}({})", object.class_name(), signature_of(&args)),
                e,
            )
        }),
        Value::Object(object) => match object.member(method).map(|(cell, _)| cell.get()) {
            Some(Value::Function(function)) => call_function(&function, args),
            Some(other) => Err(not_callable(other.type_name())),
            None => Err(no_such_member(method, object.class())),
        },
        Value::Null => Err(null_reference("method call")),
        other => Err(no_such_member(method, other.type_name())),
    }
}

pub(super) fn eval_static_call(
    class: &HostClassRef,
    method: Name,
    args: &[ExprRef],
    env: &Environment,
) -> EvalResult {
    let args = eval_args(args, env)?;
    class.invoke_static(method.as_str(), &args).map_err(|e| {
        host_dispatch_failed(
            format!("{}.{method}({})", class.name(), signature_of(&args)),
            e,
        )
    })
}

pub(super) fn eval_new(class: &HostClassRef, args: &[ExprRef], env: &Environment) -> EvalResult {
    let args = eval_args(args, env)?;
    class.construct(&args).map_err(|e| {
        host_dispatch_failed(format!("new {}({})", class.name(), signature_of(&args)), e)
    })
}
