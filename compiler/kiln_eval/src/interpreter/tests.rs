use pretty_assertions::assert_eq;

use kiln_value::{NativeFunction, Type, Value};

use super::*;
use crate::operators::{arithmetic, ArithOp};

#[test]
fn test_default_options() {
    let options = EvalOptions::default();
    assert_eq!(options.optimization_level, 1);
    assert_eq!(options.max_link_level, 0);
}

#[test]
fn test_overrides() {
    let options = EvalOptions::default().with_overrides(|key| match key {
        OPT_LEVEL_VAR => Some("2".to_string()),
        LINK_LEVEL_VAR => Some("three".to_string()),
        _ => None,
    });
    assert_eq!(options.optimization_level, 2);
    assert_eq!(options.max_link_level, 0);
}

#[test]
fn test_run_resolves_globals() {
    let interpreter = Interpreter::builder()
        .global("x", Type::Int, Value::Int(40))
        .build()
        .unwrap();
    let expr = Expr::binary(
        arithmetic(ArithOp::Add),
        Expr::name("x"),
        Expr::literal(Value::Int(2)),
    )
    .unwrap();
    assert_eq!(interpreter.run(&expr).unwrap(), Value::Int(42));
}

#[test]
fn test_globals_are_cast_on_build() {
    let interpreter = Interpreter::builder()
        .global("d", Type::Double, Value::Int(1))
        .build()
        .unwrap();
    assert_eq!(interpreter.global("d"), Some(Value::Double(1.0)));

    let bad = Interpreter::builder()
        .global("n", Type::Int, Value::string("x"))
        .build();
    assert!(bad.is_err());
}

#[test]
fn test_constant_global_rejects_assignment() {
    let interpreter = Interpreter::builder()
        .constant("limit", Type::Int, Value::Int(3))
        .build()
        .unwrap();
    let expr = Expr::assign(Expr::name("limit"), Expr::literal(Value::Int(4))).unwrap();
    assert!(interpreter.run(&expr).is_err());
    assert_eq!(interpreter.global("limit"), Some(Value::Int(3)));
}

#[test]
fn test_native_function_global() {
    let double = NativeFunction::new("double", vec![Type::Int], Type::Int, |args| match args {
        [Value::Int(n)] => Ok(Value::Int(n * 2)),
        _ => Ok(Value::Null),
    })
    .into_ref();
    let interpreter = Interpreter::builder().function(double).build().unwrap();
    let expr = Expr::apply(Expr::name("double"), vec![Expr::literal(Value::Int(21))]);
    assert_eq!(interpreter.run(&expr).unwrap(), Value::Int(42));
}

#[test]
fn test_top_level_return() {
    let interpreter = Interpreter::builder().build().unwrap();
    let expr = Expr::sequence(vec![
        Expr::early_return(Expr::literal(Value::Int(1))),
        Expr::literal(Value::Int(2)),
    ]);
    assert_eq!(interpreter.run(&expr).unwrap(), Value::Int(1));
}

#[test]
fn test_unknown_name_is_an_error() {
    let interpreter = Interpreter::builder().build().unwrap();
    let err = interpreter.run(&Expr::name("missing")).unwrap_err();
    assert_eq!(err.message, "undefined variable: missing");
}
