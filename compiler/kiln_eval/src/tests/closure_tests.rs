use pretty_assertions::assert_eq;

use kiln_value::{Arity, EvalErrorKind, Function, Type, Value};

use super::support::{add, arith, compare, int, ints, name};
use crate::environment::{FrameLayout, Slot};
use crate::expr::{Expr, ExprRef, LambdaDef, LetBlock, Param};
use crate::operators::{ArithOp, CompareOp};
use crate::Interpreter;

fn lambda(params: Vec<Param>, ret: Type, body: ExprRef) -> ExprRef {
    Expr::lambda(LambdaDef::new(params, None, ret, body))
}

fn call(callee: ExprRef, args: Vec<ExprRef>) -> ExprRef {
    Expr::apply(callee, args)
}

fn interpreter() -> Interpreter {
    Interpreter::builder().build().unwrap()
}

#[test]
fn test_closure_outlives_its_block() {
    // let { x = 10; () -> x } evaluated to a closure, called afterwards.
    let block = LetBlock::new(
        FrameLayout::new(vec![Slot::new("x", Type::Int)]),
        vec![
            Expr::declare(name("x"), int(10)).unwrap(),
            lambda(vec![], Type::Int, name("x")),
        ],
        Type::function(Type::Int),
    );
    let expr = call(Expr::let_block(block), vec![]);
    assert_eq!(interpreter().run(&expr).unwrap(), Value::Int(10));
}

#[test]
fn test_closure_observes_later_writes() {
    // let { x = 1; f = () -> x; x = 2; f() }
    let block = LetBlock::new(
        FrameLayout::new(vec![
            Slot::new("x", Type::Int),
            Slot::new("f", Type::function(Type::Int)),
        ]),
        vec![
            Expr::declare(name("x"), int(1)).unwrap(),
            Expr::declare(name("f"), lambda(vec![], Type::Int, name("x"))).unwrap(),
            Expr::assign(name("x"), int(2)).unwrap(),
            call(name("f"), vec![]),
        ],
        Type::Int,
    );
    assert_eq!(
        interpreter().run(&Expr::let_block(block)).unwrap(),
        Value::Int(2)
    );
}

#[test]
fn test_each_instantiation_captures_its_own_frame() {
    // make = (n) -> () -> n
    let make = lambda(
        vec![Param::new("n", Type::Int)],
        Type::function(Type::Int),
        lambda(vec![], Type::Int, name("n")),
    );
    let interpreter = Interpreter::builder()
        .global("make", Type::function(Type::function(Type::Int)), Value::Null)
        .build()
        .unwrap();
    interpreter
        .run(&Expr::assign(name("make"), make).unwrap())
        .unwrap();

    let both = add(
        call(call(name("make"), vec![int(1)]), vec![]),
        arith(
            ArithOp::Mul,
            call(call(name("make"), vec![int(2)]), vec![]),
            int(10),
        ),
    );
    assert_eq!(interpreter.run(&both).unwrap(), Value::Int(21));
}

#[test]
fn test_recursion_through_global() {
    // fact = (n) -> if n <= 1 then 1 else n * fact(n - 1)
    let body = Expr::if_then_else(
        compare(CompareOp::LtEq, name("n"), int(1)),
        int(1),
        arith(
            ArithOp::Mul,
            name("n"),
            call(name("fact"), vec![arith(ArithOp::Sub, name("n"), int(1))]),
        ),
    );
    let fact = lambda(vec![Param::new("n", Type::Int)], Type::Int, body);
    let interpreter = Interpreter::builder()
        .global("fact", Type::function(Type::Int), Value::Null)
        .build()
        .unwrap();
    interpreter
        .run(&Expr::assign(name("fact"), fact).unwrap())
        .unwrap();
    let result = interpreter
        .run(&call(name("fact"), vec![int(5)]))
        .unwrap();
    assert_eq!(result, Value::Int(120));
}

#[test]
fn test_defaults_and_arity() {
    let f = lambda(
        vec![
            Param::new("a", Type::Int),
            Param::new("b", Type::Int).with_default(Value::Int(10)),
        ],
        Type::Int,
        add(name("a"), name("b")),
    );
    let interpreter = interpreter();
    assert_eq!(
        interpreter.run(&call(f.clone(), vec![int(1)])).unwrap(),
        Value::Int(11)
    );
    assert_eq!(
        interpreter.run(&call(f.clone(), vec![int(1), int(2)])).unwrap(),
        Value::Int(3)
    );
    let err = interpreter.run(&call(f.clone(), vec![])).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::ArityMismatch { .. }));

    let Value::Function(closure) = interpreter.run(&f).unwrap() else {
        panic!("expected a closure");
    };
    assert_eq!(closure.arity(), Arity::range(1, 2));
    assert_eq!(closure.return_type(), Type::Int);
}

#[test]
fn test_arguments_cast_to_parameter_types() {
    let f = lambda(
        vec![Param::new("d", Type::Double)],
        Type::Double,
        name("d"),
    );
    let interpreter = interpreter();
    assert_eq!(
        interpreter.run(&call(f.clone(), vec![int(3)])).unwrap(),
        Value::Double(3.0)
    );
    let err = interpreter
        .run(&call(f, vec![Expr::literal(Value::string("x"))]))
        .unwrap_err();
    assert!(err.notes.iter().any(|note| note.contains("argument 1")));
}

#[test]
fn test_rest_parameter_collects_extras() {
    let def = LambdaDef::new(
        vec![Param::new("first", Type::Int)],
        Some("rest".into()),
        Type::Any,
        name("rest"),
    );
    let f = Expr::lambda(def);
    let result = interpreter()
        .run(&call(f, vec![int(1), int(2), int(3)]))
        .unwrap();
    assert_eq!(result, ints(&[2, 3]));
}

#[test]
fn test_return_leaves_closure_body() {
    let body = Expr::sequence(vec![Expr::early_return(int(1)), int(2)]);
    let f = lambda(vec![], Type::Long, body);
    assert_eq!(
        interpreter().run(&call(f, vec![])).unwrap(),
        Value::Long(1)
    );
}

#[test]
fn test_void_closure_yields_void() {
    let f = lambda(vec![], Type::Void, int(5));
    assert_eq!(interpreter().run(&call(f, vec![])).unwrap(), Value::Void);
}

#[test]
fn test_named_closure() {
    let def = LambdaDef::new(vec![], None, Type::Int, int(0)).named("zero");
    let Value::Function(closure) = interpreter().run(&Expr::lambda(def)).unwrap() else {
        panic!("expected a closure");
    };
    assert_eq!(closure.name(), "zero");
}
