//! Builders shared by the crate-level suites.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kiln_ir::Name;
use kiln_value::{
    signature_of, EvalResult, FunctionRef, HostClass, HostError, HostObject, NativeFunction,
    Type, Value,
};
use parking_lot::RwLock;

use crate::environment::{Environment, FrameLayout, Slot};
use crate::expr::{Expr, ExprRef};
use crate::operators::{arithmetic, comparison, ArithOp, CompareOp};
use crate::scope::CompileEnv;

pub(super) fn int(n: i32) -> ExprRef {
    Expr::literal(Value::Int(n))
}

pub(super) fn boolean(b: bool) -> ExprRef {
    Expr::literal(Value::Bool(b))
}

pub(super) fn text(s: &str) -> ExprRef {
    Expr::literal(Value::string(s))
}

pub(super) fn name(n: &str) -> ExprRef {
    Expr::name(n)
}

pub(super) fn arith(op: ArithOp, lhs: ExprRef, rhs: ExprRef) -> ExprRef {
    Expr::binary(arithmetic(op), lhs, rhs).unwrap()
}

pub(super) fn add(lhs: ExprRef, rhs: ExprRef) -> ExprRef {
    arith(ArithOp::Add, lhs, rhs)
}

pub(super) fn compare(op: CompareOp, lhs: ExprRef, rhs: ExprRef) -> ExprRef {
    Expr::binary(comparison(op), lhs, rhs).unwrap()
}

/// Evaluate a closed tree.
pub(super) fn eval(expr: &ExprRef) -> EvalResult {
    expr.evaluate(&Environment::empty())
}

/// A root frame with `slots`, and the compile-time view of it.
pub(super) fn frame(slots: Vec<Slot>) -> (Environment, CompileEnv) {
    let layout = FrameLayout::new(slots);
    let env = Environment::root(Arc::clone(&layout));
    (env, CompileEnv::root(layout))
}

/// Resolve `expr` against `scope` and evaluate it in `env`.
pub(super) fn run_in(expr: &ExprRef, env: &Environment, scope: &CompileEnv) -> EvalResult {
    expr.resolve(scope, 0).evaluate(env)
}

pub(super) fn set(env: &Environment, slot: &str, value: Value) {
    let (address, _) = env.layout().lookup(Name::from(slot)).unwrap();
    env.get(address).unwrap().set(value);
}

pub(super) fn get(env: &Environment, slot: &str) -> Value {
    let (address, _) = env.layout().lookup(Name::from(slot)).unwrap();
    env.get(address).unwrap().get()
}

/// A nullary native function returning `result` and counting its calls.
pub(super) fn counting(result: Value) -> (ExprRef, Arc<AtomicUsize>) {
    counting_as(result.clone(), Type::of(&result))
}

/// Like [`counting`], declared to return `ret`.
pub(super) fn counting_as(result: Value, ret: Type) -> (ExprRef, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let function = NativeFunction::new("tick", vec![], ret, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(result.clone())
    })
    .into_ref();
    (Expr::apply(callee(function), vec![]), calls)
}

pub(super) fn callee(function: FunctionRef) -> ExprRef {
    Expr::literal(Value::function(function))
}

pub(super) fn calls(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

pub(super) fn ints(values: &[i32]) -> Value {
    Value::list(values.iter().copied().map(Value::Int).collect())
}

/// Host object with one writable `int` field `x` and a `scale(int)` method.
#[derive(Debug)]
pub(super) struct Point {
    x: RwLock<i32>,
}

impl Point {
    pub(super) fn value(x: i32) -> Value {
        Value::host(Arc::new(Point { x: RwLock::new(x) }))
    }
}

impl HostObject for Point {
    fn class_name(&self) -> &str {
        "Point"
    }

    fn get_field(&self, field: &str) -> Result<Value, HostError> {
        match field {
            "x" => Ok(Value::Int(*self.x.read())),
            _ => Err(HostError::NoSuchField {
                class: "Point".into(),
                field: field.into(),
            }),
        }
    }

    fn set_field(&self, field: &str, value: Value) -> Result<(), HostError> {
        match (field, value) {
            ("x", Value::Int(x)) => {
                *self.x.write() = x;
                Ok(())
            }
            ("x", _) => Err(HostError::IllegalAccess {
                class: "Point".into(),
                member: "x".into(),
            }),
            _ => Err(HostError::NoSuchField {
                class: "Point".into(),
                field: field.into(),
            }),
        }
    }

    fn invoke_method(&self, method: &str, args: &[Value]) -> Result<Value, HostError> {
        match (method, args) {
            ("scale", [Value::Int(k)]) => Ok(Value::Int(*self.x.read() * k)),
            _ => Err(HostError::NoSuchMethod {
                class: "Point".into(),
                method: method.into(),
                signature: signature_of(args),
            }),
        }
    }
}

/// The `Point` class: `new Point(int)`, a read-only static `created`
/// counter and a static `origin()` factory.
#[derive(Debug, Default)]
pub(super) struct PointClass {
    created: AtomicUsize,
}

impl HostClass for PointClass {
    fn name(&self) -> &str {
        "Point"
    }

    fn construct(&self, args: &[Value]) -> Result<Value, HostError> {
        match args {
            [Value::Int(x)] => {
                self.created.fetch_add(1, Ordering::SeqCst);
                Ok(Point::value(*x))
            }
            _ => Err(HostError::NoSuchConstructor {
                class: "Point".into(),
                signature: signature_of(args),
            }),
        }
    }

    fn get_static(&self, field: &str) -> Result<Value, HostError> {
        match field {
            "created" => Ok(Value::Long(
                i64::try_from(self.created.load(Ordering::SeqCst)).unwrap_or(i64::MAX),
            )),
            _ => Err(HostError::NoSuchField {
                class: "Point".into(),
                field: field.into(),
            }),
        }
    }

    fn set_static(&self, field: &str, _value: Value) -> Result<(), HostError> {
        Err(HostError::IllegalAccess {
            class: "Point".into(),
            member: field.into(),
        })
    }

    fn invoke_static(&self, method: &str, args: &[Value]) -> Result<Value, HostError> {
        match (method, args) {
            ("origin", []) => Ok(Point::value(0)),
            _ => Err(HostError::NoSuchMethod {
                class: "Point".into(),
                method: method.into(),
                signature: signature_of(args),
            }),
        }
    }
}
