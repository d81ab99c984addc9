use pretty_assertions::assert_eq;

use super::*;

fn apply(op: &OperatorRef, args: Vec<Value>) -> EvalResult {
    op.validate_args(args).and_then(|args| op.invoke(args))
}

fn ints(values: &[i32]) -> Value {
    Value::list(values.iter().copied().map(Value::Int).collect())
}

#[test]
fn test_int_arithmetic() {
    let add = arithmetic(ArithOp::Add);
    let rem = arithmetic(ArithOp::Rem);
    let div = arithmetic(ArithOp::Div);
    assert_eq!(apply(&add, vec![Value::Int(2), Value::Int(3)]).unwrap(), Value::Int(5));
    assert_eq!(apply(&rem, vec![Value::Int(7), Value::Int(2)]).unwrap(), Value::Int(1));
    assert_eq!(apply(&div, vec![Value::Int(7), Value::Int(2)]).unwrap(), Value::Int(3));
}

#[test]
fn test_promotion() {
    let add = arithmetic(ArithOp::Add);
    assert_eq!(
        apply(&add, vec![Value::Int(1), Value::Long(2)]).unwrap(),
        Value::Long(3)
    );
    assert_eq!(
        apply(&add, vec![Value::Int(1), Value::Double(0.5)]).unwrap(),
        Value::Double(1.5)
    );
    assert_eq!(
        apply(&add, vec![Value::Char('a'), Value::Int(1)]).unwrap(),
        Value::Int(98)
    );
}

#[test]
fn test_string_concatenation() {
    let add = arithmetic(ArithOp::Add);
    assert_eq!(
        apply(&add, vec![Value::string("n = "), Value::Int(4)]).unwrap(),
        Value::string("n = 4")
    );
}

#[test]
fn test_division_by_zero_and_overflow() {
    let div = arithmetic(ArithOp::Div);
    let rem = arithmetic(ArithOp::Rem);
    let mul = arithmetic(ArithOp::Mul);
    assert!(apply(&div, vec![Value::Int(1), Value::Int(0)]).is_err());
    assert!(apply(&rem, vec![Value::Long(1), Value::Long(0)]).is_err());
    assert!(apply(&mul, vec![Value::Int(i32::MAX), Value::Int(2)]).is_err());
    assert_eq!(
        apply(&div, vec![Value::Double(1.0), Value::Double(0.0)]).unwrap(),
        Value::Double(f64::INFINITY)
    );
}

#[test]
fn test_arithmetic_inference() {
    let add = arithmetic(ArithOp::Add);
    let sub = arithmetic(ArithOp::Sub);
    assert_eq!(add.infer_type(&[Type::Int, Type::Long]).unwrap(), Type::Long);
    assert_eq!(add.infer_type(&[Type::Char, Type::Char]).unwrap(), Type::Int);
    assert_eq!(add.infer_type(&[Type::Str, Type::Int]).unwrap(), Type::Str);
    assert_eq!(add.infer_type(&[Type::Any, Type::Int]).unwrap(), Type::Any);
    assert!(sub.infer_type(&[Type::Str, Type::Int]).is_err());
    assert!(add.infer_type(&[Type::Int]).is_err());
}

#[test]
fn test_comparisons() {
    let lt = comparison(CompareOp::Lt);
    let eq = comparison(CompareOp::Eq);
    let ne = comparison(CompareOp::NotEq);
    assert_eq!(apply(&lt, vec![Value::Int(2), Value::Double(2.5)]).unwrap(), Value::Bool(true));
    assert_eq!(
        apply(&lt, vec![Value::string("abc"), Value::string("abd")]).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(apply(&eq, vec![Value::Int(2), Value::Long(2)]).unwrap(), Value::Bool(true));
    assert_eq!(apply(&eq, vec![Value::Null, Value::Null]).unwrap(), Value::Bool(true));
    assert_eq!(apply(&ne, vec![Value::Null, Value::Int(0)]).unwrap(), Value::Bool(true));
    assert!(apply(&lt, vec![Value::Null, Value::Int(0)]).is_err());
    assert!(comparison(CompareOp::Gt)
        .infer_type(&[Type::Str, Type::Int])
        .is_err());
}

#[test]
fn test_unary_operators() {
    let neg = negate();
    assert_eq!(apply(&neg, vec![Value::Int(3)]).unwrap(), Value::Int(-3));
    assert!(apply(&neg, vec![Value::Int(i32::MIN)]).is_err());
    assert!(apply(&neg, vec![Value::string("x")]).is_err());
    assert_eq!(neg.infer_type(&[Type::Char]).unwrap(), Type::Int);

    let not = not();
    assert_eq!(apply(&not, vec![Value::Int(0)]).unwrap(), Value::Bool(true));
    assert_eq!(apply(&not, vec![Value::string("x")]).unwrap(), Value::Bool(false));
}

#[test]
fn test_range_values() {
    let range = range();
    assert_eq!(apply(&range, vec![Value::Int(1), Value::Int(4)]).unwrap(), ints(&[1, 2, 3, 4]));
    assert_eq!(apply(&range, vec![Value::Int(3), Value::Int(1)]).unwrap(), ints(&[3, 2, 1]));
    assert_eq!(
        apply(&range, vec![Value::Int(0), Value::Int(10), Value::Int(5)]).unwrap(),
        ints(&[0, 5, 10])
    );
    assert_eq!(
        apply(&range, vec![Value::Char('a'), Value::Char('c')]).unwrap(),
        Value::list(vec![Value::Char('a'), Value::Char('b'), Value::Char('c')])
    );
    assert!(apply(&range, vec![Value::Int(0), Value::Int(1), Value::Int(0)]).is_err());
}

#[test]
fn test_double_range_rejects_endless_walks() {
    let range = range();
    let d = Value::Double;
    assert_eq!(
        apply(&range, vec![d(0.0), d(1.0), d(0.5)]).unwrap(),
        Value::list(vec![d(0.0), d(0.5), d(1.0)])
    );
    assert!(apply(&range, vec![d(0.0), d(f64::INFINITY)]).is_err());
    assert!(apply(&range, vec![d(f64::NEG_INFINITY), d(0.0)]).is_err());
    assert!(apply(&range, vec![d(0.0), d(f64::NAN)]).is_err());
    assert!(apply(&range, vec![d(0.0), d(1.0), d(f64::INFINITY)]).is_err());
    // A step below the spacing of doubles at 1e20 never advances.
    assert!(apply(&range, vec![d(1e20), d(1e21), d(1.0)]).is_err());
}

#[test]
fn test_range_has_its_own_inference() {
    let range = range();
    // A union of the argument types would give `int` here.
    assert_eq!(
        range
            .infer_type(&[Type::Char, Type::Char, Type::Int])
            .unwrap(),
        Type::list(Type::Char)
    );
    assert_eq!(
        range.infer_type(&[Type::Int, Type::Long]).unwrap(),
        Type::list(Type::Long)
    );
    assert_eq!(
        range.infer_type(&[Type::Int, Type::Int, Type::Double]).unwrap(),
        Type::list(Type::Double)
    );
    assert!(range.infer_type(&[Type::Str, Type::Int]).is_err());
}
