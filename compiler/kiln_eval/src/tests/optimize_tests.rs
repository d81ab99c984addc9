use std::sync::Arc;

use pretty_assertions::assert_eq;

use kiln_value::{Type, Value};

use super::support::{
    add, arith, boolean, calls, counting, counting_as, eval, frame, int, ints, name, run_in, set,
    text,
};
use crate::environment::{Environment, Slot};
use crate::expr::{Expr, ExprKind, ExprRef, LambdaDef};
use crate::operators::{not, range, ArithOp};
use crate::optimize::optimize_tree;
use crate::scope::CompileEnv;

fn literal_of(expr: &ExprRef) -> Value {
    match expr.as_literal() {
        Some(value) => value.clone(),
        None => panic!("expected a literal, got {:?}", expr.kind()),
    }
}

/// `x: int` and `flag: boolean`, resolved.
fn vars() -> (ExprRef, ExprRef, CompileEnv) {
    let (_, scope) = frame(vec![Slot::new("x", Type::Int), Slot::new("flag", Type::Bool)]);
    let x = name("x").resolve(&scope, 0);
    let flag = name("flag").resolve(&scope, 0);
    (x, flag, scope)
}

#[test]
fn test_level_zero_is_identity() {
    let tree = add(int(1), int(2));
    assert!(Arc::ptr_eq(&optimize_tree(&tree, 0), &tree));
}

#[test]
fn test_folds_constant_arithmetic() {
    let tree = add(int(1), arith(ArithOp::Mul, int(2), int(3)));
    let folded = optimize_tree(&tree, 1);
    assert_eq!(literal_of(&folded), Value::Int(7));
    assert_eq!(*folded.inferred_type(), Type::Int);
}

#[test]
fn test_folded_literal_keeps_node_type() {
    let tree = add(int(1), Expr::literal(Value::Long(2)));
    let folded = optimize_tree(&tree, 1);
    assert_eq!(literal_of(&folded), Value::Long(3));
    assert_eq!(*folded.inferred_type(), Type::Long);
}

#[test]
fn test_folds_inside_non_constant_parent() {
    let (x, _, _) = vars();
    let tree = add(x, add(int(2), int(3)));
    let optimized = optimize_tree(&tree, 1);
    let ExprKind::Binary { rhs, .. } = optimized.kind() else {
        panic!("expected a binary node");
    };
    assert_eq!(literal_of(rhs), Value::Int(5));
}

#[test]
fn test_constant_flag_is_set_at_construction() {
    let (x, _, _) = vars();
    assert!(int(1).is_constant());
    assert!(!x.is_constant());
    assert!(!add(Arc::clone(&x), int(1)).is_constant());
    assert!(Expr::cast(Type::Long, add(int(1), int(2))).is_constant());
    assert!(!Expr::list_literal(None, Type::Int, vec![int(1)]).is_constant());

    let mut chain = int(1);
    for _ in 0..2_000 {
        chain = add(chain, int(1));
    }
    assert!(chain.is_constant());
    assert_eq!(literal_of(&optimize_tree(&chain, 1)), Value::Int(2_001));
}

#[test]
fn test_failing_subtree_is_left_alone() {
    let tree = arith(ArithOp::Div, int(1), int(0));
    let optimized = optimize_tree(&tree, 2);
    assert!(Arc::ptr_eq(&optimized, &tree));
    assert!(eval(&optimized).is_err());
}

#[test]
fn test_containers_are_not_folded() {
    let tree = Expr::list_literal(None, Type::Int, vec![int(1)]);
    assert!(Arc::ptr_eq(&optimize_tree(&tree, 2), &tree));
    let ranged = Expr::binary(range(), int(1), int(3)).unwrap();
    assert!(optimize_tree(&ranged, 2).as_literal().is_none());
}

#[test]
fn test_side_effects_are_not_folded() {
    let (call, count) = counting(Value::Int(1));
    let tree = add(call, int(1));
    let optimized = optimize_tree(&tree, 2);
    assert!(Arc::ptr_eq(&optimized, &tree));
    assert_eq!(calls(&count), 0);
}

#[test]
fn test_redundant_cast_is_dropped() {
    let (x, _, _) = vars();
    let same = Expr::cast(Type::Int, Arc::clone(&x));
    assert!(Arc::ptr_eq(&optimize_tree(&same, 1), &x));

    let widening = Expr::cast(Type::Long, Arc::clone(&x));
    assert!(Arc::ptr_eq(&optimize_tree(&widening, 1), &widening));
}

/// Evaluates `tree` directly and after optimization, expecting `expected`
/// both times.
fn same_result(tree: &ExprRef, env: &Environment, scope: &CompileEnv, expected: &Value) {
    let linked = tree.resolve(scope, 0);
    assert_eq!(linked.evaluate(env).unwrap(), *expected);
    for level in 1..=2 {
        let optimized = optimize_tree(&linked, level);
        assert_eq!(optimized.evaluate(env).unwrap(), *expected);
    }
}

#[test]
fn test_cast_over_element_read_is_kept() {
    // A list stores what it is given, so `xs[0]` may hold an `int` even
    // though the slot is declared `List<double>`.
    let (env, scope) = frame(vec![Slot::new("xs", Type::list(Type::Double))]);
    set(&env, "xs", ints(&[1]));
    let store = Expr::assign(Expr::index(name("xs"), int(0)), int(7)).unwrap();
    run_in(&store, &env, &scope).unwrap();

    let read = Expr::cast(Type::Double, Expr::index(name("xs"), int(0)));
    same_result(&read, &env, &scope, &Value::Double(7.0));

    // An `int[]` is accepted where a `double[]` is declared.
    let (env, scope) = frame(vec![Slot::new("a", Type::array(Type::Double))]);
    let narrow = Value::array(Type::Int, vec![Value::Int(1)]).unwrap();
    run_in(&Expr::assign(name("a"), Expr::literal(narrow)).unwrap(), &env, &scope).unwrap();
    let read = Expr::cast(Type::Double, Expr::index(name("a"), int(0)));
    same_result(&read, &env, &scope, &Value::Double(1.0));
}

#[test]
fn test_cast_over_call_is_kept() {
    let (call, _) = counting_as(Value::Int(3), Type::Double);
    let (env, scope) = frame(vec![]);
    same_result(&Expr::cast(Type::Double, call), &env, &scope, &Value::Double(3.0));

    // A picked branch keeps the conditional's cast for the same reason.
    let (call, _) = counting_as(Value::Int(3), Type::Double);
    let tree = Expr::if_then_else(boolean(true), call, Expr::literal(Value::Double(0.0)));
    same_result(&tree, &env, &scope, &Value::Double(3.0));

    // `and` converts a right operand that only claims to be a boolean.
    let (call, _) = counting_as(Value::Int(1), Type::Bool);
    same_result(&Expr::and(boolean(true), call), &env, &scope, &Value::Bool(true));
}

#[test]
fn test_container_results_are_not_evaluated() {
    // Evaluating this would never finish; folding must not try.
    let endless = Expr::binary(
        range(),
        Expr::literal(Value::Double(0.0)),
        Expr::literal(Value::Double(f64::INFINITY)),
    )
    .unwrap();
    assert!(endless.is_constant());
    assert!(Arc::ptr_eq(&optimize_tree(&endless, 2), &endless));
    assert!(eval(&endless).is_err());
}

#[test]
fn test_literal_condition_picks_branch() {
    let (x, _, _) = vars();
    let tree = Expr::if_then_else(boolean(true), Arc::clone(&x), int(0));
    // Level 1 folds only constant subtrees.
    assert!(Arc::ptr_eq(&optimize_tree(&tree, 1), &tree));
    assert!(Arc::ptr_eq(&optimize_tree(&tree, 2), &x));

    // The surviving branch keeps the conditional's type.
    let widened = Expr::if_then_else(
        Expr::literal(Value::Int(0)),
        Expr::literal(Value::Long(5)),
        Arc::clone(&x),
    );
    let optimized = optimize_tree(&widened, 2);
    assert_eq!(*optimized.inferred_type(), Type::Long);
    match optimized.kind() {
        ExprKind::Cast { target, operand } => {
            assert_eq!(*target, Type::Long);
            assert!(Arc::ptr_eq(operand, &x));
        }
        other => panic!("expected a cast, got {other:?}"),
    }
}

#[test]
fn test_sequence_drops_literal_items() {
    let (x, _, _) = vars();
    let tree = Expr::sequence(vec![int(1), Arc::clone(&x), text("unused"), int(2)]);
    let optimized = optimize_tree(&tree, 2);
    let ExprKind::Sequence(items) = optimized.kind() else {
        panic!("expected a sequence");
    };
    assert_eq!(items.len(), 2);
    assert!(Arc::ptr_eq(&items[0], &x));
    assert_eq!(literal_of(&items[1]), Value::Int(2));

    let single = Expr::sequence(vec![int(1), Arc::clone(&x)]);
    assert!(Arc::ptr_eq(&optimize_tree(&single, 2), &x));
}

#[test]
fn test_before_with_literal_second() {
    let (x, _, _) = vars();
    let tree = Expr::before(Arc::clone(&x), int(3));
    assert!(Arc::ptr_eq(&optimize_tree(&tree, 2), &x));
}

#[test]
fn test_and_or_with_literal_left() {
    let (x, flag, _) = vars();

    let short = Expr::and(boolean(false), Arc::clone(&x));
    assert_eq!(literal_of(&optimize_tree(&short, 2)), Value::Bool(false));
    let short = Expr::or(int(1), Arc::clone(&x));
    assert_eq!(literal_of(&optimize_tree(&short, 2)), Value::Bool(true));

    let pass = Expr::and(boolean(true), Arc::clone(&flag));
    assert!(Arc::ptr_eq(&optimize_tree(&pass, 2), &flag));
    let pass = Expr::or(boolean(false), Arc::clone(&flag));
    assert!(Arc::ptr_eq(&optimize_tree(&pass, 2), &flag));

    // An `int` operand still has to be converted to a boolean.
    let kept = Expr::and(boolean(true), Arc::clone(&x));
    assert!(Arc::ptr_eq(&optimize_tree(&kept, 2), &kept));
}

#[test]
fn test_optimization_is_idempotent() {
    let (x, flag, _) = vars();
    let tree = Expr::sequence(vec![
        int(1),
        Expr::if_then_else(boolean(false), int(0), add(Arc::clone(&x), add(int(1), int(1)))),
        Expr::and(boolean(true), Arc::clone(&flag)),
        Expr::unary(not(), Arc::clone(&flag)).unwrap(),
    ]);
    for level in 1..=2 {
        let once = optimize_tree(&tree, level);
        assert!(Arc::ptr_eq(&optimize_tree(&once, level), &once));
    }
}

#[test]
fn test_optimizes_lambda_body() {
    let (_, _, scope) = vars();
    let body = add(int(2), int(2));
    let lambda = Expr::lambda(LambdaDef::new(vec![], None, Type::Int, body));
    let optimized = optimize_tree(&lambda.resolve(&scope, 0), 1);
    let ExprKind::Lambda(def) = optimized.kind() else {
        panic!("expected a lambda");
    };
    assert_eq!(literal_of(&def.body), Value::Int(4));
}
