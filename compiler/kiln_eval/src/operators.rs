//! Built-in operators.
//!
//! Each operator is a small value implementing [`Function`] (so it can be
//! validated and invoked like any callable) and [`Operator`] (so operator
//! nodes can ask it for their static type when they are built).
//!
//! Numeric operands promote along `char < int < long < double`; two chars
//! compute in `int`. Integer arithmetic is checked.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use kiln_value::coerce::{to_bool, to_number};
use kiln_value::errors::{
    binary_type_mismatch, division_by_zero, integer_overflow, invalid_operand, type_mismatch,
    wrong_arg_count,
};
use kiln_value::{Arity, EvalError, EvalResult, Function, Operator, OperatorRef, Type, Value};

/// Arithmetic operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl ArithOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Rem => "%",
        }
    }

    fn describe(self) -> &'static str {
        match self {
            ArithOp::Add => "addition",
            ArithOp::Sub => "subtraction",
            ArithOp::Mul => "multiplication",
            ArithOp::Div => "division",
            ArithOp::Rem => "remainder",
        }
    }
}

/// Comparison operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::NotEq => "!=",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
        }
    }

    fn is_equality(self) -> bool {
        matches!(self, CompareOp::Eq | CompareOp::NotEq)
    }

    fn holds(self, ordering: Option<Ordering>) -> bool {
        match self {
            CompareOp::Eq => ordering == Some(Ordering::Equal),
            CompareOp::NotEq => ordering != Some(Ordering::Equal),
            CompareOp::Lt => ordering == Some(Ordering::Less),
            CompareOp::LtEq => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            CompareOp::Gt => ordering == Some(Ordering::Greater),
            CompareOp::GtEq => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        }
    }
}

// Constructors

pub fn arithmetic(op: ArithOp) -> OperatorRef {
    Arc::new(Arithmetic(op))
}

pub fn comparison(op: CompareOp) -> OperatorRef {
    Arc::new(Comparison(op))
}

/// Unary minus.
pub fn negate() -> OperatorRef {
    Arc::new(Negate)
}

/// Logical not over truthiness.
pub fn not() -> OperatorRef {
    Arc::new(Not)
}

/// Inclusive range `from..to` with an optional step, as a list.
pub fn range() -> OperatorRef {
    Arc::new(Range)
}

// Numeric promotion

#[derive(Copy, Clone, Debug)]
enum Num {
    Int(i32),
    Long(i64),
    Double(f64),
}

/// Operands promoted to a common representation.
enum Promoted {
    Int(i32, i32),
    Long(i64, i64),
    Double(f64, f64),
}

impl Num {
    fn of(value: &Value) -> Option<Num> {
        match to_number(value, true).ok()? {
            Value::Int(n) => Some(Num::Int(n)),
            Value::Long(n) => Some(Num::Long(n)),
            Value::Double(d) => Some(Num::Double(d)),
            _ => None,
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "long to double promotion is lossy by definition"
    )]
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(n) => f64::from(n),
            Num::Long(n) => n as f64,
            Num::Double(d) => d,
        }
    }
}

fn promote(a: Num, b: Num) -> Promoted {
    match (a, b) {
        (Num::Int(a), Num::Int(b)) => Promoted::Int(a, b),
        (Num::Int(a), Num::Long(b)) => Promoted::Long(i64::from(a), b),
        (Num::Long(a), Num::Int(b)) => Promoted::Long(a, i64::from(b)),
        (Num::Long(a), Num::Long(b)) => Promoted::Long(a, b),
        (a, b) => Promoted::Double(a.as_f64(), b.as_f64()),
    }
}

impl Promoted {
    fn compare(&self) -> Option<Ordering> {
        match self {
            Promoted::Int(a, b) => Some(a.cmp(b)),
            Promoted::Long(a, b) => Some(a.cmp(b)),
            Promoted::Double(a, b) => a.partial_cmp(b),
        }
    }
}

// Arithmetic

#[inline]
fn checked<T>(result: Option<T>, wrap: fn(T) -> Value, op: ArithOp) -> EvalResult {
    result.map(wrap).ok_or_else(|| integer_overflow(op.describe()))
}

macro_rules! integral_arith {
    ($name:ident, $ty:ty, $wrap:path) => {
        fn $name(op: ArithOp, a: $ty, b: $ty) -> EvalResult {
            match op {
                ArithOp::Add => checked(a.checked_add(b), $wrap, op),
                ArithOp::Sub => checked(a.checked_sub(b), $wrap, op),
                ArithOp::Mul => checked(a.checked_mul(b), $wrap, op),
                ArithOp::Div if b == 0 => Err(division_by_zero()),
                ArithOp::Div => checked(a.checked_div(b), $wrap, op),
                ArithOp::Rem if b == 0 => Err(division_by_zero()),
                ArithOp::Rem => checked(a.checked_rem(b), $wrap, op),
            }
        }
    };
}

integral_arith!(int_arith, i32, Value::Int);
integral_arith!(long_arith, i64, Value::Long);

fn double_arith(op: ArithOp, a: f64, b: f64) -> Value {
    Value::Double(match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div => a / b,
        ArithOp::Rem => a % b,
    })
}

/// `+` with a string operand concatenates the display forms.
fn is_text(value: &Value) -> bool {
    matches!(value, Value::Str(_))
}

fn arith(op: ArithOp, lhs: &Value, rhs: &Value) -> EvalResult {
    if op == ArithOp::Add && (is_text(lhs) || is_text(rhs)) {
        return Ok(Value::string(format!("{lhs}{rhs}")));
    }
    let (Some(a), Some(b)) = (Num::of(lhs), Num::of(rhs)) else {
        return Err(binary_type_mismatch(
            op.symbol(),
            lhs.type_name(),
            rhs.type_name(),
        ));
    };
    match promote(a, b) {
        Promoted::Int(a, b) => int_arith(op, a, b),
        Promoted::Long(a, b) => long_arith(op, a, b),
        Promoted::Double(a, b) => Ok(double_arith(op, a, b)),
    }
}

/// `lhs + rhs`, as used by increment and decrement.
pub(crate) fn add_values(lhs: &Value, rhs: &Value) -> EvalResult {
    arith(ArithOp::Add, lhs, rhs)
}

fn check_arity(name: &str, arity: Arity, args: Vec<Value>) -> Result<Vec<Value>, EvalError> {
    if arity.accepts(args.len()) {
        Ok(args)
    } else {
        Err(wrong_arg_count(name, arity, args.len()))
    }
}

fn check_type_arity(name: &str, arity: Arity, types: &[Type]) -> Result<(), EvalError> {
    if arity.accepts(types.len()) {
        Ok(())
    } else {
        Err(wrong_arg_count(name, arity, types.len()))
    }
}

struct Arithmetic(ArithOp);

impl fmt::Debug for Arithmetic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Arithmetic({})", self.0.symbol())
    }
}

impl Function for Arithmetic {
    fn name(&self) -> &str {
        self.0.symbol()
    }

    fn arity(&self) -> Arity {
        Arity::exact(2)
    }

    fn return_type(&self) -> Type {
        Type::Any
    }

    fn validate_args(&self, args: Vec<Value>) -> Result<Vec<Value>, EvalError> {
        check_arity(self.name(), self.arity(), args)
    }

    fn invoke(&self, args: Vec<Value>) -> EvalResult {
        match args.as_slice() {
            [lhs, rhs] => arith(self.0, lhs, rhs),
            _ => Err(wrong_arg_count(self.name(), self.arity(), args.len())),
        }
    }
}

impl Operator for Arithmetic {
    fn infer_type(&self, arg_types: &[Type]) -> Result<Type, EvalError> {
        check_type_arity(self.name(), self.arity(), arg_types)?;
        let (lhs, rhs) = (&arg_types[0], &arg_types[1]);
        if self.0 == ArithOp::Add && (*lhs == Type::Str || *rhs == Type::Str) {
            return Ok(Type::Str);
        }
        if *lhs == Type::Any || *rhs == Type::Any {
            return Ok(Type::Any);
        }
        if lhs.is_numeric() && rhs.is_numeric() {
            return Ok(match lhs.union(rhs) {
                Type::Char => Type::Int,
                widest => widest,
            });
        }
        Err(binary_type_mismatch(self.0.symbol(), lhs, rhs))
    }
}

// Comparison

fn compare(op: CompareOp, lhs: &Value, rhs: &Value) -> EvalResult {
    let ordering = match (Num::of(lhs), Num::of(rhs)) {
        (Some(a), Some(b)) => promote(a, b).compare(),
        _ => match (lhs, rhs) {
            (Value::Str(a), Value::Str(b)) => Some((**a).cmp(&**b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ if op.is_equality() => {
                return Ok(Value::Bool((lhs == rhs) == (op == CompareOp::Eq)));
            }
            _ => {
                return Err(binary_type_mismatch(
                    op.symbol(),
                    lhs.type_name(),
                    rhs.type_name(),
                ))
            }
        },
    };
    Ok(Value::Bool(op.holds(ordering)))
}

struct Comparison(CompareOp);

impl fmt::Debug for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Comparison({})", self.0.symbol())
    }
}

impl Function for Comparison {
    fn name(&self) -> &str {
        self.0.symbol()
    }

    fn arity(&self) -> Arity {
        Arity::exact(2)
    }

    fn return_type(&self) -> Type {
        Type::Bool
    }

    fn validate_args(&self, args: Vec<Value>) -> Result<Vec<Value>, EvalError> {
        check_arity(self.name(), self.arity(), args)
    }

    fn invoke(&self, args: Vec<Value>) -> EvalResult {
        match args.as_slice() {
            [lhs, rhs] => compare(self.0, lhs, rhs),
            _ => Err(wrong_arg_count(self.name(), self.arity(), args.len())),
        }
    }
}

impl Operator for Comparison {
    fn infer_type(&self, arg_types: &[Type]) -> Result<Type, EvalError> {
        check_type_arity(self.name(), self.arity(), arg_types)?;
        let (lhs, rhs) = (&arg_types[0], &arg_types[1]);
        let comparable = self.0.is_equality()
            || *lhs == Type::Any
            || *rhs == Type::Any
            || (lhs.is_numeric() && rhs.is_numeric())
            || (lhs == rhs && matches!(lhs, Type::Str | Type::Bool));
        if comparable {
            Ok(Type::Bool)
        } else {
            Err(binary_type_mismatch(self.0.symbol(), lhs, rhs))
        }
    }
}

// Unary

#[derive(Debug)]
struct Negate;

impl Function for Negate {
    fn name(&self) -> &str {
        "-"
    }

    fn arity(&self) -> Arity {
        Arity::exact(1)
    }

    fn return_type(&self) -> Type {
        Type::Any
    }

    fn validate_args(&self, args: Vec<Value>) -> Result<Vec<Value>, EvalError> {
        check_arity(self.name(), self.arity(), args)
    }

    fn invoke(&self, args: Vec<Value>) -> EvalResult {
        let [operand] = args.as_slice() else {
            return Err(wrong_arg_count(self.name(), self.arity(), args.len()));
        };
        match Num::of(operand) {
            Some(Num::Int(n)) => n
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| integer_overflow("negation")),
            Some(Num::Long(n)) => n
                .checked_neg()
                .map(Value::Long)
                .ok_or_else(|| integer_overflow("negation")),
            Some(Num::Double(d)) => Ok(Value::Double(-d)),
            None => Err(invalid_operand("-", operand.type_name())),
        }
    }
}

impl Operator for Negate {
    fn infer_type(&self, arg_types: &[Type]) -> Result<Type, EvalError> {
        check_type_arity(self.name(), self.arity(), arg_types)?;
        match &arg_types[0] {
            Type::Any => Ok(Type::Any),
            Type::Char => Ok(Type::Int),
            numeric if numeric.is_numeric() => Ok(numeric.clone()),
            other => Err(invalid_operand("-", other)),
        }
    }
}

#[derive(Debug)]
struct Not;

impl Function for Not {
    fn name(&self) -> &str {
        "!"
    }

    fn arity(&self) -> Arity {
        Arity::exact(1)
    }

    fn return_type(&self) -> Type {
        Type::Bool
    }

    fn validate_args(&self, args: Vec<Value>) -> Result<Vec<Value>, EvalError> {
        check_arity(self.name(), self.arity(), args)
    }

    fn invoke(&self, args: Vec<Value>) -> EvalResult {
        let [operand] = args.as_slice() else {
            return Err(wrong_arg_count(self.name(), self.arity(), args.len()));
        };
        Ok(Value::Bool(!to_bool(operand)))
    }
}

impl Operator for Not {
    fn infer_type(&self, arg_types: &[Type]) -> Result<Type, EvalError> {
        check_type_arity(self.name(), self.arity(), arg_types)?;
        Ok(Type::Bool)
    }
}

// Range

/// Element type of a range over endpoints (and step) of the given types.
///
/// Char endpoints give chars even with an int step; any double gives
/// doubles; otherwise the widest integral type, at least `int`.
fn range_element(types: &[Type]) -> Result<Type, EvalError> {
    if types.iter().any(|ty| *ty == Type::Any) {
        return Ok(Type::Any);
    }
    if let Some(bad) = types.iter().find(|ty| !ty.is_numeric()) {
        return Err(invalid_operand("..", bad));
    }
    if types.contains(&Type::Double) {
        return Ok(Type::Double);
    }
    if types[..2].iter().all(|ty| *ty == Type::Char) {
        return Ok(Type::Char);
    }
    Ok(if types.contains(&Type::Long) {
        Type::Long
    } else {
        Type::Int
    })
}

/// Inclusive integral walk from `from` toward `to`.
fn integral_steps(from: i64, to: i64, step: i64) -> Vec<i64> {
    let mut steps = Vec::new();
    let mut current = from;
    while (step > 0 && current <= to) || (step < 0 && current >= to) {
        steps.push(current);
        match current.checked_add(step) {
            Some(next) => current = next,
            None => break,
        }
    }
    steps
}

fn range_values(elem: &Type, from: &Value, to: &Value, step: Option<&Value>) -> EvalResult {
    let Some(from_num) = Num::of(from) else {
        return Err(invalid_operand("..", from.type_name()));
    };
    let Some(to_num) = Num::of(to) else {
        return Err(invalid_operand("..", to.type_name()));
    };
    let step_num = match step {
        Some(step) => Some(Num::of(step).ok_or_else(|| invalid_operand("..", step.type_name()))?),
        None => None,
    };

    if *elem == Type::Double {
        let (from, to) = (from_num.as_f64(), to_num.as_f64());
        let step = match step_num {
            Some(step) => step.as_f64(),
            None if from <= to => 1.0,
            None => -1.0,
        };
        if !(from.is_finite() && to.is_finite() && step.is_finite()) {
            return Err(EvalError::new("range bounds and step must be finite"));
        }
        if step == 0.0 {
            return Err(EvalError::new("range step must be non-zero"));
        }
        let mut items = Vec::new();
        let mut current = from;
        while (step > 0.0 && current <= to) || (step < 0.0 && current >= to) {
            items.push(Value::Double(current));
            let next = current + step;
            // Below the spacing of doubles at `current` the walk stalls.
            if next == current {
                return Err(EvalError::new("range step too small to advance"));
            }
            current = next;
        }
        return Ok(Value::list(items));
    }

    let integral = |num: Num| match num {
        Num::Int(n) => Ok(i64::from(n)),
        Num::Long(n) => Ok(n),
        Num::Double(_) => Err(type_mismatch("integral number", "double")),
    };
    let (from, to) = (integral(from_num)?, integral(to_num)?);
    let step = match step_num {
        Some(step) => integral(step)?,
        None if from <= to => 1,
        None => -1,
    };
    if step == 0 {
        return Err(EvalError::new("range step must be non-zero"));
    }
    integral_steps(from, to, step)
        .into_iter()
        .map(|n| elem.cast(Value::Long(n)))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::list)
}

#[derive(Debug)]
struct Range;

impl Function for Range {
    fn name(&self) -> &str {
        ".."
    }

    fn arity(&self) -> Arity {
        Arity::range(2, 3)
    }

    fn return_type(&self) -> Type {
        Type::list(Type::Any)
    }

    fn validate_args(&self, args: Vec<Value>) -> Result<Vec<Value>, EvalError> {
        check_arity(self.name(), self.arity(), args)
    }

    fn invoke(&self, args: Vec<Value>) -> EvalResult {
        let (from, to, step) = match args.as_slice() {
            [from, to] => (from, to, None),
            [from, to, step] => (from, to, Some(step)),
            _ => return Err(wrong_arg_count(self.name(), self.arity(), args.len())),
        };
        let types: Vec<Type> = args.iter().map(Type::of).collect();
        range_values(&range_element(&types)?, from, to, step)
    }
}

impl Operator for Range {
    fn infer_type(&self, arg_types: &[Type]) -> Result<Type, EvalError> {
        check_type_arity(self.name(), self.arity(), arg_types)?;
        Ok(Type::list(range_element(arg_types)?))
    }
}

#[cfg(test)]
mod tests;
