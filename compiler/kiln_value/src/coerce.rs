//! Truthiness and numeric coercions shared by control-flow and arithmetic.

use crate::errors::{type_mismatch, EvalError};
use crate::ty::truncate_to_i64;
use crate::value::Value;

/// Truthiness used by conditionals, loops and the logical operators.
///
/// `void` and `null` are false; numbers are true when non-zero; characters
/// when not NUL; strings and containers when non-empty. Callables, objects
/// and host values are always true.
pub fn to_bool(value: &Value) -> bool {
    match value {
        Value::Void | Value::Null => false,
        Value::Bool(b) => *b,
        Value::Char(c) => *c != '\0',
        Value::Int(n) => *n != 0,
        Value::Long(n) => *n != 0,
        Value::Double(d) => *d != 0.0,
        Value::Str(s) => !s.is_empty(),
        Value::CharBuffer(buf) => !buf.read().is_empty(),
        Value::List(items) => !items.read().is_empty(),
        Value::Array(array) => !array.is_empty(),
        Value::Map(entries) => !entries.read().is_empty(),
        Value::Function(_) | Value::Object(_) | Value::Host(_) => true,
    }
}

/// Integral value of a number or character; doubles truncate toward zero.
pub fn to_int(value: &Value) -> Result<i64, EvalError> {
    match value {
        Value::Double(d) => Ok(truncate_to_i64(*d)),
        other => other
            .as_integral()
            .ok_or_else(|| type_mismatch("integral number", other.type_name())),
    }
}

/// Numeric view of `value` as `Int`, `Long` or `Double`.
///
/// Strict mode accepts only numbers and characters (characters become their
/// code point as `Int`). Lax mode additionally accepts booleans (`0`/`1`)
/// and strings holding a decimal number.
pub fn to_number(value: &Value, strict: bool) -> Result<Value, EvalError> {
    match value {
        Value::Int(_) | Value::Long(_) | Value::Double(_) => Ok(value.clone()),
        Value::Char(c) => Ok(Value::Int(
            i32::try_from(u32::from(*c)).unwrap_or(i32::MAX),
        )),
        Value::Bool(b) if !strict => Ok(Value::Int(i32::from(*b))),
        Value::Str(s) if !strict => parse_number(s.trim())
            .ok_or_else(|| type_mismatch("number", format!("\"{}\"", &**s))),
        other => Err(type_mismatch("number", other.type_name())),
    }
}

fn parse_number(text: &str) -> Option<Value> {
    if let Ok(n) = text.parse::<i32>() {
        return Some(Value::Int(n));
    }
    if let Ok(n) = text.parse::<i64>() {
        return Some(Value::Long(n));
    }
    text.parse::<f64>().ok().map(Value::Double)
}
