//! Type descriptors.
//!
//! A [`Type`] answers "what does this expression produce" for the node that
//! owns it, and converts runtime values to that type with [`Type::cast`].
//! The numeric lattice is deliberately small: `Char < Int < Long < Double`.

use std::fmt;

use kiln_ir::Name;

use crate::errors::{integer_overflow, type_mismatch, EvalError, EvalResult};
use crate::value::Value;

/// Static type of an expression, or runtime type of a value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// No value; used for statements.
    Void,
    /// Type of the `null` literal.
    Null,
    Bool,
    Char,
    Int,
    Long,
    Double,
    Str,
    CharBuffer,
    List(Box<Type>),
    Array(Box<Type>),
    /// String-keyed map with the given value type.
    Map(Box<Type>),
    /// Callable with the given return type.
    Function(Box<Type>),
    /// Any interpreted-class instance.
    Object,
    /// Host class, by name.
    Host(Name),
    /// Top type; casting to it is the identity.
    Any,
}

/// Coarse classification of a [`Type`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Void,
    Null,
    Boolean,
    Character,
    Integral,
    Floating,
    String,
    CharBuffer,
    List,
    Array,
    Map,
    Function,
    Object,
    Host,
    Any,
}

impl Type {
    pub fn list(elem: Type) -> Type {
        Type::List(Box::new(elem))
    }

    pub fn array(elem: Type) -> Type {
        Type::Array(Box::new(elem))
    }

    pub fn map(value: Type) -> Type {
        Type::Map(Box::new(value))
    }

    pub fn function(ret: Type) -> Type {
        Type::Function(Box::new(ret))
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Type::Void => TypeKind::Void,
            Type::Null => TypeKind::Null,
            Type::Bool => TypeKind::Boolean,
            Type::Char => TypeKind::Character,
            Type::Int | Type::Long => TypeKind::Integral,
            Type::Double => TypeKind::Floating,
            Type::Str => TypeKind::String,
            Type::CharBuffer => TypeKind::CharBuffer,
            Type::List(_) => TypeKind::List,
            Type::Array(_) => TypeKind::Array,
            Type::Map(_) => TypeKind::Map,
            Type::Function(_) => TypeKind::Function,
            Type::Object => TypeKind::Object,
            Type::Host(_) => TypeKind::Host,
            Type::Any => TypeKind::Any,
        }
    }

    /// Name of the runtime class values of this type are represented by.
    pub fn host_class(&self) -> &'static str {
        match self {
            Type::Void => "void",
            Type::Null => "null",
            Type::Bool => "boolean",
            Type::Char => "char",
            Type::Int => "int",
            Type::Long => "long",
            Type::Double => "double",
            Type::Str => "String",
            Type::CharBuffer => "StringBuilder",
            Type::List(_) => "List",
            Type::Array(_) => "Array",
            Type::Map(_) => "Map",
            Type::Function(_) => "Function",
            Type::Object | Type::Any => "Object",
            Type::Host(class) => class.as_str(),
        }
    }

    /// Element type of an indexable type.
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Str | Type::CharBuffer => Some(&Type::Char),
            Type::List(elem) | Type::Array(elem) | Type::Map(elem) => Some(elem),
            _ => None,
        }
    }

    /// Return type of a function type.
    pub fn return_type(&self) -> Option<&Type> {
        match self {
            Type::Function(ret) => Some(ret),
            _ => None,
        }
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        self.numeric_rank().is_some()
    }

    /// True for types whose values may be `null`.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Type::Null
                | Type::Str
                | Type::CharBuffer
                | Type::List(_)
                | Type::Array(_)
                | Type::Map(_)
                | Type::Function(_)
                | Type::Object
                | Type::Host(_)
                | Type::Any
        )
    }

    fn numeric_rank(&self) -> Option<u8> {
        match self {
            Type::Char => Some(0),
            Type::Int => Some(1),
            Type::Long => Some(2),
            Type::Double => Some(3),
            _ => None,
        }
    }

    /// Runtime type of `value`.
    pub fn of(value: &Value) -> Type {
        match value {
            Value::Void => Type::Void,
            Value::Null => Type::Null,
            Value::Bool(_) => Type::Bool,
            Value::Char(_) => Type::Char,
            Value::Int(_) => Type::Int,
            Value::Long(_) => Type::Long,
            Value::Double(_) => Type::Double,
            Value::Str(_) => Type::Str,
            Value::CharBuffer(_) => Type::CharBuffer,
            Value::List(_) => Type::list(Type::Any),
            Value::Array(array) => Type::array(array.element_type().clone()),
            Value::Map(_) => Type::map(Type::Any),
            Value::Function(f) => Type::function(f.return_type()),
            Value::Object(_) => Type::Object,
            Value::Host(object) => Type::Host(Name::intern(object.class_name())),
        }
    }

    /// Zero value a fresh slot of this type holds.
    pub fn default_value(&self) -> Value {
        match self {
            Type::Void => Value::Void,
            Type::Bool => Value::Bool(false),
            Type::Char => Value::Char('\0'),
            Type::Int => Value::Int(0),
            Type::Long => Value::Long(0),
            Type::Double => Value::Double(0.0),
            _ => Value::Null,
        }
    }

    /// Least type both `self` and `other` convert to.
    ///
    /// Total: incompatible pairs join at `Any`. `Void` absorbs everything,
    /// so a conditional with a statement branch is itself a statement.
    pub fn union(&self, other: &Type) -> Type {
        if self == other {
            return self.clone();
        }
        match (self, other) {
            (Type::Void, _) | (_, Type::Void) => Type::Void,
            (Type::Any, _) | (_, Type::Any) => Type::Any,
            (Type::Null, t) | (t, Type::Null) if t.is_reference() => t.clone(),
            (Type::List(a), Type::List(b)) => Type::list(a.union(b)),
            (Type::Array(a), Type::Array(b)) => Type::array(a.union(b)),
            (Type::Map(a), Type::Map(b)) => Type::map(a.union(b)),
            (Type::Function(a), Type::Function(b)) => Type::function(a.union(b)),
            (a, b) => match (a.numeric_rank(), b.numeric_rank()) {
                (Some(ra), Some(rb)) => {
                    if ra >= rb {
                        a.clone()
                    } else {
                        b.clone()
                    }
                }
                _ => Type::Any,
            },
        }
    }

    /// True if every value of `other` converts to `self` without loss.
    pub fn contains(&self, other: &Type) -> bool {
        if self == other {
            return true;
        }
        match (self, other) {
            (Type::Any, _) => true,
            (t, Type::Null) => t.is_reference(),
            (Type::List(a), Type::List(b))
            | (Type::Array(a), Type::Array(b))
            | (Type::Map(a), Type::Map(b))
            | (Type::Function(a), Type::Function(b)) => a.contains(b),
            (a, b) => matches!(
                (a.numeric_rank(), b.numeric_rank()),
                (Some(ra), Some(rb)) if ra >= rb
            ),
        }
    }

    /// Structural type equality.
    #[inline]
    pub fn is_equivalent_to(&self, other: &Type) -> bool {
        self == other
    }

    /// Convert `value` to this type.
    ///
    /// Numeric conversions widen or narrow (floating to integral truncates
    /// toward zero; integral narrowing fails when the value does not fit).
    /// Reference types accept `null`.
    pub fn cast(&self, value: Value) -> EvalResult {
        match (self, value) {
            (Type::Any, value) => Ok(value),
            (Type::Void, _) => Ok(Value::Void),
            (ty, Value::Null) if ty.is_reference() => Ok(Value::Null),
            (Type::Bool, Value::Bool(b)) => Ok(Value::Bool(b)),
            (Type::Char, value) => cast_char(value),
            (Type::Int, value) => cast_int(value),
            (Type::Long, value) => cast_long(value),
            (Type::Double, value) => cast_double(value),
            (Type::Str, value @ Value::Str(_))
            | (Type::CharBuffer, value @ Value::CharBuffer(_))
            | (Type::List(_), value @ Value::List(_))
            | (Type::Map(_), value @ Value::Map(_))
            | (Type::Function(_), value @ Value::Function(_))
            | (Type::Object, value @ Value::Object(_)) => Ok(value),
            (Type::Array(elem), Value::Array(array)) if elem.contains(array.element_type()) => {
                Ok(Value::Array(array))
            }
            (Type::Host(class), Value::Host(object)) if object.class_name() == class.as_str() => {
                Ok(Value::Host(object))
            }
            (ty, value) => Err(type_mismatch(ty, value.type_name())),
        }
    }
}

fn cast_char(value: Value) -> EvalResult {
    let code = match value {
        Value::Char(c) => return Ok(Value::Char(c)),
        Value::Int(n) => i64::from(n),
        Value::Long(n) => n,
        Value::Double(d) => truncate_to_i64(d),
        other => return Err(type_mismatch(Type::Char, other.type_name())),
    };
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(Value::Char)
        .ok_or_else(|| integer_overflow("conversion to char"))
}

fn cast_int(value: Value) -> EvalResult {
    let wide = match value {
        Value::Int(n) => return Ok(Value::Int(n)),
        Value::Char(c) => i64::from(u32::from(c)),
        Value::Long(n) => n,
        Value::Double(d) => truncate_to_i64(d),
        other => return Err(type_mismatch(Type::Int, other.type_name())),
    };
    i32::try_from(wide)
        .map(Value::Int)
        .map_err(|_| integer_overflow("conversion to int"))
}

fn cast_long(value: Value) -> EvalResult {
    match value {
        Value::Long(n) => Ok(Value::Long(n)),
        Value::Int(n) => Ok(Value::Long(i64::from(n))),
        Value::Char(c) => Ok(Value::Long(i64::from(u32::from(c)))),
        Value::Double(d) => Ok(Value::Long(truncate_to_i64(d))),
        other => Err(type_mismatch(Type::Long, other.type_name())),
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "long to double widening is lossy by definition"
)]
fn cast_double(value: Value) -> EvalResult {
    match value {
        Value::Double(d) => Ok(Value::Double(d)),
        Value::Int(n) => Ok(Value::Double(f64::from(n))),
        Value::Long(n) => Ok(Value::Double(n as f64)),
        Value::Char(c) => Ok(Value::Double(f64::from(u32::from(c)))),
        other => Err(type_mismatch(Type::Double, other.type_name())),
    }
}

/// Truncate toward zero, saturating at the `i64` range; NaN becomes 0.
#[expect(
    clippy::cast_possible_truncation,
    reason = "float to integral conversion truncates by definition"
)]
pub(crate) fn truncate_to_i64(d: f64) -> i64 {
    d as i64
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::List(elem) => write!(f, "List<{elem}>"),
            Type::Array(elem) => write!(f, "{elem}[]"),
            Type::Map(value) => write!(f, "Map<String, {value}>"),
            Type::Function(ret) => write!(f, "Function<{ret}>"),
            Type::Any => write!(f, "any"),
            other => f.write_str(other.host_class()),
        }
    }
}

/// Make a cast failure mention what was being converted.
pub fn cast_with_context(ty: &Type, value: Value, context: &str) -> Result<Value, EvalError> {
    ty.cast(value).map_err(|e| e.with_note(context.to_string()))
}
