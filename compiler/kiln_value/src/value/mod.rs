//! Runtime values for the Kiln evaluator.
//!
//! Scalars are stored inline. Strings live in an immutable [`Heap`];
//! containers (char buffers, lists, arrays, maps) live in a [`Shared`] cell
//! so that every copy of a value aliases the same storage, the way host
//! references behave.
//!
//! Heap values are only created through the factory methods on `Value`:
//!
//! ```text
//! let s = Value::string("hello");
//! let xs = Value::list(vec![Value::Int(1)]);
//! let ds = Value::array(Type::Double, vec![Value::Int(1)])?; // [1.0]
//! ```

mod composite;
mod heap;

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

pub use composite::{ArrayValue, ObjectLayout, ObjectValue};
pub use heap::{Heap, Shared};

use crate::errors::EvalError;
use crate::function::FunctionRef;
use crate::host::HostRef;
use crate::ty::Type;

/// Runtime value.
#[derive(Clone)]
pub enum Value {
    /// Result of an expression evaluated only for effect.
    Void,
    /// The null reference.
    Null,
    Bool(bool),
    Char(char),
    Int(i32),
    Long(i64),
    Double(f64),
    /// Immutable string.
    Str(Heap<str>),
    /// Mutable character buffer.
    CharBuffer(Shared<Vec<char>>),
    /// Growable list.
    List(Shared<Vec<Value>>),
    /// Fixed-length typed array.
    Array(ArrayValue),
    /// String-keyed map.
    Map(Shared<FxHashMap<String, Value>>),
    /// Callable value (native function, operator or closure).
    Function(FunctionRef),
    /// Interpreted-class instance.
    Object(ObjectValue),
    /// Host object reached through reflection.
    Host(HostRef),
}

// Factory methods (the only way to construct heap values)

impl Value {
    /// Create a string value.
    #[inline]
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::Str(Heap::from_arc(Arc::from(s.as_ref())))
    }

    /// Create a mutable character buffer holding `s`.
    pub fn char_buffer(s: &str) -> Self {
        Value::CharBuffer(Shared::new(s.chars().collect()))
    }

    /// Create a list value.
    #[inline]
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Shared::new(items))
    }

    /// Create an array, casting every element to `elem`.
    pub fn array(elem: Type, items: Vec<Value>) -> Result<Self, EvalError> {
        let items = items
            .into_iter()
            .map(|item| elem.cast(item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Array(ArrayValue::new(elem, items)))
    }

    /// Create an array of `len` default elements.
    pub fn array_filled(elem: Type, len: usize) -> Self {
        let items = vec![elem.default_value(); len];
        Value::Array(ArrayValue::new(elem, items))
    }

    /// Create a map value.
    #[inline]
    pub fn map(entries: FxHashMap<String, Value>) -> Self {
        Value::Map(Shared::new(entries))
    }

    /// Wrap a callable.
    #[inline]
    pub fn function(f: FunctionRef) -> Self {
        Value::Function(f)
    }

    /// Wrap a host object.
    #[inline]
    pub fn host(object: HostRef) -> Self {
        Value::Host(object)
    }
}

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    /// Borrow the text of a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integral payload of `Int`/`Long`/`Char`.
    pub fn as_integral(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(i64::from(*n)),
            Value::Long(n) => Some(*n),
            Value::Char(c) => Some(i64::from(u32::from(*c))),
            _ => None,
        }
    }

    /// Snapshot of a list's elements.
    pub fn list_items(&self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) => Some(items.read().clone()),
            Value::Array(array) => Some(array.items().clone()),
            _ => None,
        }
    }

    /// Runtime class name, as reported in diagnostics.
    pub fn type_name(&self) -> String {
        match self {
            Value::Host(object) => object.class_name().to_string(),
            Value::Object(object) => object.class().to_string(),
            other => Type::of(other).to_string(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "Void"),
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Char(c) => write!(f, "Char({c:?})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Long(n) => write!(f, "Long({n})"),
            Value::Double(d) => write!(f, "Double({d:?})"),
            Value::Str(s) => write!(f, "Str({:?})", &**s),
            Value::CharBuffer(buf) => {
                write!(f, "CharBuffer({:?})", buf.read().iter().collect::<String>())
            }
            Value::List(items) => f.debug_tuple("List").field(&*items.read()).finish(),
            Value::Array(array) => f
                .debug_struct("Array")
                .field("elem", array.element_type())
                .field("items", &*array.items())
                .finish(),
            Value::Map(entries) => f.debug_tuple("Map").field(&*entries.read()).finish(),
            Value::Function(func) => write!(f, "Function({})", func.name()),
            Value::Object(object) => write!(f, "Object({})", object.class()),
            Value::Host(object) => write!(f, "Host({})", object.class_name()),
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "void"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Long(n) => write!(f, "{n}"),
            Value::Double(d) => write!(f, "{d:?}"),
            Value::Str(s) => write!(f, "{}", &**s),
            Value::CharBuffer(buf) => write!(f, "{}", buf.read().iter().collect::<String>()),
            Value::List(items) => write_seq(f, &items.read()),
            Value::Array(array) => write_seq(f, &array.items()),
            Value::Map(entries) => {
                let entries = entries.read();
                let mut keys: Vec<&String> = entries.keys().collect();
                keys.sort();
                write!(f, "{{")?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}={}", entries[key])?;
                }
                write!(f, "}}")
            }
            Value::Function(func) => write!(f, "<fn {}>", func.name()),
            Value::Object(object) => write!(f, "<{} instance>", object.class()),
            Value::Host(object) => write!(f, "<{}>", object.class_name()),
        }
    }
}

/// Structural equality for containers, identity for callables and objects.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => **a == **b,
            (Value::CharBuffer(a), Value::CharBuffer(b)) => {
                a.ptr_eq(b) || *a.read() == *b.read()
            }
            (Value::List(a), Value::List(b)) => a.ptr_eq(b) || *a.read() == *b.read(),
            (Value::Array(a), Value::Array(b)) => {
                a.ptr_eq(b)
                    || (a.element_type() == b.element_type() && *a.items() == *b.items())
            }
            (Value::Map(a), Value::Map(b)) => a.ptr_eq(b) || *a.read() == *b.read(),
            (Value::Function(a), Value::Function(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Host(a), Value::Host(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            _ => false,
        }
    }
}
