//! The closed set of values that support `[]`.
//!
//! Indexing nodes classify the base value once and then dispatch with an
//! exhaustive match, so adding a container kind is a compile error until
//! every access strategy handles it.

use kiln_value::coerce::to_int;
use kiln_value::errors::{
    cannot_assign_index, cannot_index, index_out_of_bounds, map_keys_must_be_strings,
    null_reference, type_mismatch,
};
use kiln_value::{ArrayValue, EvalError, EvalResult, Heap, Shared, Type, Value};
use rustc_hash::FxHashMap;

/// A value that can be indexed.
#[derive(Clone, Debug)]
pub enum Indexable {
    /// Read-only characters.
    Str(Heap<str>),
    CharBuffer(Shared<Vec<char>>),
    List(Shared<Vec<Value>>),
    Array(ArrayValue),
    /// Keyed by string.
    Map(Shared<FxHashMap<String, Value>>),
}

impl Indexable {
    /// Classify `value`, failing for values that cannot be indexed.
    pub fn of(value: Value) -> Result<Self, EvalError> {
        match value {
            Value::Str(s) => Ok(Indexable::Str(s)),
            Value::CharBuffer(buf) => Ok(Indexable::CharBuffer(buf)),
            Value::List(items) => Ok(Indexable::List(items)),
            Value::Array(array) => Ok(Indexable::Array(array)),
            Value::Map(entries) => Ok(Indexable::Map(entries)),
            Value::Null => Err(null_reference("indexing")),
            other => Err(cannot_index(other.type_name())),
        }
    }

    /// Number of elements (characters for strings, entries for maps).
    pub fn len(&self) -> usize {
        match self {
            Indexable::Str(s) => s.chars().count(),
            Indexable::CharBuffer(buf) => buf.read().len(),
            Indexable::List(items) => items.read().len(),
            Indexable::Array(array) => array.len(),
            Indexable::Map(entries) => entries.read().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn type_name(&self) -> &'static str {
        match self {
            Indexable::Str(_) => "String",
            Indexable::CharBuffer(_) => "StringBuilder",
            Indexable::List(_) => "List",
            Indexable::Array(_) => "Array",
            Indexable::Map(_) => "Map",
        }
    }

    /// Element at `key`. A missing map key reads as `null`.
    pub fn get(&self, key: &Value) -> EvalResult {
        match self {
            Indexable::Map(entries) => {
                let key = map_key(key)?;
                Ok(entries.read().get(key).cloned().unwrap_or(Value::Null))
            }
            Indexable::Str(s) => {
                let i = position(key, self.len())?;
                Ok(s.chars().nth(i).map_or(Value::Null, Value::Char))
            }
            Indexable::CharBuffer(buf) => {
                let buf = buf.read();
                let i = position(key, buf.len())?;
                Ok(Value::Char(buf[i]))
            }
            Indexable::List(items) => {
                let items = items.read();
                let i = position(key, items.len())?;
                Ok(items[i].clone())
            }
            Indexable::Array(array) => {
                let i = position(key, array.len())?;
                array
                    .get(i)
                    .ok_or_else(|| index_out_of_bounds(to_int(key).unwrap_or(-1), array.len()))
            }
        }
    }

    /// Store `value` at `key`, returning what was stored.
    ///
    /// Arrays cast to their element type and char buffers to `char`;
    /// strings are immutable.
    pub fn set(&self, key: &Value, value: Value) -> EvalResult {
        match self {
            Indexable::Map(entries) => {
                let key = map_key(key)?.to_string();
                entries.write().insert(key, value.clone());
                Ok(value)
            }
            Indexable::Str(_) => Err(cannot_assign_index(self.type_name())),
            Indexable::CharBuffer(buf) => {
                let ch = match Type::Char.cast(value)? {
                    Value::Char(ch) => ch,
                    other => return Err(type_mismatch(Type::Char, other.type_name())),
                };
                let mut buf = buf.write();
                let i = position(key, buf.len())?;
                buf[i] = ch;
                Ok(Value::Char(ch))
            }
            Indexable::List(items) => {
                let mut items = items.write();
                let i = position(key, items.len())?;
                items[i] = value.clone();
                Ok(value)
            }
            Indexable::Array(array) => {
                let i = position(key, array.len())?;
                array.store(i, value)
            }
        }
    }

    /// Elements `[lo, hi)`, or `[lo, len)` when `lo > hi`.
    ///
    /// Strings and char buffers slice to a new string; lists and arrays to
    /// a new container of the same kind.
    pub fn slice(&self, lo: i64, hi: i64) -> EvalResult {
        match self {
            Indexable::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let (start, end) = range_bounds(lo, hi, chars.len())?;
                Ok(Value::string(chars[start..end].iter().collect::<String>()))
            }
            Indexable::CharBuffer(buf) => {
                let buf = buf.read();
                let (start, end) = range_bounds(lo, hi, buf.len())?;
                Ok(Value::string(buf[start..end].iter().collect::<String>()))
            }
            Indexable::List(items) => {
                let items = items.read();
                let (start, end) = range_bounds(lo, hi, items.len())?;
                Ok(Value::list(items[start..end].to_vec()))
            }
            Indexable::Array(array) => {
                let items = array.items();
                let (start, end) = range_bounds(lo, hi, items.len())?;
                let slice = items[start..end].to_vec();
                drop(items);
                Value::array(array.element_type().clone(), slice)
            }
            Indexable::Map(_) => Err(cannot_index("Map with a range")),
        }
    }
}

fn map_key(key: &Value) -> Result<&str, EvalError> {
    key.as_str()
        .ok_or_else(|| map_keys_must_be_strings(key.type_name()))
}

/// In-bounds position of an integral `key`.
fn position(key: &Value, len: usize) -> Result<usize, EvalError> {
    let index = to_int(key)?;
    usize::try_from(index)
        .ok()
        .filter(|i| *i < len)
        .ok_or_else(|| index_out_of_bounds(index, len))
}

/// Slice bounds for `lo..hi` over `len` elements.
///
/// `lo > hi` selects `lo..len`. `lo` must lie within `0..=len` either way.
pub(crate) fn range_bounds(lo: i64, hi: i64, len: usize) -> Result<(usize, usize), EvalError> {
    let start = usize::try_from(lo)
        .ok()
        .filter(|start| *start <= len)
        .ok_or_else(|| index_out_of_bounds(lo, len))?;
    if lo > hi {
        return Ok((start, len));
    }
    let end = usize::try_from(hi)
        .ok()
        .filter(|end| *end <= len)
        .ok_or_else(|| index_out_of_bounds(hi, len))?;
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ints(values: &[i32]) -> Value {
        Value::list(values.iter().copied().map(Value::Int).collect())
    }

    #[test]
    fn test_range_bounds_policy() {
        assert_eq!(range_bounds(1, 3, 5).ok(), Some((1, 3)));
        assert_eq!(range_bounds(3, 1, 5).ok(), Some((3, 5)));
        assert_eq!(range_bounds(5, 0, 5).ok(), Some((5, 5)));
        assert!(range_bounds(6, 0, 5).is_err());
        assert!(range_bounds(-1, 2, 5).is_err());
        assert!(range_bounds(1, 9, 5).is_err());
    }

    #[test]
    fn test_string_index_reads_characters() {
        let s = Indexable::of(Value::string("héllo")).ok();
        let s = s.as_ref();
        assert_eq!(s.map(Indexable::len), Some(5));
        assert_eq!(s.and_then(|s| s.get(&Value::Int(1)).ok()), Some(Value::Char('é')));
        assert!(s.is_some_and(|s| s.set(&Value::Int(0), Value::Char('x')).is_err()));
    }

    #[test]
    fn test_missing_map_key_reads_null() {
        let map = Indexable::of(Value::map(FxHashMap::default())).ok();
        let map = map.as_ref();
        assert_eq!(map.and_then(|m| m.get(&Value::string("k")).ok()), Some(Value::Null));
        assert!(map.is_some_and(|m| m.get(&Value::Int(0)).is_err()));
    }

    #[test]
    fn test_list_set_and_bounds() {
        let list = ints(&[1, 2, 3]);
        let Ok(target) = Indexable::of(list.clone()) else {
            panic!("list is indexable");
        };
        assert_eq!(target.set(&Value::Int(2), Value::Int(9)).ok(), Some(Value::Int(9)));
        assert_eq!(list, ints(&[1, 2, 9]));
        assert!(target.get(&Value::Int(3)).is_err());
        assert!(target.get(&Value::Int(-1)).is_err());
    }

    #[test]
    fn test_char_buffer_set_casts_to_char() {
        let buf = Value::char_buffer("abc");
        let Ok(target) = Indexable::of(buf.clone()) else {
            panic!("buffer is indexable");
        };
        assert_eq!(target.set(&Value::Int(0), Value::Int(65)).ok(), Some(Value::Char('A')));
        assert_eq!(buf.to_string(), "Abc");
    }

    #[test]
    fn test_non_indexable_values() {
        assert!(Indexable::of(Value::Int(3)).is_err());
        assert!(Indexable::of(Value::Null).is_err());
    }
}
