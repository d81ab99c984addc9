//! Mutable single-value cell.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::value::Value;

/// A mutable box holding one `Value`.
///
/// Each cell belongs to exactly one environment slot (or object member).
/// Cloning the handle does not copy the value: both handles observe the
/// same writes, which is what lets an l-value hold on to its target between
/// the read and the write of a compound assignment.
#[derive(Clone)]
pub struct Variable(Arc<RwLock<Value>>);

impl Variable {
    pub fn new(value: Value) -> Self {
        Variable(Arc::new(RwLock::new(value)))
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> Value {
        self.0.read().clone()
    }

    /// Replace the value, returning the previous one.
    #[inline]
    pub fn set(&self, value: Value) -> Value {
        std::mem::replace(&mut *self.0.write(), value)
    }

    /// True if both handles refer to the same cell.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Variable {
    fn default() -> Self {
        Variable::new(Value::Null)
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Variable").field(&*self.0.read()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_returns_previous() {
        let cell = Variable::new(Value::Int(1));
        assert_eq!(cell.set(Value::Int(2)), Value::Int(1));
        assert_eq!(cell.get(), Value::Int(2));
    }

    #[test]
    fn test_clones_share_the_cell() {
        let cell = Variable::new(Value::Int(1));
        let alias = cell.clone();
        alias.set(Value::Int(7));
        assert_eq!(cell.get(), Value::Int(7));
        assert!(cell.ptr_eq(&alias));
        assert!(!cell.ptr_eq(&Variable::default()));
    }
}
