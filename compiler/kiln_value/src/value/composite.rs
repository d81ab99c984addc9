//! Composite runtime values: typed arrays and interpreted-class instances.

use std::sync::Arc;

use kiln_ir::Name;
use parking_lot::RwLockReadGuard;
use rustc_hash::FxHashMap;

use super::{Shared, Value};
use crate::errors::{index_out_of_bounds, EvalError};
use crate::ty::Type;
use crate::variable::Variable;

/// Fixed-length array whose elements all conform to `elem`.
#[derive(Clone, Debug)]
pub struct ArrayValue {
    elem: Type,
    items: Shared<Vec<Value>>,
}

impl ArrayValue {
    /// Build an array from already-cast elements.
    pub(crate) fn new(elem: Type, items: Vec<Value>) -> Self {
        ArrayValue {
            elem,
            items: Shared::new(items),
        }
    }

    /// Declared element type.
    #[inline]
    pub fn element_type(&self) -> &Type {
        &self.elem
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Element at `index`, if in bounds.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.read().get(index).cloned()
    }

    /// Cast `value` to the element type and store it at `index`.
    ///
    /// Returns the stored (cast) value.
    pub fn store(&self, index: usize, value: Value) -> Result<Value, EvalError> {
        let value = self.elem.cast(value)?;
        let mut items = self.items.write();
        let len = items.len();
        let slot = items
            .get_mut(index)
            .ok_or_else(|| index_out_of_bounds(index_as_i64(index), len))?;
        *slot = value.clone();
        Ok(value)
    }

    /// Read access to all elements.
    pub fn items(&self) -> RwLockReadGuard<'_, Vec<Value>> {
        self.items.read()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.items.ptr_eq(&other.items)
    }
}

pub(crate) fn index_as_i64(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

/// Member layout shared by all instances of an interpreted class.
#[derive(Debug)]
pub struct ObjectLayout {
    class: Name,
    members: Vec<(Name, Type)>,
    index: FxHashMap<Name, usize>,
}

impl ObjectLayout {
    /// Declare a class with the given members, in slot order.
    pub fn new(class: Name, members: Vec<(Name, Type)>) -> Arc<Self> {
        let index = members
            .iter()
            .enumerate()
            .map(|(slot, (name, _))| (*name, slot))
            .collect();
        Arc::new(ObjectLayout {
            class,
            members,
            index,
        })
    }

    #[inline]
    pub fn class(&self) -> Name {
        self.class
    }

    /// Slot and declared type of `member`.
    pub fn member(&self, member: Name) -> Option<(usize, &Type)> {
        let slot = *self.index.get(&member)?;
        self.members.get(slot).map(|(_, ty)| (slot, ty))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Instance of an interpreted class: one `Variable` per declared member.
#[derive(Clone, Debug)]
pub struct ObjectValue {
    layout: Arc<ObjectLayout>,
    slots: Arc<[Variable]>,
}

impl ObjectValue {
    /// Allocate an instance with every member at its type's default value.
    pub fn new(layout: Arc<ObjectLayout>) -> Self {
        let slots = layout
            .members
            .iter()
            .map(|(_, ty)| Variable::new(ty.default_value()))
            .collect();
        ObjectValue { layout, slots }
    }

    #[inline]
    pub fn layout(&self) -> &Arc<ObjectLayout> {
        &self.layout
    }

    #[inline]
    pub fn class(&self) -> Name {
        self.layout.class
    }

    /// The cell and declared type backing `member`.
    pub fn member(&self, member: Name) -> Option<(&Variable, &Type)> {
        let (slot, ty) = self.layout.member(member)?;
        self.slots.get(slot).map(|cell| (cell, ty))
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slots, &other.slots)
    }
}
