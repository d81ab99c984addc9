//! Runtime environment: a chain of fixed-size frames.
//!
//! A frame is created on entry to a `let` block or a closure call and holds
//! one [`Variable`] cell per slot of its [`FrameLayout`]. Frames point at
//! their enclosing frame but never at their children, so a frame lives
//! exactly as long as some evaluation or closure still reaches it.
//!
//! Resolved variable references never look names up at runtime: they walk
//! `depth` parent links and index the slot directly.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use kiln_ir::Name;
use kiln_value::{Type, Variable};
use rustc_hash::FxHashMap;

bitflags! {
    /// Declaration modifiers of a slot.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct Modifiers: u8 {
        /// Only the declaring initialisation may write the slot.
        const FINAL = 1 << 0;
    }
}

/// Declaration of one frame slot.
#[derive(Clone, Debug, PartialEq)]
pub struct Slot {
    pub name: Name,
    pub ty: Type,
    pub modifiers: Modifiers,
}

impl Slot {
    pub fn new(name: impl Into<Name>, ty: Type) -> Self {
        Slot {
            name: name.into(),
            ty,
            modifiers: Modifiers::empty(),
        }
    }

    /// A `FINAL` slot.
    pub fn constant(name: impl Into<Name>, ty: Type) -> Self {
        Slot::new(name, ty).with_modifiers(Modifiers::FINAL)
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Slot declarations of a frame, shared by every frame built from it.
#[derive(Debug, Default)]
pub struct FrameLayout {
    slots: Vec<Slot>,
    index: FxHashMap<Name, usize>,
}

impl FrameLayout {
    /// Declare a frame. A name declared twice resolves to its last slot.
    pub fn new(slots: Vec<Slot>) -> Arc<Self> {
        let index = slots
            .iter()
            .enumerate()
            .map(|(i, slot)| (slot.name, i))
            .collect();
        Arc::new(FrameLayout { slots, index })
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(FrameLayout::default())
    }

    /// Address and declaration of `name` in this frame.
    #[inline]
    pub fn lookup(&self, name: Name) -> Option<(usize, &Slot)> {
        let address = *self.index.get(&name)?;
        self.slots.get(address).map(|slot| (address, slot))
    }

    #[inline]
    pub fn slot(&self, address: usize) -> Option<&Slot> {
        self.slots.get(address)
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

struct Frame {
    layout: Arc<FrameLayout>,
    cells: Box<[Variable]>,
    parent: Option<Environment>,
}

/// Handle to a runtime frame and, through it, its enclosing frames.
///
/// Cloning is cheap and aliases the same cells.
#[derive(Clone)]
pub struct Environment(Arc<Frame>);

impl Environment {
    /// An outermost frame.
    pub fn root(layout: Arc<FrameLayout>) -> Self {
        Self::with_parent(layout, None)
    }

    /// An outermost frame with no slots.
    pub fn empty() -> Self {
        Self::root(FrameLayout::empty())
    }

    /// A frame nested inside `self`.
    pub fn child(&self, layout: Arc<FrameLayout>) -> Self {
        Self::with_parent(layout, Some(self.clone()))
    }

    fn with_parent(layout: Arc<FrameLayout>, parent: Option<Environment>) -> Self {
        let cells = layout
            .slots
            .iter()
            .map(|slot| Variable::new(slot.ty.default_value()))
            .collect();
        Environment(Arc::new(Frame {
            layout,
            cells,
            parent,
        }))
    }

    #[inline]
    pub fn parent(&self) -> Option<&Environment> {
        self.0.parent.as_ref()
    }

    /// The frame `depth` parent links away; `0` is `self`.
    pub fn ancestor(&self, depth: u32) -> Option<&Environment> {
        let mut env = self;
        for _ in 0..depth {
            env = env.parent()?;
        }
        Some(env)
    }

    /// `self` followed by every enclosing frame, innermost first.
    pub fn frames(&self) -> impl Iterator<Item = &Environment> {
        std::iter::successors(Some(self), |env| env.parent())
    }

    #[inline]
    pub fn layout(&self) -> &Arc<FrameLayout> {
        &self.0.layout
    }

    /// Cell at `address` in this frame.
    #[inline]
    pub fn get(&self, address: usize) -> Option<&Variable> {
        self.0.cells.get(address)
    }

    /// Cell at `address` in the frame `depth` links away.
    #[inline]
    pub fn lookup(&self, depth: u32, address: usize) -> Option<&Variable> {
        self.ancestor(depth)?.get(address)
    }

    /// True if both handles refer to the same frame.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (slot, cell) in self.0.layout.slots.iter().zip(self.0.cells.iter()) {
            map.entry(&slot.name, cell);
        }
        map.finish()?;
        if let Some(parent) = self.parent() {
            write!(f, " <- {parent:?}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
