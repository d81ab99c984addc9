//! Reference-counted storage for heap values.
//!
//! [`Heap`] holds immutable payloads (strings). [`Shared`] holds the mutable
//! containers (lists, arrays, char buffers, maps): every copy of a `Value`
//! aliases the same storage, matching host reference semantics. Both wrappers
//! have crate-private constructors so that heap values are only created
//! through the `Value` factory methods.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Immutable, shared heap payload.
pub struct Heap<T: ?Sized>(Arc<T>);

impl<T: ?Sized> Heap<T> {
    #[inline]
    pub(crate) fn from_arc(inner: Arc<T>) -> Self {
        Heap(inner)
    }

    /// True if both handles point at the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: ?Sized> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> Deref for Heap<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// Mutable, shared heap payload.
pub struct Shared<T>(Arc<RwLock<T>>);

impl<T> Shared<T> {
    #[inline]
    pub(crate) fn new(value: T) -> Self {
        Shared(Arc::new(RwLock::new(value)))
    }

    /// Borrow the contents for reading.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read()
    }

    /// Borrow the contents for writing.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write()
    }

    /// True if both handles alias the same container.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for Shared<T> {
    #[inline]
    fn clone(&self) -> Self {
        Shared(Arc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0.read(), f)
    }
}
