//! Interned identifier.
//!
//! Variable names, class members and parameter names are compared on every
//! resolution lookup, so they are interned once into a compact 32-bit handle.

use std::fmt;

use crate::interner::global;

/// Interned identifier.
///
/// Layout: 32-bit index split into shard (4 bits) + local index (28 bits)
/// - Bits 31-28: Shard index (0-15)
/// - Bits 27-0: Local index within shard
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Maximum local index per shard.
    pub const MAX_LOCAL: u32 = 0x0FFF_FFFF;

    /// Number of shards.
    pub const NUM_SHARDS: usize = 16;

    #[inline]
    pub(crate) const fn new(shard: u32, local: u32) -> Self {
        debug_assert!(shard < 16);
        debug_assert!(local <= Self::MAX_LOCAL);
        Name((shard << 28) | local)
    }

    /// Intern `text` in the process-wide interner.
    #[inline]
    pub fn intern(text: &str) -> Self {
        global().intern(text)
    }

    /// The interned text.
    #[inline]
    pub fn as_str(self) -> &'static str {
        global().lookup(self)
    }

    #[inline]
    pub(crate) const fn shard(self) -> usize {
        (self.0 >> 28) as usize
    }

    #[inline]
    pub(crate) const fn local(self) -> usize {
        (self.0 & Self::MAX_LOCAL) as usize
    }

    /// Raw handle value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", self.as_str())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl From<&str> for Name {
    fn from(text: &str) -> Self {
        Name::intern(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_layout() {
        let name = Name::new(5, 1000);
        assert_eq!(name.shard(), 5);
        assert_eq!(name.local(), 1000);
    }

    #[test]
    fn test_name_empty() {
        assert_eq!(Name::EMPTY.shard(), 0);
        assert_eq!(Name::EMPTY.local(), 0);
        assert_eq!(Name::intern(""), Name::EMPTY);
    }

    #[test]
    fn test_name_display_roundtrips_text() {
        let name = Name::intern("counter");
        assert_eq!(name.to_string(), "counter");
        assert_eq!(format!("{name:?}"), "Name(\"counter\")");
    }

    #[test]
    fn test_name_hash() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(Name::intern("a"));
        set.insert(Name::intern("a"));
        set.insert(Name::intern("b"));
        assert_eq!(set.len(), 2);
    }
}
