//! Interned string identifier.

use std::fmt;

/// Interned string identifier.
///
/// A `Name` is a dense index into a [`StringInterner`](crate::StringInterner).
/// Two `Name`s issued by the same interner are equal iff their strings are
/// equal, so every name-keyed table in the runtime compares keys in O(1).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Create from a raw index.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    /// Index into the interner's string table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}
