//! Table index newtypes.
//!
//! The compiled manifest refers to types, procs, and strings by index; these
//! newtypes keep the three index spaces from being mixed up.

use std::fmt;

macro_rules! table_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create from a raw table index.
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            /// Index into the owning table.
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

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

table_id! {
    /// Index into the object tree's type table.
    TypeId
}

table_id! {
    /// Index into the object tree's proc table.
    ProcId
}

table_id! {
    /// Index into the manifest's string table.
    ///
    /// The loader interns the string table in order, so a validated
    /// `StringId` maps 1:1 onto an interned `Name`. Serializes as the bare
    /// index, matching the manifest encoding.
    #[derive(serde::Serialize, serde::Deserialize)]
    #[serde(transparent)]
    StringId
}
