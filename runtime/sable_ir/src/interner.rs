//! String interner for identifier storage.
//!
//! Provides O(1) interning and lookup. Interned strings are leaked so that
//! lookups hand out `&'static str` without holding a lock guard.

// Arc is needed for SharedInterner - the interner is shared between the
// object tree, the runtime, and the constant folder.
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

/// Inner storage for interned strings.
struct InternTable {
    /// Map from string content to index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents, indexed by `Name`.
    strings: Vec<&'static str>,
}

/// String interner mapping identifiers to dense [`Name`] indices.
///
/// Names are issued densely starting from [`Name::EMPTY`], which lets the
/// manifest loader intern its string table in order and use the resulting
/// names as stable indices.
///
/// # Thread Safety
/// Uses a `RwLock` internally; wrap in [`SharedInterner`] to share.
pub struct StringInterner {
    table: RwLock<InternTable>,
}

impl StringInterner {
    /// Create a new interner with the empty string and common runtime
    /// identifiers pre-interned.
    pub fn new() -> Self {
        let interner = StringInterner {
            table: RwLock::new(InternTable {
                map: FxHashMap::default(),
                strings: Vec::with_capacity(256),
            }),
        };
        // Empty string is always Name::EMPTY
        interner.intern("");
        interner.pre_intern_common();
        interner
    }

    /// Intern a string, returning its `Name`.
    ///
    /// # Panics
    /// Panics if the table exceeds `u32::MAX` distinct strings. A compiled
    /// world is bounded far below that by its manifest, so this is treated
    /// as a capacity limit rather than a recoverable error.
    pub fn intern(&self, s: &str) -> Name {
        // Fast path: already interned
        {
            let guard = self.table.read();
            if let Some(&idx) = guard.map.get(s) {
                return Name::from_raw(idx);
            }
        }

        let mut guard = self.table.write();
        // Double-check after acquiring the write lock
        if let Some(&idx) = guard.map.get(s) {
            return Name::from_raw(idx);
        }

        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let idx = u32::try_from(guard.strings.len()).unwrap_or_else(|_| {
            panic!("interner exceeded capacity: {} strings", guard.strings.len())
        });
        guard.strings.push(leaked);
        guard.map.insert(leaked, idx);
        Name::from_raw(idx)
    }

    /// Intern an owned `String`, avoiding the extra copy `intern` would make
    /// for a string that is not yet present.
    ///
    /// # Panics
    /// Panics if the table exceeds `u32::MAX` distinct strings, as for
    /// [`StringInterner::intern`].
    pub fn intern_owned(&self, s: String) -> Name {
        {
            let guard = self.table.read();
            if let Some(&idx) = guard.map.get(s.as_str()) {
                return Name::from_raw(idx);
            }
        }

        let mut guard = self.table.write();
        if let Some(&idx) = guard.map.get(s.as_str()) {
            return Name::from_raw(idx);
        }

        let leaked: &'static str = Box::leak(s.into_boxed_str());
        let idx = u32::try_from(guard.strings.len()).unwrap_or_else(|_| {
            panic!("interner exceeded capacity: {} strings", guard.strings.len())
        });
        guard.strings.push(leaked);
        guard.map.insert(leaked, idx);
        Name::from_raw(idx)
    }

    /// Look up the string for a `Name`.
    ///
    /// The returned reference is `'static` because interned strings are
    /// leaked, never deallocated.
    pub fn lookup(&self, name: Name) -> &'static str {
        let guard = self.table.read();
        guard.strings[name.index()]
    }

    /// Resolve a `Name` that may not have been issued by this interner.
    pub fn try_lookup(&self, name: Name) -> Option<&'static str> {
        let guard = self.table.read();
        guard.strings.get(name.index()).copied()
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    /// True if only the empty string has been interned.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Pre-intern identifiers every loaded world refers to.
    fn pre_intern_common(&self) {
        const COMMON: &[&str] = &[
            // Lifecycle procs
            "New",
            "Del",
            // Implicit scope names
            "src",
            "usr",
            "args",
            // Ubiquitous variables
            "name",
            "desc",
            "type",
            "parent_type",
            "tag",
            "vars",
            "world",
        ];

        for s in COMMON {
            self.intern(s);
        }
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for looking up interned string names.
///
/// Higher-level crates accept any `StringLookup` implementor so they do not
/// couple to `StringInterner` directly (diagnostics formatting, for example).
pub trait StringLookup {
    /// Look up the string for an interned name.
    fn lookup(&self, name: Name) -> &str;
}

impl StringLookup for StringInterner {
    fn lookup(&self, name: Name) -> &str {
        StringInterner::lookup(self, name)
    }
}

/// Shared handle to a [`StringInterner`].
///
/// The interner is created once per runtime session and handed to the tree
/// loader, the runtime, and the constant folder; this newtype keeps the
/// `Arc` an implementation detail.
#[derive(Clone)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    /// Create a new shared interner.
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl Default for SharedInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl StringLookup for SharedInterner {
    fn lookup(&self, name: Name) -> &str {
        StringInterner::lookup(self, name)
    }
}
