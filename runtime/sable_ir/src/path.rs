//! Slash-separated class-tree paths.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A type path in the class tree, e.g. `/datum/weapon/sword`.
///
/// Paths are rooted: every path starts with `/`, and the root type itself is
/// the single slash. A path is a name, not an ancestry claim: the tree's
/// parent links decide which types are ancestors of which.
///
/// Cheap to clone (shared storage).
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TypePath(Arc<str>);

impl TypePath {
    /// The root of the class tree.
    pub fn root() -> Self {
        TypePath(Arc::from("/"))
    }

    /// Create a path from a string.
    ///
    /// Returns `None` if the string is not rooted (does not start with `/`)
    /// or has a trailing slash (other than the root itself).
    pub fn new(path: &str) -> Option<Self> {
        if !path.starts_with('/') {
            return None;
        }
        if path.len() > 1 && path.ends_with('/') {
            return None;
        }
        Some(TypePath(Arc::from(path)))
    }

    /// True for the root path `/`.
    pub fn is_root(&self) -> bool {
        &*self.0 == "/"
    }

    /// The path string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The final element of the path (`sword` for `/datum/weapon/sword`),
    /// or the empty string for the root.
    pub fn element_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// The parent path, or `None` for the root.
    pub fn parent(&self) -> Option<TypePath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(TypePath::root()),
            Some(idx) => TypePath::new(&self.0[..idx]),
            None => None,
        }
    }

    /// Append an element, yielding a child path.
    pub fn child(&self, element: &str) -> TypePath {
        if self.is_root() {
            TypePath(Arc::from(format!("/{element}")))
        } else {
            TypePath(Arc::from(format!("{}/{element}", self.0)))
        }
    }

}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypePath({})", self.0)
    }
}

impl Serialize for TypePath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TypePath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TypePath::new(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("malformed type path: {s:?}")))
    }
}

#[cfg(test)]
mod tests;
