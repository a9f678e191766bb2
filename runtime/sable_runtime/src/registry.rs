//! The reference registry.
//!
//! Issues stable integer handles for live instances, for use across trust
//! boundaries (save files, remote clients). Owned by a runtime session, not
//! process-wide, so isolated runtimes cannot cross-contaminate.

use rustc_hash::FxHashMap;

use crate::error::RuntimeError;
use crate::instance::ObjectRef;

/// A stable integer identifying a live object instance.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct Handle(u32);

impl Handle {
    /// Raw integer value, for serialization.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Reconstruct from a serialized value.
    pub const fn from_raw(raw: u32) -> Self {
        Handle(raw)
    }
}

/// Forward and reverse index between handles and live instances.
///
/// Handles are allocated from a monotonically increasing counter and never
/// reclaimed for the registry's lifetime: after an instance is deleted, its
/// handle resolves to "not found" forever - never to a later, unrelated
/// instance.
#[derive(Default)]
pub struct ReferenceRegistry {
    next: u32,
    forward: FxHashMap<Handle, ObjectRef>,
    /// Keyed by instance serial; survives deletion so a re-acquire on a
    /// deleted instance cannot be confused with a fresh allocation.
    by_serial: FxHashMap<u64, Handle>,
}

impl ReferenceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        ReferenceRegistry::default()
    }

    /// Get-or-create the handle for an instance.
    ///
    /// Two calls on the same instance return the same handle.
    pub fn acquire(&mut self, obj: &ObjectRef) -> Handle {
        if let Some(&handle) = self.by_serial.get(&obj.serial()) {
            return handle;
        }
        let handle = Handle(self.next);
        self.next += 1;
        self.by_serial.insert(obj.serial(), handle);
        self.forward.insert(handle, obj.clone());
        handle
    }

    /// The live instance a handle was issued for.
    pub fn resolve(&self, handle: Handle) -> Result<ObjectRef, RuntimeError> {
        self.forward
            .get(&handle)
            .cloned()
            .ok_or(RuntimeError::HandleNotFound(handle.raw()))
    }

    /// Drop the forward entry for a deleted instance.
    ///
    /// The handle itself is never reissued.
    pub fn release(&mut self, obj: &ObjectRef) {
        if let Some(&handle) = self.by_serial.get(&obj.serial()) {
            self.forward.remove(&handle);
        }
    }

    /// Number of live registered instances.
    pub fn live_count(&self) -> usize {
        self.forward.len()
    }
}
