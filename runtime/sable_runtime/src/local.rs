//! Single-threaded shared-cell primitive.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A single-threaded wrapper for reference-counted interior mutability.
///
/// Wraps `Rc<RefCell<T>>` so that shared mutable runtime state (lists) is
/// allocated through one factory method, and so the identity comparison the
/// value model needs is available as [`Local::ptr_eq`].
///
/// # Thread Safety
/// `Local<T>` is NOT thread-safe. Proc execution is single-threaded
/// cooperative, and `Rc` is cheaper than `Arc` for that.
#[repr(transparent)]
pub struct Local<T>(Rc<RefCell<T>>);

impl<T> Local<T> {
    /// Allocate a new shared cell.
    #[inline]
    pub fn new(value: T) -> Self {
        Local(Rc::new(RefCell::new(value)))
    }

    /// Borrow the inner value immutably.
    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    /// Borrow the inner value mutably.
    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// True iff both handles refer to the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Local<T>) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for Local<T> {
    #[inline]
    fn clone(&self) -> Self {
        Local(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Local<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Local").field(&self.0).finish()
    }
}

impl<T: Default> Default for Local<T> {
    fn default() -> Self {
        Local::new(T::default())
    }
}
