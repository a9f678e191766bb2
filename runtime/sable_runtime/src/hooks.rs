//! Lifecycle and accessor hooks.
//!
//! A type may carry one hook set observing instance lifecycle and variable
//! access. Absence means pure pass-through; the instance code path never
//! null-checks individual callbacks.

use sable_ir::Name;

use crate::instance::ObjectRef;
use crate::proc::ProcArgs;
use crate::value::Value;

/// Optional per-type capability table for lifecycle and accessor events.
///
/// Every method has a pass-through/no-op default, so an implementor
/// overrides only the events it cares about.
///
/// Ordering contracts:
/// - `on_created` observes a fully materialized instance; every
///   fresh-constructed default is already in place.
/// - `on_var_set` runs after the write is committed and sees the raw prior
///   value (no `on_var_get` transform applied).
/// - `on_deleted` runs at most once per instance.
pub trait HookSet {
    /// Instance finished construction.
    fn on_created(&self, _obj: &ObjectRef, _args: &ProcArgs) {}

    /// Instance is being deleted.
    fn on_deleted(&self, _obj: &ObjectRef) {}

    /// A variable is being read; may transform the exposed value
    /// (virtual properties).
    fn on_var_get(&self, _obj: &ObjectRef, _name: Name, value: Value) -> Value {
        value
    }

    /// A variable was written.
    fn on_var_set(&self, _obj: &ObjectRef, _name: Name, _new: &Value, _old: &Value) {}
}

/// The no-op hook set used when a type declares none.
pub struct NoHooks;

impl HookSet for NoHooks {}
