//! Object instances.
//!
//! An instance is identity plus a sparse override store on top of its
//! definition. Variables absent from the store fall back to the merged
//! default; reference-bearing defaults were materialized into the store
//! during construction, so sharing never happens by accident.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use sable_diagnostic::{Diagnostic, DiagnosticKind};
use sable_ir::{Name, TypePath};

use crate::definition::ObjectDefinition;
use crate::error::RuntimeError;
use crate::proc::ProcArgs;
use crate::runtime::Runtime;
use crate::value::Value;

/// Backing state of one live object.
pub struct ObjectInstance {
    definition: Rc<ObjectDefinition>,
    /// Construction-time serial, unique per runtime. The reference
    /// registry keys its reverse index on this rather than the allocation
    /// address, which could be reused after a drop.
    serial: u64,
    /// Monotonic: set once by deletion, never cleared.
    deleted: Cell<bool>,
    /// Variables that differ from the definition default.
    vars: RefCell<FxHashMap<Name, Value>>,
}

/// Shared, identity-bearing handle to an object instance.
///
/// Two `ObjectRef`s are the "same object" iff [`ObjectRef::ptr_eq`]; value
/// equality over instances does not exist.
#[derive(Clone)]
pub struct ObjectRef(Rc<ObjectInstance>);

impl ObjectRef {
    /// Bind a definition with an empty override store.
    ///
    /// Construction of a fully materialized instance (fresh defaults,
    /// creation hook) is driven by [`Runtime::create_object`]; this is the
    /// first step of that protocol only.
    pub(crate) fn bind(definition: Rc<ObjectDefinition>, serial: u64) -> Self {
        ObjectRef(Rc::new(ObjectInstance {
            definition,
            serial,
            deleted: Cell::new(false),
            vars: RefCell::new(FxHashMap::default()),
        }))
    }

    /// The definition this instance was constructed from.
    pub fn definition(&self) -> &Rc<ObjectDefinition> {
        &self.0.definition
    }

    /// The instance's type path.
    pub fn path(&self) -> &TypePath {
        self.0.definition.path()
    }

    /// Runtime-unique construction serial.
    pub fn serial(&self) -> u64 {
        self.0.serial
    }

    /// True iff both handles refer to the same instance.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// True once the instance has been deleted.
    pub fn is_deleted(&self) -> bool {
        self.0.deleted.get()
    }

    /// True iff `path` names this instance's type or an ancestor.
    pub fn is_subtype_of(&self, path: &TypePath) -> bool {
        self.0.definition.is_subtype_of(path)
    }

    /// True iff the type declares variable `name` (own or inherited).
    pub fn has_variable(&self, name: Name) -> bool {
        self.0.definition.has_variable(name)
    }

    /// True iff the type declares proc `name` (own or inherited).
    pub fn has_proc(&self, name: Name) -> bool {
        self.0.definition.has_proc(name)
    }

    /// Read a variable, routed through the get hook when one exists.
    pub fn get_var(&self, name: Name) -> Result<Value, RuntimeError> {
        if !self.has_variable(name) {
            return Err(RuntimeError::UnknownVariable(self.name_str(name)));
        }
        let value = self.raw_var(name);
        Ok(match self.0.definition.hooks() {
            Some(hooks) => hooks.on_var_get(self, name, value),
            None => value,
        })
    }

    /// Non-erroring read used by the scope chain.
    pub fn try_get_var(&self, name: Name) -> Option<Value> {
        if !self.has_variable(name) {
            return None;
        }
        let value = self.raw_var(name);
        Some(match self.0.definition.hooks() {
            Some(hooks) => hooks.on_var_get(self, name, value),
            None => value,
        })
    }

    /// Write a variable.
    ///
    /// The set hook runs after the write is committed and observes the raw
    /// prior value - the get hook's transform is not applied to it.
    pub fn set_var(&self, name: Name, value: Value) -> Result<(), RuntimeError> {
        if !self.has_variable(name) {
            return Err(RuntimeError::UnknownVariable(self.name_str(name)));
        }
        let old = self.raw_var(name);
        self.0.vars.borrow_mut().insert(name, value.clone());
        if let Some(hooks) = self.0.definition.hooks() {
            hooks.on_var_set(self, name, &value, &old);
        }
        Ok(())
    }

    /// Override-or-default, with no hook transform.
    fn raw_var(&self, name: Name) -> Value {
        if let Some(value) = self.0.vars.borrow().get(&name) {
            return value.clone();
        }
        self.0
            .definition
            .default_of(name)
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Call a proc on this instance.
    ///
    /// Never fails: any failure is converted into a structured diagnostic
    /// delivered to the runtime's sink, and the call yields `Null`. Callers
    /// that want the failure use [`ObjectRef::try_call_proc`].
    pub fn call_proc(
        &self,
        name: Name,
        args: &ProcArgs,
        usr: Option<&ObjectRef>,
        rt: &Runtime,
    ) -> Value {
        match self.try_call_proc(name, args, usr, rt) {
            Ok(value) => value,
            Err(error) => {
                let kind = diagnostic_kind(&error);
                rt.sink().report(
                    Diagnostic::error(kind, error.to_string())
                        .with_proc(self.name_str(name))
                        .with_type(self.path().clone()),
                );
                Value::Null
            }
        }
    }

    /// Call a proc on this instance, propagating failures.
    pub fn try_call_proc(
        &self,
        name: Name,
        args: &ProcArgs,
        usr: Option<&ObjectRef>,
        rt: &Runtime,
    ) -> Result<Value, RuntimeError> {
        let proc_id = self
            .0
            .definition
            .proc(name)
            .ok_or_else(|| RuntimeError::UnknownProc(self.name_str(name)))?;
        let super_id = self.0.definition.super_of(name, proc_id);
        rt.invoke(proc_id, Some(self), usr, args, super_id)
    }

    /// Delete this instance.
    ///
    /// Idempotent, and never fails: the deletion hook runs at most once,
    /// the registry entry is removed, and the flag stays set.
    pub fn delete(&self, rt: &Runtime) {
        if self.0.deleted.get() {
            return;
        }
        if let Some(hooks) = self.0.definition.hooks() {
            hooks.on_deleted(self);
        }
        rt.forget_handle(self);
        self.0.deleted.set(true);
    }

    fn name_str(&self, name: Name) -> String {
        self.0.definition.interner().lookup(name).to_string()
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ObjectRef({}, serial={})",
            self.path(),
            self.0.serial
        )
    }
}

/// Map a runtime error onto its diagnostic category.
fn diagnostic_kind(error: &RuntimeError) -> DiagnosticKind {
    match error {
        RuntimeError::UnknownVariable(_) => DiagnosticKind::UnknownVariable,
        RuntimeError::UnknownProc(_) => DiagnosticKind::UnknownProc,
        RuntimeError::UnknownValue(_) => DiagnosticKind::UnknownValue,
        RuntimeError::HandleNotFound(_) => DiagnosticKind::HandleNotFound,
        RuntimeError::UnknownType(_) | RuntimeError::ProcRuntime(_) => DiagnosticKind::ProcRuntime,
    }
}

#[cfg(test)]
mod tests;
