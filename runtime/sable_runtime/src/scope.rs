//! The scope chain used during proc execution.
//!
//! Lookup priority is strict: locals, then enclosing scopes, then the
//! bound instance's variables, then declared globals. Assignment follows
//! the identical order and mutates in place at the level where the name is
//! found; it never creates a binding.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use sable_ir::{Name, ProcId};

use crate::error::RuntimeError;
use crate::instance::ObjectRef;
use crate::runtime::Runtime;
use crate::value::Value;

/// One scope of an invocation.
///
/// Nested (block) scopes share the bound instance, the actor, and the
/// super-proc pointer with their invocation's root scope; only the local
/// map is their own, and it is allocated lazily on the first declaration.
pub struct ProcScope {
    rt: Runtime,
    parent: Option<ScopeRef>,
    src: Option<ObjectRef>,
    usr: Option<ObjectRef>,
    /// The overridden ancestor implementation of the currently executing
    /// proc, callable from any block depth.
    super_proc: Option<ProcId>,
    locals: RefCell<Option<FxHashMap<Name, Value>>>,
}

/// Shared handle to a scope.
#[derive(Clone)]
pub struct ScopeRef(Rc<ProcScope>);

impl ScopeRef {
    /// Root scope of a proc invocation.
    pub fn root(
        rt: Runtime,
        src: Option<ObjectRef>,
        usr: Option<ObjectRef>,
        super_proc: Option<ProcId>,
    ) -> Self {
        ScopeRef(Rc::new(ProcScope {
            rt,
            parent: None,
            src,
            usr,
            super_proc,
            locals: RefCell::new(None),
        }))
    }

    /// Nested block scope, inheriting instance, actor, and super pointer.
    pub fn child(&self) -> Self {
        ScopeRef(Rc::new(ProcScope {
            rt: self.0.rt.clone(),
            parent: Some(self.clone()),
            src: self.0.src.clone(),
            usr: self.0.usr.clone(),
            super_proc: self.0.super_proc,
            locals: RefCell::new(None),
        }))
    }

    /// The bound instance, if the invocation has one.
    pub fn src(&self) -> Option<&ObjectRef> {
        self.0.src.as_ref()
    }

    /// The acting actor.
    pub fn usr(&self) -> Option<&ObjectRef> {
        self.0.usr.as_ref()
    }

    /// The overridden ancestor implementation of the executing proc.
    pub fn super_proc(&self) -> Option<ProcId> {
        self.0.super_proc
    }

    /// Resolve a name.
    pub fn get_value(&self, name: Name) -> Result<Value, RuntimeError> {
        if let Some(locals) = self.0.locals.borrow().as_ref() {
            if let Some(value) = locals.get(&name) {
                return Ok(value.clone());
            }
        }
        if let Some(parent) = &self.0.parent {
            return parent.get_value(name);
        }
        if let Some(src) = &self.0.src {
            if let Some(value) = src.try_get_var(name) {
                return Ok(value);
            }
            if let Some(value) = self.0.rt.global(name) {
                return Ok(value);
            }
        }
        Err(RuntimeError::UnknownValue(self.name_str(name)))
    }

    /// Assign to an existing binding, at the level where the name is
    /// found. Assigning a name not found anywhere is an error.
    pub fn assign(&self, name: Name, value: Value) -> Result<(), RuntimeError> {
        {
            let mut borrow = self.0.locals.borrow_mut();
            if let Some(locals) = borrow.as_mut() {
                if let Some(slot) = locals.get_mut(&name) {
                    *slot = value;
                    return Ok(());
                }
            }
        }
        if let Some(parent) = &self.0.parent {
            return parent.assign(name, value);
        }
        if let Some(src) = &self.0.src {
            if src.has_variable(name) {
                return src.set_var(name, value);
            }
            if self.0.rt.set_global(name, value).is_ok() {
                return Ok(());
            }
        }
        Err(RuntimeError::UnknownValue(self.name_str(name)))
    }

    /// Introduce a new binding in the *current* scope, shadowing any outer
    /// binding of the same name for the rest of this scope's lifetime.
    pub fn declare_local(&self, name: Name, value: Value) {
        self.0
            .locals
            .borrow_mut()
            .get_or_insert_with(FxHashMap::default)
            .insert(name, value);
    }

    /// Resolve a proc name against the bound instance's proc table.
    ///
    /// Local variables never shadow proc names.
    pub fn get_proc(&self, name: Name) -> Result<ProcId, RuntimeError> {
        self.0
            .src
            .as_ref()
            .and_then(|src| src.definition().proc(name))
            .ok_or_else(|| RuntimeError::UnknownProc(self.name_str(name)))
    }

    fn name_str(&self, name: Name) -> String {
        self.0.rt.interner().lookup(name).to_string()
    }
}
