//! The runtime session.
//!
//! Owns everything mutable: the reference registry, the global variable
//! table, and the instance serial counter. One `Runtime` value is the
//! single mutation authority - instantiation, deletion, and handle
//! issuance all go through it, so keeping it on one thread keeps those
//! operations sound.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rustc_hash::FxHashMap;
use sable_diagnostic::SharedSink;
use sable_ir::{Name, ProcId, SharedInterner, TypeId, TypePath};

use crate::error::RuntimeError;
use crate::instance::ObjectRef;
use crate::list::ListRef;
use crate::natives::{NativeCall, NativeHandler};
use crate::proc::{ProcArgs, ProcExecutor, ProcKind};
use crate::registry::{Handle, ReferenceRegistry};
use crate::scope::ScopeRef;
use crate::tree::ObjectTree;
use crate::value::Value;

struct RuntimeInner {
    tree: ObjectTree,
    registry: RefCell<ReferenceRegistry>,
    globals: RefCell<FxHashMap<Name, Value>>,
    sink: SharedSink,
    executor: Option<Rc<dyn ProcExecutor>>,
    next_serial: Cell<u64>,
}

/// Shared handle to a runtime session.
///
/// Cheap to clone; all clones refer to the same session state.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

/// Builder wiring a loaded tree to a sink and an interpreter.
pub struct RuntimeBuilder {
    tree: ObjectTree,
    sink: SharedSink,
    executor: Option<Rc<dyn ProcExecutor>>,
}

impl RuntimeBuilder {
    /// Start from a loaded, validated tree.
    pub fn new(tree: ObjectTree) -> Self {
        RuntimeBuilder {
            tree,
            sink: SharedSink::default(),
            executor: None,
        }
    }

    /// Use a specific diagnostic sink.
    #[must_use]
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    /// Install the external interpreter for compiled proc bodies.
    #[must_use]
    pub fn with_executor(mut self, executor: Rc<dyn ProcExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Finish the session. Globals start at their declared initial values.
    pub fn build(self) -> Runtime {
        let globals = self.tree.globals().iter().cloned().collect();
        Runtime {
            inner: Rc::new(RuntimeInner {
                tree: self.tree,
                registry: RefCell::new(ReferenceRegistry::new()),
                globals: RefCell::new(globals),
                sink: self.sink,
                executor: self.executor,
                next_serial: Cell::new(0),
            }),
        }
    }
}

impl Runtime {
    /// Session over a tree with default wiring.
    pub fn new(tree: ObjectTree) -> Self {
        RuntimeBuilder::new(tree).build()
    }

    /// The loaded type tree.
    pub fn tree(&self) -> &ObjectTree {
        &self.inner.tree
    }

    /// The session's interner.
    pub fn interner(&self) -> &SharedInterner {
        self.inner.tree.interner()
    }

    /// The diagnostic sink.
    pub fn sink(&self) -> &SharedSink {
        &self.inner.sink
    }

    // Instantiation and deletion

    /// Instantiate a type by path.
    pub fn create_object(
        &self,
        path: &TypePath,
        args: &ProcArgs,
    ) -> Result<ObjectRef, RuntimeError> {
        let entry = self
            .inner
            .tree
            .entry_by_path(path)
            .ok_or_else(|| RuntimeError::UnknownType(path.to_string()))?;
        self.create_object_by_id(entry.id, args)
    }

    /// Instantiate a type by id, running the full construction protocol:
    /// fresh scalar recipes, then fresh list recipes, then the creation
    /// hook over the fully materialized instance.
    pub fn create_object_by_id(
        &self,
        type_id: TypeId,
        args: &ProcArgs,
    ) -> Result<ObjectRef, RuntimeError> {
        let definition = self
            .inner
            .tree
            .definition(type_id)
            .ok_or_else(|| RuntimeError::UnknownType(format!("#{}", type_id.raw())))?
            .clone();

        let serial = self.inner.next_serial.get();
        self.inner.next_serial.set(serial + 1);
        let obj = ObjectRef::bind(definition.clone(), serial);

        for recipe in definition.fresh_objects() {
            let sub = self.create_object_by_id(
                recipe.type_id,
                &ProcArgs::positional(recipe.args.iter().cloned()),
            )?;
            obj.set_var(recipe.var, Value::object(sub))?;
        }

        for recipe in definition.fresh_lists() {
            let list = ListRef::new();
            {
                let mut inner = list.borrow_mut();
                for (key, value) in &recipe.entries {
                    match key {
                        Some(key) => inner.set_assoc(key.clone(), value.clone()),
                        None => inner.append(value.clone()),
                    }
                }
            }
            obj.set_var(recipe.var, Value::list(list))?;
        }

        if let Some(hooks) = definition.hooks() {
            hooks.on_created(&obj, args);
        }
        Ok(obj)
    }

    /// Delete an instance (idempotent; see [`ObjectRef::delete`]).
    pub fn delete(&self, obj: &ObjectRef) {
        obj.delete(self);
    }

    // Reference registry

    /// Get-or-create the stable handle for a live instance.
    pub fn acquire_handle(&self, obj: &ObjectRef) -> Handle {
        self.inner.registry.borrow_mut().acquire(obj)
    }

    /// Resolve a handle to the instance it was issued for.
    pub fn resolve_handle(&self, handle: Handle) -> Result<ObjectRef, RuntimeError> {
        self.inner.registry.borrow().resolve(handle)
    }

    /// Remove a deleted instance from the forward index.
    pub(crate) fn forget_handle(&self, obj: &ObjectRef) {
        self.inner.registry.borrow_mut().release(obj);
    }

    // Globals

    /// True iff the world declares global `name`.
    pub fn has_global(&self, name: Name) -> bool {
        self.inner.globals.borrow().contains_key(&name)
    }

    /// Current value of a declared global.
    pub fn global(&self, name: Name) -> Option<Value> {
        self.inner.globals.borrow().get(&name).cloned()
    }

    /// Assign a declared global.
    pub fn set_global(&self, name: Name, value: Value) -> Result<(), RuntimeError> {
        let mut globals = self.inner.globals.borrow_mut();
        match globals.get_mut(&name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RuntimeError::UnknownValue(
                self.interner().lookup(name).to_string(),
            )),
        }
    }

    // Proc dispatch

    /// Call a global proc by name.
    pub fn call_global_proc(
        &self,
        name: Name,
        args: &ProcArgs,
        usr: Option<&ObjectRef>,
    ) -> Result<Value, RuntimeError> {
        let proc_id = self.inner.tree.global_proc(name).ok_or_else(|| {
            RuntimeError::UnknownProc(self.interner().lookup(name).to_string())
        })?;
        self.invoke(proc_id, None, usr, args, None)
    }

    /// Run the world-start init proc, if the manifest declared one.
    pub fn run_global_init(&self) -> Result<Value, RuntimeError> {
        match self.inner.tree.global_init_proc() {
            Some(proc_id) => self.invoke(proc_id, None, None, &ProcArgs::none(), None),
            None => Ok(Value::Null),
        }
    }

    /// Execute a proc by table id.
    ///
    /// This is the dispatch point both for instance calls and for the
    /// external interpreter driving "super" calls: the interpreter reads
    /// the scope's super pointer and invokes it here with the same `src`.
    pub fn invoke(
        &self,
        proc_id: ProcId,
        src: Option<&ObjectRef>,
        usr: Option<&ObjectRef>,
        args: &ProcArgs,
        super_proc: Option<ProcId>,
    ) -> Result<Value, RuntimeError> {
        let proc = self
            .inner
            .tree
            .proc(proc_id)
            .ok_or_else(|| RuntimeError::UnknownProc(format!("#{}", proc_id.raw())))?;
        let name = self.interner().lookup(proc.name);

        match &proc.kind {
            ProcKind::Native(Some(NativeHandler::Sync(handler))) => {
                let bound = proc.bind_args(args);
                handler(&NativeCall {
                    src,
                    usr,
                    args: &bound,
                    raw: args,
                    tree: Some(&self.inner.tree),
                })
            }
            ProcKind::Native(Some(NativeHandler::Async(_))) => Err(RuntimeError::proc_runtime(
                format!("async native proc '{name}' requires the external interpreter"),
            )),
            ProcKind::Native(None) => Err(RuntimeError::proc_runtime(format!(
                "native proc '{name}' has no bound handler"
            ))),
            ProcKind::Compiled { .. } => {
                let executor = self.inner.executor.clone().ok_or_else(|| {
                    RuntimeError::proc_runtime(format!(
                        "no interpreter installed for compiled proc '{name}'"
                    ))
                })?;
                let scope =
                    ScopeRef::root(self.clone(), src.cloned(), usr.cloned(), super_proc);
                executor.execute(self, proc_id, &scope, args)
            }
        }
    }
}

#[cfg(test)]
mod tests;
