use std::cell::Cell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use sable_ir::{Name, ProcId, SharedInterner, TypePath};

use crate::error::RuntimeError;
use crate::hooks::HookSet;
use crate::instance::ObjectRef;
use crate::natives::{AsyncNativeSpawn, NativeCall, NativeProcDesc};
use crate::proc::{ProcArgs, ProcExecutor};
use crate::runtime::{Runtime, RuntimeBuilder};
use crate::scope::ScopeRef;
use crate::tree::ObjectTree;
use crate::value::Value;

const WORLD: &str = r#"{
    "strings": ["loot", "gold"],
    "globalProcs": [0],
    "globals": [{"name": "score", "value": {"kind": "number", "value": 0.0}}],
    "globalInitProc": {"name": "init", "body": 1},
    "types": [
        {"path": "/"},
        {"path": "/datum", "parent": 0},
        {
            "path": "/datum/stat",
            "parent": 1,
            "variables": [{"name": "power", "value": {"kind": "number", "value": 3.0}}]
        },
        {
            "path": "/mob",
            "parent": 0,
            "initObjects": [{"name": "stats", "typePath": "/datum/stat"}],
            "initLists": [{
                "name": "inventory",
                "entries": [
                    {"value": {"kind": "text", "value": 0}},
                    {"key": {"kind": "text", "value": 1}, "value": {"kind": "number", "value": 10.0}}
                ]
            }]
        }
    ],
    "procs": [
        {"name": "roll", "native": true},
        {"name": "boot", "body": 0}
    ]
}"#;

fn load_world() -> ObjectTree {
    match ObjectTree::load_json(WORLD, &SharedInterner::new()) {
        Ok(tree) => tree,
        Err(error) => panic!("load failed: {error}"),
    }
}

fn path(s: &str) -> TypePath {
    match TypePath::new(s) {
        Some(path) => path,
        None => panic!("bad path in test: {s}"),
    }
}

fn name(rt: &Runtime, s: &str) -> Name {
    rt.interner().intern(s)
}

fn spawn(rt: &Runtime, type_path: &str) -> ObjectRef {
    match rt.create_object(&path(type_path), &ProcArgs::none()) {
        Ok(obj) => obj,
        Err(error) => panic!("create failed: {error}"),
    }
}

#[test]
fn fresh_defaults_are_materialized_per_instance() {
    let rt = Runtime::new(load_world());
    let a = spawn(&rt, "/mob");
    let b = spawn(&rt, "/mob");

    let inventory = name(&rt, "inventory");
    let (list_a, list_b) = match (a.try_get_var(inventory), b.try_get_var(inventory)) {
        (Some(Value::List(la)), Some(Value::List(lb))) => (la, lb),
        other => panic!("inventory should be lists, got {other:?}"),
    };
    assert!(!list_a.ptr_eq(&list_b));
    assert_eq!(list_a.borrow().len(), 2);
    assert_eq!(list_a.borrow().get(0), Some(&Value::text("loot")));
    assert_eq!(
        list_a.borrow().get_assoc(&Value::text("gold")),
        Some(&Value::number(10.0))
    );

    let stats = name(&rt, "stats");
    let (stat_a, stat_b) = match (a.try_get_var(stats), b.try_get_var(stats)) {
        (Some(Value::Object(oa)), Some(Value::Object(ob))) => (oa, ob),
        other => panic!("stats should be objects, got {other:?}"),
    };
    assert!(!stat_a.ptr_eq(&stat_b));
    assert!(stat_a.is_subtype_of(&path("/datum/stat")));
    assert_eq!(stat_a.try_get_var(name(&rt, "power")), Some(Value::number(3.0)));
}

struct MaterializedCheck {
    inventory: Name,
    stats: Name,
    saw_both: Cell<bool>,
}

impl HookSet for MaterializedCheck {
    fn on_created(&self, obj: &ObjectRef, _args: &ProcArgs) {
        let list = matches!(obj.try_get_var(self.inventory), Some(Value::List(_)));
        let stat = matches!(obj.try_get_var(self.stats), Some(Value::Object(_)));
        self.saw_both.set(list && stat);
    }
}

#[test]
fn creation_hook_observes_a_fully_materialized_instance() {
    let mut tree = load_world();
    let hooks = Rc::new(MaterializedCheck {
        inventory: tree.interner().intern("inventory"),
        stats: tree.interner().intern("stats"),
        saw_both: Cell::new(false),
    });
    assert!(tree.install_hooks(&path("/mob"), hooks.clone()));
    let rt = Runtime::new(tree);
    let _mob = spawn(&rt, "/mob");
    assert!(hooks.saw_both.get());
}

#[test]
fn unknown_type_does_not_instantiate() {
    let rt = Runtime::new(load_world());
    assert!(matches!(
        rt.create_object(&path("/no/such"), &ProcArgs::none()),
        Err(RuntimeError::UnknownType(_))
    ));
}

#[test]
fn handles_survive_until_deletion_and_no_further() {
    let rt = Runtime::new(load_world());
    let mob = spawn(&rt, "/mob");
    let handle = rt.acquire_handle(&mob);
    assert_eq!(rt.acquire_handle(&mob), handle);
    match rt.resolve_handle(handle) {
        Ok(resolved) => assert!(resolved.ptr_eq(&mob)),
        Err(error) => panic!("resolve failed: {error}"),
    }

    rt.delete(&mob);
    assert!(matches!(
        rt.resolve_handle(handle),
        Err(RuntimeError::HandleNotFound(_))
    ));

    // A fresh instance never inherits the dead handle
    let other = spawn(&rt, "/mob");
    assert!(rt.acquire_handle(&other) != handle);
}

#[test]
fn globals_start_at_declared_values() {
    let rt = Runtime::new(load_world());
    let score = name(&rt, "score");
    assert!(rt.has_global(score));
    assert_eq!(rt.global(score), Some(Value::number(0.0)));
    assert!(rt.set_global(score, Value::number(5.0)).is_ok());
    assert_eq!(rt.global(score), Some(Value::number(5.0)));

    let absent = name(&rt, "absent");
    assert!(matches!(
        rt.set_global(absent, Value::Null),
        Err(RuntimeError::UnknownValue(_))
    ));
}

#[test]
fn global_procs_dispatch_to_bound_natives() {
    let mut tree = load_world();
    tree.register_global_native(NativeProcDesc::sync("roll", Vec::new(), |_| {
        Ok(Value::number(4.0))
    }));
    let rt = Runtime::new(tree);
    let result = rt.call_global_proc(name(&rt, "roll"), &ProcArgs::none(), None);
    assert_eq!(result.ok(), Some(Value::number(4.0)));

    assert!(matches!(
        rt.call_global_proc(name(&rt, "absent"), &ProcArgs::none(), None),
        Err(RuntimeError::UnknownProc(_))
    ));
}

#[test]
fn unbound_native_fails_at_invocation() {
    let rt = Runtime::new(load_world());
    assert!(matches!(
        rt.call_global_proc(name(&rt, "roll"), &ProcArgs::none(), None),
        Err(RuntimeError::ProcRuntime(_))
    ));
}

struct NeverSpawns;

impl AsyncNativeSpawn for NeverSpawns {
    fn spawn(&self, _call: &NativeCall<'_>) -> Result<u64, RuntimeError> {
        Ok(0)
    }
}

#[test]
fn async_natives_require_the_interpreter() {
    let mut tree = load_world();
    tree.register_global_native(NativeProcDesc::asynchronous(
        "roll",
        Vec::new(),
        Rc::new(NeverSpawns),
    ));
    let rt = Runtime::new(tree);
    assert!(matches!(
        rt.call_global_proc(name(&rt, "roll"), &ProcArgs::none(), None),
        Err(RuntimeError::ProcRuntime(_))
    ));
}

/// Reports whether the scope it was handed carried a bound instance.
struct SrcProbe;

impl ProcExecutor for SrcProbe {
    fn execute(
        &self,
        _rt: &Runtime,
        _proc_id: ProcId,
        scope: &ScopeRef,
        _args: &ProcArgs,
    ) -> Result<Value, RuntimeError> {
        Ok(match scope.src() {
            Some(_) => Value::number(1.0),
            None => Value::number(99.0),
        })
    }
}

#[test]
fn compiled_procs_run_through_the_installed_executor() {
    let rt = RuntimeBuilder::new(load_world())
        .with_executor(Rc::new(SrcProbe))
        .build();
    // The global init proc runs unbound
    assert_eq!(rt.run_global_init().ok(), Some(Value::number(99.0)));

    let mob = spawn(&rt, "/mob");
    let result = rt.invoke(ProcId::new(1), Some(&mob), None, &ProcArgs::none(), None);
    assert_eq!(result.ok(), Some(Value::number(1.0)));
}

#[test]
fn compiled_procs_without_an_executor_fail_cleanly() {
    let rt = Runtime::new(load_world());
    assert!(matches!(
        rt.run_global_init(),
        Err(RuntimeError::ProcRuntime(_))
    ));
}

#[test]
fn worlds_without_an_init_proc_boot_to_null() {
    let json = r#"{"types": [{"path": "/"}]}"#;
    let tree = match ObjectTree::load_json(json, &SharedInterner::new()) {
        Ok(tree) => tree,
        Err(error) => panic!("load failed: {error}"),
    };
    let rt = Runtime::new(tree);
    assert_eq!(rt.run_global_init().ok(), Some(Value::Null));
}
