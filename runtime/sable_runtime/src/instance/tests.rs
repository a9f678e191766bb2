use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use sable_diagnostic::{buffer_sink, DiagnosticKind, VecSink};
use sable_ir::{Name, SharedInterner, TypePath};

use crate::error::RuntimeError;
use crate::hooks::HookSet;
use crate::instance::ObjectRef;
use crate::natives::{DefaultArg, NativeCall, NativeParam, NativeProcDesc};
use crate::proc::ProcArgs;
use crate::runtime::{Runtime, RuntimeBuilder};
use crate::tree::ObjectTree;
use crate::value::Value;

const WORLD: &str = r#"{
    "strings": ["Unnamed"],
    "types": [
        {"path": "/"},
        {
            "path": "/mob",
            "parent": 0,
            "variables": [
                {"name": "health", "value": {"kind": "number", "value": 100.0}},
                {"name": "name", "value": {"kind": "text", "value": 0}}
            ],
            "procs": [{"name": "attack", "ids": [0]}]
        },
        {
            "path": "/mob/fighter",
            "parent": 1,
            "variables": [{"name": "health", "value": {"kind": "number", "value": 150.0}}],
            "procs": [{"name": "attack", "ids": [1]}]
        }
    ],
    "procs": [
        {"name": "attack", "native": true},
        {"name": "attack", "native": true}
    ]
}"#;

fn base_attack(_call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    Ok(Value::number(1.0))
}

/// Returns src health plus the power argument.
fn fighter_attack(call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    let tree = call.require_tree()?;
    let src = call
        .src
        .ok_or_else(|| RuntimeError::proc_runtime("attack needs a bound instance"))?;
    let health = src.get_var(tree.interner().intern("health"))?;
    let power = call.arg(0).as_number().unwrap_or(0.0);
    Ok(Value::number(health.as_number().unwrap_or(0.0) + power))
}

fn path(s: &str) -> TypePath {
    match TypePath::new(s) {
        Some(path) => path,
        None => panic!("bad path in test: {s}"),
    }
}

fn load_world() -> ObjectTree {
    let mut tree = match ObjectTree::load_json(WORLD, &SharedInterner::new()) {
        Ok(tree) => tree,
        Err(error) => panic!("load failed: {error}"),
    };
    tree.register_native(
        &path("/mob"),
        NativeProcDesc::sync("attack", Vec::new(), base_attack),
    );
    tree.register_native(
        &path("/mob/fighter"),
        NativeProcDesc::sync(
            "attack",
            vec![NativeParam::with_default("power", DefaultArg::Number(5.0))],
            fighter_attack,
        ),
    );
    tree
}

fn world() -> (Runtime, Arc<VecSink>) {
    let (sink, records) = buffer_sink();
    let rt = RuntimeBuilder::new(load_world()).with_sink(sink).build();
    (rt, records)
}

fn spawn(rt: &Runtime, type_path: &str) -> ObjectRef {
    match rt.create_object(&path(type_path), &ProcArgs::none()) {
        Ok(obj) => obj,
        Err(error) => panic!("create failed: {error}"),
    }
}

fn name(rt: &Runtime, s: &str) -> Name {
    rt.interner().intern(s)
}

#[test]
fn variables_read_defaults_until_written() {
    let (rt, _) = world();
    let mob = spawn(&rt, "/mob");
    let health = name(&rt, "health");
    assert_eq!(mob.get_var(health).ok(), Some(Value::number(100.0)));
    assert_eq!(mob.get_var(name(&rt, "name")).ok(), Some(Value::text("Unnamed")));
}

#[test]
fn set_var_overrides_are_per_instance() {
    let (rt, _) = world();
    let a = spawn(&rt, "/mob");
    let b = spawn(&rt, "/mob");
    let health = name(&rt, "health");
    assert!(a.set_var(health, Value::number(20.0)).is_ok());
    assert_eq!(a.try_get_var(health), Some(Value::number(20.0)));
    assert_eq!(b.try_get_var(health), Some(Value::number(100.0)));
}

#[test]
fn undeclared_variable_access_fails() {
    let (rt, _) = world();
    let mob = spawn(&rt, "/mob");
    let mana = name(&rt, "mana");
    assert!(matches!(
        mob.get_var(mana),
        Err(RuntimeError::UnknownVariable(_))
    ));
    assert!(matches!(
        mob.set_var(mana, Value::number(1.0)),
        Err(RuntimeError::UnknownVariable(_))
    ));
    assert_eq!(mob.try_get_var(mana), None);
}

#[test]
fn inherited_declarations_are_visible() {
    let (rt, _) = world();
    let fighter = spawn(&rt, "/mob/fighter");
    assert!(fighter.has_variable(name(&rt, "name")));
    assert!(fighter.has_proc(name(&rt, "attack")));
    assert_eq!(fighter.try_get_var(name(&rt, "name")), Some(Value::text("Unnamed")));
    assert!(fighter.is_subtype_of(&path("/mob")));
    assert!(fighter.is_subtype_of(&path("/")));
    let mob = spawn(&rt, "/mob");
    assert!(!mob.is_subtype_of(&path("/mob/fighter")));
}

#[test]
fn dispatch_picks_most_derived_override() {
    let (rt, _) = world();
    let attack = name(&rt, "attack");
    let mob = spawn(&rt, "/mob");
    let fighter = spawn(&rt, "/mob/fighter");
    assert_eq!(mob.call_proc(attack, &ProcArgs::none(), None, &rt), Value::number(1.0));
    // 150 health + default power 5
    assert_eq!(
        fighter.call_proc(attack, &ProcArgs::none(), None, &rt),
        Value::number(155.0)
    );
    assert_eq!(
        fighter.call_proc(attack, &ProcArgs::positional([Value::number(10.0)]), None, &rt),
        Value::number(160.0)
    );
}

#[test]
fn super_implementation_stays_callable() {
    let (rt, _) = world();
    let attack = name(&rt, "attack");
    let fighter = spawn(&rt, "/mob/fighter");
    let def = fighter.definition();
    let own = match def.proc(attack) {
        Some(id) => id,
        None => panic!("attack missing"),
    };
    let ancestor = match def.super_of(attack, own) {
        Some(id) => id,
        None => panic!("super missing"),
    };
    let result = rt.invoke(ancestor, Some(&fighter), None, &ProcArgs::none(), None);
    assert_eq!(result.unwrap_or(Value::Null), Value::number(1.0));
}

#[test]
fn failed_call_reports_a_diagnostic_and_yields_null() {
    let (rt, records) = world();
    let mob = spawn(&rt, "/mob");
    let result = mob.call_proc(name(&rt, "no_such_proc"), &ProcArgs::none(), None, &rt);
    assert_eq!(result, Value::Null);
    let reported = records.take();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].kind, DiagnosticKind::UnknownProc);
}

#[derive(Default)]
struct CountingHooks {
    created: Cell<u32>,
    deleted: Cell<u32>,
    sets: RefCell<Vec<(Value, Value)>>,
}

impl HookSet for CountingHooks {
    fn on_created(&self, _obj: &ObjectRef, _args: &ProcArgs) {
        self.created.set(self.created.get() + 1);
    }

    fn on_deleted(&self, _obj: &ObjectRef) {
        self.deleted.set(self.deleted.get() + 1);
    }

    fn on_var_get(&self, _obj: &ObjectRef, _name: Name, value: Value) -> Value {
        match value.as_number() {
            Some(n) => Value::number(n * 2.0),
            None => value,
        }
    }

    fn on_var_set(&self, _obj: &ObjectRef, _name: Name, new: &Value, old: &Value) {
        self.sets.borrow_mut().push((new.clone(), old.clone()));
    }
}

fn hooked_world() -> (Runtime, Rc<CountingHooks>) {
    let hooks = Rc::new(CountingHooks::default());
    let mut tree = load_world();
    assert!(tree.install_hooks(&path("/mob"), hooks.clone()));
    (RuntimeBuilder::new(tree).build(), hooks)
}

#[test]
fn get_hook_transforms_reads() {
    let (rt, _) = hooked_world();
    let mob = spawn(&rt, "/mob");
    assert_eq!(mob.try_get_var(name(&rt, "health")), Some(Value::number(200.0)));
}

#[test]
fn set_hook_sees_raw_prior_value() {
    let (rt, hooks) = hooked_world();
    let mob = spawn(&rt, "/mob");
    let health = name(&rt, "health");
    assert!(mob.set_var(health, Value::number(10.0)).is_ok());
    let sets = hooks.sets.borrow();
    // Old value is the raw 100, not the get hook's doubled 200
    assert_eq!(
        sets.as_slice(),
        &[(Value::number(10.0), Value::number(100.0))]
    );
}

#[test]
fn creation_hook_runs_once_per_instance() {
    let (rt, hooks) = hooked_world();
    let _a = spawn(&rt, "/mob");
    let _b = spawn(&rt, "/mob");
    assert_eq!(hooks.created.get(), 2);
}

#[test]
fn delete_is_idempotent() {
    let (rt, hooks) = hooked_world();
    let mob = spawn(&rt, "/mob");
    assert!(!mob.is_deleted());
    mob.delete(&rt);
    mob.delete(&rt);
    mob.delete(&rt);
    assert!(mob.is_deleted());
    assert_eq!(hooks.deleted.get(), 1);
}

#[test]
fn deleted_instances_still_answer_queries() {
    let (rt, _) = world();
    let mob = spawn(&rt, "/mob");
    let health = name(&rt, "health");
    assert!(mob.set_var(health, Value::number(3.0)).is_ok());
    mob.delete(&rt);
    // Live references keep working; only the registry forgets it
    assert_eq!(mob.try_get_var(health), Some(Value::number(3.0)));
}
