use pretty_assertions::assert_eq;
use sable_ir::SharedInterner;

use crate::proc::{ParamSpec, Proc, ProcArgs, ProcKind};
use crate::value::Value;

fn two_param_proc(interner: &SharedInterner) -> Proc {
    Proc {
        name: interner.intern("attack"),
        params: vec![
            ParamSpec {
                name: interner.intern("target"),
                default: Value::Null,
            },
            ParamSpec {
                name: interner.intern("power"),
                default: Value::number(5.0),
            },
        ],
        kind: ProcKind::Native(None),
    }
}

#[test]
fn named_argument_wins_over_positional() {
    let interner = SharedInterner::new();
    let power = interner.intern("power");
    let args = ProcArgs::positional([Value::number(1.0), Value::number(2.0)])
        .with_named(power, Value::number(9.0));
    assert_eq!(args.arg(1, power), Some(&Value::number(9.0)));
    assert_eq!(args.arg(0, interner.intern("target")), Some(&Value::number(1.0)));
}

#[test]
fn arg_misses_past_the_end() {
    let interner = SharedInterner::new();
    let args = ProcArgs::positional([Value::number(1.0)]);
    assert_eq!(args.arg(3, interner.intern("absent")), None);
}

#[test]
fn bind_args_falls_back_to_declared_defaults() {
    let interner = SharedInterner::new();
    let proc = two_param_proc(&interner);
    let bound = proc.bind_args(&ProcArgs::positional([Value::text("goblin")]));
    assert_eq!(bound, vec![Value::text("goblin"), Value::number(5.0)]);
}

#[test]
fn bind_args_applies_named_overrides() {
    let interner = SharedInterner::new();
    let proc = two_param_proc(&interner);
    let args = ProcArgs::none().with_named(interner.intern("power"), Value::number(12.0));
    let bound = proc.bind_args(&args);
    assert_eq!(bound, vec![Value::Null, Value::number(12.0)]);
}

#[test]
fn is_empty_reflects_both_argument_kinds() {
    let interner = SharedInterner::new();
    assert!(ProcArgs::none().is_empty());
    assert!(!ProcArgs::positional([Value::Null]).is_empty());
    assert!(!ProcArgs::none()
        .with_named(interner.intern("n"), Value::Null)
        .is_empty());
}
