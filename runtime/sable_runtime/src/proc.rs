//! Procs and call arguments.

use rustc_hash::FxHashMap;
use sable_ir::{Name, ProcId};
use smallvec::SmallVec;

use crate::error::RuntimeError;
use crate::natives::NativeHandler;
use crate::runtime::Runtime;
use crate::scope::ScopeRef;
use crate::value::Value;

/// Arguments to a proc call: ordered values plus named overrides.
#[derive(Clone, Debug, Default)]
pub struct ProcArgs {
    ordered: SmallVec<[Value; 4]>,
    named: FxHashMap<Name, Value>,
}

impl ProcArgs {
    /// No arguments.
    pub fn none() -> Self {
        ProcArgs::default()
    }

    /// Positional arguments only.
    pub fn positional(values: impl IntoIterator<Item = Value>) -> Self {
        ProcArgs {
            ordered: values.into_iter().collect(),
            named: FxHashMap::default(),
        }
    }

    /// Append a positional argument.
    pub fn push(&mut self, value: Value) {
        self.ordered.push(value);
    }

    /// Set a named argument, replacing any previous value for that name.
    pub fn set_named(&mut self, name: Name, value: Value) {
        self.named.insert(name, value);
    }

    /// Builder-style named argument.
    #[must_use]
    pub fn with_named(mut self, name: Name, value: Value) -> Self {
        self.set_named(name, value);
        self
    }

    /// The ordered arguments.
    pub fn ordered(&self) -> &[Value] {
        &self.ordered
    }

    /// Number of ordered arguments.
    pub fn ordered_len(&self) -> usize {
        self.ordered.len()
    }

    /// True if no arguments were supplied at all.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty() && self.named.is_empty()
    }

    /// Look up the argument for a declared parameter.
    ///
    /// A named argument wins over the positional one at the parameter's
    /// index; absence of both yields `None` (the caller falls back to the
    /// declared default).
    pub fn arg(&self, index: usize, name: Name) -> Option<&Value> {
        self.named.get(&name).or_else(|| self.ordered.get(index))
    }
}

/// A declared parameter with its default literal value.
#[derive(Clone, Debug)]
pub struct ParamSpec {
    pub name: Name,
    pub default: Value,
}

/// How a proc executes.
#[derive(Clone)]
pub enum ProcKind {
    /// Declared native in the manifest. The handler is bound at
    /// registration time; a declared-but-unbound native proc fails at
    /// invocation, not at load.
    Native(Option<NativeHandler>),
    /// Compiled body, executed by the external interpreter.
    Compiled { body: Option<u32> },
}

/// A callable unit of behavior bound to a type or the global scope.
#[derive(Clone)]
pub struct Proc {
    pub name: Name,
    pub params: Vec<ParamSpec>,
    pub kind: ProcKind,
}

impl Proc {
    /// True for procs declared native (bound or not).
    pub fn is_native(&self) -> bool {
        matches!(self.kind, ProcKind::Native(_))
    }

    /// Resolve every declared parameter against the call-site arguments,
    /// falling back to declared defaults for omitted parameters.
    pub fn bind_args(&self, args: &ProcArgs) -> Vec<Value> {
        self.params
            .iter()
            .enumerate()
            .map(|(i, param)| {
                args.arg(i, param.name)
                    .cloned()
                    .unwrap_or_else(|| param.default.clone())
            })
            .collect()
    }
}

/// Boundary to the external interpreter that runs compiled proc bodies.
///
/// The runtime hands over the proc id, the invocation's root scope (with
/// the instance, usr, and super-proc pointer already bound), and the raw
/// call arguments; it receives back a value or a propagated failure, which
/// the proc-call boundary then converts per its never-throw contract.
pub trait ProcExecutor {
    fn execute(
        &self,
        rt: &Runtime,
        proc_id: ProcId,
        scope: &ScopeRef,
        args: &ProcArgs,
    ) -> Result<Value, RuntimeError>;
}

#[cfg(test)]
mod tests;
