//! Native proc handlers and the native-proc registry.
//!
//! Native procs are host-implemented. A handler supplies declared metadata
//! (name, parameter names, default argument values) and an invocable body;
//! the object tree binds it to a pre-declared proc slot by name match only,
//! and unmatched handlers are inert. The standalone [`NativeRegistry`] is
//! the compiler-side registry the constant folder resolves against.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::error::RuntimeError;
use crate::instance::ObjectRef;
use crate::proc::ProcArgs;
use crate::tree::ObjectTree;
use crate::value::Value;

/// Invocation context handed to a synchronous native handler.
///
/// At runtime every field is populated; at fold time `src`, `usr`, and
/// `tree` are `None`, and a handler that needs them must return an error
/// rather than panic.
pub struct NativeCall<'a> {
    /// The bound instance, if the proc was called on one.
    pub src: Option<&'a ObjectRef>,
    /// The acting actor.
    pub usr: Option<&'a ObjectRef>,
    /// Declared parameters resolved against the call site, defaults applied.
    pub args: &'a [Value],
    /// The raw call-site arguments, for variadic handlers.
    pub raw: &'a ProcArgs,
    /// The loaded object tree, absent in the fold-time stub context.
    pub tree: Option<&'a ObjectTree>,
}

impl NativeCall<'_> {
    /// Argument at a declared-parameter position, `Null` past the end.
    pub fn arg(&self, index: usize) -> Value {
        self.args.get(index).cloned().unwrap_or(Value::Null)
    }

    /// The object tree, or a clean failure for handlers that need live
    /// world state but were invoked from the fold-time stub context.
    pub fn require_tree(&self) -> Result<&ObjectTree, RuntimeError> {
        self.tree
            .ok_or_else(|| RuntimeError::proc_runtime("native proc requires a loaded world"))
    }
}

/// Body of a synchronous native proc.
pub type NativeFn = fn(&NativeCall<'_>) -> Result<Value, RuntimeError>;

/// A registered native handler.
///
/// Asynchronous handlers are a registration point only: the external
/// interpreter drives their suspension. This core never invokes one
/// synchronously, and the constant folder treats reaching one as a fatal
/// configuration error.
#[derive(Clone)]
pub enum NativeHandler {
    Sync(NativeFn),
    Async(Rc<dyn AsyncNativeSpawn>),
}

impl NativeHandler {
    /// True for handlers that may suspend.
    pub fn is_async(&self) -> bool {
        matches!(self, NativeHandler::Async(_))
    }
}

/// Spawn half of an asynchronous native proc.
///
/// The runtime only records the registration; scheduling and resumption
/// belong to the external interpreter.
pub trait AsyncNativeSpawn {
    /// Begin the operation, returning a token the interpreter resumes on.
    fn spawn(&self, call: &NativeCall<'_>) -> Result<u64, RuntimeError>;
}

/// Default literal for a native proc parameter.
///
/// Self-contained (no string-table indices) so a registry can exist without
/// a loaded manifest, which is exactly the constant folder's situation.
#[derive(Clone, Debug, PartialEq)]
pub enum DefaultArg {
    Null,
    Number(f64),
    Text(String),
}

impl DefaultArg {
    /// Lift to a runtime value.
    pub fn to_value(&self) -> Value {
        match self {
            DefaultArg::Null => Value::Null,
            DefaultArg::Number(n) => Value::Number(*n),
            DefaultArg::Text(s) => Value::text(s.as_str()),
        }
    }
}

/// A native proc parameter declaration.
#[derive(Clone, Debug)]
pub struct NativeParam {
    pub name: String,
    pub default: DefaultArg,
}

impl NativeParam {
    /// Parameter with a null default.
    pub fn required(name: impl Into<String>) -> Self {
        NativeParam {
            name: name.into(),
            default: DefaultArg::Null,
        }
    }

    /// Parameter with an explicit default.
    pub fn with_default(name: impl Into<String>, default: DefaultArg) -> Self {
        NativeParam {
            name: name.into(),
            default,
        }
    }
}

/// Declared metadata plus invocable body for one native proc.
#[derive(Clone)]
pub struct NativeProcDesc {
    pub name: String,
    pub params: Vec<NativeParam>,
    pub handler: NativeHandler,
}

impl NativeProcDesc {
    /// Describe a synchronous native proc.
    pub fn sync(name: impl Into<String>, params: Vec<NativeParam>, body: NativeFn) -> Self {
        NativeProcDesc {
            name: name.into(),
            params,
            handler: NativeHandler::Sync(body),
        }
    }

    /// Describe an asynchronous native proc.
    pub fn asynchronous(
        name: impl Into<String>,
        params: Vec<NativeParam>,
        spawn: Rc<dyn AsyncNativeSpawn>,
    ) -> Self {
        NativeProcDesc {
            name: name.into(),
            params,
            handler: NativeHandler::Async(spawn),
        }
    }
}

/// Standalone registry of native procs, keyed by name.
///
/// The object tree consumes descriptors directly at registration; this
/// registry exists for contexts with no tree at all - the compiler's
/// constant folder resolves candidate calls against it.
#[derive(Default)]
pub struct NativeRegistry {
    entries: FxHashMap<String, NativeProcDesc>,
}

impl NativeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        NativeRegistry::default()
    }

    /// Register a native proc. A later registration under the same name
    /// replaces the earlier one.
    pub fn register(&mut self, desc: NativeProcDesc) {
        self.entries.insert(desc.name.clone(), desc);
    }

    /// Look up a native proc by name.
    pub fn lookup(&self, name: &str) -> Option<&NativeProcDesc> {
        self.entries.get(name)
    }

    /// Number of registered procs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
