//! Core object runtime for Sable worlds.
//!
//! Loads the compiled manifest into an [`ObjectTree`] of merged type
//! definitions, instantiates [`ObjectInstance`]s with sparse per-instance
//! variable storage, issues stable wire handles through the
//! [`ReferenceRegistry`], and dispatches procs, native or compiled,
//! through a [`Runtime`] session. Compiled proc bodies are executed by an
//! external interpreter plugged in via [`ProcExecutor`]; this crate owns
//! everything around that boundary.
//!
//! The runtime is single threaded. Instances and lists are reference
//! counted with interior mutability, and one `Runtime` value is the sole
//! mutation authority for registry state and globals.

mod definition;
mod error;
mod hooks;
mod instance;
mod list;
mod local;
mod natives;
mod proc;
mod registry;
mod runtime;
mod scope;
mod tree;
mod value;

pub use definition::{FreshListRecipe, FreshObjectRecipe, ObjectDefinition};
pub use error::{LoadError, RuntimeError};
pub use hooks::{HookSet, NoHooks};
pub use instance::{ObjectInstance, ObjectRef};
pub use list::{List, ListRef};
pub use local::Local;
pub use natives::{
    AsyncNativeSpawn, DefaultArg, NativeCall, NativeFn, NativeHandler, NativeParam,
    NativeProcDesc, NativeRegistry,
};
pub use proc::{ParamSpec, Proc, ProcArgs, ProcExecutor, ProcKind};
pub use registry::{Handle, ReferenceRegistry};
pub use runtime::{Runtime, RuntimeBuilder};
pub use scope::{ProcScope, ScopeRef};
pub use tree::{ObjectTree, TreeEntry};
pub use value::Value;
