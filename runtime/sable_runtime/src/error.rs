//! Runtime error taxonomy.
//!
//! Two families with different propagation rules:
//! - [`LoadError`] is fatal: a manifest with any dangling cross-reference
//!   aborts startup before a tree exists.
//! - [`RuntimeError`] is recoverable by enclosing logic; the proc-call
//!   boundary converts it into a diagnostic record and a `Null` result.

use thiserror::Error;

/// Fatal error while building the object tree from a compiled manifest.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("manifest parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("manifest declares no types")]
    NoTypes,

    #[error("type {index} ({path}): parent reference {parent} out of range")]
    DanglingParentRef {
        index: usize,
        path: String,
        parent: u32,
    },

    #[error("type {path}: parent chain contains a cycle")]
    ParentCycle { path: String },

    #[error("manifest has no root type and type {path} has no parent")]
    MissingRoot { path: String },

    #[error("duplicate type path {path}")]
    DuplicateTypePath { path: String },

    #[error("{context}: proc reference {id} out of range")]
    DanglingProcRef { context: String, id: u32 },

    #[error("{context}: string reference {id} out of range")]
    DanglingStringRef { context: String, id: u32 },

    #[error("{context}: resource reference {id} out of range")]
    DanglingResourceRef { context: String, id: u32 },

    #[error("type {path}: fresh-variable recipe for '{var}' names unknown type {target}")]
    UnknownRecipeType {
        path: String,
        var: String,
        target: String,
    },

    #[error("global proc '{name}' declared more than once")]
    DuplicateGlobalProc { name: String },
}

/// Recoverable failure raised during proc execution or name resolution.
///
/// All variants carry resolved strings rather than interned names so the
/// message is meaningful without an interner in hand.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("variable '{0}' doesn't exist")]
    UnknownVariable(String),

    #[error("proc '{0}' doesn't exist")]
    UnknownProc(String),

    #[error("value '{0}' doesn't exist")]
    UnknownValue(String),

    #[error("type {0} doesn't exist")]
    UnknownType(String),

    #[error("no instance registered for handle {0}")]
    HandleNotFound(u32),

    /// Failure raised by a proc body, native handler, or the external
    /// interpreter.
    #[error("{0}")]
    ProcRuntime(String),
}

impl RuntimeError {
    /// Failure from a proc body or handler, with a free-form message.
    pub fn proc_runtime(message: impl Into<String>) -> Self {
        RuntimeError::ProcRuntime(message.into())
    }
}
