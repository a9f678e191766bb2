//! The folder itself.

use thiserror::Error;
use tracing::trace;

use sable_runtime::{NativeCall, NativeHandler, NativeProcDesc, NativeRegistry, ProcArgs, Value};

/// A constant the compiler can embed in the manifest.
#[derive(Clone, Debug, PartialEq)]
pub enum Const {
    Null,
    Number(f64),
    Text(String),
}

impl Const {
    fn to_value(&self) -> Value {
        match self {
            Const::Null => Value::Null,
            Const::Number(n) => Value::number(*n),
            Const::Text(s) => Value::text(s.as_str()),
        }
    }
}

/// One argument of a candidate call.
///
/// A single `Dynamic` argument disqualifies the whole call.
#[derive(Clone, Debug, PartialEq)]
pub enum CandidateArg {
    Const(Const),
    Dynamic,
}

/// Fatal folding error.
#[derive(Debug, Error)]
pub enum FoldError {
    /// An asynchronous native reached a constant position. The fold
    /// context cannot suspend, so this is a registry configuration error,
    /// not a property of the call site.
    #[error("async native proc '{name}' cannot be constant folded")]
    AsyncNative { name: String },
}

/// Name resolution the folder needs, and nothing else.
///
/// Implemented by [`NativeRegistry`]; tests substitute their own.
pub trait NativeLookup {
    fn native(&self, name: &str) -> Option<&NativeProcDesc>;
}

impl NativeLookup for NativeRegistry {
    fn native(&self, name: &str) -> Option<&NativeProcDesc> {
        self.lookup(name)
    }
}

/// Constant folder over a native-proc registry.
pub struct Folder<'r, L: NativeLookup> {
    registry: &'r L,
}

impl<'r, L: NativeLookup> Folder<'r, L> {
    /// Fold against a registry.
    pub fn new(registry: &'r L) -> Self {
        Folder { registry }
    }

    /// Attempt to evaluate a call at compile time.
    ///
    /// `Ok(None)` means "leave it for runtime": the name is unregistered,
    /// an argument is dynamic, the handler failed in the stub context, or
    /// the result is not representable as a manifest constant.
    pub fn try_fold(
        &self,
        name: &str,
        args: &[CandidateArg],
    ) -> Result<Option<Const>, FoldError> {
        let Some(desc) = self.registry.native(name) else {
            return Ok(None);
        };

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                CandidateArg::Const(c) => values.push(c.to_value()),
                CandidateArg::Dynamic => return Ok(None),
            }
        }

        let handler = match &desc.handler {
            NativeHandler::Sync(handler) => *handler,
            NativeHandler::Async(_) => {
                return Err(FoldError::AsyncNative {
                    name: name.to_string(),
                })
            }
        };

        // Declared defaults fill in omitted trailing arguments
        let bound: Vec<Value> = desc
            .params
            .iter()
            .enumerate()
            .map(|(i, param)| match values.get(i) {
                Some(value) => value.clone(),
                None => param.default.to_value(),
            })
            .collect();

        let raw = ProcArgs::positional(values);
        let call = NativeCall {
            src: None,
            usr: None,
            args: &bound,
            raw: &raw,
            tree: None,
        };
        let result = match handler(&call) {
            Ok(value) => value,
            Err(error) => {
                trace!(name, %error, "native handler failed in fold context");
                return Ok(None);
            }
        };

        Ok(match result {
            Value::Number(n) => Some(Const::Number(n)),
            Value::Text(s) => Some(Const::Text(s.to_string())),
            _ => None,
        })
    }
}
