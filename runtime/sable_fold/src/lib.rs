//! Compile-time constant folding over native procs.
//!
//! The compiler calls [`Folder::try_fold`] for every proc call whose
//! arguments are all compile-time constants. The fold runs the registered
//! synchronous handler in a stub context with no world: no bound instance,
//! no actor, no object tree. Handlers that need any of those return an
//! error, which the folder treats as "not foldable" rather than a failure,
//! so the call is simply left for runtime.
//!
//! The single hard error is reaching an asynchronous native: a suspending
//! proc in a constant position means the registry handed the compiler a
//! handler set it was never meant to see.

mod fold;

pub use fold::{CandidateArg, Const, FoldError, Folder, NativeLookup};
