//! Structured diagnostics for the Sable runtime.
//!
//! The proc-call boundary never propagates failures to its caller; instead
//! every failure becomes a [`Diagnostic`] record delivered to a
//! [`DiagnosticSink`]. Hosts choose where records go: a buffer in tests, the
//! `tracing` subscriber in production.

mod diagnostic;
mod sink;

pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use sink::{buffer_sink, DiagnosticSink, SharedSink, TracingSink, VecSink};
