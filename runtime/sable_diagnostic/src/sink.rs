//! Diagnostic sinks.
//!
//! The runtime reports diagnostics through a sink chosen by the host:
//! - Production: [`TracingSink`], forwarding to the `tracing` subscriber
//! - Tests: [`VecSink`], buffering records for assertions

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::{Diagnostic, Severity};

/// Destination for runtime diagnostics.
pub trait DiagnosticSink {
    /// Deliver one diagnostic record.
    fn report(&self, diagnostic: Diagnostic);
}

/// Shared handle to a sink.
///
/// The runtime, every instance call boundary, and tests all hold one of
/// these; the newtype keeps the `Arc<dyn ...>` an implementation detail.
#[derive(Clone)]
pub struct SharedSink(Arc<dyn DiagnosticSink + Send + Sync>);

impl SharedSink {
    /// Wrap a sink for sharing.
    pub fn new(sink: impl DiagnosticSink + Send + Sync + 'static) -> Self {
        SharedSink(Arc::new(sink))
    }

    /// Deliver one diagnostic record.
    pub fn report(&self, diagnostic: Diagnostic) {
        self.0.report(diagnostic);
    }
}

impl Default for SharedSink {
    fn default() -> Self {
        SharedSink::new(TracingSink)
    }
}

/// Sink that forwards diagnostics to the `tracing` subscriber.
#[derive(Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => error!(target: "sable::diagnostic", "{diagnostic}"),
            Severity::Warning => warn!(target: "sable::diagnostic", "{diagnostic}"),
            Severity::Note => info!(target: "sable::diagnostic", "{diagnostic}"),
        }
    }
}

/// Sink that buffers diagnostics for later inspection.
#[derive(Default)]
pub struct VecSink {
    records: Mutex<Vec<Diagnostic>>,
}

impl VecSink {
    /// Create an empty buffering sink.
    pub fn new() -> Self {
        VecSink {
            records: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of all buffered records.
    pub fn records(&self) -> Vec<Diagnostic> {
        self.records.lock().clone()
    }

    /// Drain all buffered records.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.records.lock())
    }

    /// Number of buffered records.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// True if nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl DiagnosticSink for VecSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.records.lock().push(diagnostic);
    }
}

/// A `VecSink` behind a `SharedSink`, with the buffer still reachable.
///
/// `SharedSink::new` consumes the sink, so tests that need to both hand the
/// sink to a runtime and read it back use this pair constructor.
pub fn buffer_sink() -> (SharedSink, Arc<VecSink>) {
    let sink = Arc::new(VecSink::new());
    (SharedSink(sink.clone()), sink)
}
