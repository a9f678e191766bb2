//! Diagnostic record types.

use std::fmt;

use sable_ir::TypePath;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// What category of failure a diagnostic reports.
///
/// Mirrors the recoverable half of the runtime error taxonomy; load failures
/// are fatal and never reach a sink.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DiagnosticKind {
    /// A name did not resolve to a variable.
    UnknownVariable,
    /// A name did not resolve to a proc.
    UnknownProc,
    /// A name did not resolve to any value in the scope chain.
    UnknownValue,
    /// A proc body (native or compiled) raised a failure.
    ProcRuntime,
    /// A reference handle did not resolve to a live instance.
    HandleNotFound,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::UnknownVariable => write!(f, "unknown variable"),
            DiagnosticKind::UnknownProc => write!(f, "unknown proc"),
            DiagnosticKind::UnknownValue => write!(f, "unknown value"),
            DiagnosticKind::ProcRuntime => write!(f, "proc runtime failure"),
            DiagnosticKind::HandleNotFound => write!(f, "handle not found"),
        }
    }
}

/// A structured diagnostic record.
///
/// Produced at the proc-call boundary when a failure is converted into the
/// logged/Null-returning contract, carrying enough context to identify the
/// originating proc and type without parsing message text.
#[derive(Clone, PartialEq, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    /// Name of the proc that was executing, if any.
    pub proc_name: Option<String>,
    /// Type of the bound instance, if any.
    pub type_path: Option<TypePath>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            kind,
            message: message.into(),
            proc_name: None,
            type_path: None,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            kind,
            message: message.into(),
            proc_name: None,
            type_path: None,
        }
    }

    /// Attach the originating proc name.
    #[must_use]
    pub fn with_proc(mut self, proc_name: impl Into<String>) -> Self {
        self.proc_name = Some(proc_name.into());
        self
    }

    /// Attach the originating type path.
    #[must_use]
    pub fn with_type(mut self, type_path: TypePath) -> Self {
        self.type_path = Some(type_path);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.kind, self.message)?;
        if let Some(proc_name) = &self.proc_name {
            write!(f, " (in proc '{proc_name}'")?;
            if let Some(path) = &self.type_path {
                write!(f, " on {path}")?;
            }
            write!(f, ")")?;
        } else if let Some(path) = &self.type_path {
            write!(f, " (on {path})")?;
        }
        Ok(())
    }
}
