//! Policy errors

use std::fmt;

use thiserror::Error;

/// Policy result
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Diagnostic detail captured from a script fault
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScriptFault {
    /// Exception kind, e.g. `RuntimeError`
    pub kind: String,
    /// Exception message
    pub message: String,
    /// Trace lines, innermost call last
    pub trace: Vec<String>,
}

impl ScriptFault {
    pub fn new(
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            trace: Vec::new(),
        }
    }

    /// Trace rendered one frame per line
    pub fn trace_text(&self) -> String {
        self.trace.join("\n")
    }
}

impl fmt::Display for ScriptFault {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Errors that abort a whole hook invocation
///
/// The host only ever sees a binary outcome; these exist for logging and
/// for tests.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Failed to load \"{module}\": {fault}")]
    ScriptLoad { module: String, fault: ScriptFault },

    #[error("Entry function \"{entry}\" not found or not callable in \"{module}\"")]
    EntryResolution { module: String, entry: String },

    #[error("Call failed: {fault}")]
    Invocation { fault: ScriptFault },

    #[error("non-zero return: {status}")]
    Rejection { status: i64 },
}

impl PolicyError {
    /// Script fault carried by this error, if any
    pub fn fault(&self) -> Option<&ScriptFault> {
        match self {
            PolicyError::ScriptLoad { fault, .. } | PolicyError::Invocation { fault } => {
                Some(fault)
            }
            _ => None,
        }
    }
}

/// A single field could not be converted
///
/// Always recovered locally: the field is logged and skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not convert job description entry {field}: {reason}")]
pub struct FieldConversionError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldConversionError {
    pub fn new(
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}
