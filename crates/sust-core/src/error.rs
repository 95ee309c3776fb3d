//! Sust Error Types
//!
//! Defines every error condition the engine can surface. Operations produce an
//! [`ErrorKind`]; the dispatcher pins it to the failing command as a
//! [`ScriptError`].

use std::io;

use thiserror::Error;

use crate::capability::Capability;
use crate::command::Command;

/// Error conditions, independent of where they happened
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    // Variable store
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("cannot convert {from} to {to}")]
    Conversion { from: String, to: String },

    // Containers
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },
    #[error("key `{0}` not found")]
    KeyNotFound(String),
    #[error("invalid range [{start}, {end}] for length {len}")]
    InvalidRange { start: i64, end: i64, len: usize },
    #[error("optional is empty")]
    EmptyOptional,
    #[error("integer overflow")]
    IntegerOverflow,

    // Functions
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
    #[error("argument mismatch calling `{function}`: {reason}")]
    ArgumentMismatch { function: String, reason: String },
    #[error("function `{0}` is already defined")]
    DuplicateFunction(String),
    #[error("function `{0}` defined inside another function")]
    NestedFunction(String),
    #[error("function `{0}` has no FUNC_END")]
    UnterminatedFunction(String),
    #[error("FUNC_END outside of a function")]
    UnexpectedFunctionEnd,
    #[error("call depth limit {0} exceeded")]
    CallDepthExceeded(usize),

    // Program text
    #[error("unknown opcode `{0}`")]
    UnknownOpcode(String),
    #[error("unknown type `{0}`")]
    UnknownType(String),
    #[error("expected {expected} arguments, found {found}")]
    MissingArgument { expected: String, found: usize },

    // Streams & host
    #[error("end of stream: expected {expected} bytes, got {got}")]
    EndOfStream { expected: usize, got: usize },
    #[error("stream unavailable: {0}")]
    StreamUnavailable(String),
    #[error("capability {0} not granted")]
    CapabilityDenied(Capability),
    #[error("io error: {0}")]
    Io(String),
}

impl ErrorKind {
    pub(crate) fn mismatch(expected: impl ToString, found: impl ToString) -> Self {
        ErrorKind::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub(crate) fn conversion(from: impl ToString, to: impl ToString) -> Self {
        ErrorKind::Conversion {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub(crate) fn arguments(function: &str, reason: impl Into<String>) -> Self {
        ErrorKind::ArgumentMismatch {
            function: function.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<io::Error> for ErrorKind {
    fn from(err: io::Error) -> Self {
        ErrorKind::Io(err.to_string())
    }
}

/// An error pinned to the command that raised it
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {opcode}: {kind}")]
pub struct ScriptError {
    pub line: usize,
    pub opcode: String,
    /// Function whose body contained the command, `None` at top level
    pub function: Option<String>,
    #[source]
    pub kind: ErrorKind,
}

impl ScriptError {
    pub fn new(line: usize, opcode: impl Into<String>, kind: ErrorKind) -> Self {
        ScriptError {
            line,
            opcode: opcode.into(),
            function: None,
            kind,
        }
    }

    pub fn at(command: &Command, kind: ErrorKind) -> Self {
        Self::new(command.line, command.opcode.name(), kind)
    }

    pub(crate) fn in_function(mut self, name: &str) -> Self {
        if self.function.is_none() {
            self.function = Some(name.to_string());
        }
        self
    }
}

pub type Result<T> = std::result::Result<T, ErrorKind>;
pub type ScriptResult<T> = std::result::Result<T, ScriptError>;
