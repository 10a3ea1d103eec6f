//! Compile and runtime errors.

use std::fmt;

use crate::value::Arity;

/// Why an expression failed to compile or check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompileErrorKind {
    Syntax {
        message: String,
    },
    UnknownName {
        name: String,
    },
    ArgumentCount {
        name: String,
        expected: Arity,
        got: usize,
    },
    NotCallable {
        name: String,
    },
    Type {
        message: String,
    },
}

impl fmt::Display for CompileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { message } => write!(f, "syntax error: {message}"),
            Self::UnknownName { name } => write!(f, "unknown name `{name}`"),
            Self::ArgumentCount {
                name,
                expected,
                got,
            } => write!(f, "`{name}` expects {expected} arguments, got {got}"),
            Self::NotCallable { name } => write!(f, "`{name}` is not callable"),
            Self::Type { message } => f.write_str(message),
        }
    }
}

/// Compile-time failure, located by byte offset in the expression source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileError {
    pub kind: CompileErrorKind,
    pub offset: u32,
}

impl CompileError {
    pub fn new(kind: CompileErrorKind, offset: u32) -> Self {
        CompileError { kind, offset }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at offset {})", self.kind, self.offset)
    }
}

impl std::error::Error for CompileError {}

/// Why a running expression failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    UnknownName {
        name: String,
    },
    ArgumentCount {
        name: String,
        expected: Arity,
        got: usize,
    },
    NotCallable {
        type_name: &'static str,
    },
    Type {
        message: String,
    },
    DivisionByZero,
    IndexOutOfBounds {
        index: i64,
        len: usize,
    },
    Overflow {
        operation: &'static str,
    },
    /// Raised by an embedder callback. The embedder keeps the details.
    Host {
        message: String,
    },
}

impl fmt::Display for RuntimeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownName { name } => write!(f, "unknown name `{name}`"),
            Self::ArgumentCount {
                name,
                expected,
                got,
            } => write!(f, "`{name}` expects {expected} arguments, got {got}"),
            Self::NotCallable { type_name } => write!(f, "{type_name} is not callable"),
            Self::Type { message } => f.write_str(message),
            Self::DivisionByZero => f.write_str("division by zero"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::Overflow { operation } => write!(f, "integer overflow in {operation}"),
            Self::Host { message } => f.write_str(message),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    /// Byte offset of the failing node, when known.
    pub offset: Option<u32>,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind) -> Self {
        RuntimeError { kind, offset: None }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        RuntimeError::new(RuntimeErrorKind::Type {
            message: message.into(),
        })
    }

    pub fn host(message: impl Into<String>) -> Self {
        RuntimeError::new(RuntimeErrorKind::Host {
            message: message.into(),
        })
    }

    /// Attach a location unless one is already set.
    #[must_use]
    pub fn at(mut self, offset: u32) -> Self {
        self.offset.get_or_insert(offset);
        self
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{} (at offset {offset})", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for RuntimeError {}
