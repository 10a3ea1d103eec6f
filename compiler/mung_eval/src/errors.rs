//! Evaluation errors.
//!
//! Errors are built through the `#[cold]` constructors below so every
//! message is worded in one place.

use std::fmt;

use mung_expr::Arity;
use mung_ir::Position;

/// Structured evaluation failure category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// An identifier that resolves to nothing in scope.
    NotDefined { name: String },
    /// A top-level namespace requested by name does not exist.
    DefinitionNotFound { name: String },
    /// A call with the wrong number of arguments. `signature` is the
    /// callee's declaration (`add x y`) when it is a namespace.
    ParameterCountMismatch {
        name: String,
        signature: Option<String>,
        expected: Arity,
        got: usize,
    },
    /// A value whose payload does not match its kind.
    InvalidValueType { message: String },
    InvalidBoolean { text: String },
    InvalidNumber { text: String },
    /// The expression failed to parse or check.
    ExprCompile { source: String, message: String },
    /// The expression failed while running.
    ExprEvaluate { source: String, message: String },
    /// Parameterized namespaces called each other too deeply.
    RecursionLimit { name: String, limit: usize },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotDefined { name } => write!(f, "`{name}` is not defined"),
            Self::DefinitionNotFound { name } => write!(f, "no namespace named `{name}`"),
            Self::ParameterCountMismatch {
                name,
                signature,
                expected,
                got,
            } => {
                write!(f, "`{name}` expects {expected} arguments, got {got}")?;
                if let Some(signature) = signature {
                    write!(f, " (declared as `{signature}`)")?;
                }
                Ok(())
            }
            Self::InvalidValueType { message } => write!(f, "invalid value: {message}"),
            Self::InvalidBoolean { text } => write!(f, "invalid boolean `{text}`"),
            Self::InvalidNumber { text } => write!(f, "invalid number `{text}`"),
            Self::ExprCompile { source, message } => {
                write!(f, "cannot compile `{source}`: {message}")
            }
            Self::ExprEvaluate { source, message } => {
                write!(f, "cannot evaluate `{source}`: {message}")
            }
            Self::RecursionLimit { name, limit } => {
                write!(f, "call depth limit of {limit} exceeded in `{name}`")
            }
        }
    }
}

/// An evaluation failure and the position of the value that caused it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Dummy for values built without a source.
    pub pos: Position,
}

impl EvalError {
    pub fn from_kind(kind: EvalErrorKind) -> Self {
        EvalError {
            kind,
            pos: Position::DUMMY,
        }
    }

    /// Attach a position unless one is already set.
    #[must_use]
    pub fn at(mut self, pos: Position) -> Self {
        if self.pos.is_dummy() {
            self.pos = pos;
        }
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pos.is_dummy() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.pos, self.kind)
        }
    }
}

impl std::error::Error for EvalError {}

pub type EvalResult<T = mung_expr::Value> = Result<T, EvalError>;

#[cold]
pub fn not_defined(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotDefined {
        name: name.to_string(),
    })
}

#[cold]
pub fn definition_not_found(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DefinitionNotFound {
        name: name.to_string(),
    })
}

#[cold]
pub fn parameter_count_mismatch(
    name: &str,
    signature: Option<String>,
    expected: Arity,
    got: usize,
) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ParameterCountMismatch {
        name: name.to_string(),
        signature,
        expected,
        got,
    })
}

#[cold]
pub fn invalid_value_type(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidValueType {
        message: message.into(),
    })
}

#[cold]
pub fn invalid_boolean(text: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidBoolean {
        text: text.to_string(),
    })
}

#[cold]
pub fn invalid_number(text: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidNumber {
        text: text.to_string(),
    })
}

#[cold]
pub fn expr_compile(source: &str, message: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ExprCompile {
        source: source.to_string(),
        message: message.to_string(),
    })
}

#[cold]
pub fn expr_evaluate(source: &str, message: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ExprEvaluate {
        source: source.to_string(),
        message: message.to_string(),
    })
}

#[cold]
pub fn recursion_limit(name: &str, limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::RecursionLimit {
        name: name.to_string(),
        limit,
    })
}
