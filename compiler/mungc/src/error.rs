//! The error type of the facade.

use std::fmt;
use std::path::PathBuf;

use mung_eval::EvalError;
use mung_parse::{ParseError, ParseErrorKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The source could not be read to the end.
    ReadInput {
        path: Option<PathBuf>,
        message: String,
    },
    Parse(ParseError),
    Eval(EvalError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ReadInput {
                path: Some(path),
                message,
            } => write!(f, "failed to read `{}`: {message}", path.display()),
            Error::ReadInput {
                path: None,
                message,
            } => write!(f, "failed to read input: {message}"),
            Error::Parse(err) => write!(f, "{err}"),
            Error::Eval(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ReadInput { .. } => None,
            Error::Parse(err) => Some(err),
            Error::Eval(err) => Some(err),
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        if let ParseErrorKind::ReadInput { message } = &err.kind {
            return Error::ReadInput {
                path: None,
                message: message.clone(),
            };
        }
        Error::Parse(err)
    }
}

impl From<EvalError> for Error {
    fn from(err: EvalError) -> Self {
        Error::Eval(err)
    }
}
