//! Parse errors.
//!
//! Every error carries the position of the offending construct and a
//! rendered snippet of the source line with a caret under it, so the error
//! can be shown without access to the source.

use std::fmt;

use mung_ir::{Position, TokenKind};
use mung_lexer::LineIndex;

/// What went wrong.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A token the grammar does not allow here.
    Syntax {
        expected: Vec<&'static str>,
        found: String,
    },
    /// The same text derives both as a block and as an expression.
    AmbiguousParse { found: String },
    /// Namespace definitions nested deeper than the configured limit.
    /// `chain` lists the enclosing namespace names, outermost first.
    MaxDepthExceeded { limit: usize, chain: Vec<String> },
    VariadicNotLast { namespace: String, param: String },
    /// A literal whose text does not cook into a value.
    InvalidLiteral { kind: TokenKind, text: String },
    /// An expression that does not compile.
    InvalidExpression { source: String, message: String },
    /// The source could not be read.
    ReadInput { message: String },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { expected, found } => {
                f.write_str("expected ")?;
                for (i, item) in expected.iter().enumerate() {
                    if i > 0 {
                        f.write_str(if i + 1 == expected.len() { " or " } else { ", " })?;
                    }
                    f.write_str(item)?;
                }
                write!(f, ", found {found}")
            }
            Self::AmbiguousParse { found } => write!(
                f,
                "ambiguous parse: block followed by {found} also reads as an expression; \
                 wrap the expression in {{{{ }}}}"
            ),
            Self::MaxDepthExceeded { limit, chain } => write!(
                f,
                "namespace nesting exceeds the limit of {limit}: {}",
                chain.join(" -> ")
            ),
            Self::VariadicNotLast { namespace, param } => write!(
                f,
                "variadic parameter `...{param}` of `{namespace}` must be the last parameter"
            ),
            Self::InvalidLiteral { kind, text } => write!(f, "invalid {kind} literal {text}"),
            Self::InvalidExpression { source, message } => {
                write!(f, "invalid expression `{source}`: {message}")
            }
            Self::ReadInput { message } => write!(f, "failed to read input: {message}"),
        }
    }
}

/// A located parse failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub pos: Position,
    /// Source line with a caret under the offending column. Empty when the
    /// error has no location.
    pub snippet: String,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, source: &str, index: &LineIndex, pos: Position) -> Self {
        ParseError {
            kind,
            pos,
            snippet: render_snippet(source, index, pos),
        }
    }

    /// Error with no source location.
    pub fn unlocated(kind: ParseErrorKind) -> Self {
        ParseError {
            kind,
            pos: Position::DUMMY,
            snippet: String::new(),
        }
    }

    pub(crate) fn read_input(err: &std::io::Error) -> Self {
        ParseError::unlocated(ParseErrorKind::ReadInput {
            message: err.to_string(),
        })
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pos.is_dummy() {
            return write!(f, "{}", self.kind);
        }
        write!(f, "{}: {}", self.pos, self.kind)?;
        if !self.snippet.is_empty() {
            write!(f, "\n{}", self.snippet)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Render the line containing `pos` with a caret under its column.
///
/// ```text
///   3 | config : { a : 1 }.a
///     |                   ^
/// ```
pub(crate) fn render_snippet(source: &str, index: &LineIndex, pos: Position) -> String {
    if pos.is_dummy() {
        return String::new();
    }
    let line = index.line_text(source, pos.line);
    let gutter = pos.line.to_string();
    // Tabs stay tabs so the caret lines up in a terminal.
    let width = pos.column.saturating_sub(1) as usize;
    let mut pad: String = line
        .chars()
        .take(width)
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect();
    let short = width.saturating_sub(pad.chars().count());
    pad.extend(std::iter::repeat(' ').take(short));
    format!(
        "{gutter:>4} | {line}\n{blank:>4} | {pad}^",
        blank = ""
    )
}
