//! Lexical tokens.

use std::fmt;

use crate::span::{Position, Span};

/// Token classification produced by the lexer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifier, possibly with interior `-+.@/` separators.
    Ident,
    /// `true` or `false`.
    Bool,
    /// Decimal, hex, octal, binary or scientific number.
    Number,
    /// Double-quoted string; the token text keeps quotes and escapes.
    Str,
    /// `{{ ... }}` expression literal; the token text is the inner source.
    Expr,
    Colon,
    Semicolon,
    Comma,
    LBrace,
    RBrace,
    /// `...` in front of a variadic parameter.
    Ellipsis,
    /// Any other single character. Operators inside bare expressions.
    Other,
    /// Unterminated string or expression literal.
    Invalid,
    Eof,
}

impl TokenKind {
    /// Human-readable description for diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Ident => "identifier",
            TokenKind::Bool => "boolean",
            TokenKind::Number => "number",
            TokenKind::Str => "string",
            TokenKind::Expr => "expression",
            TokenKind::Colon => "`:`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Comma => "`,`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::Ellipsis => "`...`",
            TokenKind::Other => "character",
            TokenKind::Invalid => "malformed literal",
            TokenKind::Eof => "end of input",
        }
    }

    /// `;` or `,`.
    #[inline]
    pub fn is_separator(self) -> bool {
        matches!(self, TokenKind::Semicolon | TokenKind::Comma)
    }

    /// Boolean, number, string or expression literal.
    #[inline]
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::Bool | TokenKind::Number | TokenKind::Str | TokenKind::Expr
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A classified lexeme with its text and location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub pos: Position,
    /// Byte offset one past the last source byte of the lexeme.
    pub end: u32,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, pos: Position, end: u32) -> Self {
        Token {
            kind,
            text: text.into(),
            pos,
            end,
        }
    }

    /// Token that does not come from any source text.
    pub fn synthetic(kind: TokenKind, text: impl Into<String>) -> Self {
        Token::new(kind, text, Position::DUMMY, 0)
    }

    /// Source range covered by the lexeme.
    #[inline]
    pub fn span(&self) -> Span {
        Span::new(self.pos.offset, self.end.max(self.pos.offset))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => f.write_str("end of input"),
            _ => write!(f, "`{}`", self.text),
        }
    }
}
