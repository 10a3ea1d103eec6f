//! Token cursor with lookahead.

use mung_ir::{Token, TokenKind};

/// Cursor over a token list that always ends with `Eof`.
pub(crate) struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(tokens.last().is_some_and(|t| t.kind == TokenKind::Eof));
        Cursor { tokens, pos: 0 }
    }

    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Token `n` places ahead of the current one. Reads past the end yield
    /// the final `Eof`.
    #[inline]
    pub(crate) fn peek(&self, n: usize) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + n).min(last)]
    }

    #[inline]
    pub(crate) fn current(&self) -> &Token {
        self.peek(0)
    }

    #[inline]
    pub(crate) fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    #[inline]
    pub(crate) fn kind_at(&self, n: usize) -> TokenKind {
        self.peek(n).kind
    }

    #[inline]
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Consume and return the current token. `Eof` is never consumed.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    /// The most recently consumed token.
    pub(crate) fn previous(&self) -> Option<&Token> {
        self.pos.checked_sub(1).map(|i| &self.tokens[i])
    }

    /// `;`, `,`, `}` or end of input: the tokens that may follow a value.
    #[inline]
    pub(crate) fn at_terminator(&self, n: usize) -> bool {
        matches!(
            self.kind_at(n),
            TokenKind::Semicolon | TokenKind::Comma | TokenKind::RBrace | TokenKind::Eof
        )
    }
}
