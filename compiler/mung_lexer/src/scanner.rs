//! Raw scanner producing `(kind, start, end)` triples.
//!
//! The scanner never fails. Input it cannot classify becomes `Other`
//! (one character) or `Invalid` (unterminated literal), and the parser
//! decides whether that is an error in context. Comments and whitespace
//! produce no tokens.

use mung_ir::TokenKind;

use crate::cursor::Cursor;

/// A token before position lookup and text extraction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct RawToken {
    pub kind: TokenKind,
    pub start: u32,
    pub end: u32,
}

/// Separators allowed inside an identifier when followed by an
/// identifier-continue character.
const IDENT_SEPARATORS: [char; 5] = ['-', '+', '.', '@', '/'];

#[inline]
pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

#[inline]
pub(crate) fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub(crate) struct Scanner<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Scanner {
            cursor: Cursor::new(src),
        }
    }

    #[inline]
    pub(crate) fn cursor(&self) -> &Cursor<'a> {
        &self.cursor
    }

    /// Next token. Returns `Eof` forever once input is exhausted.
    pub(crate) fn next_token(&mut self) -> RawToken {
        if let Some(invalid) = self.skip_trivia() {
            return invalid;
        }
        let start = self.cursor.pos();
        let Some(c) = self.cursor.current() else {
            return self.finish(TokenKind::Eof, start);
        };
        match c {
            ':' => self.single(TokenKind::Colon, start),
            ';' => self.single(TokenKind::Semicolon, start),
            ',' => self.single(TokenKind::Comma, start),
            '}' => self.single(TokenKind::RBrace, start),
            '{' if self.cursor.starts_with("{{") => self.expression(start),
            '{' => self.single(TokenKind::LBrace, start),
            '"' => self.string(start),
            '.' if self.cursor.starts_with("...")
                && self.cursor.peek_nth(3).is_some_and(is_ident_start) =>
            {
                self.cursor.advance_bytes(3);
                self.finish(TokenKind::Ellipsis, start)
            }
            '0'..='9' => self.number(start),
            '-' | '+' if self.cursor.peek_nth(1).is_some_and(|d| d.is_ascii_digit()) => {
                self.cursor.advance();
                self.number(start)
            }
            c if is_ident_start(c) => self.identifier(start),
            _ => self.single(TokenKind::Other, start),
        }
    }

    #[inline]
    fn finish(&self, kind: TokenKind, start: u32) -> RawToken {
        RawToken {
            kind,
            start,
            end: self.cursor.pos(),
        }
    }

    fn single(&mut self, kind: TokenKind, start: u32) -> RawToken {
        self.cursor.advance();
        self.finish(kind, start)
    }

    /// Skip whitespace and comments. An unterminated block comment is
    /// returned as an `Invalid` token.
    fn skip_trivia(&mut self) -> Option<RawToken> {
        loop {
            self.cursor.eat_while(char::is_whitespace);
            if self.cursor.starts_with("//") || self.cursor.starts_with("#") {
                self.cursor.eat_until_newline();
            } else if self.cursor.starts_with("/*") {
                let start = self.cursor.pos();
                self.cursor.advance_bytes(2);
                if !self.cursor.eat_past("*/") {
                    return Some(self.finish(TokenKind::Invalid, start));
                }
            } else {
                return None;
            }
        }
    }

    fn identifier(&mut self, start: u32) -> RawToken {
        loop {
            self.cursor.eat_while(is_ident_continue);
            match self.cursor.current() {
                Some(sep)
                    if IDENT_SEPARATORS.contains(&sep)
                        && self.cursor.peek_nth(1).is_some_and(is_ident_continue) =>
                {
                    self.cursor.advance();
                }
                _ => break,
            }
        }
        let kind = match self.cursor.slice_from(start) {
            "true" | "false" => TokenKind::Bool,
            _ => TokenKind::Ident,
        };
        self.finish(kind, start)
    }

    /// Numbers are scanned permissively; the literal is validated when it
    /// is cooked.
    fn number(&mut self, start: u32) -> RawToken {
        let radix_prefix = self.cursor.current() == Some('0')
            && matches!(
                self.cursor.peek_nth(1),
                Some('x' | 'X' | 'o' | 'O' | 'b' | 'B')
            );
        if radix_prefix {
            self.cursor.advance_bytes(2);
            self.cursor.eat_while(|c| c.is_ascii_hexdigit() || c == '_');
            return self.finish(TokenKind::Number, start);
        }
        self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
        if self.cursor.current() == Some('.')
            && self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit())
        {
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
        }
        if matches!(self.cursor.current(), Some('e' | 'E')) {
            let sign = usize::from(matches!(self.cursor.peek_nth(1), Some('+' | '-')));
            if self
                .cursor
                .peek_nth(1 + sign)
                .is_some_and(|c| c.is_ascii_digit())
            {
                self.cursor.advance_bytes(1 + sign);
                self.cursor.eat_while(|c| c.is_ascii_digit());
            }
        }
        self.finish(TokenKind::Number, start)
    }

    fn string(&mut self, start: u32) -> RawToken {
        let kind = if self.cursor.eat_quoted() {
            TokenKind::Str
        } else {
            TokenKind::Invalid
        };
        self.finish(kind, start)
    }

    /// `{{ ... }}`. Nested brackets and quoted strings inside do not end the
    /// literal.
    fn expression(&mut self, start: u32) -> RawToken {
        self.cursor.advance_bytes(2);
        let mut depth = 0u32;
        loop {
            let Some(c) = self.cursor.current() else {
                return self.finish(TokenKind::Invalid, start);
            };
            match c {
                '"' | '\'' => {
                    if !self.cursor.eat_quoted() {
                        return self.finish(TokenKind::Invalid, start);
                    }
                    continue;
                }
                '{' | '(' | '[' => depth += 1,
                '}' | ')' | ']' if depth > 0 => depth -= 1,
                '}' if self.cursor.starts_with("}}") => {
                    self.cursor.advance_bytes(2);
                    return self.finish(TokenKind::Expr, start);
                }
                _ => {}
            }
            self.cursor.advance();
        }
    }
}
