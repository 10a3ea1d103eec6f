//! Tokenizer for mung documents.
//!
//! [`lex`] turns source text into [`Token`]s carrying their kind, text and
//! position. Lexing never fails; malformed input shows up as
//! [`TokenKind::Invalid`] or [`TokenKind::Other`] tokens for the parser to
//! reject in context.
//!
//! Token text is the source lexeme, except for expression literals, whose
//! text is the trimmed source between `{{` and `}}`.

mod cursor;
mod scanner;

pub use cursor::LineIndex;

use mung_ir::{Token, TokenKind};

use scanner::Scanner;

/// Tokenize `source`. The result always ends with one `Eof` token.
pub fn lex(source: &str) -> Vec<Token> {
    let index = LineIndex::new(source);
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    loop {
        let raw = scanner.next_token();
        let lexeme = scanner.cursor().slice(raw.start, raw.end);
        let text = match raw.kind {
            TokenKind::Expr => expression_body(lexeme),
            _ => lexeme,
        };
        tokens.push(Token::new(
            raw.kind,
            text,
            index.position(source, raw.start),
            raw.end,
        ));
        if raw.kind == TokenKind::Eof {
            return tokens;
        }
    }
}

/// Source between the `{{` and `}}` delimiters, trimmed.
fn expression_body(lexeme: &str) -> &str {
    lexeme
        .strip_prefix("{{")
        .and_then(|s| s.strip_suffix("}}"))
        .unwrap_or(lexeme)
        .trim()
}

/// Whether `text` would lex as exactly one identifier token.
pub fn is_identifier(text: &str) -> bool {
    let mut scanner = Scanner::new(text);
    let first = scanner.next_token();
    first.kind == TokenKind::Ident
        && first.start == 0
        && first.end as usize == text.len()
        && scanner.next_token().kind == TokenKind::Eof
}

#[cfg(test)]
mod tests;
