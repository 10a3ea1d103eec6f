//! Literal values to runtime values.

use mung_expr::Value;
use mung_ir::literal::{self, Number};
use mung_ir::{Token, TokenKind};

use crate::errors::{invalid_boolean, invalid_number, invalid_value_type, EvalResult};

pub(crate) fn boolean(token: &Token) -> EvalResult {
    literal::parse_bool(&token.text)
        .map(Value::Bool)
        .ok_or_else(|| invalid_boolean(&token.text).at(token.pos))
}

pub(crate) fn number(token: &Token) -> EvalResult {
    match literal::parse_number(&token.text) {
        Some(Number::Int(n)) => Ok(Value::Int(n)),
        Some(Number::Float(n)) => Ok(Value::Float(n)),
        None => Err(invalid_number(&token.text).at(token.pos)),
    }
}

pub(crate) fn string(token: &Token) -> EvalResult {
    literal::unescape(&token.text)
        .map(Value::from)
        .ok_or_else(|| {
            invalid_value_type(format!("malformed string literal {}", token)).at(token.pos)
        })
}

/// A call argument given as text. A lone number, boolean or string literal
/// is cooked; any other text is passed through as a string.
pub(crate) fn argument(text: &str) -> Value {
    let tokens = mung_lexer::lex(text);
    let cooked = match tokens.as_slice() {
        [only, eof] if eof.kind == TokenKind::Eof && only.pos.offset == 0 => {
            let whole = only.end as usize == text.len();
            match only.kind {
                TokenKind::Number if whole => number(only).ok(),
                TokenKind::Bool if whole => boolean(only).ok(),
                TokenKind::Str if whole => string(only).ok(),
                _ => None,
            }
        }
        _ => None,
    };
    cooked.unwrap_or_else(|| Value::from(text))
}
