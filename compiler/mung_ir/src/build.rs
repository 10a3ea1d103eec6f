//! Construction API for documents built in code rather than parsed.
//!
//! Nodes built here carry synthetic tokens whose text is exactly what the
//! lexer would have produced for the same literal, so the evaluator cannot
//! tell them apart from parsed nodes.

use std::sync::Arc;

use crate::ast::{AstError, ExprLiteral, Namespace, Param, Tuple, Value};
use crate::literal::{self, float_text};
use crate::token::{Token, TokenKind};

/// Build a namespace from a name, parameter names and a value.
///
/// A parameter written as `...name` is variadic.
pub fn define_namespace(name: &str, params: &[&str], value: Value) -> Result<Namespace, AstError> {
    if name.is_empty() {
        return Err(AstError::InvalidIdentifier {
            text: name.to_string(),
        });
    }
    let params = params.iter().map(|p| match p.strip_prefix("...") {
        Some(rest) => Param::variadic(rest),
        None => Param::new(*p),
    });
    Namespace::new(Token::synthetic(TokenKind::Ident, name), params, value)
}

impl Value {
    pub fn new_string(s: &str) -> Value {
        Value::String(Token::synthetic(TokenKind::Str, literal::escape(s)))
    }

    pub fn new_int(n: i64) -> Value {
        Value::Number(Token::synthetic(TokenKind::Number, n.to_string()))
    }

    pub fn new_float(n: f64) -> Value {
        Value::Number(Token::synthetic(TokenKind::Number, float_text(n)))
    }

    /// Number from literal text, validated with the same rules the
    /// evaluator applies.
    pub fn new_number(text: &str) -> Result<Value, AstError> {
        if literal::parse_number(text).is_none() {
            return Err(AstError::InvalidLiteral {
                kind: TokenKind::Number,
                text: text.to_string(),
            });
        }
        Ok(Value::Number(Token::synthetic(TokenKind::Number, text)))
    }

    pub fn new_bool(b: bool) -> Value {
        Value::Boolean(Token::synthetic(
            TokenKind::Bool,
            if b { "true" } else { "false" },
        ))
    }

    pub fn new_identifier(name: &str) -> Value {
        Value::Identifier(Token::synthetic(TokenKind::Ident, name))
    }

    pub fn new_expr(source: &str) -> Value {
        Value::Expr(ExprLiteral::new(Token::synthetic(
            TokenKind::Expr,
            source.trim(),
        )))
    }

    pub fn new_tuple(values: Vec<Value>) -> Value {
        Value::Tuple(Arc::new(Tuple::new(values)))
    }

    pub fn new_namespace(namespace: Namespace) -> Value {
        Value::Namespace(Arc::new(namespace))
    }
}
