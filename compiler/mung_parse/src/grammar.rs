//! Recursive descent over the token stream.
//!
//! ```text
//! Manifest  = (Namespace (Sep Namespace)* Sep?)?
//! Namespace = Ident Param* ':' Value
//! Param     = Ident | '...' Ident
//! Value     = Block | Expr | Namespace | Ident | Literal | BareExpr
//! Block     = '{' (Namespace (Sep Namespace)* Sep?)? '}'
//! Sep       = ';' | ','
//! ```
//!
//! A `{` opens a block only when it is followed by `}` or by
//! `Ident (Ident | '...' Ident)* ':'`. Any other value is captured verbatim
//! from the source as a bare expression.

use std::sync::Arc;

use mung_ir::{
    literal, Ast, ExprLiteral, Namespace, Param, ParseOptions, Position, Token, TokenKind, Tuple,
    Value,
};
use mung_lexer::LineIndex;
use tracing::trace;

use crate::cursor::Cursor;
use crate::error::{ParseError, ParseErrorKind};

pub(crate) struct Parser<'a> {
    source: &'a str,
    index: LineIndex,
    cursor: Cursor,
    options: &'a ParseOptions,
    /// Current nesting of namespace definitions.
    depth: usize,
    /// Names of the namespaces being defined, outermost first.
    chain: Vec<String>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(source: &'a str, options: &'a ParseOptions) -> Self {
        Parser {
            source,
            index: LineIndex::new(source),
            cursor: Cursor::new(mung_lexer::lex(source)),
            options,
            depth: 0,
            chain: Vec::new(),
        }
    }

    fn error(&self, kind: ParseErrorKind, pos: Position) -> ParseError {
        ParseError::new(kind, self.source, &self.index, pos)
    }

    /// Syntax error at the current token.
    fn expected(&self, expected: &[&'static str]) -> ParseError {
        let token = self.cursor.current();
        let found = match token.kind {
            TokenKind::Invalid => format!("unterminated {}", describe_invalid(&token.text)),
            _ => token.to_string(),
        };
        self.error(
            ParseErrorKind::Syntax {
                expected: expected.to_vec(),
                found,
            },
            token.pos,
        )
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.cursor.check(kind) {
            Ok(self.cursor.advance())
        } else {
            Err(self.expected(&[kind.describe()]))
        }
    }

    // Manifest

    pub(crate) fn manifest(mut self) -> Result<Ast, ParseError> {
        let mut namespaces = Vec::new();
        while !self.cursor.check(TokenKind::Eof) {
            let namespace = self.namespace()?;
            namespaces.push(Arc::new(namespace));
            self.depth = 0;
            self.chain.clear();

            if self.cursor.current_kind().is_separator() {
                self.cursor.advance();
            } else if !self.cursor.check(TokenKind::Eof) {
                return Err(self.expected(&["`;`", "`,`", "end of input"]));
            }
        }
        Ok(Ast::from_namespaces(namespaces, self.options.clone()))
    }

    // Namespaces

    fn namespace(&mut self) -> Result<Namespace, ParseError> {
        mung_stack::with_stack(|| self.namespace_inner())
    }

    fn namespace_inner(&mut self) -> Result<Namespace, ParseError> {
        let ident = self.expect(TokenKind::Ident)?;
        self.depth += 1;
        self.chain.push(ident.text.clone());
        if self.depth > self.options.max_recursion_depth {
            return Err(self.error(
                ParseErrorKind::MaxDepthExceeded {
                    limit: self.options.max_recursion_depth,
                    chain: self.chain.clone(),
                },
                ident.pos,
            ));
        }

        let pos = ident.pos;
        let params = self.params(&ident)?;
        self.expect(TokenKind::Colon)?;
        let value = self.value()?;

        self.depth -= 1;
        self.chain.pop();
        Namespace::new(ident, params, value).map_err(|e| {
            self.error(
                ParseErrorKind::Syntax {
                    expected: vec![],
                    found: e.to_string(),
                },
                pos,
            )
        })
    }

    fn params(&mut self, ident: &Token) -> Result<Vec<Param>, ParseError> {
        let mut params: Vec<Param> = Vec::new();
        loop {
            let variadic = match self.cursor.current_kind() {
                TokenKind::Ident => false,
                TokenKind::Ellipsis => {
                    self.cursor.advance();
                    true
                }
                _ => return Ok(params),
            };
            let name = self.expect(TokenKind::Ident)?;
            if let Some(prev) = params.last().filter(|p| p.variadic) {
                return Err(self.error(
                    ParseErrorKind::VariadicNotLast {
                        namespace: ident.text.clone(),
                        param: prev.name.clone(),
                    },
                    name.pos,
                ));
            }
            params.push(if variadic {
                Param::variadic(name.text)
            } else {
                Param::new(name.text)
            });
        }
    }

    /// Does a namespace definition start `n` tokens ahead?
    fn definition_ahead(&self, n: usize) -> bool {
        if self.cursor.kind_at(n) != TokenKind::Ident {
            return false;
        }
        let mut i = n + 1;
        loop {
            match self.cursor.kind_at(i) {
                TokenKind::Colon => return true,
                TokenKind::Ident => i += 1,
                TokenKind::Ellipsis if self.cursor.kind_at(i + 1) == TokenKind::Ident => i += 2,
                _ => return false,
            }
        }
    }

    /// Is the `{` at the cursor the start of a block?
    fn block_ahead(&self) -> bool {
        self.cursor.kind_at(1) == TokenKind::RBrace || self.definition_ahead(1)
    }

    // Values

    fn value(&mut self) -> Result<Value, ParseError> {
        match self.cursor.current_kind() {
            TokenKind::LBrace if self.block_ahead() => self.block(),
            TokenKind::Expr => {
                let token = self.cursor.advance();
                if !self.cursor.at_terminator(0) {
                    return Err(self.expected(&["`;`", "`,`", "`}`", "end of input"]));
                }
                self.expression(token)
            }
            TokenKind::Ident if self.definition_ahead(0) => {
                let nested = self.namespace()?;
                Ok(Value::Namespace(Arc::new(nested)))
            }
            TokenKind::Ident if self.cursor.at_terminator(1) => {
                Ok(Value::Identifier(self.cursor.advance()))
            }
            TokenKind::Bool | TokenKind::Number | TokenKind::Str
                if self.cursor.at_terminator(1) =>
            {
                let token = self.cursor.advance();
                self.literal(token)
            }
            TokenKind::Eof
            | TokenKind::Colon
            | TokenKind::Semicolon
            | TokenKind::Comma
            | TokenKind::RBrace
            | TokenKind::Invalid => Err(self.expected(&["value"])),
            _ => {
                let token = self.bare_expression()?;
                self.expression(token)
            }
        }
    }

    fn literal(&self, token: Token) -> Result<Value, ParseError> {
        let valid = match token.kind {
            TokenKind::Number => literal::parse_number(&token.text).is_some(),
            TokenKind::Str => literal::unescape(&token.text).is_some(),
            _ => literal::parse_bool(&token.text).is_some(),
        };
        if !valid {
            return Err(self.error(
                ParseErrorKind::InvalidLiteral {
                    kind: token.kind,
                    text: token.text.clone(),
                },
                token.pos,
            ));
        }
        Ok(match token.kind {
            TokenKind::Number => Value::Number(token),
            TokenKind::Str => Value::String(token),
            _ => Value::Boolean(token),
        })
    }

    fn block(&mut self) -> Result<Value, ParseError> {
        let open = self.expect(TokenKind::LBrace)?;
        let mut values = Vec::new();
        while !self.cursor.check(TokenKind::RBrace) {
            let namespace = self.namespace()?;
            values.push(Value::Namespace(Arc::new(namespace)));
            if self.cursor.current_kind().is_separator() {
                self.cursor.advance();
            } else if !self.cursor.check(TokenKind::RBrace) {
                return Err(self.expected(&["`;`", "`,`", "`}`"]));
            }
        }
        self.cursor.advance();

        // `{ a : 1 }.a` is a block and also an expression over a map literal.
        if self.cursor.check(TokenKind::Other) {
            let found = self.cursor.current().to_string();
            return Err(self.error(ParseErrorKind::AmbiguousParse { found }, open.pos));
        }
        if !self.cursor.at_terminator(0) {
            return Err(self.expected(&["`;`", "`,`", "`}`", "end of input"]));
        }
        Ok(Value::Tuple(Arc::new(Tuple::new(values))))
    }

    /// Capture tokens up to a top-level `;` or `,`, an unbalanced closer or
    /// the end of input, and return the covered source text as one
    /// expression token.
    fn bare_expression(&mut self) -> Result<Token, ParseError> {
        let first = self.cursor.current().clone();
        let start = self.cursor.position();
        let mut stack: Vec<Token> = Vec::new();
        loop {
            let token = self.cursor.current();
            match token.kind {
                TokenKind::Semicolon | TokenKind::Comma if stack.is_empty() => break,
                TokenKind::Eof => {
                    if let Some(open) = stack.pop() {
                        return Err(self.error(
                            ParseErrorKind::Syntax {
                                expected: vec![closer_for(&open.text).1],
                                found: "end of input".to_string(),
                            },
                            open.pos,
                        ));
                    }
                    break;
                }
                TokenKind::Expr => {
                    return Err(self.error(
                        ParseErrorKind::Syntax {
                            expected: vec!["operand"],
                            found: "expression literal inside an expression".to_string(),
                        },
                        token.pos,
                    ))
                }
                TokenKind::Invalid => return Err(self.expected(&["operand"])),
                TokenKind::Ident if stack.is_empty() && self.definition_after_operand() => {
                    return Err(self.expected(&["`;`", "`,`"]));
                }
                TokenKind::LBrace => stack.push(token.clone()),
                TokenKind::Other if matches!(token.text.as_str(), "(" | "[") => {
                    stack.push(token.clone());
                }
                TokenKind::RBrace => {
                    if stack.is_empty() {
                        break;
                    }
                    self.close(&mut stack)?;
                }
                TokenKind::Other if matches!(token.text.as_str(), ")" | "]") => {
                    if stack.is_empty() {
                        break;
                    }
                    self.close(&mut stack)?;
                }
                _ => {}
            }
            self.cursor.advance();
        }
        if self.cursor.position() == start {
            return Err(self.expected(&["value"]));
        }

        let end = self.cursor.previous().map_or(first.pos.offset, |t| t.end);
        let text = self
            .source
            .get(first.pos.offset as usize..end as usize)
            .unwrap_or_default()
            .trim();
        trace!(text, "captured bare expression");
        Ok(Token::new(TokenKind::Expr, text, first.pos, end))
    }

    /// A definition at the cursor right after a complete operand, as in
    /// `a : 1 b : 2`. A ternary `c ? x : y` never matches: `x` follows `?`.
    fn definition_after_operand(&self) -> bool {
        let ends_operand = self.cursor.previous().is_some_and(|prev| match prev.kind {
            TokenKind::Number | TokenKind::Str | TokenKind::Bool | TokenKind::RBrace => true,
            TokenKind::Ident => !mung_expr::is_operator_word(&prev.text),
            TokenKind::Other => matches!(prev.text.as_str(), ")" | "]"),
            _ => false,
        });
        ends_operand
            && !mung_expr::is_operator_word(&self.cursor.current().text)
            && self.definition_ahead(0)
    }

    /// Pop the innermost opener, which must match the closer at the cursor.
    fn close(&self, stack: &mut Vec<Token>) -> Result<(), ParseError> {
        let closer = self.cursor.current();
        let Some(open) = stack.last() else {
            return Err(self.expected(&["operand"]));
        };
        let (text, described) = closer_for(&open.text);
        if closer.text != text {
            return Err(self.expected(&[described]));
        }
        stack.pop();
        Ok(())
    }

    /// Build an expression value, compiling it now when asked to.
    fn expression(&self, token: Token) -> Result<Value, ParseError> {
        let mut literal = ExprLiteral::new(token);
        if self.options.compile_expressions {
            let compiled = mung_expr::compile(literal.source());
            match compiled {
                Ok(program) => literal = literal.with_program(Arc::new(program)),
                Err(err) => {
                    let token = literal.token();
                    let pos = self.body_position(token, err.offset);
                    return Err(self.error(
                        ParseErrorKind::InvalidExpression {
                            source: token.text.clone(),
                            message: err.kind.to_string(),
                        },
                        pos,
                    ));
                }
            }
        }
        Ok(Value::Expr(literal))
    }

    /// Document position of byte `offset` within an expression token's text.
    fn body_position(&self, token: &Token, offset: u32) -> Position {
        let lexeme = self
            .source
            .get(token.pos.offset as usize..token.end as usize)
            .unwrap_or_default();
        let body_start = lexeme.find(token.text.as_str()).unwrap_or(0);
        let start = token.pos.offset + u32::try_from(body_start).unwrap_or(0);
        self.index.position(self.source, start.saturating_add(offset))
    }
}

/// Closing text for an opener, and how to describe it in diagnostics.
fn closer_for(opener: &str) -> (&'static str, &'static str) {
    match opener {
        "(" => (")", "`)`"),
        "[" => ("]", "`]`"),
        _ => ("}", "`}`"),
    }
}

fn describe_invalid(text: &str) -> &'static str {
    if text.starts_with("{{") {
        "expression literal"
    } else if text.starts_with("/*") {
        "block comment"
    } else {
        "string"
    }
}
