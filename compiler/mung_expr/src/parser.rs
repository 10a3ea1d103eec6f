//! Precedence-climbing parser producing a [`Program`].

use crate::error::{CompileError, CompileErrorKind};
use crate::lexer::{tokenize, Lexed, Tok};
use crate::syntax::{BinaryOp, Expr, ExprId, Program, UnaryOp, UNARY_PRECEDENCE};

pub(crate) fn parse(source: &str) -> Result<Program, CompileError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        nodes: Vec::new(),
        offsets: Vec::new(),
    };
    let root = mung_stack::with_stack(|| parser.expression())?;
    if !parser.at_eof() {
        return Err(parser.unexpected("end of expression"));
    }
    Ok(Program::from_parts(
        source.to_string(),
        parser.nodes,
        parser.offsets,
        root,
    ))
}

struct Parser {
    tokens: Vec<Lexed>,
    pos: usize,
    nodes: Vec<Expr>,
    offsets: Vec<u32>,
}

impl Parser {
    fn alloc(&mut self, expr: Expr, offset: u32) -> ExprId {
        let id = ExprId::new(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(expr);
        self.offsets.push(offset);
        id
    }

    #[inline]
    fn current(&self) -> &Lexed {
        // tokenize always ends with Eof and the cursor never passes it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    #[inline]
    fn at_eof(&self) -> bool {
        self.current().tok == Tok::Eof
    }

    fn advance(&mut self) -> Lexed {
        let tok = self.current().clone();
        if tok.tok != Tok::Eof {
            self.pos += 1;
        }
        tok
    }

    fn check_punct(&self, p: &str) -> bool {
        matches!(self.current().tok, Tok::Punct(q) if q == p)
    }

    fn eat_punct(&mut self, p: &str) -> bool {
        if self.check_punct(p) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, p: &str) -> Result<(), CompileError> {
        if self.eat_punct(p) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("`{p}`")))
        }
    }

    fn unexpected(&self, expected: &str) -> CompileError {
        let cur = self.current();
        CompileError::new(
            CompileErrorKind::Syntax {
                message: format!("expected {expected}, found {}", cur.tok.describe()),
            },
            cur.offset,
        )
    }

    fn expression(&mut self) -> Result<ExprId, CompileError> {
        let offset = self.current().offset;
        let cond = self.binary(0)?;
        if !self.eat_punct("?") {
            return Ok(cond);
        }
        let then = mung_stack::with_stack(|| self.expression())?;
        self.expect_punct(":")?;
        let otherwise = mung_stack::with_stack(|| self.expression())?;
        Ok(self.alloc(
            Expr::Ternary {
                cond,
                then,
                otherwise,
            },
            offset,
        ))
    }

    /// Infix operator at the cursor, if any.
    fn peek_binary(&self) -> Option<BinaryOp> {
        match &self.current().tok {
            Tok::Punct(p) => Some(match *p {
                "**" => BinaryOp::Pow,
                "*" => BinaryOp::Mul,
                "/" => BinaryOp::Div,
                "%" => BinaryOp::Rem,
                "+" => BinaryOp::Add,
                "-" => BinaryOp::Sub,
                "==" => BinaryOp::Eq,
                "!=" => BinaryOp::NotEq,
                "<" => BinaryOp::Lt,
                "<=" => BinaryOp::LtEq,
                ">" => BinaryOp::Gt,
                ">=" => BinaryOp::GtEq,
                "&&" => BinaryOp::And,
                "||" => BinaryOp::Or,
                "??" => BinaryOp::Coalesce,
                _ => return None,
            }),
            Tok::Ident(word) => BinaryOp::from_word(word),
            _ => None,
        }
    }

    fn binary(&mut self, min_prec: u8) -> Result<ExprId, CompileError> {
        let mut left = self.unary()?;
        while let Some(op) = self.peek_binary() {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            let offset = self.advance().offset;
            // `**` is right associative.
            let next = if op == BinaryOp::Pow { prec } else { prec + 1 };
            let right = mung_stack::with_stack(|| self.binary(next))?;
            left = self.alloc(Expr::Binary { op, left, right }, offset);
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<ExprId, CompileError> {
        let offset = self.current().offset;
        let op = match &self.current().tok {
            Tok::Punct("-") => Some(UnaryOp::Neg),
            Tok::Punct("!") => Some(UnaryOp::Not),
            Tok::Ident(word) if word == "not" => Some(UnaryOp::Not),
            _ => None,
        };
        let Some(op) = op else {
            return self.postfix();
        };
        self.advance();
        let operand = mung_stack::with_stack(|| self.binary(UNARY_PRECEDENCE))?;
        Ok(self.alloc(Expr::Unary { op, operand }, offset))
    }

    fn postfix(&mut self) -> Result<ExprId, CompileError> {
        let mut expr = self.primary()?;
        loop {
            let offset = self.current().offset;
            if self.eat_punct(".") || self.check_punct("?.") {
                let optional = self.eat_punct("?.");
                let Tok::Ident(field) = self.current().tok.clone() else {
                    return Err(self.unexpected("field name"));
                };
                self.advance();
                expr = self.alloc(
                    Expr::Member {
                        object: expr,
                        field,
                        optional,
                    },
                    offset,
                );
            } else if self.eat_punct("[") {
                let index = mung_stack::with_stack(|| self.expression())?;
                self.expect_punct("]")?;
                expr = self.alloc(
                    Expr::Index {
                        object: expr,
                        index,
                    },
                    offset,
                );
            } else if self.eat_punct("(") {
                let args = self.list_until(")")?;
                expr = self.alloc(Expr::Call { callee: expr, args }, offset);
            } else {
                return Ok(expr);
            }
        }
    }

    /// Comma-separated expressions up to `close`, trailing comma allowed.
    fn list_until(&mut self, close: &str) -> Result<Vec<ExprId>, CompileError> {
        let mut items = Vec::new();
        while !self.eat_punct(close) {
            items.push(mung_stack::with_stack(|| self.expression())?);
            if !self.eat_punct(",") {
                self.expect_punct(close)?;
                break;
            }
        }
        Ok(items)
    }

    fn primary(&mut self) -> Result<ExprId, CompileError> {
        if matches!(self.current().tok, Tok::Eof | Tok::Punct(")" | "]" | "}" | "," | ":")) {
            return Err(self.unexpected("expression"));
        }
        let Lexed { tok, offset } = self.advance();
        let expr = match tok {
            Tok::Int(n) => Expr::Int(n),
            Tok::Float(n) => Expr::Float(n),
            Tok::Str(s) => Expr::Str(s),
            Tok::Ident(name) => match name.as_str() {
                "nil" | "null" => Expr::Nil,
                "true" => Expr::Bool(true),
                "false" => Expr::Bool(false),
                _ => Expr::Ident(name),
            },
            Tok::Punct("(") => {
                let inner = mung_stack::with_stack(|| self.expression())?;
                self.expect_punct(")")?;
                return Ok(inner);
            }
            Tok::Punct("[") => Expr::List(self.list_until("]")?),
            Tok::Punct("{") => Expr::Map(self.map_entries()?),
            Tok::Punct(_) | Tok::Eof => {
                self.pos -= 1;
                return Err(self.unexpected("expression"));
            }
        };
        Ok(self.alloc(expr, offset))
    }

    fn map_entries(&mut self) -> Result<Vec<(String, ExprId)>, CompileError> {
        let mut entries = Vec::new();
        while !self.eat_punct("}") {
            let key = match &self.current().tok {
                Tok::Ident(name) | Tok::Str(name) => name.clone(),
                Tok::Int(n) => n.to_string(),
                _ => return Err(self.unexpected("map key")),
            };
            self.advance();
            self.expect_punct(":")?;
            let value = mung_stack::with_stack(|| self.expression())?;
            entries.push((key, value));
            if !self.eat_punct(",") {
                self.expect_punct("}")?;
                break;
            }
        }
        Ok(entries)
    }
}
