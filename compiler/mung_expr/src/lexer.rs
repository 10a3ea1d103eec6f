//! Expression tokenizer.

use crate::error::{CompileError, CompileErrorKind};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Tok {
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),
    /// Operator or delimiter, e.g. `(`, `?.`, `**`.
    Punct(&'static str),
    Eof,
}

impl Tok {
    pub(crate) fn describe(&self) -> String {
        match self {
            Tok::Ident(name) => format!("`{name}`"),
            Tok::Int(n) => format!("`{n}`"),
            Tok::Float(n) => format!("`{n}`"),
            Tok::Str(_) => "string".to_string(),
            Tok::Punct(p) => format!("`{p}`"),
            Tok::Eof => "end of expression".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Lexed {
    pub tok: Tok,
    pub offset: u32,
}

/// Multi-character operators first so the longest match wins.
const PUNCT: &[&str] = &[
    "**", "==", "!=", "<=", ">=", "&&", "||", "??", "?.", "(", ")", "[", "]", "{", "}", ",", ":",
    ".", "+", "-", "*", "/", "%", "<", ">", "!", "?",
];

pub(crate) fn tokenize(source: &str) -> Result<Vec<Lexed>, CompileError> {
    let mut lexer = Lexer {
        src: source,
        bytes: source.as_bytes(),
        pos: 0,
    };
    let mut out = Vec::new();
    loop {
        lexer.skip_trivia()?;
        let offset = lexer.offset();
        let Some(tok) = lexer.next_token()? else {
            out.push(Lexed {
                tok: Tok::Eof,
                offset,
            });
            return Ok(out);
        };
        out.push(Lexed { tok, offset });
    }
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn offset(&self) -> u32 {
        u32::try_from(self.pos).unwrap_or(u32::MAX)
    }

    fn error(&self, at: usize, message: impl Into<String>) -> CompileError {
        CompileError::new(
            CompileErrorKind::Syntax {
                message: message.into(),
            },
            u32::try_from(at).unwrap_or(u32::MAX),
        )
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.pos + n).copied()
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_trivia(&mut self) -> Result<(), CompileError> {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();
            if trimmed.starts_with("//") {
                self.pos += trimmed.find('\n').unwrap_or(trimmed.len());
            } else if trimmed.starts_with("/*") {
                let Some(end) = trimmed[2..].find("*/") else {
                    return Err(self.error(self.pos, "unterminated comment"));
                };
                self.pos += end + 4;
            } else {
                return Ok(());
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Tok>, CompileError> {
        let Some(c) = self.rest().chars().next() else {
            return Ok(None);
        };
        if c.is_alphabetic() || c == '_' || c == '$' {
            return Ok(Some(self.ident()));
        }
        if c.is_ascii_digit() || (c == '.' && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()))
        {
            return self.number().map(Some);
        }
        if c == '"' || c == '\'' {
            return self.string().map(Some);
        }
        // `?.5` is a ternary on a float, not optional member access.
        if self.rest().starts_with("?.") && self.peek_at(2).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
            return Ok(Some(Tok::Punct("?")));
        }
        for p in PUNCT {
            if self.rest().starts_with(p) {
                self.pos += p.len();
                return Ok(Some(Tok::Punct(p)));
            }
        }
        Err(self.error(self.pos, format!("unexpected character `{c}`")))
    }

    fn ident(&mut self) -> Tok {
        let start = self.pos;
        let len = self
            .rest()
            .char_indices()
            .find(|&(_, c)| !(c.is_alphanumeric() || c == '_' || c == '$'))
            .map_or(self.rest().len(), |(i, _)| i);
        self.pos += len;
        Tok::Ident(self.src[start..self.pos].to_string())
    }

    fn number(&mut self) -> Result<Tok, CompileError> {
        let start = self.pos;
        if self.peek() == Some(b'0') {
            let radix = match self.peek_at(1) {
                Some(b'x' | b'X') => Some(16),
                Some(b'o' | b'O') => Some(8),
                Some(b'b' | b'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.pos += 2;
                let digits_start = self.pos;
                while self
                    .peek()
                    .is_some_and(|b| b == b'_' || char::from(b).is_digit(radix))
                {
                    self.pos += 1;
                }
                let digits: String = self.src[digits_start..self.pos]
                    .chars()
                    .filter(|&c| c != '_')
                    .collect();
                return i64::from_str_radix(&digits, radix)
                    .map(Tok::Int)
                    .map_err(|_| self.error(start, "invalid integer literal"));
            }
        }

        let mut is_float = false;
        self.digits();
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
            is_float = true;
            self.pos += 1;
            self.digits();
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let sign = usize::from(matches!(self.peek_at(1), Some(b'+' | b'-')));
            if self.peek_at(1 + sign).is_some_and(|b| b.is_ascii_digit()) {
                is_float = true;
                self.pos += 1 + sign;
                self.digits();
            }
        }
        let text: String = self.src[start..self.pos]
            .chars()
            .filter(|&c| c != '_')
            .collect();
        if is_float {
            text.parse::<f64>()
                .map(Tok::Float)
                .map_err(|_| self.error(start, "invalid float literal"))
        } else {
            text.parse::<i64>()
                .map(Tok::Int)
                .map_err(|_| self.error(start, "integer literal out of range"))
        }
    }

    fn digits(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_digit() || b == b'_') {
            self.pos += 1;
        }
    }

    fn string(&mut self) -> Result<Tok, CompileError> {
        let start = self.pos;
        let Some(quote) = self.rest().chars().next() else {
            return Err(self.error(start, "unterminated string"));
        };
        self.pos += 1;
        let mut out = String::new();
        loop {
            let Some(c) = self.rest().chars().next() else {
                return Err(self.error(start, "unterminated string"));
            };
            self.pos += c.len_utf8();
            if c == quote {
                return Ok(Tok::Str(out));
            }
            if c != '\\' {
                out.push(c);
                continue;
            }
            let Some(esc) = self.rest().chars().next() else {
                return Err(self.error(start, "unterminated string"));
            };
            self.pos += esc.len_utf8();
            match esc {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                '0'..='7' => {
                    let mut value = esc.to_digit(8).unwrap_or(0);
                    for _ in 0..2 {
                        match self.peek().and_then(|b| char::from(b).to_digit(8)) {
                            Some(d) => {
                                value = value * 8 + d;
                                self.pos += 1;
                            }
                            None => break,
                        }
                    }
                    out.push(self.scalar(value, start)?);
                }
                'x' => {
                    let value = self.hex(2, start)?;
                    out.push(self.scalar(value, start)?);
                }
                'u' => {
                    let value = self.hex(4, start)?;
                    out.push(self.scalar(value, start)?);
                }
                '\\' | '"' | '\'' => out.push(esc),
                other => {
                    return Err(self.error(self.pos - 2, format!("unknown escape `\\{other}`")))
                }
            }
        }
    }

    fn hex(&mut self, width: usize, start: usize) -> Result<u32, CompileError> {
        let digits = self
            .src
            .get(self.pos..self.pos + width)
            .filter(|d| d.bytes().all(|b| b.is_ascii_hexdigit()));
        let value = digits.and_then(|d| u32::from_str_radix(d, 16).ok());
        match value {
            Some(v) => {
                self.pos += width;
                Ok(v)
            }
            None => Err(self.error(start, "malformed hex escape")),
        }
    }

    fn scalar(&self, value: u32, start: usize) -> Result<char, CompileError> {
        char::from_u32(value).ok_or_else(|| self.error(start, "escape is not a Unicode scalar"))
    }
}
