//! Literal text cooking shared by the lexer, the evaluator and the
//! construction API.
//!
//! Tokens keep their source text verbatim. Turning that text into a value
//! happens here, so parsed and programmatically built literals go through
//! the same code.

use std::fmt::Write;

/// A cooked numeric literal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

/// Parse numeric literal text.
///
/// Accepts an optional sign, `_` digit separators, `0x`/`0o`/`0b`
/// prefixes, decimals and scientific notation. Integer parsing is tried
/// first; text that does not fit an `i64` falls back to a float.
pub fn parse_number(text: &str) -> Option<Number> {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    let (negative, digits) = match cleaned.as_bytes().first() {
        Some(b'-') => (true, &cleaned[1..]),
        Some(b'+') => (false, &cleaned[1..]),
        _ => (false, cleaned.as_str()),
    };
    if digits.is_empty() {
        return None;
    }

    let radix = match digits.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let magnitude = i64::from_str_radix(&digits[2..], radix).ok()?;
        return Some(Number::Int(if negative { -magnitude } else { magnitude }));
    }

    if !digits.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        // Rejects `inf`, `NaN` and friends that `f64::from_str` would accept.
        return None;
    }
    if let Ok(n) = cleaned.parse::<i64>() {
        return Some(Number::Int(n));
    }
    cleaned.parse::<f64>().ok().map(Number::Float)
}

/// `true`/`false` only.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Cook a string literal, quotes included.
///
/// Escapes: `\n \t \r \\ \" \xHH \uHHHH \NNN` (three octal digits).
/// Returns `None` for a missing quote, an unknown escape, or an escape that
/// does not name a valid character.
pub fn unescape(raw: &str) -> Option<String> {
    let content = raw.strip_prefix('"')?.strip_suffix('"')?;
    if !content.contains('\\') {
        return Some(content.to_string());
    }

    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            'x' => out.push(take_hex(&mut chars, 2)?),
            'u' => out.push(take_hex(&mut chars, 4)?),
            d @ '0'..='7' => {
                let mut code = d.to_digit(8)?;
                for _ in 0..2 {
                    code = code * 8 + chars.next()?.to_digit(8)?;
                }
                out.push(char::from_u32(code)?);
            }
            _ => return None,
        }
    }
    Some(out)
}

fn take_hex(chars: &mut impl Iterator<Item = char>, count: usize) -> Option<char> {
    let mut code = 0u32;
    for _ in 0..count {
        code = code * 16 + chars.next()?.to_digit(16)?;
    }
    char::from_u32(code)
}

/// Quote and escape `s` so that [`unescape`] returns it unchanged.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render a float so that it reads back as a float, never as an integer.
pub fn float_text(n: f64) -> String {
    let text = format!("{n:?}");
    if text.contains(['.', 'e', 'E']) || !n.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}
