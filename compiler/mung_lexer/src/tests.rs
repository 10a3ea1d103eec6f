use super::*;
use mung_ir::Position;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn tokens_carry_text_and_positions() {
    let tokens = lex("config : {\n  port : 8080,\n}");
    let summary: Vec<(TokenKind, &str, u32, u32)> = tokens
        .iter()
        .map(|t| (t.kind, t.text.as_str(), t.pos.line, t.pos.column))
        .collect();
    assert_eq!(
        summary,
        vec![
            (TokenKind::Ident, "config", 1, 1),
            (TokenKind::Colon, ":", 1, 8),
            (TokenKind::LBrace, "{", 1, 10),
            (TokenKind::Ident, "port", 2, 3),
            (TokenKind::Colon, ":", 2, 8),
            (TokenKind::Number, "8080", 2, 10),
            (TokenKind::Comma, ",", 2, 14),
            (TokenKind::RBrace, "}", 3, 1),
            (TokenKind::Eof, "", 3, 2),
        ]
    );
}

#[test]
fn expression_text_is_the_trimmed_body() {
    let tokens = lex("x : {{  a + b\n }};");
    assert_eq!(tokens[2].kind, TokenKind::Expr);
    assert_eq!(tokens[2].text, "a + b");
    assert_eq!(tokens[2].span().len(), 13);
}

#[test]
fn empty_source_is_just_eof() {
    let tokens = lex("");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Eof);
    assert_eq!(tokens[0].pos, Position::new(0, 1, 1));
}

#[test]
fn identifier_check() {
    assert!(is_identifier("log-pretty"));
    assert!(is_identifier("a.b"));
    assert!(!is_identifier("true"));
    assert!(!is_identifier("a b"));
    assert!(!is_identifier("1a"));
    assert!(!is_identifier(""));
}

proptest! {
    #[test]
    fn lexing_never_panics_and_is_ordered(src in "\\PC*") {
        let tokens = lex(&src);
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        let mut last_end = 0;
        for tok in &tokens {
            prop_assert!(tok.pos.offset >= last_end);
            prop_assert!(tok.end >= tok.pos.offset);
            prop_assert!(tok.pos.line >= 1 && tok.pos.column >= 1);
            last_end = tok.end;
        }
        prop_assert!(last_end as usize <= src.len());
    }

    #[test]
    fn structured_input_never_panics(
        src in proptest::collection::vec(
            prop_oneof![
                Just("{"), Just("}"), Just("{{"), Just("}}"), Just(":"), Just(";"),
                Just("\""), Just("'"), Just("..."), Just("/*"), Just("*/"), Just("#"),
                Just("a-b"), Just("-1"), Just("0x"), Just(" "), Just("\n"),
            ],
            0..40,
        )
    ) {
        let src = src.concat();
        let tokens = lex(&src);
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }
}
