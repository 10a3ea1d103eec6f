//! Parsing through the facade.

use std::io;

use mungc::{Ast, AstValue, Error, ParseErrorKind, ParseOptions, ValueKind};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::common::parse;

#[test]
fn documents_parse_in_order() {
    let ast = parse("name : \"svc\"; port : 8080; config : { debug : true }; add x y : x + y");
    let names: Vec<_> = ast.namespaces().iter().map(|ns| ns.name()).collect();
    assert_eq!(names, vec!["name", "port", "config", "add"]);
    let kinds: Vec<_> = ast.namespaces().iter().map(|ns| ns.value().kind()).collect();
    assert_eq!(
        kinds,
        vec![ValueKind::String, ValueKind::Number, ValueKind::Tuple, ValueKind::Expr]
    );
}

#[test]
fn syntax_errors_carry_a_snippet() {
    let err = mungc::parse("a : 1 b : 2", &ParseOptions::default()).unwrap_err();
    let Error::Parse(err) = err else {
        panic!("expected a parse error, got {err:?}");
    };
    assert!(matches!(err.kind, ParseErrorKind::Syntax { .. }));
    assert_eq!(err.pos.line, 1);
    assert_eq!(err.pos.column, 7);
    assert!(err.to_string().contains("^"));
}

#[test]
fn depth_guard() {
    let nested = |depth: usize| {
        let mut source = String::new();
        for i in 0..depth {
            source.push_str(&format!("n{i} : "));
        }
        source.push('1');
        source
    };
    let options = ParseOptions::default().with_max_recursion_depth(5);
    assert!(mungc::parse(&nested(5), &options).is_ok());
    let err = mungc::parse(&nested(6), &options).unwrap_err();
    assert!(matches!(
        err,
        Error::Parse(ref e) if matches!(e.kind, ParseErrorKind::MaxDepthExceeded { limit: 5, .. })
    ));
}

#[test]
fn ambiguous_blocks_are_rejected() {
    let err = mungc::parse("config : { a : 1 }.a", &ParseOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::Parse(ref e) if matches!(e.kind, ParseErrorKind::AmbiguousParse { .. })
    ));
}

struct BrokenPipe;

impl io::Read for BrokenPipe {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
    }
}

#[test]
fn read_failures_are_read_input_errors() {
    let err = mungc::parse_reader(BrokenPipe, &ParseOptions::default()).unwrap_err();
    assert_eq!(
        err,
        Error::ReadInput {
            path: None,
            message: "pipe closed".to_string()
        }
    );

    let err = mungc::load("/definitely/not/here.mung", &ParseOptions::default()).unwrap_err();
    assert!(matches!(err, Error::ReadInput { path: Some(_), .. }));
    assert!(err.to_string().contains("/definitely/not/here.mung"));
}

#[test]
fn readers_parse_like_strings() {
    let source = "a : 1; b : { c : \"x\" }";
    let from_reader = mungc::parse_reader(source.as_bytes(), &ParseOptions::default()).unwrap();
    assert_eq!(from_reader, parse(source));
}

fn name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,5}(-[a-z]{1,3})?".prop_filter("keyword", |s| s != "true" && s != "false")
}

fn scalar() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<i32>().prop_map(|n| n.to_string()),
        any::<bool>().prop_map(|b| b.to_string()),
        "[a-z ]{0,8}".prop_map(|s| format!("{s:?}")),
        "[a-z]{1,4}".prop_map(|s| format!("{{{{ {s} + 1 }}}}")),
    ]
}

fn entry() -> impl Strategy<Value = String> {
    let leaf = (name(), scalar()).prop_map(|(n, v)| format!("{n} : {v}"));
    leaf.prop_recursive(3, 16, 4, |inner| {
        (name(), prop::collection::vec(inner, 0..4))
            .prop_map(|(n, entries)| format!("{n} : {{ {} }}", entries.join("; ")))
    })
}

/// Names, parameters and value kinds, ignoring positions and layout.
fn shape(value: &AstValue) -> String {
    match value.as_tuple() {
        Some(tuple) => {
            let entries: Vec<String> = tuple
                .values()
                .iter()
                .map(|v| match v.as_namespace() {
                    Some(ns) => format!("{}={}", ns.signature(), shape(ns.value())),
                    None => shape(v),
                })
                .collect();
            format!("{{{}}}", entries.join(","))
        }
        None => value.kind().to_string(),
    }
}

fn document_shape(ast: &Ast) -> Vec<String> {
    ast.namespaces()
        .iter()
        .map(|ns| format!("{}={}", ns.signature(), shape(ns.value())))
        .collect()
}

proptest! {
    #[test]
    fn formatted_documents_reparse(entries in prop::collection::vec(entry(), 0..5)) {
        let ast = parse(&entries.join(";\n"));
        let printed = ast.to_string();
        let again = parse(&printed);
        prop_assert_eq!(document_shape(&again), document_shape(&ast));
        prop_assert_eq!(again.to_string(), printed);
    }
}
