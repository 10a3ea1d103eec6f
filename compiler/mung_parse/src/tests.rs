use std::io;

use mung_ir::{define_namespace, Ast, Position, TokenKind, Value, ValueKind};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

fn ok(source: &str) -> Ast {
    match parse(source, &ParseOptions::default()) {
        Ok(ast) => ast,
        Err(err) => panic!("unexpected parse error:\n{err}"),
    }
}

fn err(source: &str) -> ParseError {
    err_with(source, &ParseOptions::default())
}

fn err_with(source: &str, options: &ParseOptions) -> ParseError {
    match parse(source, options) {
        Ok(ast) => panic!("expected an error, parsed:\n{ast}"),
        Err(err) => err,
    }
}

fn value<'a>(ast: &'a Ast, name: &str) -> &'a Value {
    ast.namespace(name)
        .unwrap_or_else(|| panic!("no namespace `{name}`"))
        .value()
}

fn text(value: &Value) -> &str {
    value.token().map_or("", |t| t.text.as_str())
}

#[test]
fn scalar_namespaces() {
    let ast = ok("name : \"mung\"; port : 8080; ratio : -0.5, debug : true;\nhost : localhost");
    let kinds: Vec<(&str, ValueKind, &str)> = ast
        .namespaces()
        .iter()
        .map(|ns| (ns.name(), ns.value().kind(), text(ns.value())))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("name", ValueKind::String, "\"mung\""),
            ("port", ValueKind::Number, "8080"),
            ("ratio", ValueKind::Number, "-0.5"),
            ("debug", ValueKind::Boolean, "true"),
            ("host", ValueKind::Identifier, "localhost"),
        ]
    );
}

#[test]
fn newline_is_not_a_separator() {
    let e = err("a : { b : 1 }\nc : 2");
    assert!(matches!(e.kind, ParseErrorKind::Syntax { ref found, .. } if found == "`c`"));
    assert_eq!(e.pos, Position::new(14, 2, 1));
}

#[test]
fn missing_separator_after_a_value() {
    for (source, col) in [
        ("a : 1 b : 2", 7),
        ("debug : true\nhost : localhost", 1),
        ("a : x + 1 b : 2", 11),
        ("a : (1 + 2) f x : x", 13),
    ] {
        let e = err(source);
        assert!(
            matches!(e.kind, ParseErrorKind::Syntax { ref expected, .. } if expected == &["`;`", "`,`"]),
            "{source}: {e}"
        );
        assert_eq!(e.pos.column, col, "{source}");
    }
}

#[test]
fn ternary_is_not_a_definition() {
    let ast = ok("pick : flag ? yes : no; both : a in b ? x : y");
    assert_eq!(text(value(&ast, "pick")), "flag ? yes : no");
    assert_eq!(text(value(&ast, "both")), "a in b ? x : y");
}

#[test]
fn empty_manifest() {
    assert!(ok("").is_empty());
    assert!(ok("  // nothing here\n# or here\n/* at all */").is_empty());
}

#[test]
fn trailing_separator() {
    assert_eq!(ok("a : 1;").len(), 1);
    assert_eq!(ok("a : 1, b : 2,").len(), 2);
    assert!(matches!(err("a : 1;;").kind, ParseErrorKind::Syntax { .. }));
}

#[test]
fn nested_namespaces() {
    let ast = ok("a : b : c : 1");
    let b = value(&ast, "a").as_namespace().cloned();
    let b = b.as_deref().map(|b| (b.name(), b.value().kind()));
    assert_eq!(b, Some(("b", ValueKind::Namespace)));
}

#[test]
fn blocks() {
    let ast = ok("config : {\n  host : \"localhost\";\n  port : 8080;\n  tls : { on : false }\n}");
    let block = value(&ast, "config").as_tuple().cloned();
    let block = block.as_deref().map(|t| {
        t.namespaces()
            .map(|ns| ns.name().to_string())
            .collect::<Vec<_>>()
    });
    assert_eq!(
        block,
        Some(vec!["host".to_string(), "port".to_string(), "tls".to_string()])
    );

    let empty = ok("nothing : {}");
    assert!(value(&empty, "nothing").as_tuple().is_some_and(|t| t.is_empty()));
}

#[test]
fn block_entries_need_separators() {
    // `1 c : 2` is captured as one bare expression and fails only when compiled.
    assert!(parse("a : { b : 1 c : 2 }", &ParseOptions::default()).is_ok());
    let e = err("a : { b : {{ 1 }} c : 2 }");
    assert!(matches!(e.kind, ParseErrorKind::Syntax { ref found, .. } if found == "`c`"));
}

#[test]
fn parameters() {
    let ast = ok("add x y : {{ x + y }}; sum ...nums : {{ nums }}");
    let add = ast.namespace("add").map(|ns| ns.signature());
    let sum = ast.namespace("sum").map(|ns| ns.signature());
    assert_eq!(add.as_deref(), Some("add x y"));
    assert_eq!(sum.as_deref(), Some("sum ...nums"));
    assert_eq!(text(value(&ast, "add")), "x + y");
}

#[test]
fn variadic_must_be_last() {
    let e = err("f ...a b : 1");
    assert_eq!(
        e.kind,
        ParseErrorKind::VariadicNotLast {
            namespace: "f".to_string(),
            param: "a".to_string(),
        }
    );
    assert_eq!(e.pos, Position::new(7, 1, 8));
}

#[test]
fn missing_colon() {
    let e = err("x 1 : 2");
    assert_eq!(
        e.kind,
        ParseErrorKind::Syntax {
            expected: vec!["`:`"],
            found: "`1`".to_string(),
        }
    );
}

#[test]
fn missing_value() {
    let e = err("x : ;");
    assert_eq!(
        e.kind,
        ParseErrorKind::Syntax {
            expected: vec!["value"],
            found: "`;`".to_string(),
        }
    );
    assert!(matches!(err("x : )").kind, ParseErrorKind::Syntax { .. }));
    let e = err("x :");
    assert!(matches!(e.kind, ParseErrorKind::Syntax { ref found, .. } if found == "end of input"));
}

#[test]
fn depth_limit() {
    let options = ParseOptions::default().with_max_recursion_depth(3);
    assert!(parse("a : b : c : 1", &options).is_ok());

    let e = err_with("a : b : c : d : 1", &options);
    assert_eq!(
        e.kind,
        ParseErrorKind::MaxDepthExceeded {
            limit: 3,
            chain: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        }
    );
    assert_eq!(e.pos, Position::new(12, 1, 13));
}

#[test]
fn depth_counts_blocks_and_resets_per_namespace() {
    let options = ParseOptions::default().with_max_recursion_depth(2);
    let e = err_with("a : { b : { c : 1 } }", &options);
    assert!(matches!(
        e.kind,
        ParseErrorKind::MaxDepthExceeded { ref chain, .. } if chain == &["a", "b", "c"]
    ));
    assert!(parse("a : b : 1; c : d : 1; e : { f : 1 }", &options).is_ok());
}

#[test]
fn deep_nesting_within_the_default_limit() {
    let depth = mung_ir::DEFAULT_MAX_RECURSION_DEPTH;
    let mut source = String::new();
    for i in 0..depth {
        source.push_str(&format!("n{i} : "));
    }
    source.push('1');
    assert!(parse(&source, &ParseOptions::default()).is_ok());

    source.insert_str(0, "top : ");
    assert!(matches!(
        err(&source).kind,
        ParseErrorKind::MaxDepthExceeded { limit, .. } if limit == depth
    ));
}

#[test]
fn block_followed_by_operator_is_ambiguous() {
    let e = err("config : { a : 1 }.a");
    assert_eq!(
        e.kind,
        ParseErrorKind::AmbiguousParse {
            found: "`.`".to_string()
        }
    );
    assert_eq!(e.pos, Position::new(9, 1, 10));
    assert!(e.to_string().contains("{{ }}"));
}

#[test]
fn bare_expressions() {
    let ast = ok(concat!(
        "sum : 1 + 2;\n",
        "scaled : (a + 1) * 3;\n",
        "list : [1, 2, 3];\n",
        "pick : ok ? \"yes\" : \"no\";\n",
        "call : f(1, 2);\n",
        "map : {\"a\": 1}.a;\n",
        "neg : !flag",
    ));
    let exprs: Vec<(&str, &str)> = ast
        .namespaces()
        .iter()
        .map(|ns| {
            assert_eq!(ns.value().kind(), ValueKind::Expr, "{}", ns.name());
            (ns.name(), text(ns.value()))
        })
        .collect();
    assert_eq!(
        exprs,
        vec![
            ("sum", "1 + 2"),
            ("scaled", "(a + 1) * 3"),
            ("list", "[1, 2, 3]"),
            ("pick", "ok ? \"yes\" : \"no\""),
            ("call", "f(1, 2)"),
            ("map", "{\"a\": 1}.a"),
            ("neg", "!flag"),
        ]
    );
}

#[test]
fn bare_expression_inside_block() {
    let ast = ok("a : { b : 1 + 2; c : 3 }");
    let block = value(&ast, "a").as_tuple().cloned();
    let b = block
        .as_deref()
        .and_then(|t| t.find("b"))
        .map(|b| text(b.value()).to_string());
    assert_eq!(b.as_deref(), Some("1 + 2"));
}

#[test]
fn unbalanced_bare_expressions() {
    let e = err("x : (1 + 2");
    assert_eq!(
        e.kind,
        ParseErrorKind::Syntax {
            expected: vec!["`)`"],
            found: "end of input".to_string(),
        }
    );
    assert_eq!(e.pos, Position::new(4, 1, 5));

    let e = err("x : (1]");
    assert_eq!(
        e.kind,
        ParseErrorKind::Syntax {
            expected: vec!["`)`"],
            found: "`]`".to_string(),
        }
    );
}

#[test]
fn expression_literal_must_end_the_value() {
    let e = err("x : {{ 1 }} 2");
    assert!(matches!(e.kind, ParseErrorKind::Syntax { ref found, .. } if found == "`2`"));
}

#[test]
fn invalid_literals() {
    let e = err("x : 0x");
    assert_eq!(
        e.kind,
        ParseErrorKind::InvalidLiteral {
            kind: TokenKind::Number,
            text: "0x".to_string(),
        }
    );
    let e = err(r#"x : "\q""#);
    assert!(matches!(
        e.kind,
        ParseErrorKind::InvalidLiteral { kind: TokenKind::Str, .. }
    ));
}

#[test]
fn unterminated_literals() {
    let e = err("x : \"abc");
    assert!(matches!(e.kind, ParseErrorKind::Syntax { ref found, .. } if found == "unterminated string"));
    let e = err("x : {{ 1 + ");
    assert!(matches!(e.kind, ParseErrorKind::Syntax { ref found, .. } if found == "unterminated expression literal"));
}

#[test]
fn eager_compilation() {
    let options = ParseOptions::default().with_compile_expressions(true);
    let ast = match parse("x : {{ 1 + 2 }}; y : a * 2", &options) {
        Ok(ast) => ast,
        Err(e) => panic!("{e}"),
    };
    for name in ["x", "y"] {
        assert!(matches!(value(&ast, name), Value::Expr(e) if e.program().is_some()));
    }

    let e = err_with("x : 1;\ny : {{ 1 + }}", &options);
    assert!(matches!(
        e.kind,
        ParseErrorKind::InvalidExpression { ref source, .. } if source == "1 +"
    ));
    assert_eq!(e.pos.line, 2);

    // Lazy by default.
    let ast = ok("y : {{ 1 + }}");
    assert!(matches!(value(&ast, "y"), Value::Expr(e) if e.program().is_none()));
}

struct FailingReader;

impl io::Read for FailingReader {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("boom"))
    }
}

#[test]
fn parse_from_reader() {
    let ast = parse_reader("a : 1".as_bytes(), &ParseOptions::default());
    assert_eq!(ast.map(|a| a.len()), Ok(1));

    let e = parse_reader(FailingReader, &ParseOptions::default());
    assert_eq!(
        e.map(|a| a.len()),
        Err(ParseError::unlocated(ParseErrorKind::ReadInput {
            message: "boom".to_string()
        }))
    );
}

#[test]
fn options_travel_with_the_ast() {
    let options = ParseOptions::default().with_max_recursion_depth(7);
    let ast = parse("a : 1", &options);
    assert_eq!(ast.map(|a| a.options().max_recursion_depth), Ok(7));
}

// Generated documents

fn name() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,6}".prop_filter("keyword", |s| s != "true" && s != "false")
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::new_int),
        (-1.0e9..1.0e9f64).prop_map(Value::new_float),
        any::<bool>().prop_map(Value::new_bool),
        "\\PC{0,12}".prop_map(|s| Value::new_string(&s)),
        name().prop_map(|s| Value::new_identifier(&s)),
        Just(Value::new_expr("a + 1")),
    ]
}

fn tree() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec((name(), inner.clone()), 0..4).prop_map(|entries| {
                Value::new_tuple(
                    entries
                        .into_iter()
                        .filter_map(|(n, v)| define_namespace(&n, &[], v).ok())
                        .map(Value::new_namespace)
                        .collect(),
                )
            }),
            (name(), inner).prop_filter_map("namespace", |(n, v)| {
                define_namespace(&n, &[], v).ok().map(Value::new_namespace)
            }),
        ]
    })
}

fn document() -> impl Strategy<Value = Ast> {
    prop::collection::vec((name(), prop::collection::vec(name(), 0..3), tree()), 0..5)
        .prop_map(|defs| {
            let mut ast = Ast::default();
            for (n, params, v) in defs {
                let params: Vec<&str> = params.iter().map(String::as_str).collect();
                if let Ok(ns) = define_namespace(&n, &params, v) {
                    ast.define(ns);
                }
            }
            ast
        })
}

proptest! {
    #[test]
    fn formatted_documents_reparse(ast in document()) {
        let printed = ast.to_string();
        let reparsed = parse(&printed, &ParseOptions::default());
        prop_assert!(reparsed.is_ok(), "{}\n{:?}", printed, reparsed);
        let reparsed = reparsed.map(|a| a.to_string()).unwrap_or_default();
        prop_assert_eq!(reparsed, printed);
    }

    #[test]
    fn parsing_never_panics(src in "\\PC{0,64}") {
        let _ = parse(&src, &ParseOptions::default());
    }
}
