use crate::{compile, Expr, ExprId, Patch, Program};
use pretty_assertions::assert_eq;

fn root(source: &str) -> (Program, Expr) {
    let program = compile(source).unwrap();
    let root = program.get(program.root()).clone();
    (program, root)
}

#[test]
fn hyphenated_name_parses_as_subtraction() {
    let (program, root) = root("log-pretty");
    let Expr::Binary { op, left, right } = root else {
        panic!("expected binary, got {root:?}");
    };
    assert_eq!(op, crate::BinaryOp::Sub);
    assert_eq!(program.get(left).as_ident(), Some("log"));
    assert_eq!(program.get(right).as_ident(), Some("pretty"));
}

#[test]
fn member_binds_tighter_than_subtraction() {
    let (program, root) = root("config.log - pretty");
    let Expr::Binary { left, .. } = root else {
        panic!("expected binary");
    };
    assert_eq!(program.path(left), Some(vec!["config", "log"]));
}

#[test]
fn power_is_right_associative_and_binds_tighter_than_negation() {
    let (program, root) = root("-2 ** 3 ** 2");
    let Expr::Unary { operand, .. } = root else {
        panic!("expected unary");
    };
    let Expr::Binary { right, .. } = program.get(operand) else {
        panic!("expected binary");
    };
    assert!(matches!(program.get(*right), Expr::Binary { .. }));
}

#[test]
fn free_names_skip_members_and_keys() {
    let program = compile(r#"a + b.c + f(a, {k: d})["x"]"#).unwrap();
    assert_eq!(program.free_names(), vec!["a", "b", "f", "d"]);
}

#[test]
fn post_order_visits_children_first() {
    let program = compile("a + b").unwrap();
    let order = program.post_order();
    assert_eq!(order.len(), 3);
    assert_eq!(*order.last().unwrap(), program.root());
}

struct Rename;

impl Patch for Rename {
    fn visit(&mut self, program: &mut Program, id: ExprId) {
        if program.get(id).as_ident() == Some("old") {
            program.set(id, Expr::Ident("new".to_string()));
        }
    }
}

#[test]
fn patch_rewrites_nodes_in_place() {
    let mut program = compile("old + old.x").unwrap();
    program.patch(&mut Rename);
    assert_eq!(program.free_names(), vec!["new"]);
    // Source text is untouched.
    assert_eq!(program.source(), "old + old.x");
}

#[test]
fn syntax_errors_carry_offsets() {
    let err = compile("1 + ").unwrap_err();
    assert_eq!(err.offset, 4);
    let err = compile("a b").unwrap_err();
    assert_eq!(err.offset, 2);
    assert!(compile("\"open").is_err());
    assert!(compile("(1").is_err());
}

#[test]
fn literals_and_comments() {
    let (_, root) = root("0x1F // trailing");
    assert_eq!(root, Expr::Int(31));
    let (_, root) = self::root("/* c */ 1_000");
    assert_eq!(root, Expr::Int(1000));
    let (_, root) = self::root("2.5e1");
    assert_eq!(root, Expr::Float(25.0));
    let (_, root) = self::root(r"'a\tbA\101'");
    assert_eq!(root, Expr::Str("a\tbAA".to_string()));
}

#[test]
fn deep_nesting_does_not_overflow() {
    let source = format!("{}1{}", "(".repeat(5_000), ")".repeat(5_000));
    let program = compile(&source).unwrap();
    assert_eq!(program.get(program.root()), &Expr::Int(1));
}
