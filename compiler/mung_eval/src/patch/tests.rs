use mung_expr::{Expr, ExprId, Program};
use pretty_assertions::assert_eq;
use rustc_hash::FxHashSet;

use super::*;

#[derive(Default)]
struct Names {
    names: FxHashSet<String>,
    members: FxHashSet<String>,
}

impl Names {
    fn with(names: &[&str], members: &[&str]) -> Self {
        Names {
            names: names.iter().map(|s| (*s).to_string()).collect(),
            members: members.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl NameResolver for Names {
    fn has_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    fn has_member(&self, path: &[&str], member: &str) -> bool {
        self.members.contains(&format!("{}.{member}", path.join(".")))
    }
}

fn render(p: &Program, id: ExprId) -> String {
    match p.get(id) {
        Expr::Ident(name) => name.clone(),
        Expr::Int(n) => n.to_string(),
        Expr::Member { object, field, .. } => format!("(. {} {field})", render(p, *object)),
        Expr::Index { object, index } => {
            format!("([] {} {})", render(p, *object), render(p, *index))
        }
        Expr::Call { callee, args } => {
            let mut out = format!("(call {}", render(p, *callee));
            for arg in args {
                out.push(' ');
                out.push_str(&render(p, *arg));
            }
            out.push(')');
            out
        }
        Expr::Unary { op, operand } => format!("({} {})", op.as_symbol(), render(p, *operand)),
        Expr::Binary { op, left, right } => format!(
            "({} {} {})",
            op.as_symbol(),
            render(p, *left),
            render(p, *right)
        ),
        other => format!("{other:?}"),
    }
}

fn patched(source: &str, names: &Names) -> (String, usize) {
    let mut program = match mung_expr::compile(source) {
        Ok(p) => p,
        Err(e) => panic!("{e}"),
    };
    let mut patcher = HyphenPatcher::new(names);
    program.patch(&mut patcher);
    (render(&program, program.root()), patcher.fused())
}

#[test]
fn fuses_known_names() {
    let names = Names::with(&["log-pretty"], &[]);
    assert_eq!(patched("log-pretty", &names), ("log-pretty".to_string(), 1));
    assert_eq!(patched("log - pretty", &names), ("log-pretty".to_string(), 1));
}

#[test]
fn leaves_real_subtraction_alone() {
    let names = Names::with(&["a", "b"], &[]);
    assert_eq!(patched("a - b", &names), ("(- a b)".to_string(), 0));
    assert_eq!(patched("a - 1", &names), ("(- a 1)".to_string(), 0));
}

#[test]
fn fuses_member_access() {
    let names = Names::with(&["config"], &["config.log-pretty", "app.server.max-conns"]);
    assert_eq!(
        patched("config.log-pretty", &names).0,
        "(. config log-pretty)"
    );
    assert_eq!(
        patched("app.server.max-conns * 2", &names).0,
        "(* (. (. app server) max-conns) 2)"
    );
    assert_eq!(patched("config.log-level", &names).0, "(- (. config log) level)");
}

#[test]
fn fuses_chains() {
    let whole = Names::with(&["a-b-c"], &[]);
    assert_eq!(patched("a-b-c", &whole).0, "a-b-c");

    let suffix = Names::with(&["a", "b-c"], &[]);
    assert_eq!(patched("a-b-c", &suffix).0, "(- a b-c)");

    let prefix = Names::with(&["a-b", "c"], &[]);
    assert_eq!(patched("a-b-c", &prefix).0, "(- a-b c)");

    let nested = Names::with(&[], &["x.one-two-three"]);
    assert_eq!(patched("x.one-two-three", &nested).0, "(. x one-two-three)");
}

#[test]
fn fuses_into_postfix_chains() {
    let names = Names::with(&["my-map", "to-upper"], &[]);
    assert_eq!(patched("my-map.key", &names).0, "(. my-map key)");
    assert_eq!(patched("my-map[0]", &names).0, "([] my-map 0)");
    assert_eq!(patched("to-upper(1, 2)", &names).0, "(call to-upper 1 2)");
}

#[test]
fn fused_names_take_part_in_other_operators() {
    let names = Names::with(&["max-conns"], &[]);
    assert_eq!(patched("max-conns + 1", &names).0, "(+ max-conns 1)");
    assert_eq!(patched("2 * max-conns", &names).0, "(* 2 max-conns)");
    assert_eq!(patched("(max-conns)", &names).0, "max-conns");
    assert_eq!(patched("2 * max-conns * 3", &names).0, "(* (* 2 max-conns) 3)");
    assert_eq!(patched("-max-conns", &names).0, "(- max-conns)");
}

#[test]
fn postfix_chains_stay_on_the_fused_name() {
    let names = Names::with(&["a-r"], &[]);
    assert_eq!(patched("2 * a - r.z", &names), ("(* 2 (. a-r z))".to_string(), 1));
    assert_eq!(patched("-a - r.z", &names), ("(- (. a-r z))".to_string(), 1));
    assert_eq!(patched("2 * a - r[0]", &names).0, "(* 2 ([] a-r 0))");
    assert_eq!(patched("!a - r(1)", &names).0, "(! (call a-r 1))");
}

#[test]
fn operators_regroup_around_the_fused_name() {
    let names = Names::with(&["a-r"], &[]);
    assert_eq!(patched("8 / a - r / 2", &names).0, "(/ (/ 8 a-r) 2)");
    assert_eq!(patched("2 * a - r.z * 3", &names).0, "(* (* 2 (. a-r z)) 3)");
    assert_eq!(patched("2 ** a - r ** 3", &names).0, "(** 2 (** a-r 3))");
    assert_eq!(patched("-a - r ** 2", &names).0, "(- (** a-r 2))");
    assert_eq!(patched("-a - r * 2", &names).0, "(* (- a-r) 2)");
}

#[test]
fn parenthesized_operands_are_not_fused() {
    let names = Names::with(&["a-r"], &[]);
    assert_eq!(patched("a - (r * 2).z", &names).1, 0);
    assert_eq!(patched("a - -r", &names).1, 0);
}
