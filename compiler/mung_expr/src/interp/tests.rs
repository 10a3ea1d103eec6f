use std::any::Any;
use std::sync::Arc;

use crate::{
    compile, run, Arity, Env, Func, Host, NoHost, RuntimeError, RuntimeErrorKind, Value,
};
use pretty_assertions::assert_eq;

fn env(pairs: &[(&str, Value)]) -> Env {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

fn eval_in(source: &str, env: &Env) -> Result<Value, RuntimeError> {
    run(&compile(source).unwrap(), env, &mut NoHost)
}

fn eval(source: &str) -> Value {
    eval_in(source, &Env::default()).unwrap()
}

#[test]
fn arithmetic() {
    assert_eq!(eval("10 + 32"), Value::Int(42));
    assert_eq!(eval("10 - 3"), Value::Int(7));
    assert_eq!(eval("7 / 2"), Value::Float(3.5));
    assert_eq!(eval("7 % 4"), Value::Int(3));
    assert_eq!(eval("2 ** 10"), Value::Int(1024));
    assert_eq!(eval("1 + 0.5"), Value::Float(1.5));
    assert_eq!(eval("-(3)"), Value::Int(-3));
}

#[test]
fn arithmetic_errors() {
    let err = eval_in("1 / 0", &Env::default()).unwrap_err();
    assert_eq!(err.kind, RuntimeErrorKind::DivisionByZero);
    let err = eval_in("9223372036854775807 + 1", &Env::default()).unwrap_err();
    assert!(matches!(err.kind, RuntimeErrorKind::Overflow { .. }));
    let err = eval_in("true + 1", &Env::default()).unwrap_err();
    assert!(matches!(err.kind, RuntimeErrorKind::Type { .. }));
}

#[test]
fn strings_and_lists() {
    assert_eq!(
        eval(r#""http://localhost:" + string(8080)"#),
        Value::from("http://localhost:8080")
    );
    assert_eq!(eval("[1] + [2]"), Value::list(vec![1.into(), 2.into()]));
    assert_eq!(eval(r#""abc"[1]"#), Value::from("b"));
    assert_eq!(eval("[1, 2, 3][-1]"), Value::Int(3));
}

#[test]
fn index_out_of_bounds() {
    let err = eval_in("[1, 2][5]", &Env::default()).unwrap_err();
    assert_eq!(
        err.kind,
        RuntimeErrorKind::IndexOutOfBounds { index: 5, len: 2 }
    );
    assert_eq!(err.offset, Some(6));
}

#[test]
fn logic_short_circuits() {
    assert_eq!(eval("false && missing"), Value::Bool(false));
    assert_eq!(eval("true or missing"), Value::Bool(true));
    assert_eq!(eval("nil ?? 5"), Value::Int(5));
    assert_eq!(eval("1 ?? missing"), Value::Int(1));
    assert_eq!(eval("not false"), Value::Bool(true));
    assert_eq!(eval("1 < 2 ? \"yes\" : \"no\""), Value::from("yes"));
}

#[test]
fn membership_operators() {
    assert_eq!(eval("2 in [1, 2]"), Value::Bool(true));
    assert_eq!(eval(r#""a" in {a: 1}"#), Value::Bool(true));
    assert_eq!(eval(r#""team" contains "ea""#), Value::Bool(true));
    assert_eq!(eval(r#""team" startsWith "te""#), Value::Bool(true));
    assert_eq!(eval(r#""team" endsWith "x""#), Value::Bool(false));
}

#[test]
fn members_and_optional_chaining() {
    let env = env(&[(
        "config",
        crate::stdlib::map_of([("port", Value::Int(8080))]),
    )]);
    assert_eq!(eval_in("config.port", &env).unwrap(), Value::Int(8080));
    assert_eq!(eval_in("config.missing", &env).unwrap(), Value::Nil);
    assert_eq!(eval_in("config.missing?.deeper", &env).unwrap(), Value::Nil);
    assert!(eval_in("config.missing.deeper", &env).is_err());
    assert_eq!(eval_in(r#"config["port"]"#, &env).unwrap(), Value::Int(8080));
}

#[test]
fn environment_shadows_standard_functions() {
    let env = env(&[("len", Value::Int(3))]);
    assert_eq!(eval_in("len + 1", &env).unwrap(), Value::Int(4));
}

#[test]
fn unknown_names_and_arity() {
    let err = eval_in("nope", &Env::default()).unwrap_err();
    assert_eq!(
        err.kind,
        RuntimeErrorKind::UnknownName {
            name: "nope".to_string()
        }
    );
    let err = eval_in("len(1, 2)", &Env::default()).unwrap_err();
    assert!(matches!(err.kind, RuntimeErrorKind::ArgumentCount { got: 2, .. }));
    let err = eval_in("(1)(2)", &Env::default()).unwrap_err();
    assert_eq!(err.kind, RuntimeErrorKind::NotCallable { type_name: "int" });
}

struct Doubler {
    calls: usize,
}

impl Host for Doubler {
    fn call(
        &mut self,
        _func: &Func,
        handle: &(dyn Any + Send + Sync),
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        self.calls += 1;
        let factor = handle.downcast_ref::<i64>().copied().unwrap_or(1);
        Ok(Value::Int(args[0].as_int().unwrap_or(0) * factor))
    }
}

#[test]
fn host_functions_dispatch_to_the_embedder() {
    let env = env(&[(
        "double",
        Value::Func(Func::host("double", Arity::Exact(1), Arc::new(2_i64))),
    )]);
    let mut host = Doubler { calls: 0 };
    let program = compile("double(4) + double(1)").unwrap();
    assert_eq!(run(&program, &env, &mut host).unwrap(), Value::Int(10));
    assert_eq!(host.calls, 2);

    let err = run(&program, &env, &mut NoHost).unwrap_err();
    assert!(matches!(err.kind, RuntimeErrorKind::Host { .. }));
}
