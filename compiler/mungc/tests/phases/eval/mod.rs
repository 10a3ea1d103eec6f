//! Document scenarios evaluated end to end.

use mungc::{Arity, EnvSnapshot, EvalErrorKind, Map, ParseOptions, Value};
use pretty_assertions::assert_eq;
use rayon::prelude::*;

use crate::common::{eval, eval_error, parse};

fn map(entries: &[(&str, Value)]) -> Value {
    Value::map(
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect::<Map>(),
    )
}

#[test]
fn literal_block() {
    assert_eq!(
        eval("config : { host : \"localhost\", port : 8080 }", "config", &[]),
        map(&[("host", Value::from("localhost")), ("port", Value::Int(8080))])
    );
}

#[test]
fn sibling_reference() {
    let ast = parse("config : { port : 8080, url : \"http://localhost:\" + string(port) }");
    assert_eq!(
        mungc::evaluate_expr(&ast, "config.url"),
        Ok(Value::from("http://localhost:8080"))
    );
}

#[test]
fn parameterized_call() {
    assert_eq!(eval("add x y : x + y", "add", &["10", "32"]), Value::Int(42));
}

#[test]
fn variadic_call() {
    assert_eq!(
        eval("sum ...nums : nums[0] + nums[1] + nums[2]", "sum", &["1", "2", "3"]),
        Value::Int(6)
    );
}

#[test]
fn arity_enforcement() {
    for args in [&[][..], &["1"][..], &["1", "2", "3"][..]] {
        assert_eq!(
            eval_error("f p1 p2 : p1", "f", args),
            EvalErrorKind::ParameterCountMismatch {
                name: "f".to_string(),
                signature: Some("f p1 p2".to_string()),
                expected: Arity::Exact(2),
                got: args.len(),
            }
        );
    }
    for args in [&["1"][..], &["1", "2"][..], &["1", "2", "3", "4"][..]] {
        assert_eq!(eval("f p1 ...rest : p1", "f", args), Value::Int(1));
    }
}

#[test]
fn hyphen_fusion() {
    let ast = parse("config : { log-pretty : true }");
    assert_eq!(mungc::evaluate_expr(&ast, "config.log-pretty"), Ok(Value::Bool(true)));
    let ast = parse("a : 10; b : 3");
    assert_eq!(mungc::evaluate_expr(&ast, "a - b"), Ok(Value::Int(7)));
}

#[test]
fn cycle_safety() {
    let ast = parse("a : {{ b }}; b : {{ a }}");
    let all = mungc::evaluate_all(&ast).unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.values().any(Value::is_nil));
}

#[test]
fn environment_snapshot() {
    let env: EnvSnapshot = [("STAGE", "prod")].into_iter().collect();
    let options = ParseOptions::default().with_env(env);
    let ast = mungc::parse("stage : {{ env.STAGE }}; db : {{ \"db-\" + env(\"STAGE\") }}", &options)
        .unwrap();
    assert_eq!(
        mungc::evaluate_all(&ast).unwrap(),
        [
            ("stage".to_string(), Value::from("prod")),
            ("db".to_string(), Value::from("db-prod")),
        ]
        .into_iter()
        .collect::<Map>()
    );
}

#[test]
fn evaluation_errors_surface_through_the_facade() {
    let err = mungc::evaluate_source("x : {{ nope }}", "x", &[]).unwrap_err();
    assert_eq!(err.to_string(), "1:5: `nope` is not defined");
    assert!(matches!(
        mungc::evaluate_source("x : 1", "y", &[]),
        Err(mungc::Error::Eval(ref e)) if e.kind == EvalErrorKind::DefinitionNotFound { name: "y".to_string() }
    ));
}

#[test]
fn realistic_document() {
    let source = r#"
        app : {
            name : "billing";
            port : 8080;
            max-conns : 64;
            server : {
                workers : 4;
                backlog : {{ workers * 32 }}
            };
            url : {{ "http://" + name + ":" + string(port) }};
            budget : {{ max-conns * 2 }}
        };
        scale n : {{ app.server.workers * n }};
        total ...xs : {{ len(xs) }}
    "#;
    let ast = parse(source);
    let app = mungc::evaluate_namespace(&ast, "app", &[]).unwrap();
    assert_eq!(app.member("url"), Some(Value::from("http://billing:8080")));
    assert_eq!(app.member("budget"), Some(Value::Int(128)));
    assert_eq!(
        app.member("server").and_then(|s| s.member("backlog")),
        Some(Value::Int(128))
    );
    assert_eq!(mungc::evaluate_namespace(&ast, "scale", &["3"]), Ok(Value::Int(12)));
    assert_eq!(
        mungc::evaluate_namespace(&ast, "total", &["a", "b", "c"]),
        Ok(Value::Int(3))
    );
}

#[test]
fn parallel_evaluation() {
    let ast = parse("add x y : x + y; base : 100; plus n : {{ base + n }}");
    let results: Vec<_> = (0..128i64)
        .into_par_iter()
        .map(|i| {
            let arg = i.to_string();
            mungc::evaluate_namespace(&ast, "plus", &[arg.as_str()])
        })
        .collect();
    for (i, result) in (0..128i64).zip(results) {
        assert_eq!(result, Ok(Value::Int(100 + i)));
    }
}
