//! `serde` conversion of documents and evaluation results.

use mungc::Value;
use serde_json::json;

use crate::common::parse;

#[test]
fn documents_convert_without_evaluating() {
    let ast = parse("name : \"svc\"; port : 8080; ratio : 0.5; on : true; url : {{ name + \"/\" }}; config : { tls : false }");
    assert_eq!(
        serde_json::to_value(&ast).unwrap(),
        json!({
            "name": "svc",
            "port": 8080,
            "ratio": 0.5,
            "on": true,
            "url": "{{ name + \"/\" }}",
            "config": { "tls": false }
        })
    );
}

#[test]
fn results_convert_to_native_data() {
    let ast = parse(
        "config : { host : \"localhost\", ports : {{ [80, 443] }}, none : {{ nil }} }; add x y : x + y",
    );
    let all = mungc::evaluate_all(&ast).unwrap();
    assert_eq!(
        serde_json::to_value(Value::map(all)).unwrap(),
        json!({
            "config": { "host": "localhost", "ports": [80, 443], "none": null }
        })
    );
    let add = mungc::evaluate_expr(&ast, "add").unwrap();
    assert_eq!(serde_json::to_value(&add).unwrap(), json!("<func add>"));
    assert_eq!(serde_json::to_value(Value::Float(1.5)).unwrap(), json!(1.5));
}
