//! Standard functions available to every expression.
//!
//! Names in the caller's environment shadow these.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::value::{Arity, Func, Map, Value};

static STD: OnceLock<FxHashMap<&'static str, Value>> = OnceLock::new();

/// Look up a standard function by name.
pub fn lookup(name: &str) -> Option<&'static Value> {
    table().get(name)
}

/// Names of all standard functions.
pub fn names() -> impl Iterator<Item = &'static str> {
    table().keys().copied()
}

fn table() -> &'static FxHashMap<&'static str, Value> {
    STD.get_or_init(|| {
        let defs: [(&'static str, Arity, fn(&[Value]) -> Result<Value, RuntimeError>); 18] = [
            ("len", Arity::Exact(1), len),
            ("string", Arity::Exact(1), string),
            ("int", Arity::Exact(1), int),
            ("float", Arity::Exact(1), float),
            ("bool", Arity::Exact(1), boolean),
            ("upper", Arity::Exact(1), upper),
            ("lower", Arity::Exact(1), lower),
            ("trim", Arity::Exact(1), trim),
            ("split", Arity::Exact(2), split),
            ("join", Arity::Exact(2), join),
            ("keys", Arity::Exact(1), keys),
            ("values", Arity::Exact(1), values),
            ("contains", Arity::Exact(2), contains),
            ("startsWith", Arity::Exact(2), starts_with),
            ("endsWith", Arity::Exact(2), ends_with),
            ("abs", Arity::Exact(1), abs),
            ("min", Arity::AtLeast(1), min),
            ("max", Arity::AtLeast(1), max),
        ];
        defs.into_iter()
            .map(|(name, arity, f)| (name, Value::Func(Func::native(name, arity, f))))
            .collect()
    })
}

fn expected(func: &str, what: &str, got: &Value) -> RuntimeError {
    RuntimeError::type_error(format!("{func}: expected {what}, got {}", got.type_name()))
}

fn str_arg<'a>(func: &str, v: &'a Value) -> Result<&'a str, RuntimeError> {
    v.as_str().ok_or_else(|| expected(func, "string", v))
}

fn len(args: &[Value]) -> Result<Value, RuntimeError> {
    let n = match &args[0] {
        Value::Str(s) => s.chars().count(),
        Value::List(items) => items.len(),
        Value::Map(map) => map.len(),
        other => return Err(expected("len", "string, array or map", other)),
    };
    Ok(Value::Int(i64::try_from(n).unwrap_or(i64::MAX)))
}

fn string(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(match &args[0] {
        Value::Str(_) => args[0].clone(),
        other => Value::str(other.to_string()),
    })
}

fn int(args: &[Value]) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Int(_) => Ok(args[0].clone()),
        Value::Float(n) if !n.is_nan() => truncate(*n).map(Value::Int),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| RuntimeError::type_error(format!("int: cannot convert {s:?}"))),
        other => Err(expected("int", "number, bool or string", other)),
    }
}

/// `2^63`, the first float above the `i64` range.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Truncate toward zero; floats outside the `i64` range overflow.
fn truncate(n: f64) -> Result<i64, RuntimeError> {
    let n = n.trunc();
    if !(-I64_LIMIT..I64_LIMIT).contains(&n) {
        return Err(RuntimeError::new(RuntimeErrorKind::Overflow { operation: "int" }));
    }
    #[expect(clippy::cast_possible_truncation, reason = "range checked above")]
    let int = n as i64;
    Ok(int)
}

fn float(args: &[Value]) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| RuntimeError::type_error(format!("float: cannot convert {s:?}"))),
        other => other
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| expected("float", "number or string", other)),
    }
}

fn boolean(args: &[Value]) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Bool(_) => Ok(args[0].clone()),
        Value::Nil => Ok(Value::Bool(false)),
        Value::Int(n) => Ok(Value::Bool(*n != 0)),
        Value::Str(s) => match s.trim() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(RuntimeError::type_error(format!("bool: cannot convert {s:?}"))),
        },
        other => Err(expected("bool", "bool, int or string", other)),
    }
}

fn upper(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::str(str_arg("upper", &args[0])?.to_uppercase()))
}

fn lower(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::str(str_arg("lower", &args[0])?.to_lowercase()))
}

fn trim(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::str(str_arg("trim", &args[0])?.trim()))
}

fn split(args: &[Value]) -> Result<Value, RuntimeError> {
    let s = str_arg("split", &args[0])?;
    let sep = str_arg("split", &args[1])?;
    Ok(Value::list(s.split(sep).map(Value::from).collect()))
}

fn join(args: &[Value]) -> Result<Value, RuntimeError> {
    let items = args[0]
        .as_list()
        .ok_or_else(|| expected("join", "array", &args[0]))?;
    let sep = str_arg("join", &args[1])?;
    let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
    Ok(Value::str(parts.join(sep)))
}

fn keys(args: &[Value]) -> Result<Value, RuntimeError> {
    let map = args[0]
        .as_map()
        .ok_or_else(|| expected("keys", "map", &args[0]))?;
    Ok(Value::list(map.keys().map(|k| Value::from(k.as_str())).collect()))
}

fn values(args: &[Value]) -> Result<Value, RuntimeError> {
    let map = args[0]
        .as_map()
        .ok_or_else(|| expected("values", "map", &args[0]))?;
    Ok(Value::list(map.values().cloned().collect()))
}

pub(crate) fn contains(args: &[Value]) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Str(s) => Ok(Value::Bool(s.contains(str_arg("contains", &args[1])?))),
        Value::List(items) => Ok(Value::Bool(items.contains(&args[1]))),
        Value::Map(map) => Ok(Value::Bool(map.contains_key(str_arg("contains", &args[1])?))),
        other => Err(expected("contains", "string, array or map", other)),
    }
}

pub(crate) fn starts_with(args: &[Value]) -> Result<Value, RuntimeError> {
    let s = str_arg("startsWith", &args[0])?;
    Ok(Value::Bool(s.starts_with(str_arg("startsWith", &args[1])?)))
}

pub(crate) fn ends_with(args: &[Value]) -> Result<Value, RuntimeError> {
    let s = str_arg("endsWith", &args[0])?;
    Ok(Value::Bool(s.ends_with(str_arg("endsWith", &args[1])?)))
}

fn abs(args: &[Value]) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Int(n) => n.checked_abs().map(Value::Int).ok_or_else(|| {
            RuntimeError::new(RuntimeErrorKind::Overflow { operation: "abs" })
        }),
        Value::Float(n) => Ok(Value::Float(n.abs())),
        other => Err(expected("abs", "number", other)),
    }
}

/// Arguments to `min`/`max`: either the arguments themselves or a single
/// array argument.
fn extremes<'a>(func: &str, args: &'a [Value]) -> Result<&'a [Value], RuntimeError> {
    let items = match args {
        [Value::List(items)] => items.as_slice(),
        _ => args,
    };
    if items.is_empty() {
        return Err(RuntimeError::type_error(format!("{func}: no values")));
    }
    if let Some(bad) = items.iter().find(|v| v.as_f64().is_none()) {
        return Err(expected(func, "numbers", bad));
    }
    Ok(items)
}

fn pick(func: &str, args: &[Value], better: fn(f64, f64) -> bool) -> Result<Value, RuntimeError> {
    let items = extremes(func, args)?;
    let mut best = &items[0];
    for item in &items[1..] {
        if let (Some(a), Some(b)) = (item.as_f64(), best.as_f64()) {
            if better(a, b) {
                best = item;
            }
        }
    }
    Ok(best.clone())
}

fn min(args: &[Value]) -> Result<Value, RuntimeError> {
    pick("min", args, |a, b| a < b)
}

fn max(args: &[Value]) -> Result<Value, RuntimeError> {
    pick("max", args, |a, b| a > b)
}

/// Convenience for tests and embedders building maps.
pub fn map_of<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Value {
    Value::map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect::<Map>())
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
