//! Builtin registry.
//!
//! The outermost scope level, consulted after every document level misses.
//! The registry is read-only once built. The process-wide instance is built
//! on first use from the process environment; documents parsed with an
//! environment override get a private registry built from that snapshot.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use mung_expr::{stdlib::map_of, Arity, Func, Map, RuntimeError, Value};
use mung_ir::EnvSnapshot;

static GLOBAL: OnceLock<Arc<Builtins>> = OnceLock::new();

#[derive(Debug)]
pub struct Builtins {
    values: Map,
}

impl Builtins {
    /// The registry for the current process environment.
    pub fn global() -> Arc<Builtins> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Builtins::new(&EnvSnapshot::from_process()))))
    }

    pub fn new(env: &EnvSnapshot) -> Self {
        let mut values = Map::new();
        values.insert(
            "target".to_string(),
            Value::from(format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS)),
        );
        values.insert("platform".to_string(), platform());
        values.insert(
            "cwd".to_string(),
            Value::Func(Func::native("cwd", Arity::Exact(0), |_| cwd())),
        );
        values.insert("file".to_string(), file());
        values.insert("path".to_string(), path());
        values.insert(
            "mung".to_string(),
            map_of([("version", Value::from(env!("CARGO_PKG_VERSION")))]),
        );
        values.insert("env".to_string(), env_func(env));
        Builtins { values }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

fn platform() -> Value {
    map_of([
        ("os", Value::from(std::env::consts::OS)),
        ("arch", Value::from(std::env::consts::ARCH)),
        ("family", Value::from(std::env::consts::FAMILY)),
    ])
}

fn cwd() -> Result<Value, RuntimeError> {
    std::env::current_dir()
        .map(|dir| path_value(&dir))
        .map_err(|e| RuntimeError::host(format!("cwd: {e}")))
}

fn path_value(path: &Path) -> Value {
    Value::from(path.to_string_lossy().into_owned())
}

fn path_arg<'a>(func: &str, args: &'a [Value], index: usize) -> Result<&'a Path, RuntimeError> {
    args.get(index)
        .and_then(Value::as_str)
        .map(Path::new)
        .ok_or_else(|| {
            let got = args.get(index).map_or("nothing", Value::type_name);
            RuntimeError::type_error(format!("{func}: expected string path, got {got}"))
        })
}

fn unary(
    name: &'static str,
    f: impl Fn(&Path) -> Result<Value, RuntimeError> + Send + Sync + 'static,
) -> (&'static str, Value) {
    let short = name.rsplit('.').next().unwrap_or(name);
    let func = Func::native(name, Arity::Exact(1), move |args| {
        f(path_arg(name, args, 0)?)
    });
    (short, Value::Func(func))
}

fn file() -> Value {
    map_of([
        unary("file.exists", |p| Ok(Value::Bool(p.exists()))),
        unary("file.is_file", |p| Ok(Value::Bool(p.is_file()))),
        unary("file.is_dir", |p| Ok(Value::Bool(p.is_dir()))),
        unary("file.read", |p| {
            std::fs::read_to_string(p)
                .map(Value::from)
                .map_err(|e| RuntimeError::host(format!("file.read {}: {e}", p.display())))
        }),
    ])
}

fn path() -> Value {
    let join = Func::native("path.join", Arity::AtLeast(1), |args| {
        let mut joined = PathBuf::new();
        for index in 0..args.len() {
            joined.push(path_arg("path.join", args, index)?);
        }
        Ok(path_value(&joined))
    });
    map_of([
        ("join", Value::Func(join)),
        unary("path.base", |p| {
            Ok(p.file_name()
                .map_or(Value::from(""), |name| Value::from(name.to_string_lossy().into_owned())))
        }),
        unary("path.dir", |p| {
            Ok(p.parent().map_or(Value::from(""), path_value))
        }),
        unary("path.ext", |p| {
            Ok(p.extension()
                .map_or(Value::from(""), |ext| Value::from(ext.to_string_lossy().into_owned())))
        }),
        unary("path.abs", |p| {
            std::path::absolute(p)
                .map(|abs| path_value(&abs))
                .map_err(|e| RuntimeError::host(format!("path.abs {}: {e}", p.display())))
        }),
    ])
}

/// `env("KEY")` returns the variable or nil; `env.KEY` reads the same
/// snapshot as a member.
fn env_func(env: &EnvSnapshot) -> Value {
    let members: Map = env
        .iter()
        .map(|(k, v)| (k.to_string(), Value::from(v)))
        .collect();
    let lookup = members.clone();
    let func = Func::native("env", Arity::Exact(1), move |args| {
        let key = args
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| RuntimeError::type_error("env: expected string key"))?;
        Ok(lookup.get(key).cloned().unwrap_or(Value::Nil))
    });
    Value::Func(func.with_members(members))
}

#[cfg(test)]
mod tests;
