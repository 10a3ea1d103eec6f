use mung_expr::{call, NoHost, Value};
use mung_ir::EnvSnapshot;
use pretty_assertions::assert_eq;

use super::*;

fn registry() -> Builtins {
    Builtins::new(&[("HOME", "/home/mung"), ("MODE", "dev")].into_iter().collect::<EnvSnapshot>())
}

fn invoke(value: Option<&Value>, args: Vec<Value>) -> Option<Value> {
    let func = value?.as_func()?;
    call(func, args, &mut NoHost).ok()
}

#[test]
fn env_is_callable_and_has_members() {
    let builtins = registry();
    let env = builtins.get("env");
    assert_eq!(
        invoke(env, vec![Value::from("HOME")]),
        Some(Value::from("/home/mung"))
    );
    assert_eq!(invoke(env, vec![Value::from("MISSING")]), Some(Value::Nil));
    assert_eq!(env.and_then(|e| e.member("MODE")), Some(Value::from("dev")));
}

#[test]
fn target_names_arch_and_os() {
    let builtins = registry();
    let target = builtins.get("target").and_then(Value::as_str).map(str::to_string);
    assert_eq!(
        target,
        Some(format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS))
    );
    let os = builtins.get("platform").and_then(|p| p.member("os"));
    assert_eq!(os, Some(Value::from(std::env::consts::OS)));
}

#[test]
fn path_helpers() {
    let builtins = registry();
    let path = builtins.get("path");
    let member = |name: &str| path.and_then(|p| p.member(name));
    assert_eq!(
        invoke(member("join").as_ref(), vec![Value::from("etc"), Value::from("mung.conf")]),
        Some(Value::from(format!("etc{}mung.conf", std::path::MAIN_SEPARATOR)))
    );
    assert_eq!(
        invoke(member("base").as_ref(), vec![Value::from("etc/mung.conf")]),
        Some(Value::from("mung.conf"))
    );
    assert_eq!(
        invoke(member("ext").as_ref(), vec![Value::from("etc/mung.conf")]),
        Some(Value::from("conf"))
    );
    assert_eq!(
        invoke(member("dir").as_ref(), vec![Value::from("etc/mung.conf")]),
        Some(Value::from("etc"))
    );
}

#[test]
fn file_probes() {
    let builtins = registry();
    let file = builtins.get("file");
    let manifest = env!("CARGO_MANIFEST_DIR");
    let exists = file.and_then(|f| f.member("is_dir"));
    assert_eq!(
        invoke(exists.as_ref(), vec![Value::from(manifest)]),
        Some(Value::Bool(true))
    );
    let read = file.and_then(|f| f.member("read"));
    let missing = read
        .as_ref()
        .and_then(Value::as_func)
        .map(|f| call(f, vec![Value::from("/no/such/mung/file")], &mut NoHost).is_err());
    assert_eq!(missing, Some(true));
}

#[test]
fn version_is_the_crate_version() {
    let builtins = registry();
    let version = builtins.get("mung").and_then(|m| m.member("version"));
    assert_eq!(version, Some(Value::from(env!("CARGO_PKG_VERSION"))));
}

#[test]
fn global_registry_is_shared() {
    assert!(std::sync::Arc::ptr_eq(&Builtins::global(), &Builtins::global()));
    assert!(Builtins::global().contains("cwd"));
}
