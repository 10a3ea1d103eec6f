//! The source cache under concurrent callers.

use std::sync::Arc;

use mungc::{ParseOptions, SourceCache};
use pretty_assertions::assert_eq;
use rayon::prelude::*;

const DOCUMENT: &str = "service : { name : \"api\", port : 8080 }; replicas : 3";

#[test]
fn concurrent_callers_share_one_parse() {
    let cache = SourceCache::new();
    let options = ParseOptions::default();
    let asts: Vec<_> = (0..64)
        .into_par_iter()
        .map(|_| cache.get_or_parse(DOCUMENT, &options).unwrap())
        .collect();
    assert_eq!(cache.parse_count(), 1);
    let first = &asts[0];
    for ast in &asts {
        for (a, b) in ast.namespaces().iter().zip(first.namespaces()) {
            assert!(Arc::ptr_eq(a, b));
        }
    }

    assert!(cache.get_or_parse(DOCUMENT, &options).is_ok());
    assert_eq!(cache.parse_count(), 1);
}

#[test]
fn distinct_sources_parse_independently() {
    let cache = SourceCache::new();
    let options = ParseOptions::default();
    let sources: Vec<String> = (0..16).map(|i| format!("n : {i}")).collect();
    sources.par_iter().for_each(|source| {
        for _ in 0..4 {
            assert!(cache.get_or_parse(source, &options).is_ok());
        }
    });
    assert_eq!(cache.parse_count(), 16);
    assert_eq!(cache.len(), 16);
}

#[test]
fn failures_are_cached_too() {
    let cache = SourceCache::new();
    let options = ParseOptions::default();
    let first = cache.get_or_parse("a : : 1", &options).unwrap_err();
    let second = cache.get_or_parse("a : : 1", &options).unwrap_err();
    assert_eq!(first, second);
    assert_eq!(cache.parse_count(), 1);
}

#[test]
fn single_namespaces_come_from_the_cache() {
    let cache = SourceCache::new();
    let options = ParseOptions::default();
    let service = cache.get_namespace(DOCUMENT, &options, "service").unwrap();
    let ast = cache.get_or_parse(DOCUMENT, &options).unwrap();
    let same = service
        .zip(ast.namespace("service").cloned())
        .is_some_and(|(a, b)| Arc::ptr_eq(&a, &b));
    assert!(same);
    assert!(cache.get_namespace(DOCUMENT, &options, "nope").unwrap().is_none());
}

#[test]
fn process_wide_cache_through_the_facade() {
    let source = "facade-cache-probe : 42";
    let a = mungc::parse_cached(source, &ParseOptions::default()).unwrap();
    let b = mungc::parse_cached(source, &ParseOptions::default()).unwrap();
    assert_eq!(a, b);
    assert_eq!(mungc::evaluate_namespace(&b, "facade-cache-probe", &[]), Ok(mungc::Value::Int(42)));
}

#[test]
fn loading_files_goes_through_the_cache() {
    let path = std::env::temp_dir().join(format!("mungc-load-{}.mung", std::process::id()));
    std::fs::write(&path, "port : 8080").unwrap();
    let cache = SourceCache::new();
    let options = ParseOptions::default();
    let first = mungc::load_with(&cache, &path, &options).unwrap();
    let second = mungc::load_with(&cache, &path, &options).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(first, second);
    assert_eq!(cache.parse_count(), 1);
}
