use mung_expr::Value;

use super::*;

#[test]
fn maps_come_back_cleared() {
    let pool = EnvPool::new();
    {
        let mut env = pool.acquire();
        env.insert("a".to_string(), Value::Int(1));
        assert_eq!(pool.available(), 0);
    }
    assert_eq!(pool.available(), 1);
    let env = pool.acquire();
    assert!(env.is_empty());
    assert!(env.capacity() > 0);
}

#[test]
fn maps_come_back_on_early_return() {
    fn fails(pool: &EnvPool) -> Result<(), ()> {
        let mut env = pool.acquire();
        env.insert("x".to_string(), Value::Nil);
        Err(())
    }
    let pool = EnvPool::new();
    assert!(fails(&pool).is_err());
    assert_eq!(pool.available(), 1);
}

#[test]
fn nested_acquires_use_distinct_maps() {
    let pool = EnvPool::new();
    let mut outer = pool.acquire();
    outer.insert("outer".to_string(), Value::Int(1));
    {
        let inner = pool.acquire();
        assert!(inner.is_empty());
    }
    assert_eq!(outer.len(), 1);
    drop(outer);
    assert_eq!(pool.available(), 2);
}
