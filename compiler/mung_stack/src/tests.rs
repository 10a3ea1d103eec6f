use super::*;

/// A chain of nested frames, the shape a deeply nested document produces.
fn nest(depth: u32) -> u32 {
    with_stack(|| if depth == 0 { 0 } else { nest(depth - 1) + 1 })
}

#[test]
fn shallow_nesting_returns_value() {
    assert_eq!(nest(16), 16);
}

#[test]
fn deep_nesting_does_not_overflow() {
    assert_eq!(nest(200_000), 200_000);
}

#[test]
fn propagates_results() {
    let result: Result<u8, String> = with_stack(|| Err("depth".to_string()));
    assert_eq!(result, Err("depth".to_string()));
}
