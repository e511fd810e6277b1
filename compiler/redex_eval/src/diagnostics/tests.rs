#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn push_respects_the_limit() {
    let mut stack = CallStack::new(Some(2));
    stack.push(Symbol::new("a")).unwrap();
    stack.push(Symbol::new("b")).unwrap();
    assert_eq!(stack.push(Symbol::new("c")), Err(EvalError::StackOverflow(2)));
    assert_eq!(stack.depth(), 2);
    stack.pop();
    assert_eq!(stack.frames(), &[Symbol::new("a")]);
}

#[test]
fn unlimited_stack_never_overflows() {
    let mut stack = CallStack::new(None);
    for _ in 0..10_000 {
        stack.push(Symbol::new("f")).unwrap();
    }
    assert_eq!(stack.depth(), 10_000);
}

#[test]
fn stats_count_by_name_and_prefix() {
    let mut stats = CallStats::default();
    stats.record(&Symbol::new("match_literal_a_0"));
    stats.record(&Symbol::new("match_literal_b_1"));
    stats.record(&Symbol::new("match_sequence_2"));
    stats.record(&Symbol::new("match_sequence_2"));
    assert_eq!(stats.count("match_sequence_2"), 2);
    assert_eq!(stats.count_prefix("match_literal"), 2);
    assert_eq!(stats.count("missing"), 0);
    assert_eq!(stats.total(), 4);
    stats.reset();
    assert_eq!(stats.total(), 0);
}
