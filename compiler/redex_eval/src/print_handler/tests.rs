use pretty_assertions::assert_eq;

use super::*;

#[test]
fn buffer_handler_captures_lines() {
    let handler = buffer_handler();
    handler.println("hello");
    handler.println("world");
    assert_eq!(handler.get_output(), "hello\nworld\n");
}

#[test]
fn buffer_handler_clear() {
    let handler = buffer_handler();
    handler.println("hello");
    handler.clear();
    assert_eq!(handler.get_output(), "");
}

#[test]
fn silent_handler_discards() {
    let handler = silent_handler();
    handler.println("hello");
    assert_eq!(handler.get_output(), "");
}
