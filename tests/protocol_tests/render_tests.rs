//! Renderer Tests

use respcli::protocol::render;
use respcli::Value;

// =============================================================================
// Scalar Rendering Tests
// =============================================================================

#[test]
fn test_render_simple_string() {
    assert_eq!(render(&Value::SimpleString("OK".to_string())), "OK");
}

#[test]
fn test_render_error() {
    assert_eq!(
        render(&Value::Error("ERR wrong type".to_string())),
        "(error) ERR wrong type"
    );
}

#[test]
fn test_render_integer() {
    assert_eq!(render(&Value::Integer(-3)), "(integer) -3");
}

#[test]
fn test_render_bulk_string_is_quoted() {
    assert_eq!(render(&Value::bulk("bar baz")), "\"bar baz\"");
    assert_eq!(render(&Value::bulk("")), "\"\"");
}

#[test]
fn test_render_bulk_string_escapes() {
    assert_eq!(
        render(&Value::bulk(&b"a\"b\\c\r\n\t\x00\xff"[..])),
        r#""a\"b\\c\r\n\t\x00\xff""#
    );
}

#[test]
fn test_render_nulls() {
    assert_eq!(render(&Value::BulkString(None)), "(nil)");
    assert_eq!(render(&Value::Array(None)), "(nil)");
}

// =============================================================================
// Array Rendering Tests
// =============================================================================

#[test]
fn test_render_empty_array() {
    assert_eq!(render(&Value::array(vec![])), "(empty array)");
}

#[test]
fn test_render_flat_array() {
    let value = Value::array(vec![
        Value::bulk("message"),
        Value::bulk("news"),
        Value::bulk("hello"),
    ]);
    assert_eq!(render(&value), "1) \"message\"\n2) \"news\"\n3) \"hello\"");
}

#[test]
fn test_render_nested_array_is_indented() {
    let value = Value::array(vec![
        Value::bulk("a"),
        Value::array(vec![Value::Integer(1), Value::Integer(2)]),
        Value::BulkString(None),
    ]);
    assert_eq!(
        render(&value),
        "1) \"a\"\n2) 1) (integer) 1\n   2) (integer) 2\n3) (nil)"
    );
}

#[test]
fn test_render_doubly_nested_array() {
    let value = Value::array(vec![Value::array(vec![Value::array(vec![
        Value::Integer(1),
        Value::Integer(2),
    ])])]);
    assert_eq!(
        render(&value),
        "1) 1) 1) (integer) 1\n      2) (integer) 2"
    );
}

#[test]
fn test_render_aligns_wide_indices() {
    let value = Value::array((0..10).map(Value::Integer).collect());
    let rendered = render(&value);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines.len(), 10);
    assert_eq!(lines[0], " 1) (integer) 0");
    assert_eq!(lines[9], "10) (integer) 9");
}

#[test]
fn test_render_nested_under_wide_index() {
    let mut items: Vec<Value> = (0..9).map(Value::Integer).collect();
    items.push(Value::array(vec![Value::bulk("x"), Value::bulk("y")]));
    let rendered = render(&Value::array(items));
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines[9], "10) 1) \"x\"");
    assert_eq!(lines[10], "    2) \"y\"");
}
