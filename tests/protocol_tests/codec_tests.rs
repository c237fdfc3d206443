//! Codec Tests
//!
//! Tests for request encoding and response decoding.

use bytes::Bytes;
use respcli::protocol::{decode_value, encode_command, encode_line, write_frame, MAX_NESTING_DEPTH};
use respcli::{RespError, Value};

fn assert_violation(frame: &[u8]) {
    match decode_value(frame) {
        Err(RespError::ProtocolViolation(_)) => {}
        other => panic!(
            "Expected ProtocolViolation for {:?}, got {:?}",
            String::from_utf8_lossy(frame),
            other
        ),
    }
}

// =============================================================================
// Request Encoding Tests
// =============================================================================

#[test]
fn test_encode_set_with_spaced_argument() {
    let encoded = encode_command(&["set", "foo", "bar baz"]).unwrap();
    assert_eq!(
        encoded.as_ref(),
        b"*3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$7\r\nbar baz\r\n\r\n"
    );
}

#[test]
fn test_encode_line_matches_token_encoding() {
    let from_line = encode_line(r#"set foo "bar baz""#).unwrap();
    let from_tokens = encode_command(&["set", "foo", "bar baz"]).unwrap();
    assert_eq!(from_line, from_tokens);
}

#[test]
fn test_encode_uppercases_only_the_verb() {
    let encoded = encode_line("get MyKey").unwrap();
    assert_eq!(encoded.as_ref(), b"*2\r\n$3\r\nGET\r\n$5\r\nMyKey\r\n\r\n");
}

#[test]
fn test_encode_single_token() {
    let encoded = encode_line("ping").unwrap();
    assert_eq!(encoded.as_ref(), b"*1\r\n$4\r\nPING\r\n\r\n");
}

#[test]
fn test_encode_uses_byte_lengths() {
    let encoded = encode_command(&["set", "k", "héllo"]).unwrap();
    assert_eq!(
        encoded.as_ref(),
        "*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$6\r\nhéllo\r\n\r\n".as_bytes()
    );
}

#[test]
fn test_encode_empty_argument() {
    let encoded = encode_line(r#"set k """#).unwrap();
    assert_eq!(encoded.as_ref(), b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$0\r\n\r\n\r\n");
}

#[test]
fn test_encode_empty_token_sequence_fails() {
    let tokens: [&str; 0] = [];
    assert!(matches!(
        encode_command(&tokens),
        Err(RespError::MalformedCommand(_))
    ));
    assert!(matches!(encode_line("   "), Err(RespError::MalformedCommand(_))));
}

#[test]
fn test_encode_unterminated_quote_fails() {
    assert!(matches!(
        encode_line(r#"foo "bar"#),
        Err(RespError::MalformedCommand(_))
    ));
}

#[test]
fn test_write_frame_writes_all_bytes() {
    let mut sink = Vec::new();
    let request = encode_line("ping").unwrap();
    write_frame(&mut sink, &request).unwrap();
    assert_eq!(sink, request.to_vec());
}

// =============================================================================
// Scalar Decoding Tests
// =============================================================================

#[test]
fn test_decode_simple_string() {
    assert_eq!(
        decode_value(b"+OK\r\n").unwrap(),
        Value::SimpleString("OK".to_string())
    );
}

#[test]
fn test_decode_error() {
    assert_eq!(
        decode_value(b"-ERR unknown command\r\n").unwrap(),
        Value::Error("ERR unknown command".to_string())
    );
}

#[test]
fn test_decode_integers() {
    assert_eq!(decode_value(b":42\r\n").unwrap(), Value::Integer(42));
    assert_eq!(decode_value(b":-7\r\n").unwrap(), Value::Integer(-7));
    assert_eq!(
        decode_value(b":9223372036854775807\r\n").unwrap(),
        Value::Integer(i64::MAX)
    );
}

#[test]
fn test_decode_bulk_string() {
    assert_eq!(decode_value(b"$3\r\nfoo\r\n").unwrap(), Value::bulk("foo"));
}

#[test]
fn test_decode_empty_bulk_string_is_not_null() {
    let value = decode_value(b"$0\r\n\r\n").unwrap();
    assert_eq!(value, Value::BulkString(Some(Bytes::new())));
    assert!(!value.is_null());
}

#[test]
fn test_decode_null_bulk_string() {
    let value = decode_value(b"$-1\r\n").unwrap();
    assert_eq!(value, Value::BulkString(None));
    assert!(value.is_null());
}

#[test]
fn test_decode_bulk_string_with_embedded_crlf() {
    assert_eq!(
        decode_value(b"$4\r\na\r\nb\r\n").unwrap(),
        Value::bulk(&b"a\r\nb"[..])
    );
}

#[test]
fn test_decode_binary_bulk_string() {
    assert_eq!(
        decode_value(b"$3\r\n\x00\xff\x80\r\n").unwrap(),
        Value::bulk(vec![0x00, 0xff, 0x80])
    );
}

// =============================================================================
// Array Decoding Tests
// =============================================================================

#[test]
fn test_decode_nested_array() {
    assert_eq!(
        decode_value(b"*2\r\n*1\r\n:1\r\n$-1\r\n").unwrap(),
        Value::array(vec![
            Value::array(vec![Value::Integer(1)]),
            Value::BulkString(None),
        ])
    );
}

#[test]
fn test_decode_mixed_array_preserves_order() {
    let value = decode_value(b"*4\r\n+a\r\n:2\r\n$1\r\nc\r\n-d\r\n").unwrap();
    assert_eq!(
        value,
        Value::array(vec![
            Value::SimpleString("a".to_string()),
            Value::Integer(2),
            Value::bulk("c"),
            Value::Error("d".to_string()),
        ])
    );
}

#[test]
fn test_decode_empty_and_null_arrays() {
    assert_eq!(decode_value(b"*0\r\n").unwrap(), Value::array(vec![]));
    assert_eq!(decode_value(b"*-1\r\n").unwrap(), Value::Array(None));
}

#[test]
fn test_decode_is_idempotent() {
    let frame = b"*3\r\n$7\r\nmessage\r\n$4\r\nnews\r\n$5\r\nhello\r\n\r\n";
    assert_eq!(decode_value(frame).unwrap(), decode_value(frame).unwrap());
}

#[test]
fn test_decode_ignores_surrounding_separators() {
    assert_eq!(
        decode_value(b"\r\n+OK\r\n\r\n").unwrap(),
        Value::SimpleString("OK".to_string())
    );
}

#[test]
fn test_decode_nesting_at_limit() {
    let mut frame = b"*1\r\n".repeat(MAX_NESTING_DEPTH);
    frame.extend_from_slice(b":1\r\n");
    assert!(decode_value(&frame).is_ok());
}

// =============================================================================
// Protocol Violation Tests
// =============================================================================

#[test]
fn test_decode_empty_frame() {
    assert_violation(b"");
    assert_violation(b"\r\n\r\n");
}

#[test]
fn test_decode_unknown_type_byte() {
    assert_violation(b"?what\r\n");
}

#[test]
fn test_decode_missing_crlf() {
    assert_violation(b"+OK");
    assert_violation(b":12");
}

#[test]
fn test_decode_invalid_integer() {
    assert_violation(b":twelve\r\n");
    assert_violation(b":\r\n");
}

#[test]
fn test_decode_invalid_lengths() {
    assert_violation(b"$abc\r\nfoo\r\n");
    assert_violation(b"$-2\r\n");
    assert_violation(b"*-5\r\n");
}

#[test]
fn test_decode_truncated_bulk_string() {
    assert_violation(b"$5\r\nab\r\n");
}

#[test]
fn test_decode_bulk_string_length_mismatch() {
    assert_violation(b"$2\r\nabc\r\n");
}

#[test]
fn test_decode_truncated_array() {
    assert_violation(b"*2\r\n:1\r\n");
    assert_violation(b"*2\r\n*1\r\n");
}

#[test]
fn test_decode_huge_count_on_short_input() {
    assert_violation(b"*1000000000\r\n:1\r\n");
}

#[test]
fn test_decode_trailing_garbage() {
    assert_violation(b"+OK\r\nxyz");
    assert_violation(b":1\r\n:2\r\n");
}

#[test]
fn test_decode_nesting_past_limit() {
    let mut frame = b"*1\r\n".repeat(MAX_NESTING_DEPTH + 1);
    frame.extend_from_slice(b":1\r\n");
    assert_violation(&frame);
}
