//! Tokenizer Tests
//!
//! These tests verify:
//! - Whitespace splitting
//! - Quoted tokens with embedded whitespace and escaped quotes
//! - Rejection of unbalanced or stray quotes

use respcli::protocol::tokenize;
use respcli::RespError;

fn assert_malformed(line: &str) {
    match tokenize(line) {
        Err(RespError::MalformedCommand(_)) => {}
        other => panic!("Expected MalformedCommand for {:?}, got {:?}", line, other),
    }
}

// =============================================================================
// Splitting Tests
// =============================================================================

#[test]
fn test_single_token() {
    assert_eq!(tokenize("ping").unwrap(), vec!["ping"]);
}

#[test]
fn test_splits_on_spaces() {
    assert_eq!(tokenize("set foo bar").unwrap(), vec!["set", "foo", "bar"]);
}

#[test]
fn test_collapses_repeated_whitespace() {
    assert_eq!(tokenize("  get \t key  ").unwrap(), vec!["get", "key"]);
}

#[test]
fn test_empty_line_yields_no_tokens() {
    assert!(tokenize("").unwrap().is_empty());
    assert!(tokenize("   \t ").unwrap().is_empty());
}

#[test]
fn test_preserves_case() {
    assert_eq!(tokenize("Get MyKey").unwrap(), vec!["Get", "MyKey"]);
}

// =============================================================================
// Quoting Tests
// =============================================================================

#[test]
fn test_quoted_token_keeps_spaces() {
    assert_eq!(
        tokenize(r#"set foo "bar baz""#).unwrap(),
        vec!["set", "foo", "bar baz"]
    );
}

#[test]
fn test_quoted_token_in_the_middle() {
    assert_eq!(
        tokenize(r#"hset "my key" field"#).unwrap(),
        vec!["hset", "my key", "field"]
    );
}

#[test]
fn test_doubled_quote_is_literal() {
    assert_eq!(
        tokenize(r#"echo "say ""hi""""#).unwrap(),
        vec!["echo", r#"say "hi""#]
    );
}

#[test]
fn test_quoted_empty_token() {
    assert_eq!(tokenize(r#"set k """#).unwrap(), vec!["set", "k", ""]);
}

#[test]
fn test_unicode_tokens() {
    assert_eq!(
        tokenize("set clé \"värde ünd\"").unwrap(),
        vec!["set", "clé", "värde ünd"]
    );
}

// =============================================================================
// Malformed Input Tests
// =============================================================================

#[test]
fn test_unterminated_quote() {
    assert_malformed(r#"foo "bar"#);
}

#[test]
fn test_lone_quote() {
    assert_malformed(r#"""#);
}

#[test]
fn test_bare_quote_inside_token() {
    assert_malformed(r#"set fo"o bar"#);
}

#[test]
fn test_text_after_closing_quote() {
    assert_malformed(r#"set "foo"bar"#);
}
