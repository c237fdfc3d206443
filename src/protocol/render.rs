//! Renderer
//!
//! Human-readable text for a decoded value, in the familiar `redis-cli`
//! layout:
//!
//! ```text
//! 1) "message"
//! 2) 1) (integer) 1
//!    2) (nil)
//! ```

use super::Value;

/// Render a value as text (no trailing newline)
pub fn render(value: &Value) -> String {
    render_at(value, 0)
}

/// Render `value` whose first line starts at column `indent`; continuation
/// lines are padded to that column.
fn render_at(value: &Value, indent: usize) -> String {
    match value {
        Value::SimpleString(text) => text.clone(),
        Value::Error(message) => format!("(error) {}", message),
        Value::Integer(n) => format!("(integer) {}", n),
        Value::BulkString(None) | Value::Array(None) => "(nil)".to_string(),
        Value::BulkString(Some(data)) => quote(data),
        Value::Array(Some(items)) if items.is_empty() => "(empty array)".to_string(),
        Value::Array(Some(items)) => {
            let width = items.len().to_string().len();
            let mut out = String::new();

            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                    out.push_str(&" ".repeat(indent));
                }
                let label = format!("{:>width$}) ", i + 1, width = width);
                out.push_str(&label);
                out.push_str(&render_at(item, indent + label.len()));
            }

            out
        }
    }
}

/// Double-quote a bulk string, escaping anything non-printable
fn quote(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() + 2);
    out.push('"');
    for &b in data {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{:02x}", b)),
        }
    }
    out.push('"');
    out
}
