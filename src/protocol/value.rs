//! Value definitions
//!
//! A decoded protocol response.

use bytes::Bytes;

/// One decoded RESP value
///
/// `BulkString` and `Array` carry an `Option` because the wire format can
/// send an explicit null (length `-1`), which is distinct from empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// `+<text>\r\n`
    SimpleString(String),

    /// `$<len>\r\n<bytes>\r\n`
    BulkString(Option<Bytes>),

    /// `:<integer>\r\n`
    Integer(i64),

    /// `-<text>\r\n`
    Error(String),

    /// `*<count>\r\n` followed by `count` values
    Array(Option<Vec<Value>>),
}

impl Value {
    /// Non-null bulk string
    pub fn bulk(data: impl Into<Bytes>) -> Self {
        Value::BulkString(Some(data.into()))
    }

    /// Non-null array
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Some(items))
    }

    /// Null bulk string (`$-1`)
    pub fn null_bulk() -> Self {
        Value::BulkString(None)
    }

    /// Null array (`*-1`)
    pub fn null_array() -> Self {
        Value::Array(None)
    }

    /// Whether this is one of the two null forms
    pub fn is_null(&self) -> bool {
        matches!(self, Value::BulkString(None) | Value::Array(None))
    }

    /// Whether this is exactly the SimpleString `sentinel`
    pub fn is_simple(&self, sentinel: &str) -> bool {
        matches!(self, Value::SimpleString(s) if s == sentinel)
    }

    /// Kind name for log lines
    pub fn kind(&self) -> &'static str {
        match self {
            Value::SimpleString(_) => "simple-string",
            Value::BulkString(_) => "bulk-string",
            Value::Integer(_) => "integer",
            Value::Error(_) => "error",
            Value::Array(_) => "array",
        }
    }
}
