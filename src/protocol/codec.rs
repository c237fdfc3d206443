//! Protocol codec
//!
//! Encoding of requests and decoding of responses.
//!
//! ## Wire Format
//!
//! ### Request
//! ```text
//! *<N>\r\n
//! $<len>\r\n<VERB>\r\n
//! $<len>\r\n<arg>\r\n
//! ...
//! \r\n                      <- message separator
//! ```
//!
//! ### Response
//! ```text
//! +<text>\r\n               SimpleString
//! -<text>\r\n               Error
//! :<int>\r\n                Integer
//! $<len>\r\n<bytes>\r\n     BulkString ($-1 = null)
//! *<count>\r\n<values>      Array      (*-1 = null)
//! ```

use std::io::Write;

use bytes::{BufMut, Bytes, BytesMut};

use super::tokenizer::tokenize;
use super::Value;
use crate::error::{RespError, Result};

/// Line terminator inside a message
pub const CRLF: &[u8] = b"\r\n";

/// Deepest array nesting the decoder will follow
pub const MAX_NESTING_DEPTH: usize = 512;

// =============================================================================
// Request Encoding
// =============================================================================

/// Encode a token sequence as a request.
///
/// The first token is the command verb and is upper-cased; arguments are
/// sent as typed. Fails on an empty sequence.
pub fn encode_command<S: AsRef<str>>(tokens: &[S]) -> Result<Bytes> {
    let (verb, args) = tokens
        .split_first()
        .ok_or_else(|| RespError::MalformedCommand("empty command".to_string()))?;

    let verb = AsRef::<str>::as_ref(verb).to_uppercase();
    let payload_len: usize = args.iter().map(|a| AsRef::<str>::as_ref(a).len() + 16).sum();

    let mut buf = BytesMut::with_capacity(16 + verb.len() + payload_len);
    buf.put_slice(format!("*{}\r\n", tokens.len()).as_bytes());
    put_bulk(&mut buf, verb.as_bytes());
    for arg in args {
        put_bulk(&mut buf, AsRef::<str>::as_ref(arg).as_bytes());
    }
    buf.put_slice(CRLF);

    Ok(buf.freeze())
}

/// Tokenize and encode one input line
pub fn encode_line(line: &str) -> Result<Bytes> {
    let tokens = tokenize(line)?;
    encode_command(&tokens)
}

fn put_bulk(buf: &mut BytesMut, data: &[u8]) {
    buf.put_slice(format!("${}\r\n", data.len()).as_bytes());
    buf.put_slice(data);
    buf.put_slice(CRLF);
}

/// Write an encoded frame to a stream and flush it
pub fn write_frame<W: Write>(writer: &mut W, frame: &[u8]) -> Result<()> {
    writer.write_all(frame).map_err(RespError::from_transport)?;
    writer.flush().map_err(RespError::from_transport)?;
    Ok(())
}

// =============================================================================
// Response Decoding
// =============================================================================

/// Decode one framed message into a `Value`.
///
/// CRLF separators around the value are skipped; anything else left over
/// after the value is a protocol violation.
pub fn decode_value(frame: &[u8]) -> Result<Value> {
    let mut parser = Parser { buf: frame, pos: 0 };

    parser.skip_separators();
    if parser.at_end() {
        return Err(RespError::ProtocolViolation("empty frame".to_string()));
    }

    let value = parser.value(0)?;

    parser.skip_separators();
    if !parser.at_end() {
        return Err(RespError::ProtocolViolation(format!(
            "{} trailing bytes after {} value",
            frame.len() - parser.pos,
            value.kind()
        )));
    }

    Ok(value)
}

/// Cursor over one frame
struct Parser<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn skip_separators(&mut self) {
        loop {
            let rest = &self.buf[self.pos..];
            if rest.starts_with(CRLF) {
                self.pos += 2;
            } else if rest.starts_with(b"\n") {
                self.pos += 1;
            } else {
                return;
            }
        }
    }

    fn value(&mut self, depth: usize) -> Result<Value> {
        let Some(&tag) = self.buf.get(self.pos) else {
            return Err(truncated("type byte"));
        };
        self.pos += 1;

        match tag {
            b'+' => Ok(Value::SimpleString(self.text()?)),
            b'-' => Ok(Value::Error(self.text()?)),
            b':' => Ok(Value::Integer(self.integer()?)),
            b'$' => self.bulk_string(),
            b'*' => self.array(depth),
            other => Err(RespError::ProtocolViolation(format!(
                "unknown type byte 0x{:02x} at offset {}",
                other,
                self.pos - 1
            ))),
        }
    }

    /// Bytes up to the next CRLF; the cursor moves past it
    fn line(&mut self) -> Result<&'a [u8]> {
        let buf: &'a [u8] = self.buf;
        let rest = &buf[self.pos..];
        let end = rest
            .windows(CRLF.len())
            .position(|w| w == CRLF)
            .ok_or_else(|| truncated("CRLF"))?;
        self.pos += end + CRLF.len();
        Ok(&rest[..end])
    }

    fn text(&mut self) -> Result<String> {
        Ok(String::from_utf8_lossy(self.line()?).into_owned())
    }

    fn integer(&mut self) -> Result<i64> {
        let line = self.line()?;
        std::str::from_utf8(line)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or_else(|| {
                RespError::ProtocolViolation(format!(
                    "invalid integer {:?}",
                    String::from_utf8_lossy(line)
                ))
            })
    }

    /// Length header of a bulk string or array; `None` means null
    fn length(&mut self, what: &str) -> Result<Option<usize>> {
        match self.integer()? {
            -1 => Ok(None),
            n if n < -1 => Err(RespError::ProtocolViolation(format!(
                "negative {} length {}",
                what, n
            ))),
            n => usize::try_from(n).map(Some).map_err(|_| {
                RespError::ProtocolViolation(format!("{} length {} out of range", what, n))
            }),
        }
    }

    fn bulk_string(&mut self) -> Result<Value> {
        let Some(len) = self.length("bulk string")? else {
            return Ok(Value::BulkString(None));
        };

        let end = self
            .pos
            .checked_add(len)
            .filter(|end| end + CRLF.len() <= self.buf.len())
            .ok_or_else(|| truncated("bulk string payload"))?;

        if &self.buf[end..end + CRLF.len()] != CRLF {
            return Err(RespError::ProtocolViolation(format!(
                "bulk string length mismatch: declared {} bytes",
                len
            )));
        }

        let data = Bytes::copy_from_slice(&self.buf[self.pos..end]);
        self.pos = end + CRLF.len();
        Ok(Value::BulkString(Some(data)))
    }

    fn array(&mut self, depth: usize) -> Result<Value> {
        let Some(count) = self.length("array")? else {
            return Ok(Value::Array(None));
        };

        if depth >= MAX_NESTING_DEPTH {
            return Err(RespError::ProtocolViolation(format!(
                "array nesting deeper than {}",
                MAX_NESTING_DEPTH
            )));
        }

        // Every element takes at least three bytes, so the remaining input
        // bounds the allocation regardless of the declared count.
        let remaining = self.buf.len() - self.pos;
        let mut items = Vec::with_capacity(count.min(remaining / 3));
        for _ in 0..count {
            items.push(self.value(depth + 1)?);
        }

        Ok(Value::Array(Some(items)))
    }
}

fn truncated(what: &str) -> RespError {
    RespError::ProtocolViolation(format!("premature end of frame: expected {}", what))
}
