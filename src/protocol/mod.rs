//! Protocol Module
//!
//! Client side of the RESP wire protocol.
//!
//! ## Data Flow
//! ```text
//!  input line ──► tokenize ──► encode_command ──► transport
//!                                                    │
//!  render ◄── decode_value ◄── FrameReader ◄─────────┘
//! ```
//!
//! ### Value Kinds
//! - `+` SimpleString
//! - `-` Error
//! - `:` Integer
//! - `$` BulkString (nullable)
//! - `*` Array (nullable)

mod value;
mod tokenizer;
mod codec;
mod frame;
mod render;

pub use value::Value;
pub use tokenizer::tokenize;
pub use codec::{decode_value, encode_command, encode_line, write_frame, CRLF, MAX_NESTING_DEPTH};
pub use frame::{Frame, FrameReader, DEFAULT_MAX_FRAME_SIZE};
pub use render::render;
