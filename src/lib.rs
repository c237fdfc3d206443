//! # respcli
//!
//! An interactive command-line client for RESP servers with:
//! - Shell-style tokenizing of typed commands
//! - RESP request encoding and response decoding
//! - Delimiter framing tolerant of fragmented reads
//! - Subscription mode with per-message acknowledgments
//! - Plain TCP, TLS and mTLS transports
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Terminal (stdin/stdout)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Session                               │
//! │        (Idle / AwaitingResponse / Subscribed)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Encoder   │          │ FrameReader │
//!   │ (tokenize)  │          │  + Decoder  │
//!   └──────┬──────┘          └──────▲──────┘
//!          │                        │
//!          ▼                        │
//!   ┌─────────────────────────────────────┐
//!   │      Transport (TCP / TLS / mTLS)    │
//!   └─────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod session;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{RespError, Result};
pub use config::{CertKeyPair, Config};
pub use protocol::Value;
pub use session::{Session, SessionState};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of respcli
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
