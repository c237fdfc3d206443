//! Error types for respcli
//!
//! Provides a unified error type for all operations.

use std::io::ErrorKind;
use thiserror::Error;

/// Result type alias using RespError
pub type Result<T> = std::result::Result<T, RespError>;

/// Unified error type for respcli operations
#[derive(Debug, Error)]
pub enum RespError {
    // -------------------------------------------------------------------------
    // Input Errors
    // -------------------------------------------------------------------------
    #[error("Malformed command: {0}")]
    MalformedCommand(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Transport failure: {0}")]
    TransportFailure(#[from] std::io::Error),

    #[error("Handshake failed: {0}")]
    HandshakeFailure(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RespError {
    /// Classify an I/O error coming off the transport.
    ///
    /// Resets, aborts and premature EOFs all mean the peer is gone, so they
    /// surface as `ConnectionClosed` rather than a transport failure.
    pub fn from_transport(err: std::io::Error) -> Self {
        match err.kind() {
            ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe => RespError::ConnectionClosed,
            _ => RespError::TransportFailure(err),
        }
    }

    /// Whether the session can keep prompting after this error.
    pub fn is_recoverable(&self) -> bool {
        match self {
            RespError::MalformedCommand(_) | RespError::ProtocolViolation(_) => true,
            RespError::TransportFailure(e) => {
                matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
            }
            _ => false,
        }
    }
}
