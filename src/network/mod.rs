//! Network Module
//!
//! Connection setup for the client.
//!
//! ## Transports
//! - Plain TCP
//! - TLS (server verified against configured CAs)
//! - mTLS (TLS plus a client certificate)
//!
//! The protocol core only needs `Read + Write`; everything specific to the
//! socket or to TLS stays here.

mod transport;

pub use transport::{connect, Transport};
