//! Session Module
//!
//! Drives one interactive connection: prompt, send, receive, render.
//!
//! ## States
//! ```text
//!            line             response
//!   Idle ───────────► AwaitingResponse ──────────► Idle
//!    │                      │
//!    │ quit / EOF           │ SUBSCRIBE_OK
//!    ▼                      ▼
//!  Terminated ◄──────── Subscribed ◄──┐
//!              closed        │ push   │
//!                            └─ ack ──┘
//! ```
//!
//! Once subscribed, the connection is dedicated to push delivery: every
//! pushed message is acknowledged before it is rendered and no further
//! commands are read.

use std::fmt;
use std::io::{Read, Write};

use bytes::Bytes;

use crate::config::Config;
use crate::error::{RespError, Result};
use crate::protocol::{decode_value, encode_line, render, write_frame, FrameReader, Value};

/// Where the session is in its request/response cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the user to type a command
    Idle,

    /// A request was written; its response has not been read yet
    AwaitingResponse,

    /// The server confirmed a subscription and is pushing messages
    Subscribed,

    /// No further I/O happens
    Terminated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::AwaitingResponse => "awaiting-response",
            SessionState::Subscribed => "subscribed",
            SessionState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// An interactive client session over one transport
pub struct Session<S, I, O> {
    /// Server connection, framed on the response delimiter
    transport: FrameReader<S>,

    /// User input, framed on the input delimiter
    input: FrameReader<I>,

    /// Where prompts, rendered values and messages go
    output: O,

    state: SessionState,

    quit_sentinel: String,
    subscribe_sentinel: String,
    ack_frame: Bytes,
    show_subscribe_ack: bool,
    prompt: String,
}

impl<S, I, O> Session<S, I, O>
where
    S: Read + Write,
    I: Read,
    O: Write,
{
    /// Create a session in the `Idle` state
    pub fn new(transport: S, input: I, output: O, config: &Config) -> Self {
        let transport = FrameReader::new(transport, config.response_delimiter.clone())
            .with_max_frame_size(config.max_frame_size);
        let input = FrameReader::new(input, config.input_delimiter.clone())
            .with_max_frame_size(config.max_frame_size)
            .strip_delimiter(true);

        Self {
            transport,
            input,
            output,
            state: SessionState::Idle,
            quit_sentinel: config.quit_sentinel.clone(),
            subscribe_sentinel: config.subscribe_sentinel.clone(),
            ack_frame: Bytes::from(config.ack_frame.clone()),
            show_subscribe_ack: config.show_subscribe_ack,
            prompt: config.prompt.clone(),
        }
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run until the session terminates.
    ///
    /// Returns `Ok` for a clean end (quit, end of input, peer closed the
    /// connection) and the error for any terminal failure.
    pub fn run(&mut self) -> Result<()> {
        while self.state != SessionState::Terminated {
            self.step()?;
        }
        Ok(())
    }

    /// Perform exactly one transition and return the new state.
    ///
    /// A terminal error moves the session to `Terminated` before it is
    /// returned.
    pub fn step(&mut self) -> Result<SessionState> {
        let next = match self.state {
            SessionState::Idle => self.on_idle(),
            SessionState::AwaitingResponse => self.on_awaiting_response(),
            SessionState::Subscribed => self.on_subscribed(),
            SessionState::Terminated => Ok(SessionState::Terminated),
        };

        match next {
            Ok(state) => {
                if state != self.state {
                    tracing::debug!("Session {} -> {}", self.state, state);
                }
                self.state = state;
                Ok(state)
            }
            Err(e) => {
                tracing::debug!("Session {} -> terminated: {}", self.state, e);
                self.state = SessionState::Terminated;
                Err(e)
            }
        }
    }

    // =========================================================================
    // State Handlers
    // =========================================================================

    fn on_idle(&mut self) -> Result<SessionState> {
        self.output.write_all(self.prompt.as_bytes())?;
        self.output.flush()?;

        let frame = match self.input.read_frame() {
            Ok(frame) => frame,
            // Stdin closed (Ctrl+D)
            Err(RespError::ConnectionClosed) => {
                tracing::debug!("Input closed");
                return self.quit();
            }
            // Oversized input line
            Err(e) if e.is_recoverable() => {
                self.report(&e)?;
                return Ok(SessionState::Idle);
            }
            // Stdin failed
            Err(e) => return Err(e),
        };

        let raw = String::from_utf8_lossy(frame.as_bytes());
        let line = raw.trim();

        if line.eq_ignore_ascii_case(&self.quit_sentinel) {
            tracing::debug!("Quit requested");
            return self.quit();
        }
        if line.is_empty() {
            return Ok(SessionState::Idle);
        }

        let request = match encode_line(line) {
            Ok(request) => request,
            // Bad quoting or empty command: prompt again
            Err(e) if e.is_recoverable() => {
                self.report(&e)?;
                return Ok(SessionState::Idle);
            }
            // encode_line only fails with MalformedCommand
            Err(e) => return Err(e),
        };

        tracing::debug!("Sending request ({} bytes)", request.len());
        match write_frame(self.transport.get_mut(), &request) {
            Ok(()) => Ok(SessionState::AwaitingResponse),
            // Server went away before the request
            Err(RespError::ConnectionClosed) => self.closed(),
            // Request may be half-written
            Err(e) => Err(e),
        }
    }

    fn on_awaiting_response(&mut self) -> Result<SessionState> {
        match self.read_value() {
            Ok(value) if value.is_simple(&self.subscribe_sentinel) => {
                tracing::info!("Subscription confirmed, waiting for pushed messages");
                if self.show_subscribe_ack {
                    self.render(&value)?;
                }
                Ok(SessionState::Subscribed)
            }
            Ok(value) => {
                self.render(&value)?;
                Ok(SessionState::Idle)
            }
            // Server closed the connection
            Err(RespError::ConnectionClosed) => self.closed(),
            // Malformed or oversized reply; the next turn starts clean
            Err(e) if e.is_recoverable() => {
                self.report(&e)?;
                Ok(SessionState::Idle)
            }
            // Read failed mid-response
            Err(e) => Err(e),
        }
    }

    fn on_subscribed(&mut self) -> Result<SessionState> {
        match self.read_value() {
            Ok(value) => {
                match write_frame(self.transport.get_mut(), &self.ack_frame) {
                    Ok(()) => {}
                    // Server went away before the ack
                    Err(RespError::ConnectionClosed) => return self.closed(),
                    // Ack never reached the server
                    Err(e) => return Err(e),
                }
                if !value.is_null() {
                    self.render(&value)?;
                }
                Ok(SessionState::Subscribed)
            }
            // Server ended the subscription
            Err(RespError::ConnectionClosed) => self.closed(),
            // Bad push: report it, stay subscribed, no ack
            Err(e) if e.is_recoverable() => {
                self.report(&e)?;
                Ok(SessionState::Subscribed)
            }
            // Unknown stream state after a failed read
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn read_value(&mut self) -> Result<Value> {
        let frame = self.transport.read_frame()?;
        tracing::debug!("Received frame ({} bytes)", frame.len());
        let value = decode_value(frame.as_bytes())?;
        tracing::trace!("Decoded {} value", value.kind());
        Ok(value)
    }

    fn render(&mut self, value: &Value) -> Result<()> {
        let mut text = render(value);
        text.push('\n');
        self.write_output(text.as_bytes())
    }

    /// Tell the user about a recoverable failure
    fn report(&mut self, err: &RespError) -> Result<()> {
        tracing::warn!("{}", err);
        self.write_output(format!("{}\n", err).as_bytes())
    }

    /// The user is done
    fn quit(&mut self) -> Result<SessionState> {
        self.write_output(b"bye\n")?;
        Ok(SessionState::Terminated)
    }

    /// The peer is gone; say so and stop
    fn closed(&mut self) -> Result<SessionState> {
        tracing::info!("Connection closed by server");
        self.write_output(b"connection closed\n")?;
        Ok(SessionState::Terminated)
    }

    fn write_output(&mut self, bytes: &[u8]) -> Result<()> {
        self.output.write_all(bytes)?;
        self.output.flush()?;
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The server connection
    pub fn transport(&self) -> &S {
        self.transport.get_ref()
    }

    /// The output sink
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Consume the session, returning the transport and output
    pub fn into_parts(self) -> (S, O) {
        (self.transport.into_inner(), self.output)
    }
}
