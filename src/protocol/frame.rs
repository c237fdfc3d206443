//! Frame Reader
//!
//! Turns a byte stream into delimiter-terminated frames.
//!
//! The underlying `read` may hand back any number of bytes, so bytes are
//! accumulated in a buffer and the delimiter is searched for in the buffer,
//! never in a single chunk. Bytes after a delimiter stay buffered for the
//! next frame.

use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};

use crate::error::{RespError, Result};

/// Default cap on a single frame (16 MB)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Bytes requested from the stream per read
const READ_CHUNK_SIZE: usize = 4096;

/// One complete message off the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(Bytes);

impl Frame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Reads delimiter-terminated frames from a stream
pub struct FrameReader<R> {
    /// Underlying byte stream
    inner: R,

    /// Bytes read but not yet returned as a frame
    buffer: BytesMut,

    /// Frame terminator
    delimiter: Vec<u8>,

    /// Drop the terminator from returned frames
    strip_delimiter: bool,

    /// Largest frame accepted before giving up
    max_frame_size: usize,

    /// Prefix of `buffer` already searched without a match
    scanned: usize,

    /// Skipping the rest of an oversized frame
    discarding: bool,
}

impl<R: Read> FrameReader<R> {
    /// Create a reader that splits `inner` on `delimiter`.
    ///
    /// Returned frames include the delimiter unless `strip_delimiter(true)`
    /// is set.
    pub fn new(inner: R, delimiter: impl Into<Vec<u8>>) -> Self {
        Self {
            inner,
            buffer: BytesMut::with_capacity(READ_CHUNK_SIZE),
            delimiter: delimiter.into(),
            strip_delimiter: false,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            scanned: 0,
            discarding: false,
        }
    }

    /// Set the frame size cap (in bytes)
    pub fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Choose whether returned frames keep their delimiter
    pub fn strip_delimiter(mut self, strip: bool) -> Self {
        self.strip_delimiter = strip;
        self
    }

    /// Block until one complete frame is available.
    ///
    /// Returns `ConnectionClosed` if the stream ends first; a partial frame
    /// pending at that point is discarded. A frame over the size cap is a
    /// `ProtocolViolation`, and the rest of it is skipped before the next
    /// frame is returned.
    pub fn read_frame(&mut self) -> Result<Frame> {
        if self.delimiter.is_empty() {
            return Err(RespError::Config("frame delimiter is empty".to_string()));
        }

        loop {
            if self.discarding {
                self.skip_oversized()?;
                continue;
            }

            if let Some(end) = self.find_delimiter() {
                let len = end + self.delimiter.len();
                let mut frame = self.buffer.split_to(len);
                self.scanned = 0;

                if len > self.max_frame_size {
                    return Err(RespError::ProtocolViolation(format!(
                        "frame of {} bytes exceeds {} bytes",
                        len, self.max_frame_size
                    )));
                }

                if self.strip_delimiter {
                    frame.truncate(end);
                }
                return Ok(Frame(frame.freeze()));
            }

            if self.buffer.len() > self.max_frame_size {
                let size = self.buffer.len();
                // The terminator is still on its way; drop everything up to it
                // so the next frame lines up with the next message.
                self.discarding = true;
                self.keep_delimiter_tail();
                return Err(RespError::ProtocolViolation(format!(
                    "frame exceeds {} bytes without a terminator ({} buffered)",
                    self.max_frame_size, size
                )));
            }

            self.fill()?;
        }
    }

    /// Drop bytes of an oversized frame up to and including its terminator
    fn skip_oversized(&mut self) -> Result<()> {
        if let Some(end) = self.find_delimiter() {
            let skipped = self.buffer.split_to(end + self.delimiter.len());
            tracing::debug!("Skipped {} trailing bytes of an oversized frame", skipped.len());
            self.scanned = 0;
            self.discarding = false;
            return Ok(());
        }

        self.keep_delimiter_tail();
        self.fill()?;
        Ok(())
    }

    /// Keep only the bytes that could start a terminator split across reads
    fn keep_delimiter_tail(&mut self) {
        let keep = self.delimiter.len() - 1;
        let stale = self.buffer.len().saturating_sub(keep);
        let _ = self.buffer.split_to(stale);
        self.scanned = self.buffer.len();
    }

    /// Position of the first delimiter in the buffer.
    ///
    /// The search restarts a delimiter-length short of the scanned prefix so
    /// that a terminator split across two reads is still found.
    fn find_delimiter(&mut self) -> Option<usize> {
        let width = self.delimiter.len();
        let from = self.scanned.saturating_sub(width - 1);

        let found = self.buffer[from..]
            .windows(width)
            .position(|w| w == self.delimiter.as_slice())
            .map(|i| from + i);

        if found.is_none() {
            self.scanned = self.buffer.len();
        }
        found
    }

    /// Pull one chunk from the stream into the buffer
    fn fill(&mut self) -> Result<usize> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(0) => {
                    if !self.buffer.is_empty() {
                        tracing::debug!(
                            "Stream ended with {} bytes of an incomplete frame",
                            self.buffer.len()
                        );
                    }
                    self.buffer.clear();
                    self.scanned = 0;
                    self.discarding = false;
                    return Err(RespError::ConnectionClosed);
                }
                Ok(n) => {
                    tracing::trace!("Read {} bytes", n);
                    self.buffer.extend_from_slice(&chunk[..n]);
                    return Ok(n);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(RespError::from_transport(e)),
            }
        }
    }

    /// Number of bytes buffered but not yet returned
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// The configured delimiter
    pub fn delimiter(&self) -> &[u8] {
        &self.delimiter
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutable access to the stream, e.g. to write on the same transport
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Give back the stream; buffered bytes are lost
    pub fn into_inner(self) -> R {
        self.inner
    }
}
