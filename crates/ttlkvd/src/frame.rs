//! Line-delimited JSON framing for the RPC transport
//!
//! One request per `\n`-terminated line; `\r\n` is accepted and blank lines are
//! skipped. Decoding is incremental: a partial line stays in the buffer until
//! more bytes arrive.

use bytes::BytesMut;
use std::fmt;
use ttlkv::protocol::{RpcFrame, RpcReplyFrame};

/// Maximum frame size (1 MiB) - a longer line without a terminator is refused
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    /// Line was not a valid frame; the connection can continue
    Malformed { id: Option<u64>, message: String },
    /// No terminator within `MAX_FRAME_SIZE` bytes; the connection must close
    TooLarge(usize),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Malformed { message, .. } => write!(f, "malformed frame: {}", message),
            FrameError::TooLarge(len) => write!(
                f,
                "frame too large: {} bytes without terminator (max: {} bytes)",
                len, MAX_FRAME_SIZE
            ),
        }
    }
}

impl std::error::Error for FrameError {}

/// Incremental line splitter with a remembered scan offset
///
/// Bytes already searched for a terminator are not searched again, so a line
/// trickling in over many reads costs time linear in its length.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Offset into the buffer where the next terminator search starts
    next_index: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next complete frame off the front of `buf`
    ///
    /// Returns `Ok(None)` when more data is needed; the partial line stays in
    /// `buf`. A malformed line is consumed before the error is returned, so the
    /// caller can keep reading. `buf` must only be appended to between calls.
    pub fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<RpcFrame>, FrameError> {
        loop {
            let start = self.next_index.min(buf.len());
            let newline = match buf[start..].iter().position(|&b| b == b'\n') {
                Some(offset) => start + offset,
                None if buf.len() > MAX_FRAME_SIZE => {
                    self.next_index = 0;
                    return Err(FrameError::TooLarge(buf.len()));
                }
                None => {
                    self.next_index = buf.len();
                    return Ok(None);
                }
            };
            self.next_index = 0;

            let line = buf.split_to(newline + 1);
            let line = trim_line(&line);
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            if line.len() > MAX_FRAME_SIZE {
                return Err(FrameError::TooLarge(line.len()));
            }

            return serde_json::from_slice::<RpcFrame>(line)
                .map(Some)
                .map_err(|e| FrameError::Malformed {
                    id: salvage_id(line),
                    message: e.to_string(),
                });
        }
    }
}

/// Serialize a reply as one line
pub fn encode(reply: &RpcReplyFrame) -> ttlkv::Result<Vec<u8>> {
    let mut out = serde_json::to_vec(reply)?;
    out.push(b'\n');
    Ok(out)
}

/// Drop the trailing `\n` and an optional `\r`
fn trim_line(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Best-effort id so a caller can correlate the error with its call
fn salvage_id(line: &[u8]) -> Option<u64> {
    serde_json::from_slice::<serde_json::Value>(line)
        .ok()?
        .get("id")?
        .as_u64()
}
