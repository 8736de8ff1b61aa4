//! Length-prefix frame codec.
//!
//! Wire format:
//! ```text
//! ┌────────────┬──────────────────────────┐
//! │ Length (4B)│ postcard payload (N B)   │
//! │ LE u32     │                          │
//! └────────────┴──────────────────────────┘
//! ```
//!
//! Requests carry a [`ServoCommand`](crate::app::commands::ServoCommand),
//! responses a [`Response`].  The decoder accumulates incoming bytes and
//! yields complete frames, so a single read may return part of the header,
//! part of the payload, or several frames back to back.

use serde::{Deserialize, Serialize};

use crate::app::commands::CommandReply;
use crate::error::CommandError;

/// Maximum frame payload size.  Both message types encode to a handful of bytes.
pub const MAX_FRAME_SIZE: usize = 64;

/// Frame header size (4-byte little-endian length).
pub const HEADER_SIZE: usize = 4;

/// Largest complete frame on the wire.
pub const MAX_WIRE_SIZE: usize = HEADER_SIZE + MAX_FRAME_SIZE;

/// Reply on the wire: the command's result, or its errno.
pub type Response = Result<CommandReply, i32>;

enum DecoderState {
    ReadingHeader { collected: usize },
    ReadingPayload { expected: usize, collected: usize },
}

/// Streaming frame decoder.
pub struct FrameDecoder {
    state: DecoderState,
    header_buf: [u8; HEADER_SIZE],
    payload_buf: [u8; MAX_FRAME_SIZE],
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::ReadingHeader { collected: 0 },
            header_buf: [0; HEADER_SIZE],
            payload_buf: [0; MAX_FRAME_SIZE],
        }
    }

    /// Feed bytes into the decoder.
    ///
    /// Returns how many bytes of `data` were consumed and, if a frame
    /// completed, its payload.  Consumption stops right after a complete
    /// frame; call again with the remainder.  Frames announcing a zero or
    /// oversized length are dropped together with their header.
    pub fn feed(&mut self, data: &[u8]) -> (usize, Option<&[u8]>) {
        let mut offset = 0;

        while offset < data.len() {
            match &mut self.state {
                DecoderState::ReadingHeader { collected } => {
                    let to_copy = (HEADER_SIZE - *collected).min(data.len() - offset);
                    self.header_buf[*collected..*collected + to_copy]
                        .copy_from_slice(&data[offset..offset + to_copy]);
                    *collected += to_copy;
                    offset += to_copy;

                    if *collected == HEADER_SIZE {
                        let expected = u32::from_le_bytes(self.header_buf) as usize;
                        if expected == 0 || expected > MAX_FRAME_SIZE {
                            self.state = DecoderState::ReadingHeader { collected: 0 };
                            continue;
                        }
                        self.state = DecoderState::ReadingPayload {
                            expected,
                            collected: 0,
                        };
                    }
                }

                DecoderState::ReadingPayload { expected, collected } => {
                    let to_copy = (*expected - *collected).min(data.len() - offset);
                    self.payload_buf[*collected..*collected + to_copy]
                        .copy_from_slice(&data[offset..offset + to_copy]);
                    *collected += to_copy;
                    offset += to_copy;

                    if *collected == *expected {
                        let len = *expected;
                        self.state = DecoderState::ReadingHeader { collected: 0 };
                        return (offset, Some(&self.payload_buf[..len]));
                    }
                }
            }
        }

        (offset, None)
    }

    /// Drop any partially received frame.
    pub fn reset(&mut self) {
        self.state = DecoderState::ReadingHeader { collected: 0 };
    }
}

/// Serialize `msg` into a length-prefixed frame in `out_buf`.
///
/// Returns the total number of bytes written, or `None` if it does not fit.
pub fn encode_frame<T: Serialize>(msg: &T, out_buf: &mut [u8]) -> Option<usize> {
    let limit = out_buf.len().min(MAX_WIRE_SIZE);
    if limit <= HEADER_SIZE {
        return None;
    }
    let len = postcard::to_slice(msg, &mut out_buf[HEADER_SIZE..limit])
        .ok()?
        .len();

    let len_bytes = u32::try_from(len).ok()?.to_le_bytes();
    out_buf[..HEADER_SIZE].copy_from_slice(&len_bytes);
    Some(HEADER_SIZE + len)
}

/// Deserialize one frame payload.  Anything that is not exactly one
/// well-formed message is [`CommandError::Malformed`].
pub fn decode_payload<'de, T: Deserialize<'de>>(payload: &'de [u8]) -> Result<T, CommandError> {
    match postcard::take_from_bytes(payload) {
        Ok((msg, [])) => Ok(msg),
        _ => Err(CommandError::Malformed),
    }
}
