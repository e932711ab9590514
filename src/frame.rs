//! Frame definition and wire encoding for the sliding window protocol.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7
//! +---------------+-----------------------------------------------+
//! |  Type (8)     |              Sequence Number (32)              |
//! +---------------+---------------+-------------------------------+
//! |                       Sequence Number cont.                   |
//! +---------------------------------------------------------------+
//! |                    Payload (0..1400 bytes)                    |
//! +---------------------------------------------------------------+
//! ```

use crate::config::{HEADER_SIZE, MAX_DATA_SIZE};
use crate::error::{Error, TypeByte};

/// Frame type: the literal ASCII tag on the wire, not an ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameType {
    Data = b'D',
    Ack = b'A',
}

impl FrameType {
    const fn from_u8(b: u8) -> Option<Self> {
        match b {
            b'D' => Some(Self::Data),
            b'A' => Some(Self::Ack),
            _ => None,
        }
    }
}

/// A decoded SWP frame. Owns its payload: frames cross thread boundaries
/// (into the window's slot storage, into the ready queue) so a borrowed
/// `&[u8]` tied to the incoming datagram's lifetime would not do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub frame_type: FrameType,
    pub seq_num: u32,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn data(seq_num: u32, payload: Vec<u8>) -> Self {
        debug_assert!(payload.len() <= MAX_DATA_SIZE);
        Self {
            frame_type: FrameType::Data,
            seq_num,
            payload,
        }
    }

    pub fn ack(seq_num: u32) -> Self {
        Self {
            frame_type: FrameType::Ack,
            seq_num,
            payload: Vec::new(),
        }
    }

    /// Encodes this frame as `type(1) || seq_num(4, BE) || payload`.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE + self.payload.len());
        buf.push(self.frame_type as u8);
        buf.extend_from_slice(&self.seq_num.to_be_bytes());
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Decodes a frame from `buf`. Fails if `buf` is shorter than the
    /// 5-byte header or the type byte isn't `'D'`/`'A'`.
    pub fn decode(buf: &[u8]) -> Result<Self, Error> {
        if buf.len() < HEADER_SIZE {
            return Err(Error::MalformedFrame(TypeByte(buf.first().copied())));
        }

        let frame_type = FrameType::from_u8(buf[0])
            .ok_or(Error::MalformedFrame(TypeByte(Some(buf[0]))))?;
        let seq_num = u32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]);
        let payload = buf[HEADER_SIZE..].to_vec();

        Ok(Self {
            frame_type,
            seq_num,
            payload,
        })
    }
}
