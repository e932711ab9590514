use std::fmt;

/// Errors produced while decoding frames or driving the protocol state
/// machine.
///
/// None of these ever reach the application through `Sender::send` or
/// `Receiver::recv`: the protocol layer's propagation policy is to log
/// and drop (see the module docs on `sender` and `receiver`).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("frame shorter than header or has an unknown type byte: {0:?}")]
    MalformedFrame(TypeByte),

    #[error("ACK seq {seq} is beyond LFS {lfs}")]
    OutOfWindow { seq: u32, lfs: u32 },

    #[error("DATA seq {seq} already delivered (NFE {nfe})")]
    Duplicate { seq: u32, nfe: u32 },

    #[error("link endpoint error: {0}")]
    LinkTransient(String),
}

/// The raw byte that made a frame malformed, kept around only so the log
/// line that reports a drop can show it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TypeByte(pub Option<u8>);

impl fmt::Debug for TypeByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(b) => write!(f, "0x{:02x}", b),
            None => write!(f, "<short>"),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
