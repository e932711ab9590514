//! A reliable, in-order byte-stream transport on top of an unreliable
//! datagram link, using a sliding window protocol: a fixed window of five
//! outstanding frames, cumulative acknowledgments, and per-frame
//! retransmission timers.
//!
//! Two roles share the wire format but run as distinct instances: a
//! [`Sender`] accepts application byte buffers, fragments them, and
//! reliably admits them into flight; a [`Receiver`] reassembles frames in
//! order and hands the application a payload at a time. Neither side
//! surfaces protocol errors to the application; see the `error` module
//! for the taxonomy of what gets logged and dropped instead.

pub mod config;
pub mod error;
pub mod frame;
pub mod link;
pub mod receiver;
pub mod sender;

pub use config::SwpConfig;
pub use error::{Error, Result};
pub use frame::{Frame, FrameType};
pub use link::{ChannelLink, LinkEndpoint, UdpLink};
pub use receiver::Receiver;
pub use sender::Sender;
