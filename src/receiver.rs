//! Receiver half of the sliding window protocol.
//!
//! Mirrors `TcpStream::read`'s `rvar.wait_while` pattern: the application
//! thread blocks on a condition variable guarding a queue the background
//! receive thread fills in.

use std::array;
use std::net::ToSocketAddrs;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::collections::VecDeque;

use log::{debug, trace, warn};

use crate::config::{SwpConfig, RECV_WINDOW_SIZE};
use crate::error::Error;
use crate::frame::{Frame, FrameType};
use crate::link::{LinkEndpoint, UdpLink};

struct ReceiverState {
    /// Next seq the app will consume, i.e. the highest contiguous seq
    /// delivered so far.
    nfe: u32,
    /// `window[(seq - 1) % W]` holds a buffered out-of-order DATA frame
    /// for `seq`, if any.
    window: [Option<Frame>; RECV_WINDOW_SIZE],
    ready_queue: VecDeque<Vec<u8>>,
}

impl ReceiverState {
    fn slot_index(seq: u32) -> usize {
        (seq - 1) as usize % RECV_WINDOW_SIZE
    }
}

struct ReceiverInner {
    link: Arc<dyn LinkEndpoint>,
    state: Mutex<ReceiverState>,
    not_empty: Condvar,
}

/// Buffers out-of-order DATA frames within the receive window, delivers
/// the contiguous prefix to the application in order, and emits a
/// cumulative ACK for every DATA frame it sees (in-window, out-of-window,
/// or duplicate).
pub struct Receiver {
    inner: Arc<ReceiverInner>,
    _recv_thread: JoinHandle<()>,
}

impl Receiver {
    pub fn new(link: Arc<dyn LinkEndpoint>, _config: SwpConfig) -> Self {
        let inner = Arc::new(ReceiverInner {
            link,
            state: Mutex::new(ReceiverState {
                nfe: 0,
                window: array::from_fn(|_| None),
                ready_queue: VecDeque::new(),
            }),
            not_empty: Condvar::new(),
        });

        let recv_thread = {
            let inner = inner.clone();
            thread::spawn(move || recv_loop(inner))
        };

        Self {
            inner,
            _recv_thread: recv_thread,
        }
    }

    /// Convenience constructor: binds a UDP socket to `local_addr` and
    /// builds a receiver over it. The peer address is learned from the
    /// first datagram received.
    pub fn bind(local_addr: impl ToSocketAddrs, loss_probability: f64) -> std::io::Result<Self> {
        let link = UdpLink::bind(local_addr, loss_probability)?;
        Ok(Self::new(Arc::new(link), SwpConfig::default()))
    }

    /// Blocks until a payload is available, then returns it. Payloads are
    /// delivered in strictly increasing seq order, each exactly once.
    pub fn recv(&self) -> Vec<u8> {
        let mut state = self.inner.state.lock().unwrap();
        state = self
            .inner
            .not_empty
            .wait_while(state, |s| s.ready_queue.is_empty())
            .unwrap();
        state.ready_queue.pop_front().unwrap()
    }
}

fn recv_loop(inner: Arc<ReceiverInner>) {
    loop {
        let Some(bytes) = inner.link.recv() else {
            continue;
        };

        let frame = match Frame::decode(&bytes) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("receiver: dropping malformed frame: {e}");
                continue;
            }
        };

        if frame.frame_type != FrameType::Data {
            continue;
        }

        let seq = frame.seq_num;
        let mut state = inner.state.lock().unwrap();

        if seq <= state.nfe {
            // Already delivered: re-ACK the current contiguous prefix so
            // the sender makes progress even if its earlier ACK was lost.
            trace!("{}", Error::Duplicate { seq, nfe: state.nfe });
            let ack = Frame::ack(state.nfe).encode();
            drop(state);
            inner.link.send(&ack);
            continue;
        }

        if seq > state.nfe + RECV_WINDOW_SIZE as u32 {
            warn!("receiver: seq={seq} outside window (NFE={}), dropping", state.nfe);
            continue;
        }

        let idx = ReceiverState::slot_index(seq);
        let already_buffered = matches!(&state.window[idx], Some(f) if f.seq_num == seq);
        if !already_buffered {
            state.window[idx] = Some(frame);
        }

        let mut delivered = false;
        loop {
            let next_idx = ReceiverState::slot_index(state.nfe + 1);
            match state.window[next_idx].take() {
                Some(f) if f.seq_num == state.nfe + 1 => {
                    state.ready_queue.push_back(f.payload);
                    state.nfe += 1;
                    delivered = true;
                }
                other => {
                    state.window[next_idx] = other;
                    break;
                }
            }
        }
        if delivered {
            debug!("receiver: NFE advanced to {}", state.nfe);
        }

        let ack = Frame::ack(state.nfe).encode();
        drop(state);
        inner.link.send(&ack);
        if delivered {
            inner.not_empty.notify_all();
        }
    }
}
