//! Sender half of the sliding window protocol.
//!
//! Mirrors the window bookkeeping of `tcp::tcb::TCB`'s `SendSpace` (LAR/LFS
//! here play the role of `SND.UNA`/`SND.NXT`) but collapsed to the fixed
//! five-slot ring buffer the protocol specifies, and to a single
//! cumulative-ACK scheme with no congestion control.

use std::array;
use std::net::ToSocketAddrs;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use log::{debug, trace, warn};

use crate::config::{SwpConfig, SEND_WINDOW_SIZE};
use crate::error::Error;
use crate::frame::{Frame, FrameType};
use crate::link::{LinkEndpoint, UdpLink};

/// One outstanding, unacknowledged DATA frame plus its retransmit deadline.
struct Slot {
    frame: Frame,
    deadline: Instant,
}

struct SenderState {
    /// Highest seq fully acknowledged.
    lar: u32,
    /// Highest seq assigned and transmitted.
    lfs: u32,
    /// `window[(seq - 1) % W]` holds the outstanding frame for `seq`.
    window: [Option<Slot>; SEND_WINDOW_SIZE],
}

impl SenderState {
    fn slot_index(seq: u32) -> usize {
        (seq - 1) as usize % SEND_WINDOW_SIZE
    }
}

struct SenderInner {
    link: Arc<dyn LinkEndpoint>,
    config: SwpConfig,
    state: Mutex<SenderState>,
    /// Signaled whenever a slot frees up, so `_send_one` can stop blocking.
    not_full: Condvar,
}

/// Accepts application byte buffers, fragments them, and reliably delivers
/// each fragment to a peer `Receiver`, admitting at most
/// [`SEND_WINDOW_SIZE`] frames into flight at once.
///
/// `send` never fails: link-send failures are logged and left to the
/// retransmit timer, per the protocol's error propagation policy (nothing
/// surfaces above this layer).
pub struct Sender {
    inner: Arc<SenderInner>,
    _ack_thread: JoinHandle<()>,
    _retransmit_thread: JoinHandle<()>,
}

impl Sender {
    /// Builds a sender on top of an arbitrary link endpoint. Spawns the ACK
    /// processing thread and the retransmit-sweep thread.
    pub fn new(link: Arc<dyn LinkEndpoint>, config: SwpConfig) -> Self {
        let inner = Arc::new(SenderInner {
            link,
            config,
            state: Mutex::new(SenderState {
                lar: 0,
                lfs: 0,
                window: array::from_fn(|_| None),
            }),
            not_full: Condvar::new(),
        });

        let ack_thread = {
            let inner = inner.clone();
            thread::spawn(move || ack_loop(inner))
        };
        let retransmit_thread = {
            let inner = inner.clone();
            thread::spawn(move || retransmit_loop(inner))
        };

        Self {
            inner,
            _ack_thread: ack_thread,
            _retransmit_thread: retransmit_thread,
        }
    }

    /// Convenience constructor: binds a UDP socket to `local_addr`,
    /// connects it to `remote_addr`, and builds a sender over it.
    pub fn connect(
        local_addr: impl ToSocketAddrs,
        remote_addr: impl ToSocketAddrs,
        loss_probability: f64,
    ) -> std::io::Result<Self> {
        let link = UdpLink::connect(local_addr, remote_addr, loss_probability)?;
        Ok(Self::new(Arc::new(link), SwpConfig::default()))
    }

    /// Fragments `bytes` into chunks of at most `max_payload` bytes and
    /// admits each to the window in order. Returns once every chunk has
    /// been admitted (not once every chunk has been acknowledged).
    pub fn send(&self, bytes: &[u8]) {
        for chunk in bytes.chunks(self.inner.config.max_payload) {
            self.send_one(chunk);
        }
    }

    fn send_one(&self, chunk: &[u8]) {
        let mut state = self.inner.state.lock().unwrap();

        state = self
            .inner
            .not_full
            .wait_while(state, |s| s.lfs - s.lar == SEND_WINDOW_SIZE as u32)
            .unwrap();

        state.lfs += 1;
        let seq = state.lfs;
        let frame = Frame::data(seq, chunk.to_vec());
        let encoded = frame.encode();
        let idx = SenderState::slot_index(seq);
        state.window[idx] = Some(Slot {
            frame,
            deadline: Instant::now() + self.inner.config.timeout,
        });

        // Transmit while still holding the lock: admission and the first
        // transmission attempt are one atomic state transition.
        self.inner.link.send(&encoded);
        trace!("sender: admitted and sent seq={seq}");
    }
}

fn ack_loop(inner: Arc<SenderInner>) {
    loop {
        let Some(bytes) = inner.link.recv() else {
            continue;
        };

        let frame = match Frame::decode(&bytes) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("sender: dropping malformed frame: {e}");
                continue;
            }
        };

        if frame.frame_type != FrameType::Ack {
            continue;
        }

        let a = frame.seq_num;
        if a == 0 {
            // seq_num 0 is the reserved "no ACKs yet" sentinel.
            continue;
        }

        let mut state = inner.state.lock().unwrap();

        if a <= state.lar {
            trace!("sender: duplicate ACK {a} (LAR={})", state.lar);
            continue;
        }
        if a > state.lfs {
            warn!("{}", Error::OutOfWindow { seq: a, lfs: state.lfs });
            continue;
        }

        let mut seq = state.lar + 1;
        while seq <= a {
            let idx = SenderState::slot_index(seq);
            state.window[idx] = None;
            seq += 1;
        }
        state.lar = a;
        debug!("sender: LAR advanced to {a}");

        drop(state);
        inner.not_full.notify_all();
    }
}

fn retransmit_loop(inner: Arc<SenderInner>) {
    loop {
        thread::sleep(inner.config.tick);

        let mut state = inner.state.lock().unwrap();
        let now = Instant::now();

        let (lar, lfs) = (state.lar, state.lfs);
        for seq in (lar + 1)..=lfs {
            let idx = SenderState::slot_index(seq);
            // Guard against a slot that's empty (already ACKed) or that
            // now holds a newer frame by the time we get the lock: a
            // no-op timer fire, exactly as the protocol requires.
            let fire = match &state.window[idx] {
                Some(slot) if slot.frame.seq_num == seq && now >= slot.deadline => true,
                _ => false,
            };
            if !fire {
                continue;
            }

            let encoded = state.window[idx].as_ref().unwrap().frame.encode();
            inner.link.send(&encoded);
            if let Some(slot) = state.window[idx].as_mut() {
                slot.deadline = now + inner.config.timeout;
            }
            debug!("sender: retransmitted seq={seq}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::ChannelLink;

    fn test_config() -> SwpConfig {
        SwpConfig::default()
            .with_timeout(std::time::Duration::from_millis(200))
            .with_tick(std::time::Duration::from_millis(10))
    }

    #[test]
    fn send_one_chunk_transmits_seq_one() {
        let (sender_link, peer_link) = ChannelLink::pair(0.0);
        let sender = Sender::new(sender_link, test_config());

        sender.send(b"hello");

        let bytes = peer_link.recv().unwrap();
        let frame = Frame::decode(&bytes).unwrap();
        assert_eq!(frame.frame_type, FrameType::Data);
        assert_eq!(frame.seq_num, 1);
        assert_eq!(frame.payload, b"hello");
    }

    #[test]
    fn fragments_large_buffer_in_order() {
        let (sender_link, peer_link) = ChannelLink::pair(0.0);
        let sender = Sender::new(sender_link, test_config());

        let data = vec![b'A'; 2801];
        sender.send(&data);

        let first = Frame::decode(&peer_link.recv().unwrap()).unwrap();
        let second = Frame::decode(&peer_link.recv().unwrap()).unwrap();
        let third = Frame::decode(&peer_link.recv().unwrap()).unwrap();

        assert_eq!((first.seq_num, first.payload.len()), (1, 1400));
        assert_eq!((second.seq_num, second.payload.len()), (2, 1400));
        assert_eq!((third.seq_num, third.payload.len()), (3, 1));
    }

    #[test]
    fn duplicate_ack_is_ignored() {
        let (sender_link, peer_link) = ChannelLink::pair(0.0);
        let sender = Sender::new(sender_link, test_config());

        sender.send(b"z");
        let _ = peer_link.recv().unwrap();

        peer_link.send(&Frame::ack(1).encode());
        peer_link.send(&Frame::ack(1).encode());

        std::thread::sleep(std::time::Duration::from_millis(50));
        let state = sender.inner.state.lock().unwrap();
        assert_eq!(state.lar, 1);
    }

    #[test]
    fn window_saturates_at_five_outstanding() {
        let (sender_link, peer_link) = ChannelLink::pair(0.0);
        let sender = Arc::new(Sender::new(sender_link, test_config()));

        let sender2 = sender.clone();
        let handle = thread::spawn(move || {
            for i in 0..7u8 {
                sender2.send(&[i]);
            }
        });

        // Drain the five frames that can be admitted immediately.
        for _ in 0..5 {
            peer_link.recv().unwrap();
        }

        // send() for chunk 6 should still be blocked: nothing more to
        // drain yet without an ACK freeing a slot.
        std::thread::sleep(std::time::Duration::from_millis(50));
        {
            let state = sender.inner.state.lock().unwrap();
            assert_eq!(state.lfs - state.lar, 5);
        }

        peer_link.send(&Frame::ack(1).encode());
        peer_link.send(&Frame::ack(2).encode());

        peer_link.recv().unwrap();
        peer_link.recv().unwrap();

        handle.join().unwrap();
    }
}
