//! The lossy datagram link SWP is built on top of.
//!
//! `spec.md` treats this as an external collaborator and only summarizes
//! its contract (`send`/`recv`, best-effort, optionally lossy). This module
//! supplies two concrete implementations: [`UdpLink`], a real link over
//! `std::net::UdpSocket`, and [`ChannelLink`], an in-memory pair used by
//! this crate's own tests.

use std::io;
use std::net::{ToSocketAddrs, UdpSocket};
use std::sync::mpsc::{self, Receiver, Sender as ChannelSender};
use std::sync::Arc;

use log::warn;
use rand::Rng;

use crate::config::HEADER_SIZE;
use crate::error::Error;

/// A best-effort datagram endpoint. `send` never blocks on delivery and
/// may silently drop; `recv` blocks until a datagram arrives, or returns
/// `None` for a transient skip (a dropped inbound datagram, or a decode
/// failure the endpoint itself chooses to swallow rather than a frame).
///
/// Implementations must be safe to call `send`/`recv` on concurrently from
/// distinct threads (one thread typically owns `recv`, while `send` is
/// invoked both from application threads and retransmit sweeps).
pub trait LinkEndpoint: Send + Sync {
    fn send(&self, bytes: &[u8]);
    fn recv(&self) -> Option<Vec<u8>>;
}

/// Simulates datagram loss on the send path by dropping with probability
/// `p`. Shared by [`UdpLink`] and [`ChannelLink`] so both honor the same
/// `loss_probability` construction parameter spec.md §6 calls for.
fn should_drop(loss_probability: f64) -> bool {
    loss_probability > 0.0 && rand::thread_rng().gen_bool(loss_probability.min(1.0))
}

/// A real link endpoint over a connected UDP socket.
pub struct UdpLink {
    socket: UdpSocket,
    loss_probability: f64,
}

impl UdpLink {
    /// Binds `local_addr` and connects to `remote_addr`, so `send`/`recv`
    /// need not repeat the peer address on every call.
    pub fn connect(
        local_addr: impl ToSocketAddrs,
        remote_addr: impl ToSocketAddrs,
        loss_probability: f64,
    ) -> io::Result<Self> {
        let socket = UdpSocket::bind(local_addr)?;
        socket.connect(remote_addr)?;
        Ok(Self {
            socket,
            loss_probability,
        })
    }

    /// Binds `local_addr` without connecting; the first datagram received
    /// determines the peer, mirroring how `Receiver` does not know its
    /// sender in advance.
    pub fn bind(local_addr: impl ToSocketAddrs, loss_probability: f64) -> io::Result<Self> {
        let socket = UdpSocket::bind(local_addr)?;
        Ok(Self {
            socket,
            loss_probability,
        })
    }
}

impl LinkEndpoint for UdpLink {
    fn send(&self, bytes: &[u8]) {
        if should_drop(self.loss_probability) {
            return;
        }
        if let Err(e) = self.socket.send(bytes) {
            warn!("{}", Error::LinkTransient(e.to_string()));
        }
    }

    fn recv(&self) -> Option<Vec<u8>> {
        let mut buf = vec![0u8; HEADER_SIZE + 1400];
        match self.socket.recv_from(&mut buf) {
            Ok((n, peer)) => {
                // Lock onto the first peer seen if we weren't pre-connected.
                let _ = self.socket.connect(peer);
                buf.truncate(n);
                Some(buf)
            }
            Err(e) => {
                warn!("{}", Error::LinkTransient(e.to_string()));
                None
            }
        }
    }
}

/// An in-memory, thread-safe lossy link, used by this crate's tests so
/// they don't need real sockets. Create a connected pair with
/// [`ChannelLink::pair`]; each half may drop outbound datagrams with
/// independent `loss_probability`.
pub struct ChannelLink {
    tx: ChannelSender<Vec<u8>>,
    rx: std::sync::Mutex<Receiver<Vec<u8>>>,
    loss_probability: f64,
}

impl ChannelLink {
    /// Builds two endpoints, `a` and `b`, wired so `a.send` is delivered to
    /// `b.recv` and vice versa.
    pub fn pair(loss_probability: f64) -> (Arc<Self>, Arc<Self>) {
        let (tx_a, rx_b) = mpsc::channel();
        let (tx_b, rx_a) = mpsc::channel();
        let a = Arc::new(Self {
            tx: tx_a,
            rx: std::sync::Mutex::new(rx_a),
            loss_probability,
        });
        let b = Arc::new(Self {
            tx: tx_b,
            rx: std::sync::Mutex::new(rx_b),
            loss_probability,
        });
        (a, b)
    }
}

impl LinkEndpoint for ChannelLink {
    fn send(&self, bytes: &[u8]) {
        if should_drop(self.loss_probability) {
            return;
        }
        // The peer may have been dropped in a test; that's just a send
        // into the void, matching "best-effort" datagram delivery.
        let _ = self.tx.send(bytes.to_vec());
    }

    fn recv(&self) -> Option<Vec<u8>> {
        self.rx.lock().unwrap().recv().ok()
    }
}
