//! Timed request/response channel abstraction.
//!
//! The sender's only potentially-blocking operation is "transmit one
//! datagram, then wait for a reply up to a deadline".  [`RequestChannel`]
//! captures exactly that primitive, so the retry state machine in
//! [`crate::sender`] can be exercised against an in-memory fake channel in
//! tests while production code runs over [`UdpChannel`].
//!
//! A deadline expiry returns `Ok(None)`; it must not leave the channel in an
//! inconsistent state — the next attempt reuses the same channel.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::time::timeout;

use crate::socket::Socket;

/// One transmission plus one bounded wait for a reply.
pub trait RequestChannel {
    /// Send `frame` and wait up to `deadline` for a reply datagram.
    ///
    /// Returns `Ok(None)` when the deadline expires with no reply.
    fn exchange(
        &mut self,
        frame: &[u8],
        deadline: Duration,
    ) -> impl std::future::Future<Output = std::io::Result<Option<Vec<u8>>>> + Send;
}

// ---------------------------------------------------------------------------
// UdpChannel
// ---------------------------------------------------------------------------

/// A [`RequestChannel`] over a bound UDP socket and one fixed peer.
#[derive(Debug)]
pub struct UdpChannel {
    socket: Socket,
    peer: SocketAddr,
}

impl UdpChannel {
    /// Bind `local_addr` (use port 0 for an ephemeral port) and address all
    /// traffic to `peer`.
    pub async fn bind(local_addr: SocketAddr, peer: SocketAddr) -> std::io::Result<Self> {
        let socket = Socket::bind(local_addr).await?;
        Ok(Self { socket, peer })
    }

    /// The remote endpoint this channel talks to.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl RequestChannel for UdpChannel {
    async fn exchange(
        &mut self,
        frame: &[u8],
        deadline: Duration,
    ) -> std::io::Result<Option<Vec<u8>>> {
        self.socket.send_to(frame, self.peer).await?;

        // Datagrams from other sources do not count as replies and do not
        // reset the deadline.
        let reply_from_peer = async {
            loop {
                let (bytes, addr) = self.socket.recv_from().await?;
                if addr == self.peer {
                    return std::io::Result::Ok(bytes);
                }
                log::debug!("ignoring stray datagram from {addr}");
            }
        };

        match timeout(deadline, reply_from_peer).await {
            Ok(Ok(bytes)) => Ok(Some(bytes)),
            Ok(Err(e)) => Err(e),
            Err(_elapsed) => Ok(None),
        }
    }
}
