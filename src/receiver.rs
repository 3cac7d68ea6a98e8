//! Inbound validate/acknowledge state machine with duplicate suppression.
//!
//! [`Receiver`] owns everything that happens between "a datagram arrived"
//! and "a reply is ready": fault injection (simulated channel noise),
//! parsing, checksum verification, and the one-slot duplicate cache.
//! [`Receiver::handle_datagram`] is free of socket I/O so every verdict can
//! be unit-tested; [`Receiver::serve`] is the indefinite loop that pairs it
//! with a [`Socket`].
//!
//! # Per-datagram contract
//! 1. Corrupt the raw bytes with the configured probability — this happens
//!    once, before parsing, so the flip may land in any field.
//! 2. Decode UTF-8 and parse the three fields.  Failure → `NACK ?`, no
//!    state change.
//! 3. Sequence equals the last accepted one → duplicate retransmission
//!    (the original ACK was lost); re-ACK without re-validating.
//! 4. Otherwise recompute the checksum: match → accept and remember the
//!    sequence; mismatch → `NACK <seq>`, no state change.
//!
//! The duplicate slot holds at most one sequence value.  It is a single
//! shared slot, not keyed per peer: with several concurrent senders it can
//! misclassify, which is out of scope here (one-peer protocol).

use rand::rngs::ThreadRng;
use rand::Rng;

use crate::config::ReceiverConfig;
use crate::fault::{FaultError, FaultInjector};
use crate::frame::{Frame, Reply, SeqBit};
use crate::socket::Socket;

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// How the receiver classified one inbound datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// New frame, checksum verified; the duplicate slot was updated.
    Accepted,
    /// Retransmission of the most recently accepted frame; re-ACKed
    /// idempotently.
    DuplicateAcked,
    /// Malformed or checksum-mismatched; answered with a NACK.
    Rejected,
}

// ---------------------------------------------------------------------------
// Receiver
// ---------------------------------------------------------------------------

/// Stop-and-wait receive-side session.
#[derive(Debug)]
pub struct Receiver<R: Rng> {
    injector: FaultInjector<R>,
    /// Sequence bit of the most recently accepted frame, if any.
    /// Overwritten on each acceptance — a one-slot cache, not a window.
    last_accepted: Option<SeqBit>,
}

impl Receiver<ThreadRng> {
    /// Build a receiver using the thread-local RNG for fault injection.
    pub fn new(config: ReceiverConfig) -> Result<Self, FaultError> {
        Ok(Self::with_injector(FaultInjector::new(
            config.corruption_probability,
        )?))
    }
}

impl<R: Rng> Receiver<R> {
    /// Build a receiver around an explicit injector (deterministic tests).
    pub fn with_injector(injector: FaultInjector<R>) -> Self {
        Self {
            injector,
            last_accepted: None,
        }
    }

    /// Sequence bit of the last accepted frame, if any.
    pub fn last_accepted(&self) -> Option<SeqBit> {
        self.last_accepted
    }

    /// Process one inbound datagram and produce the reply to send back.
    pub fn handle_datagram(&mut self, datagram: &[u8]) -> (Reply, Verdict) {
        let noisy = match self.injector.corrupt(datagram) {
            Ok(bytes) => bytes,
            Err(e) => {
                // Zero-length datagrams have no bit to flip and no fields
                // to parse; classify them with the malformed frames.
                log::warn!("unprocessable datagram: {e}");
                return (Reply::NackUnknown, Verdict::Rejected);
            }
        };

        let Ok(text) = std::str::from_utf8(&noisy) else {
            log::warn!("datagram is not valid UTF-8");
            return (Reply::NackUnknown, Verdict::Rejected);
        };
        let frame = match Frame::decode(text) {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("malformed frame: {e}");
                return (Reply::NackUnknown, Verdict::Rejected);
            }
        };

        if self.last_accepted == Some(frame.seq) {
            // The sender only repeats a bit when our ACK never reached it.
            log::info!("duplicate of seq={}; re-acknowledging", frame.seq);
            return (Reply::Ack(frame.seq), Verdict::DuplicateAcked);
        }

        if frame.checksum_matches() {
            log::info!("checksum OK for seq={}; accepting", frame.seq);
            self.last_accepted = Some(frame.seq);
            (Reply::Ack(frame.seq), Verdict::Accepted)
        } else {
            log::warn!("checksum mismatch for seq={}; rejecting", frame.seq);
            (Reply::Nack(frame.seq), Verdict::Rejected)
        }
    }

    /// Serve inbound datagrams forever, one at a time.
    ///
    /// Blocks only on the next datagram; each one is fully processed and
    /// answered before the next is read.  Returns only on socket failure.
    pub async fn serve(&mut self, socket: &Socket) -> std::io::Result<()> {
        log::info!("listening on {}", socket.local_addr);
        loop {
            let (datagram, peer) = socket.recv_from().await?;
            let (reply, verdict) = self.handle_datagram(&datagram);
            log::debug!("{peer}: {verdict:?} → {reply}");
            socket.send_to(reply.encode().as_bytes(), peer).await?;
        }
    }
}
