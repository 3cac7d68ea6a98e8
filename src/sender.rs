//! Outbound retry/timeout state machine for stop-and-wait delivery.
//!
//! [`Sender`] tracks the session's alternating sequence bit and drives the
//! per-message attempt loop.  It does **not** touch the socket directly;
//! all I/O goes through a [`RequestChannel`], so the machine can be tested
//! against a scripted in-memory channel.
//!
//! # Stop-and-wait contract
//! - At most **one** message is outstanding at any moment; `deliver` returns
//!   before the next message may be submitted.
//! - Each attempt is exactly one transmission followed by one bounded wait.
//! - The sequence bit flips **iff** a reply byte-identical to
//!   `"ACK <seq>"` arrives; timeouts, NACKs, and garbled replies never
//!   advance it.
//! - Exhausting the attempt budget fails that message only; the session
//!   (and its unchanged sequence bit) remains usable for the next call.

use thiserror::Error;

use crate::channel::RequestChannel;
use crate::config::SenderConfig;
use crate::frame::{Frame, FrameError, Reply, SeqBit};

/// Per-call delivery failures.  None of these is fatal to the session.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Payload violated the frame format before anything was sent.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Every attempt timed out or drew a non-matching reply.
    #[error("no matching ACK after {attempts} attempt(s)")]
    RetriesExhausted { attempts: u32 },

    /// The underlying channel failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Stop-and-wait send-side session.
#[derive(Debug)]
pub struct Sender<C: RequestChannel> {
    channel: C,
    config: SenderConfig,
    /// Sequence bit for the **next** frame.  Mutated only on confirmed
    /// success.
    seq: SeqBit,
}

impl<C: RequestChannel> Sender<C> {
    /// Create a session starting at sequence bit `0`.
    pub fn new(channel: C, config: SenderConfig) -> Self {
        Self {
            channel,
            config,
            seq: SeqBit::Zero,
        }
    }

    /// The sequence bit the next frame will carry.
    pub fn sequence(&self) -> SeqBit {
        self.seq
    }

    /// Reliably deliver `payload`, retrying on timeout or negative reply.
    ///
    /// On success the session sequence bit has flipped.  On
    /// [`DeliveryError::RetriesExhausted`] the bit is unchanged, so
    /// resubmitting the payload reuses the same bit.
    pub async fn deliver(&mut self, payload: &str) -> Result<(), DeliveryError> {
        let frame = Frame::build(self.seq, payload)?;
        let wire = frame.encode();
        // The one reply that counts as success, compared byte-for-byte.
        let expected = Reply::Ack(self.seq).encode();

        for attempt in 1..=self.config.max_attempts {
            log::info!(
                "attempt {attempt}/{}: sending seq={}",
                self.config.max_attempts,
                self.seq
            );

            match self
                .channel
                .exchange(wire.as_bytes(), self.config.timeout)
                .await?
            {
                None => {
                    log::warn!("timeout waiting for reply; retrying");
                }
                Some(reply) if reply == expected.as_bytes() => {
                    log::info!("received {expected}; delivery confirmed");
                    self.seq = self.seq.flip();
                    return Ok(());
                }
                Some(reply) => {
                    log::warn!(
                        "non-matching reply {:?}; retrying",
                        String::from_utf8_lossy(&reply)
                    );
                }
            }
        }

        log::error!(
            "giving up on seq={} after {} attempt(s)",
            self.seq,
            self.config.max_attempts
        );
        Err(DeliveryError::RetriesExhausted {
            attempts: self.config.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Scripted channel: records transmissions, replays canned replies.
    /// `None` entries simulate a deadline expiry.
    struct ScriptedChannel {
        sent: Vec<String>,
        replies: VecDeque<Option<Vec<u8>>>,
    }

    impl ScriptedChannel {
        fn new<I>(replies: I) -> Self
        where
            I: IntoIterator<Item = Option<&'static str>>,
        {
            Self {
                sent: Vec::new(),
                replies: replies
                    .into_iter()
                    .map(|r| r.map(|s| s.as_bytes().to_vec()))
                    .collect(),
            }
        }
    }

    impl RequestChannel for ScriptedChannel {
        async fn exchange(
            &mut self,
            frame: &[u8],
            _deadline: Duration,
        ) -> std::io::Result<Option<Vec<u8>>> {
            self.sent.push(String::from_utf8(frame.to_vec()).unwrap());
            Ok(self.replies.pop_front().flatten())
        }
    }

    fn config(max_attempts: u32) -> SenderConfig {
        SenderConfig {
            timeout: Duration::from_millis(10),
            max_attempts,
        }
    }

    #[tokio::test]
    async fn immediate_ack_succeeds_and_flips_bit() {
        let channel = ScriptedChannel::new([Some("ACK 0")]);
        let mut sender = Sender::new(channel, config(5));

        sender.deliver("hello").await.unwrap();
        assert_eq!(sender.sequence(), SeqBit::One);
    }

    #[tokio::test]
    async fn frame_on_the_wire_is_well_formed() {
        let channel = ScriptedChannel::new([Some("ACK 0")]);
        let mut sender = Sender::new(channel, config(5));
        sender.deliver("hello").await.unwrap();
        assert_eq!(sender.channel.sent, vec!["0|hello|255e".to_string()]);
    }

    #[tokio::test]
    async fn consecutive_deliveries_alternate_sequence() {
        let channel = ScriptedChannel::new([Some("ACK 0"), Some("ACK 1"), Some("ACK 0")]);
        let mut sender = Sender::new(channel, config(5));

        sender.deliver("one").await.unwrap();
        sender.deliver("two").await.unwrap();
        sender.deliver("three").await.unwrap();

        assert_eq!(sender.sequence(), SeqBit::One);
        assert!(sender.channel.sent[0].starts_with("0|"));
        assert!(sender.channel.sent[1].starts_with("1|"));
        assert!(sender.channel.sent[2].starts_with("0|"));
    }

    #[tokio::test]
    async fn retries_on_timeout_then_succeeds() {
        let channel = ScriptedChannel::new([None, None, Some("ACK 0")]);
        let mut sender = Sender::new(channel, config(5));

        sender.deliver("persistent").await.unwrap();
        assert_eq!(sender.channel.sent.len(), 3);
        assert_eq!(sender.sequence(), SeqBit::One);
    }

    #[tokio::test]
    async fn nack_and_garbage_replies_trigger_retry() {
        let channel =
            ScriptedChannel::new([Some("NACK 0"), Some("noise"), Some("ACK 1"), Some("ACK 0")]);
        let mut sender = Sender::new(channel, config(5));

        // A NACK, garbage, and an ACK for the wrong bit each consume one attempt.
        sender.deliver("stubborn").await.unwrap();
        assert_eq!(sender.channel.sent.len(), 4);
        assert_eq!(sender.sequence(), SeqBit::One);
    }

    #[tokio::test]
    async fn exhaustion_fails_and_leaves_sequence_unchanged() {
        let channel = ScriptedChannel::new([None, Some("NACK 0"), None]);
        let mut sender = Sender::new(channel, config(3));

        let err = sender.deliver("doomed").await.unwrap_err();
        assert!(matches!(
            err,
            DeliveryError::RetriesExhausted { attempts: 3 }
        ));
        assert_eq!(sender.channel.sent.len(), 3);
        assert_eq!(sender.sequence(), SeqBit::Zero);

        // An exhausted script keeps timing out; the next call must reuse bit 0.
        assert!(sender.deliver("next").await.is_err());
        assert!(sender.channel.sent[3].starts_with("0|"));
    }

    #[tokio::test]
    async fn separator_in_payload_is_rejected_before_sending() {
        let channel = ScriptedChannel::new([]);
        let mut sender = Sender::new(channel, config(3));

        let err = sender.deliver("bad|payload").await.unwrap_err();
        assert!(matches!(
            err,
            DeliveryError::Frame(FrameError::SeparatorInPayload)
        ));
        assert!(sender.channel.sent.is_empty());
        assert_eq!(sender.sequence(), SeqBit::Zero);
    }
}
