//! `arq-over-udp` — stop-and-wait reliable text messaging over lossy UDP.
//!
//! Short text messages are delivered over an unreliable datagram channel
//! using a stop-and-wait ARQ scheme: one alternating sequence bit, a
//! CRC16-CCITT integrity check, and positive/negative acknowledgements.
//! The receiving side carries an artificial bit-corruption fault injector so
//! loss and corruption are observable without a real noisy link.
//!
//! # Architecture
//!
//! ```text
//!  ┌──────────┐  "0|hello|255e"   ┌───────────┐
//!  │  Sender  │──────────────────▶│ Receiver  │── FaultInjector
//!  └────┬─────┘                   └─────┬─────┘   (flips one bit
//!       │        "ACK 0" / "NACK 0"     │          with prob. p)
//!       │◀───────────────────────────────┘
//!       │
//!  ┌────▼─────────┐
//!  │ UdpChannel   │  (send + await reply with deadline)
//!  └────┬─────────┘
//!       │ raw UDP datagrams
//!  ┌────▼──────┐
//!  │  Socket   │  (thin async wrapper around tokio UdpSocket)
//!  └───────────┘
//! ```
//!
//! Each module has a single responsibility:
//! - [`checksum`] — CRC16-CCITT codec shared by both endpoints
//! - [`fault`]    — probabilistic single-bit corruptor
//! - [`frame`]    — wire format for frames and replies
//! - [`config`]   — explicit sender/receiver configuration values
//! - [`channel`]  — timed request/response abstraction over the socket
//! - [`socket`]   — async UDP socket carrying raw datagrams
//! - [`sender`]   — retry/timeout state machine
//! - [`receiver`] — validate/acknowledge state machine + duplicate cache

pub mod channel;
pub mod checksum;
pub mod config;
pub mod fault;
pub mod frame;
pub mod receiver;
pub mod sender;
pub mod socket;

pub use channel::{RequestChannel, UdpChannel};
pub use config::{ReceiverConfig, SenderConfig};
pub use fault::{FaultError, FaultInjector};
pub use frame::{Frame, FrameError, Reply, SeqBit};
pub use receiver::{Receiver, Verdict};
pub use sender::{DeliveryError, Sender};
pub use socket::Socket;
