//! Endpoint configuration values.
//!
//! The reference behavior kept host, port, timeout, retry budget, and
//! corruption probability as module-level constants.  Here they are explicit
//! values handed to the [`crate::sender::Sender`] and
//! [`crate::receiver::Receiver`] constructors, so tests can tighten the
//! timeout or force corruption without touching globals.  Addresses stay out
//! of these structs — they belong to the socket layer, not the state
//! machines.

use std::time::Duration;

/// Adjustable parameters for the sending side.
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// How long each attempt waits for a reply before retrying.
    pub timeout: Duration,
    /// Total transmission budget per `deliver` call (first send included).
    pub max_attempts: u32,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
            max_attempts: 5,
        }
    }
}

/// Adjustable parameters for the receiving side.
#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    /// Probability in `[0, 1)` that an inbound datagram has one bit flipped
    /// before parsing.  Tests may force `1.0`.
    pub corruption_probability: f64,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            corruption_probability: 0.2,
        }
    }
}
