//! Artificial bit-corruption fault injector.
//!
//! Real links corrupt frames; loopback UDP does not.  To make the checksum
//! and retransmission paths observable, the receiver passes every inbound
//! datagram through a [`FaultInjector`] before parsing it.  With probability
//! `p` the injector flips exactly one uniformly chosen bit; otherwise the
//! bytes pass through unchanged.  Output length always equals input length.
//!
//! The randomness source is injected by the caller, so tests can force
//! deterministic behavior: `p = 0.0` never corrupts, `p = 1.0` corrupts on
//! every call, and a seeded [`rand::rngs::StdRng`] makes the chosen bit
//! position reproducible.

use rand::rngs::ThreadRng;
use rand::Rng;
use thiserror::Error;

/// Errors from constructing or applying a [`FaultInjector`].
#[derive(Debug, Error, PartialEq)]
pub enum FaultError {
    /// Probability outside `[0.0, 1.0]`.
    #[error("corruption probability {0} is outside [0.0, 1.0]")]
    InvalidProbability(f64),

    /// Empty input has no bit to flip.
    #[error("cannot corrupt an empty byte sequence")]
    EmptyInput,
}

/// Flips at most one bit per call, with configurable probability.
#[derive(Debug)]
pub struct FaultInjector<R: Rng> {
    probability: f64,
    rng: R,
}

impl FaultInjector<ThreadRng> {
    /// Build an injector backed by the thread-local RNG.
    ///
    /// The configuration surface documents `p` in `[0, 1)`; the injector
    /// itself also accepts `p = 1.0` so tests can force corruption on every
    /// datagram.
    pub fn new(probability: f64) -> Result<Self, FaultError> {
        Self::with_rng(probability, rand::rng())
    }
}

impl<R: Rng> FaultInjector<R> {
    /// Build an injector with an explicit randomness source.
    pub fn with_rng(probability: f64, rng: R) -> Result<Self, FaultError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(FaultError::InvalidProbability(probability));
        }
        Ok(Self { probability, rng })
    }

    /// With probability `p`, flip one random bit of `data`; otherwise return
    /// it unchanged.  Empty input is an error — there is no bit to flip, and
    /// silently passing it through would hide a malformed datagram.
    pub fn corrupt(&mut self, data: &[u8]) -> Result<Vec<u8>, FaultError> {
        if data.is_empty() {
            return Err(FaultError::EmptyInput);
        }

        let mut out = data.to_vec();
        if self.rng.random_bool(self.probability) {
            let byte_index = self.rng.random_range(0..out.len());
            let bit_index = self.rng.random_range(0..8);
            out[byte_index] ^= 1 << bit_index;
            log::warn!(
                "injected bit flip at byte {byte_index} bit {bit_index} ({} byte datagram)",
                out.len()
            );
        }
        Ok(out)
    }
}
