//! CRC16-CCITT integrity codec.
//!
//! Both endpoints must share this function bit-exactly: the sender stamps
//! every frame with `crc16_ccitt("<seq>|<payload>")` and the receiver
//! recomputes it over the (possibly corrupted) bytes it actually got.  Any
//! single-bit flip anywhere in the frame — sequence, payload, or the
//! checksum field itself — surfaces as a mismatch.
//!
//! Parameters (the "CCITT-FALSE" variant):
//! - polynomial `0x1021`
//! - initial value `0xFFFF`
//! - no input/output bit reflection
//! - no final XOR
//!
//! No I/O happens here — this is pure data transformation.

/// Generator polynomial for CRC16-CCITT.
const POLY: u16 = 0x1021;

/// Initial accumulator value.
const INIT: u16 = 0xFFFF;

/// Compute the CRC16-CCITT checksum of `data`.
///
/// Pure and deterministic: identical input always yields identical output.
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc = INIT;

    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ POLY;
            } else {
                crc <<= 1;
            }
        }
    }

    crc
}
