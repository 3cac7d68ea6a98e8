//! Wire-format definitions for frames and acknowledgement replies.
//!
//! Every datagram the sender transmits is a [`Frame`]; every datagram the
//! receiver answers with is a [`Reply`].  This module is responsible for:
//! - Serialising a [`Frame`] into the pipe-delimited text form.
//! - Parsing received text back into a [`Frame`], returning errors for
//!   malformed input.
//! - Rendering and parsing the `ACK` / `NACK` reply line.
//!
//! No I/O happens here — this is pure data transformation.
//!
//! # Wire format
//!
//! ```text
//! frame:  <seq> '|' <payload> '|' <crc-hex>
//! reply:  "ACK " <seq>  |  "NACK " <seq>  |  "NACK ?"
//! ```
//!
//! `<seq>` is `0` or `1`; `<payload>` is arbitrary text excluding `'|'`;
//! `<crc-hex>` is the CRC16-CCITT of `"<seq>|<payload>"` as lowercase
//! hexadecimal with no fixed padding (`0x0cf8` travels as `cf8`).  The
//! checksum never covers its own field.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::checksum::crc16_ccitt;

/// Field separator within a frame.  Payloads must not contain it.
pub const SEPARATOR: char = '|';

// ---------------------------------------------------------------------------
// SeqBit
// ---------------------------------------------------------------------------

/// The alternating sequence bit distinguishing consecutive messages.
///
/// One bit is enough for stop-and-wait: with a single outstanding message,
/// a retransmission is the only way the receiver can see the same bit twice
/// in a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqBit {
    Zero,
    One,
}

impl SeqBit {
    /// The opposite bit.  Applied by the sender after a confirmed delivery.
    pub fn flip(self) -> Self {
        match self {
            SeqBit::Zero => SeqBit::One,
            SeqBit::One => SeqBit::Zero,
        }
    }
}

impl fmt::Display for SeqBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeqBit::Zero => f.write_str("0"),
            SeqBit::One => f.write_str("1"),
        }
    }
}

impl FromStr for SeqBit {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, FrameError> {
        match s {
            "0" => Ok(SeqBit::Zero),
            "1" => Ok(SeqBit::One),
            _ => Err(FrameError::BadSequence(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// One serialisable protocol frame: sequence bit, payload, checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub seq: SeqBit,
    pub payload: String,
    /// CRC16-CCITT over the UTF-8 bytes of `"<seq>|<payload>"`.
    pub checksum: u16,
}

impl Frame {
    /// Build a frame for `payload`, computing the checksum.
    ///
    /// Rejects payloads containing [`SEPARATOR`]: the text format has no
    /// escaping, so such a payload would shift the field boundaries.
    pub fn build(seq: SeqBit, payload: &str) -> Result<Self, FrameError> {
        if payload.contains(SEPARATOR) {
            return Err(FrameError::SeparatorInPayload);
        }
        let checksum = crc16_ccitt(format!("{seq}{SEPARATOR}{payload}").as_bytes());
        Ok(Self {
            seq,
            payload: payload.to_string(),
            checksum,
        })
    }

    /// Serialise to the on-wire text form.
    pub fn encode(&self) -> String {
        format!(
            "{}{SEPARATOR}{}{SEPARATOR}{:x}",
            self.seq, self.payload, self.checksum
        )
    }

    /// Parse a frame from received text.
    ///
    /// Splits on [`SEPARATOR`] into exactly three fields and parses the
    /// sequence bit and hexadecimal checksum.  The checksum field must be
    /// exactly as [`encode`](Self::encode) writes it — lowercase hex only.
    /// `from_str_radix` alone would also accept `"255E"`, and that leniency
    /// would let a bit flip inside a hex letter (`'e'` ^ 0x20 = `'E'`) slip
    /// past verification.  The checksum is **not** verified here — a
    /// corrupted frame must still parse so the receiver can answer
    /// `NACK <seq>`; call [`checksum_matches`](Self::checksum_matches)
    /// to validate.
    pub fn decode(text: &str) -> Result<Self, FrameError> {
        let mut fields = text.splitn(3, SEPARATOR);
        let (Some(seq), Some(payload), Some(crc_hex)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(FrameError::FieldCount);
        };

        let seq = seq.parse::<SeqBit>()?;
        let lowercase_hex = crc_hex
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !lowercase_hex {
            return Err(FrameError::BadChecksumField(crc_hex.to_string()));
        }
        let checksum = u16::from_str_radix(crc_hex, 16)
            .map_err(|_| FrameError::BadChecksumField(crc_hex.to_string()))?;

        Ok(Self {
            seq,
            payload: payload.to_string(),
            checksum,
        })
    }

    /// Recompute the checksum over the received sequence and payload and
    /// compare it to the checksum field.
    pub fn checksum_matches(&self) -> bool {
        crc16_ccitt(format!("{}{SEPARATOR}{}", self.seq, self.payload).as_bytes())
            == self.checksum
    }
}

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// The receiver's answer to one inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Frame accepted (or duplicate re-acknowledged).
    Ack(SeqBit),
    /// Checksum mismatch for the given sequence bit.
    Nack(SeqBit),
    /// Frame too malformed to even extract a sequence bit: `"NACK ?"`.
    NackUnknown,
}

impl Reply {
    /// Serialise to the on-wire text form.
    pub fn encode(&self) -> String {
        match self {
            Reply::Ack(seq) => format!("ACK {seq}"),
            Reply::Nack(seq) => format!("NACK {seq}"),
            Reply::NackUnknown => "NACK ?".to_string(),
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can arise when building or parsing wire text.
#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    /// Payload contains the field separator; the format has no escaping.
    #[error("payload contains the separator character '|'")]
    SeparatorInPayload,

    /// Input did not split into exactly three fields.
    #[error("expected 3 '|'-separated fields")]
    FieldCount,

    /// Sequence field was neither `0` nor `1`.
    #[error("sequence field {0:?} is not a bit")]
    BadSequence(String),

    /// Checksum field was not lowercase hexadecimal.
    #[error("checksum field {0:?} is not lowercase hexadecimal")]
    BadChecksumField(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_known_frame() {
        let frame = Frame::build(SeqBit::Zero, "hello").unwrap();
        assert_eq!(frame.encode(), "0|hello|255e");
    }

    #[test]
    fn checksum_hex_is_unpadded_lowercase() {
        // crc16("1|hi") == 0x0cf8 — must travel as "cf8", not "0cf8".
        let frame = Frame::build(SeqBit::One, "hi").unwrap();
        assert_eq!(frame.encode(), "1|hi|cf8");
    }

    #[test]
    fn decode_roundtrip() {
        let frame = Frame::build(SeqBit::One, "round trip").unwrap();
        let decoded = Frame::decode(&frame.encode()).unwrap();
        assert_eq!(decoded, frame);
        assert!(decoded.checksum_matches());
    }

    #[test]
    fn empty_payload_is_legal() {
        let frame = Frame::build(SeqBit::Zero, "").unwrap();
        assert_eq!(frame.encode(), "0||a781");
        assert!(Frame::decode("0||a781").unwrap().checksum_matches());
    }

    #[test]
    fn separator_in_payload_is_rejected() {
        assert_eq!(
            Frame::build(SeqBit::Zero, "a|b").unwrap_err(),
            FrameError::SeparatorInPayload
        );
    }

    #[test]
    fn decode_rejects_wrong_field_count() {
        assert_eq!(Frame::decode("garbage").unwrap_err(), FrameError::FieldCount);
        assert_eq!(Frame::decode("0|only-two").unwrap_err(), FrameError::FieldCount);
    }

    #[test]
    fn decode_rejects_non_bit_sequence() {
        assert_eq!(
            Frame::decode("2|hi|cf8").unwrap_err(),
            FrameError::BadSequence("2".into())
        );
    }

    #[test]
    fn decode_rejects_non_hex_checksum() {
        assert_eq!(
            Frame::decode("0|hi|zzzz").unwrap_err(),
            FrameError::BadChecksumField("zzzz".into())
        );
    }

    #[test]
    fn decode_rejects_uppercase_hex_checksum() {
        // "255E" is one bit away from the valid "255e"; accepting it would
        // let that flip through verification unnoticed.
        assert_eq!(
            Frame::decode("0|hello|255E").unwrap_err(),
            FrameError::BadChecksumField("255E".into())
        );
    }

    #[test]
    fn extra_separator_lands_in_checksum_field() {
        // splitn(3) pushes the surplus into the third field, which then
        // fails hex parsing — same classification as the reference server.
        assert!(matches!(
            Frame::decode("0|a|b|c"),
            Err(FrameError::BadChecksumField(_))
        ));
    }

    #[test]
    fn corrupted_payload_fails_verification() {
        let mut bytes = Frame::build(SeqBit::Zero, "hello").unwrap().encode().into_bytes();
        // Flip one bit inside the payload field ('h' -> 'i').
        bytes[2] ^= 0x01;
        let text = String::from_utf8(bytes).unwrap();
        let decoded = Frame::decode(&text).unwrap();
        assert!(!decoded.checksum_matches());
    }

    #[test]
    fn corrupted_checksum_field_fails_verification() {
        // "255e" corrupted to "245e": still valid hex, wrong value.
        let decoded = Frame::decode("0|hello|245e").unwrap();
        assert!(!decoded.checksum_matches());
    }

    #[test]
    fn seq_bit_flip_alternates() {
        assert_eq!(SeqBit::Zero.flip(), SeqBit::One);
        assert_eq!(SeqBit::One.flip(), SeqBit::Zero);
        assert_eq!(SeqBit::Zero.flip().flip(), SeqBit::Zero);
    }

    #[test]
    fn reply_encode_forms() {
        assert_eq!(Reply::Ack(SeqBit::Zero).encode(), "ACK 0");
        assert_eq!(Reply::Nack(SeqBit::One).encode(), "NACK 1");
        assert_eq!(Reply::NackUnknown.encode(), "NACK ?");
    }

}
