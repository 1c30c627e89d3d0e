//! Santone frame codec.
//!
//! Every exchange with a DRS unit is a single flag-delimited frame:
//!
//! ```text
//! 7E | 07 | 00 | 00 | CMD | FLAG | LEN | BODY (LEN bytes) | CRC lo | CRC hi | 7E
//! ```
//!
//! The checksum is CRC-16/XMODEM over `MODULE_FUNCTION..BODY`, written low byte
//! first. Validation of request frames is purely structural; the checksum is an
//! encoding-time guarantee and is never re-derived from received bytes.

use arrayvec::ArrayVec;
use static_assertions::const_assert_eq;
use thiserror::Error;

pub const START_FLAG: u8 = 0x7E;
pub const END_FLAG: u8 = 0x7E;
pub const MODULE_FUNCTION: u8 = 0x07;
pub const MODULE_ADDRESS: u8 = 0x00;
pub const DATA_INITIATION: u8 = 0x00;
pub const SUCCESS_FLAG: u8 = 0x00;

/// Start flag through body length.
pub const HEADER_LEN: usize = 7;
/// Position of COMMAND_NUMBER in both requests and responses.
pub const COMMAND_OFFSET: usize = 4;
/// Checksum (2) plus end flag.
pub const TRAILER_LEN: usize = 3;
pub const FRAME_OVERHEAD: usize = HEADER_LEN + TRAILER_LEN;
pub const MAX_BODY_LEN: usize = u8::MAX as usize;
pub const MAX_FRAME_LEN: usize = FRAME_OVERHEAD + MAX_BODY_LEN;

/// Shortest response the decoder will look into.
pub const MIN_RESPONSE_LEN: usize = 9;

/// Accepted hex-character lengths: GET queries (20), working mode (22),
/// attenuation (24), channel activation (52) and frequency tables (148, 159).
pub const VALID_HEX_LENGTHS: [usize; 6] = [20, 22, 24, 52, 148, 159];

const_assert_eq!(MAX_FRAME_LEN, 265);

const CRC16_POLY: u16 = 0x1021;

pub type FrameBuffer = ArrayVec<u8, MAX_FRAME_LEN>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame body of {len} bytes exceeds the 255 byte limit")]
    FrameTooLarge { len: usize },
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    #[error("response of {len} bytes is shorter than the 9 byte minimum")]
    ResponseTooShort { len: usize },
    #[error("attenuation {value} dB outside 0..={max} dB for {device}")]
    AttenuationOutOfRange { value: u8, max: u8, device: &'static str },
    #[error("channel index {0} outside 0..16")]
    ChannelOutOfRange(usize),
    #[error("expected {expected} channel entries, got {actual}")]
    ChannelCount { expected: usize, actual: usize },
}

/// A fully encoded request frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: FrameBuffer,
}

impl Frame {
    pub fn build(opcode: u8, body: &[u8]) -> Result<Self, FrameError> {
        if body.len() > MAX_BODY_LEN {
            return Err(FrameError::FrameTooLarge { len: body.len() });
        }

        let mut bytes = FrameBuffer::new();
        bytes.push(START_FLAG);
        bytes.push(MODULE_FUNCTION);
        bytes.push(MODULE_ADDRESS);
        bytes.push(DATA_INITIATION);
        bytes.push(opcode);
        bytes.push(SUCCESS_FLAG);
        bytes.push(body.len() as u8);
        // Capacity is guaranteed by the MAX_BODY_LEN check above.
        bytes
            .try_extend_from_slice(body)
            .map_err(|_| FrameError::FrameTooLarge { len: body.len() })?;

        let crc = crc16(&bytes[1..]);
        bytes.extend(crc.to_le_bytes());
        bytes.push(END_FLAG);

        Ok(Self { bytes })
    }

    pub fn opcode(&self) -> u8 {
        self.bytes[COMMAND_OFFSET]
    }

    pub fn body(&self) -> &[u8] {
        &self.bytes[HEADER_LEN..self.bytes.len() - TRAILER_LEN]
    }

    pub fn checksum(&self) -> u16 {
        let n = self.bytes.len();
        u16::from_le_bytes([self.bytes[n - 3], self.bytes[n - 2]])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_hex(&self) -> String {
        encode_hex(&self.bytes)
    }
}

pub fn build_frame(opcode: u8, body: &[u8]) -> Result<Frame, FrameError> {
    Frame::build(opcode, body)
}

/// CRC-16/XMODEM: poly 0x1021, init 0, no reflection, no final xor.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ CRC16_POLY
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Structural check of a hex-encoded frame.
///
/// Accepts the frame iff its length is one of [`VALID_HEX_LENGTHS`], it starts
/// and ends with `7E`, and characters 2..8 spell `070000`. Case-insensitive.
pub fn validate_frame(hex: &str) -> bool {
    if !VALID_HEX_LENGTHS.contains(&hex.len()) || !hex.is_ascii() {
        return false;
    }

    let field = |range: core::ops::Range<usize>, expected: &str| {
        hex.get(range)
            .map_or(false, |s| s.eq_ignore_ascii_case(expected))
    };

    field(0..2, "7E")
        && field(hex.len() - 2..hex.len(), "7E")
        && field(2..4, "07")
        && field(4..6, "00")
        && field(6..8, "00")
}

/// Payload of a response frame: everything between the 7-byte header and the
/// trailing checksum/end flag.
pub fn response_payload(response: &[u8]) -> Result<&[u8], FrameError> {
    if response.len() < MIN_RESPONSE_LEN {
        return Err(FrameError::ResponseTooShort { len: response.len() });
    }
    let end = response.len() - TRAILER_LEN;
    // A 9-byte response has no room for a body.
    Ok(if end > HEADER_LEN { &response[HEADER_LEN..end] } else { &[] })
}

pub fn encode_hex(bytes: &[u8]) -> String {
    use core::fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{:02X}", byte);
    }
    out
}

pub fn decode_hex(hex: &str) -> Result<Vec<u8>, FrameError> {
    let cleaned: String = hex.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if cleaned.len() % 2 != 0 {
        return Err(FrameError::InvalidHex(format!(
            "odd number of digits ({})",
            cleaned.len()
        )));
    }

    (0..cleaned.len())
        .step_by(2)
        .map(|i| {
            let pair = cleaned
                .get(i..i + 2)
                .filter(|p| p.bytes().all(|b| b.is_ascii_hexdigit()))
                .ok_or_else(|| FrameError::InvalidHex(format!("bad digits at offset {}", i)))?;
            u8::from_str_radix(pair, 16)
                .map_err(|_| FrameError::InvalidHex(format!("bad digit pair '{}'", pair)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc_matches_device_frames() {
        // temperature query: 7E 07 00 00 02 00 00 | 21 A6 | 7E
        assert_eq!(crc16(&[0x07, 0x00, 0x00, 0x02, 0x00, 0x00]), 0xA621);
        // device_id query
        assert_eq!(crc16(&[0x07, 0x00, 0x00, 0x97, 0x00, 0x00]), 0x35E8);
    }

    #[test]
    fn test_payload_of_nine_byte_response_is_empty() {
        let response = [0x7E, 0x07, 0x00, 0x00, 0x02, 0x00, 0x00, 0x21, 0x7E];
        assert_eq!(response_payload(&response).unwrap(), &[] as &[u8]);
    }
}
