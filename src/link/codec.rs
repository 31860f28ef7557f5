//! # Link Frame Codec
//!
//! Encodes transmit frames for the dongle and decodes frames it sends back,
//! including a streaming reader that resynchronises after line noise.

use bytes::{Buf, BytesMut};
use tracing::debug;

use super::crc::crc8;
use super::protocol::*;
use crate::error::{PanelError, Result};

/// Encode a complete link frame
///
/// # Returns
///
/// * `Vec<u8>` - SYNC + LEN + TYPE + BODY + CRC
pub fn encode_frame(frame: &LinkFrame) -> Vec<u8> {
    let length = frame.length();

    let mut out = Vec::with_capacity(LINK_HEADER_SIZE + length as usize);
    out.push(LINK_SYNC_BYTE);
    out.extend_from_slice(&length.to_le_bytes());
    out.push(frame.frame_type);
    out.extend_from_slice(&frame.body);

    // CRC covers LEN + TYPE + BODY
    let crc = crc8(&out[1..]);
    out.push(crc);
    out
}

/// Encode an ESP-NOW transmit request for `peer`
///
/// # Errors
///
/// Returns error if `payload` exceeds [`ESPNOW_MAX_PAYLOAD`]
///
/// # Examples
///
/// ```
/// use biospider_panel::link::codec::encode_tx_frame;
/// use biospider_panel::link::protocol::PeerAddress;
///
/// let frame = encode_tx_frame(&PeerAddress([1, 2, 3, 4, 5, 6]), b"PING")?;
/// assert_eq!(frame.len(), 3 + 1 + 6 + 4 + 1);
/// # Ok::<(), biospider_panel::error::PanelError>(())
/// ```
pub fn encode_tx_frame(peer: &PeerAddress, payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > ESPNOW_MAX_PAYLOAD {
        return Err(PanelError::LinkProtocol(format!(
            "Payload size {} exceeds ESP-NOW maximum {}",
            payload.len(),
            ESPNOW_MAX_PAYLOAD
        )));
    }

    let mut body = Vec::with_capacity(6 + payload.len());
    body.extend_from_slice(peer.octets());
    body.extend_from_slice(payload);

    Ok(encode_frame(&LinkFrame::new(LINK_FRAMETYPE_TX, body)?))
}

/// Decode one complete link frame
///
/// # Errors
///
/// Returns error if:
/// - Frame is too short
/// - Sync byte is incorrect
/// - Length field is out of range
/// - CRC check fails
pub fn decode_frame(frame: &[u8]) -> Result<LinkFrame> {
    if frame.len() < LINK_HEADER_SIZE + LINK_MIN_LENGTH {
        return Err(PanelError::LinkProtocol("Frame too short".to_string()));
    }

    if frame[0] != LINK_SYNC_BYTE {
        return Err(PanelError::LinkProtocol(format!(
            "Invalid sync byte: 0x{:02X}",
            frame[0]
        )));
    }

    let length = u16::from_le_bytes([frame[1], frame[2]]) as usize;
    if !(LINK_MIN_LENGTH..=LINK_MAX_LENGTH).contains(&length) {
        return Err(PanelError::LinkProtocol(format!("Invalid length: {}", length)));
    }

    let total = LINK_HEADER_SIZE + length;
    if frame.len() < total {
        return Err(PanelError::LinkProtocol(format!(
            "Frame too short: expected {} bytes, got {}",
            total,
            frame.len()
        )));
    }

    let received_crc = frame[total - 1];
    let calculated_crc = crc8(&frame[1..total - 1]);
    if received_crc != calculated_crc {
        return Err(PanelError::LinkProtocol(format!(
            "CRC mismatch: expected 0x{:02X}, got 0x{:02X}",
            calculated_crc, received_crc
        )));
    }

    LinkFrame::new(frame[3], frame[4..total - 1].to_vec())
}

/// Incremental decoder over a serial byte stream
///
/// Bytes before a sync byte are discarded. A candidate frame with a bad
/// length or CRC costs one byte: the reader skips its sync byte and searches
/// again, so a corrupted frame never swallows the frames behind it.
#[derive(Debug, Default)]
pub struct FrameReader {
    buffer: BytesMut,
    dropped: u64,
}

impl FrameReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes read from the port
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Bytes discarded while resynchronising
    pub fn dropped_bytes(&self) -> u64 {
        self.dropped
    }

    /// Bytes waiting for the rest of a frame
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Next complete, valid frame, or `None` until more bytes arrive
    pub fn next_frame(&mut self) -> Option<LinkFrame> {
        loop {
            match self.buffer.iter().position(|&b| b == LINK_SYNC_BYTE) {
                Some(0) => {}
                Some(pos) => self.discard(pos),
                None => {
                    let all = self.buffer.len();
                    self.discard(all);
                    return None;
                }
            }

            if self.buffer.len() < LINK_HEADER_SIZE {
                return None;
            }

            let length = u16::from_le_bytes([self.buffer[1], self.buffer[2]]) as usize;
            if !(LINK_MIN_LENGTH..=LINK_MAX_LENGTH).contains(&length) {
                debug!("Link resync: invalid length {}", length);
                self.discard(1);
                continue;
            }

            let total = LINK_HEADER_SIZE + length;
            if self.buffer.len() < total {
                return None;
            }

            match decode_frame(&self.buffer[..total]) {
                Ok(frame) => {
                    self.buffer.advance(total);
                    return Some(frame);
                }
                Err(e) => {
                    debug!("Link resync: {}", e);
                    self.discard(1);
                }
            }
        }
    }

    fn discard(&mut self, count: usize) {
        self.buffer.advance(count);
        self.dropped += count as u64;
    }
}
