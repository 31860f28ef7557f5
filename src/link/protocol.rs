//! # Dongle Link Protocol Constants and Types
//!
//! Framing between the panel host and its ESP-NOW USB dongle.
//!
//! ```text
//! SYNC(0xEA) | LEN(u16 LE) | TYPE | BODY | CRC8
//! ```
//!
//! `LEN` counts the bytes after itself (type, body and CRC). The CRC covers
//! `LEN`, `TYPE` and `BODY`.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::Deserialize;

use crate::error::{PanelError, Result};

/// Link frame sync byte
pub const LINK_SYNC_BYTE: u8 = 0xEA;

/// ESP-NOW frame received by the dongle (dongle → host)
pub const LINK_FRAMETYPE_RX: u8 = 0x01;

/// ESP-NOW frame to transmit (host → dongle)
pub const LINK_FRAMETYPE_TX: u8 = 0x02;

/// Delivery report for the last transmit (dongle → host)
pub const LINK_FRAMETYPE_TX_STATUS: u8 = 0x03;

/// Maximum ESP-NOW payload size
pub const ESPNOW_MAX_PAYLOAD: usize = 250;

/// Sync + 2 length bytes
pub const LINK_HEADER_SIZE: usize = 3;

/// Smallest valid LEN value: type + crc
pub const LINK_MIN_LENGTH: usize = 2;

/// Largest valid LEN value: type + rssi + mac + payload + crc
pub const LINK_MAX_LENGTH: usize = 1 + 1 + 6 + ESPNOW_MAX_PAYLOAD + 1;

/// Six byte ESP-NOW peer MAC address
#[derive(Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct PeerAddress(pub [u8; 6]);

impl PeerAddress {
    /// Broadcast address
    pub const BROADCAST: PeerAddress = PeerAddress([0xFF; 6]);

    pub fn octets(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}", a, b, c, d, e, g)
    }
}

impl fmt::Debug for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerAddress({})", self)
    }
}

impl FromStr for PeerAddress {
    type Err = String;

    /// Parse `aa:bb:cc:dd:ee:ff` (`-` also accepted as separator)
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(|c: char| c == ':' || c == '-').collect();
        if parts.len() != 6 {
            return Err(format!("MAC address '{}' must have 6 octets", s));
        }

        let mut octets = [0u8; 6];
        for (octet, part) in octets.iter_mut().zip(parts) {
            if part.len() != 2 {
                return Err(format!("invalid octet '{}' in MAC address '{}'", part, s));
            }
            *octet = u8::from_str_radix(part, 16)
                .map_err(|_| format!("invalid octet '{}' in MAC address '{}'", part, s))?;
        }
        Ok(PeerAddress(octets))
    }
}

impl TryFrom<String> for PeerAddress {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// A validated link frame (type + body, without framing bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFrame {
    pub frame_type: u8,
    pub body: Bytes,
}

impl LinkFrame {
    /// Create a frame, rejecting bodies that do not fit the length field
    pub fn new(frame_type: u8, body: impl Into<Bytes>) -> Result<Self> {
        let body = body.into();
        if body.len() + LINK_MIN_LENGTH > LINK_MAX_LENGTH {
            return Err(PanelError::LinkProtocol(format!(
                "Body size {} exceeds maximum {}",
                body.len(),
                LINK_MAX_LENGTH - LINK_MIN_LENGTH
            )));
        }
        Ok(Self { frame_type, body })
    }

    /// Value of the LEN field (type + body + crc)
    pub fn length(&self) -> u16 {
        (1 + self.body.len() + 1) as u16
    }
}

/// An ESP-NOW frame received from a peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundFrame {
    /// Signal strength reported by the radio (dBm)
    pub rssi_dbm: i32,
    /// Sender address; a single peer is assumed so it is informational
    pub src: PeerAddress,
    /// Raw payload, neither bounded nor NUL-terminated
    pub payload: Bytes,
}

impl InboundFrame {
    /// Decode the body of an RX link frame
    pub fn from_rx_body(body: &Bytes) -> Result<Self> {
        if body.len() < 7 {
            return Err(PanelError::LinkProtocol(format!(
                "RX body too short: {} bytes",
                body.len()
            )));
        }

        let rssi_dbm = body[0] as i8 as i32;
        let mut mac = [0u8; 6];
        mac.copy_from_slice(&body[1..7]);

        Ok(Self {
            rssi_dbm,
            src: PeerAddress(mac),
            payload: body.slice(7..),
        })
    }
}

/// Everything the dongle can report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    Received(InboundFrame),
    SendStatus { delivered: bool },
}

impl TryFrom<LinkFrame> for LinkEvent {
    type Error = PanelError;

    fn try_from(frame: LinkFrame) -> Result<Self> {
        match frame.frame_type {
            LINK_FRAMETYPE_RX => Ok(LinkEvent::Received(InboundFrame::from_rx_body(&frame.body)?)),
            LINK_FRAMETYPE_TX_STATUS => match frame.body.first() {
                Some(&status) => Ok(LinkEvent::SendStatus { delivered: status == 1 }),
                None => Err(PanelError::LinkProtocol("Empty TX status body".to_string())),
            },
            other => Err(PanelError::LinkProtocol(format!(
                "Unexpected frame type from dongle: 0x{:02X}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_constants() {
        assert_eq!(LINK_SYNC_BYTE, 0xEA);
        assert_eq!(LINK_FRAMETYPE_RX, 0x01);
        assert_eq!(LINK_FRAMETYPE_TX, 0x02);
        assert_eq!(LINK_FRAMETYPE_TX_STATUS, 0x03);
        assert_eq!(LINK_MAX_LENGTH, 259);
    }

    #[test]
    fn test_peer_address_parse_and_display() {
        let addr: PeerAddress = "b8:d6:1a:ab:d3:bc".parse().unwrap();
        assert_eq!(addr.octets(), &[0xb8, 0xd6, 0x1a, 0xab, 0xd3, 0xbc]);
        assert_eq!(addr.to_string(), "b8:d6:1a:ab:d3:bc");

        let dashed: PeerAddress = "B8-D6-1A-AB-D3-BC".parse().unwrap();
        assert_eq!(dashed, addr);
    }

    #[test]
    fn test_peer_address_rejects_garbage() {
        assert!("b8:d6:1a:ab:d3".parse::<PeerAddress>().is_err());
        assert!("b8:d6:1a:ab:d3:zz".parse::<PeerAddress>().is_err());
        assert!("b8:d6:1a:ab:d3:bcc".parse::<PeerAddress>().is_err());
        assert!("".parse::<PeerAddress>().is_err());
    }

    #[test]
    fn test_link_frame_length() {
        let frame = LinkFrame::new(LINK_FRAMETYPE_TX, vec![0u8; 10]).unwrap();
        assert_eq!(frame.length(), 12);
    }

    #[test]
    fn test_link_frame_too_large() {
        assert!(LinkFrame::new(LINK_FRAMETYPE_RX, vec![0u8; 257]).is_ok());
        assert!(LinkFrame::new(LINK_FRAMETYPE_RX, vec![0u8; 258]).is_err());
    }

    #[test]
    fn test_rx_body_decoding() {
        let mut body = vec![(-55i8) as u8, 1, 2, 3, 4, 5, 6];
        body.extend_from_slice(b"ACK");
        let frame = InboundFrame::from_rx_body(&Bytes::from(body)).unwrap();

        assert_eq!(frame.rssi_dbm, -55);
        assert_eq!(frame.src, PeerAddress([1, 2, 3, 4, 5, 6]));
        assert_eq!(&frame.payload[..], b"ACK");
    }

    #[test]
    fn test_rx_body_too_short() {
        assert!(InboundFrame::from_rx_body(&Bytes::from_static(&[0xC9, 1, 2])).is_err());
    }

    #[test]
    fn test_link_event_conversion() {
        let status = LinkFrame::new(LINK_FRAMETYPE_TX_STATUS, vec![1u8]).unwrap();
        assert_eq!(LinkEvent::try_from(status).unwrap(), LinkEvent::SendStatus { delivered: true });

        let failed = LinkFrame::new(LINK_FRAMETYPE_TX_STATUS, vec![0u8]).unwrap();
        assert_eq!(LinkEvent::try_from(failed).unwrap(), LinkEvent::SendStatus { delivered: false });

        let echoed_tx = LinkFrame::new(LINK_FRAMETYPE_TX, vec![0u8; 8]).unwrap();
        assert!(LinkEvent::try_from(echoed_tx).is_err());
    }
}
