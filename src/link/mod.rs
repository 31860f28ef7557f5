//! # Dongle Link Module
//!
//! Serial link to the ESP-NOW USB dongle that carries frames to and from the
//! robot.
//!
//! This module handles:
//! - Opening the dongle's serial port (8N1)
//! - Framing transmit requests and checking received frames (CRC-8)
//! - Splitting the port into a writer (the bridge's [`Transport`]) and a
//!   reader yielding [`LinkEvent`]s
//! - Resynchronising on line noise

pub mod codec;
pub mod crc;
pub mod port_trait;
pub mod protocol;
pub mod transport;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, ReadHalf};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

use crate::error::{PanelError, Result};
use codec::{encode_tx_frame, FrameReader};
use port_trait::{LinkPortIO, SerialWriteHalf};
use protocol::{LinkEvent, PeerAddress};
pub use transport::Transport;

/// Default dongle baud rate
pub const LINK_BAUD_RATE: u32 = 115_200;

/// Fallback device paths tried after the configured one
const DEFAULT_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyUSB0", // CP210x / CH340 bridges on ESP32 dev boards
    "/dev/ttyACM0", // native USB CDC (ESP32-S3)
];

/// Read chunk size; comfortably larger than one link frame
const READ_CHUNK_SIZE: usize = 512;

/// Opens the dongle and splits it into reader and writer halves
pub struct DongleLink {
    port: tokio_serial::SerialStream,
    device_path: String,
}

impl std::fmt::Debug for DongleLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DongleLink")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl DongleLink {
    /// Open the dongle at `preferred`, falling back to common device paths
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::LinkNotFound`] if no candidate path opens
    pub fn open(preferred: &str, baud_rate: u32) -> Result<Self> {
        let mut paths = vec![preferred];
        paths.extend(DEFAULT_DEVICE_PATHS.iter().copied().filter(|p| *p != preferred));
        Self::open_with_paths(&paths, baud_rate)
    }

    /// Open the first path in `paths` that succeeds
    pub fn open_with_paths(paths: &[&str], baud_rate: u32) -> Result<Self> {
        for path in paths {
            debug!("Trying to open dongle port: {}", path);

            match Self::open_port(path, baud_rate) {
                Ok(port) => {
                    info!("Opened ESP-NOW dongle at {} ({} baud)", path, baud_rate);
                    return Ok(Self {
                        port,
                        device_path: path.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(PanelError::LinkNotFound(paths.join(", ")))
    }

    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
        tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| PanelError::Link(format!("Failed to open {}: {}", path, e)))
    }

    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Split into independently owned writer and reader
    pub fn split(self) -> (LinkWriter<SerialWriteHalf>, LinkReader<ReadHalf<tokio_serial::SerialStream>>) {
        let (read, write) = tokio::io::split(self.port);
        (LinkWriter::new(SerialWriteHalf::new(write)), LinkReader::new(read))
    }
}

/// Sends ESP-NOW frames through the dongle
pub struct LinkWriter<P: LinkPortIO> {
    port: P,
}

impl<P: LinkPortIO> LinkWriter<P> {
    pub fn new(port: P) -> Self {
        Self { port }
    }
}

#[async_trait]
impl<P: LinkPortIO> Transport for LinkWriter<P> {
    async fn send(&mut self, peer: &PeerAddress, payload: &[u8]) -> Result<()> {
        let frame = encode_tx_frame(peer, payload)?;

        self.port
            .write_all(&frame)
            .await
            .map_err(|e| PanelError::Link(format!("Failed to write frame: {}", e)))?;

        self.port
            .flush()
            .await
            .map_err(|e| PanelError::Link(format!("Failed to flush link port: {}", e)))?;

        debug!("Sent {} byte payload to {}", payload.len(), peer);
        Ok(())
    }
}

/// Reads link events from the dongle
pub struct LinkReader<R> {
    reader: R,
    frames: FrameReader,
    chunk: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LinkReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            frames: FrameReader::new(),
            chunk: vec![0u8; READ_CHUNK_SIZE],
        }
    }

    /// Wait for the next event; `Ok(None)` once the port is closed
    ///
    /// Frames that pass the CRC but cannot be interpreted are logged and
    /// skipped rather than returned as errors.
    pub async fn next_event(&mut self) -> Result<Option<LinkEvent>> {
        loop {
            while let Some(frame) = self.frames.next_frame() {
                let frame_type = frame.frame_type;
                match LinkEvent::try_from(frame) {
                    Ok(event) => return Ok(Some(event)),
                    Err(e) => warn!("Ignoring link frame 0x{:02X}: {}", frame_type, e),
                }
            }

            let n = self.reader.read(&mut self.chunk).await?;
            if n == 0 {
                return Ok(None);
            }
            self.frames.push(&self.chunk[..n]);
        }
    }

    /// Bytes discarded while resynchronising
    pub fn dropped_bytes(&self) -> u64 {
        self.frames.dropped_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::codec::{decode_frame, encode_frame};
    use crate::link::port_trait::mocks::MockLinkPort;
    use crate::link::protocol::*;
    use std::io;

    fn rx_bytes(rssi: i8, payload: &[u8]) -> Vec<u8> {
        let mut body = vec![rssi as u8, 0xb8, 0xd6, 0x1a, 0xab, 0xd3, 0xbc];
        body.extend_from_slice(payload);
        encode_frame(&LinkFrame::new(LINK_FRAMETYPE_RX, body).unwrap())
    }

    #[test]
    fn test_constants() {
        assert_eq!(LINK_BAUD_RATE, 115_200);
        assert_eq!(DEFAULT_DEVICE_PATHS, &["/dev/ttyUSB0", "/dev/ttyACM0"]);
    }

    #[test]
    fn test_open_with_invalid_paths_returns_error() {
        let invalid_paths = &["/dev/nonexistent0", "/dev/nonexistent1"];
        match DongleLink::open_with_paths(invalid_paths, LINK_BAUD_RATE) {
            Err(PanelError::LinkNotFound(msg)) => {
                assert!(msg.contains("/dev/nonexistent0"));
                assert!(msg.contains("/dev/nonexistent1"));
            }
            other => panic!("Expected LinkNotFound, got: {:?}", other),
        }
    }

    #[test]
    fn test_open_with_empty_paths_returns_error() {
        let empty: &[&str] = &[];
        assert!(matches!(
            DongleLink::open_with_paths(empty, LINK_BAUD_RATE),
            Err(PanelError::LinkNotFound(_))
        ));
    }

    #[test]
    fn test_open_port_with_invalid_path_returns_error() {
        match DongleLink::open_port("/dev/nonexistent_dongle_12345", LINK_BAUD_RATE) {
            Err(PanelError::Link(msg)) => {
                assert!(msg.contains("/dev/nonexistent_dongle_12345"));
                assert!(msg.contains("Failed to open"));
            }
            other => panic!("Expected Link error, got: {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_writer_frames_payload() {
        let port = MockLinkPort::new();
        let mut writer = LinkWriter::new(port.clone());
        let peer: PeerAddress = "b8:d6:1a:ab:d3:bc".parse().unwrap();

        writer.send(&peer, b"PING").await.unwrap();

        let written = port.written_frames();
        assert_eq!(written.len(), 1);
        let frame = decode_frame(&written[0]).unwrap();
        assert_eq!(frame.frame_type, LINK_FRAMETYPE_TX);
        assert_eq!(&frame.body[..6], peer.octets());
        assert_eq!(&frame.body[6..], b"PING");
    }

    #[tokio::test]
    async fn test_writer_reports_write_failure() {
        let port = MockLinkPort::new();
        port.set_write_error(io::ErrorKind::BrokenPipe);
        let mut writer = LinkWriter::new(port);

        let result = writer.send(&PeerAddress::BROADCAST, b"STOP").await;
        assert!(matches!(result, Err(PanelError::Link(msg)) if msg.contains("Failed to write")));
    }

    #[tokio::test]
    async fn test_writer_reports_flush_failure() {
        let port = MockLinkPort::new();
        port.set_flush_error(io::ErrorKind::TimedOut);
        let mut writer = LinkWriter::new(port);

        let result = writer.send(&PeerAddress::BROADCAST, b"STOP").await;
        assert!(matches!(result, Err(PanelError::Link(msg)) if msg.contains("Failed to flush")));
    }

    #[tokio::test]
    async fn test_writer_rejects_oversized_payload() {
        let port = MockLinkPort::new();
        let mut writer = LinkWriter::new(port.clone());

        let result = writer.send(&PeerAddress::BROADCAST, &[0u8; 300]).await;
        assert!(matches!(result, Err(PanelError::LinkProtocol(_))));
        assert!(port.written_frames().is_empty());
    }

    #[tokio::test]
    async fn test_reader_yields_events_across_reads() {
        let frame = rx_bytes(-61, b"RANGE:45cm");
        let status = encode_frame(&LinkFrame::new(LINK_FRAMETYPE_TX_STATUS, vec![1u8]).unwrap());

        let mock = tokio_test::io::Builder::new()
            .read(&frame[..4])
            .read(&frame[4..])
            .read(&status)
            .build();
        let mut reader = LinkReader::new(mock);

        match reader.next_event().await.unwrap() {
            Some(LinkEvent::Received(inbound)) => {
                assert_eq!(inbound.rssi_dbm, -61);
                assert_eq!(&inbound.payload[..], b"RANGE:45cm");
            }
            other => panic!("Expected Received, got: {:?}", other),
        }
        assert_eq!(
            reader.next_event().await.unwrap(),
            Some(LinkEvent::SendStatus { delivered: true })
        );
        assert_eq!(reader.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reader_skips_uninterpretable_frames() {
        let echoed_tx = encode_frame(&LinkFrame::new(LINK_FRAMETYPE_TX, vec![0u8; 8]).unwrap());
        let mut stream = vec![0x55, 0x55];
        stream.extend(echoed_tx);
        stream.extend(rx_bytes(-40, b"ACK"));

        let mock = tokio_test::io::Builder::new().read(&stream).build();
        let mut reader = LinkReader::new(mock);

        assert!(matches!(
            reader.next_event().await.unwrap(),
            Some(LinkEvent::Received(_))
        ));
        assert_eq!(reader.dropped_bytes(), 2);
    }

    #[tokio::test]
    async fn test_reader_propagates_io_error() {
        let mock = tokio_test::io::Builder::new()
            .read_error(io::Error::new(io::ErrorKind::Other, "unplugged"))
            .build();
        let mut reader = LinkReader::new(mock);

        assert!(matches!(reader.next_event().await, Err(PanelError::Io(_))));
    }

    // Integration test - only runs if a dongle is connected
    #[tokio::test]
    #[ignore] // Run with: cargo test -- --ignored
    async fn test_send_ping_with_real_dongle() {
        if let Ok(link) = DongleLink::open("/dev/ttyUSB0", LINK_BAUD_RATE) {
            let (mut writer, _reader) = link.split();
            let result = writer.send(&PeerAddress::BROADCAST, b"PING").await;
            assert!(result.is_ok(), "Failed to send ping: {:?}", result);
        } else {
            println!("No dongle detected (skipping send test)");
        }
    }
}
