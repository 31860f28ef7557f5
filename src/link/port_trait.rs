//! Trait abstraction for the write side of the dongle port to enable testing

use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncWriteExt, WriteHalf};

/// Trait for link port write operations
#[async_trait]
pub trait LinkPortIO: Send {
    /// Write one complete link frame
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Push buffered bytes out to the dongle
    async fn flush(&mut self) -> io::Result<()>;
}

/// Write half of a `tokio_serial::SerialStream`
pub struct SerialWriteHalf {
    port: WriteHalf<tokio_serial::SerialStream>,
}

impl SerialWriteHalf {
    pub fn new(port: WriteHalf<tokio_serial::SerialStream>) -> Self {
        Self { port }
    }
}

#[async_trait]
impl LinkPortIO for SerialWriteHalf {
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.write_all(data).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.port.flush().await
    }
}
