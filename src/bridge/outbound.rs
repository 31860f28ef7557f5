//! Outbound path to the single configured peer.

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::link::protocol::PeerAddress;
use crate::link::transport::Transport;

/// Shared handle used by the UI adapter and the ping scheduler to send to
/// the peer
pub struct Outbound<T: Transport> {
    transport: Mutex<T>,
    peer: PeerAddress,
}

impl<T: Transport> Outbound<T> {
    pub fn new(transport: T, peer: PeerAddress) -> Self {
        Self {
            transport: Mutex::new(transport),
            peer,
        }
    }

    pub fn peer(&self) -> &PeerAddress {
        &self.peer
    }

    /// Hand one payload to the transport
    ///
    /// # Errors
    ///
    /// Returns the transport's error when the frame could not be queued.
    /// Nothing is retried.
    pub async fn send(&self, payload: &[u8]) -> Result<()> {
        let mut transport = self.transport.lock().await;
        transport.send(&self.peer, payload).await?;
        debug!("→ {} ({} bytes)", String::from_utf8_lossy(payload), payload.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::transport::mocks::MockTransport;

    #[tokio::test]
    async fn test_send_targets_configured_peer() {
        let transport = MockTransport::new();
        let peer: PeerAddress = "b8:d6:1a:ab:d3:bc".parse().unwrap();
        let outbound = Outbound::new(transport.clone(), peer);

        outbound.send(b"SCAN").await.unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, peer);
        assert_eq!(sent[0].1, b"SCAN");
    }

    #[tokio::test]
    async fn test_send_failure_propagates() {
        let transport = MockTransport::new();
        transport.set_failing(true);
        let outbound = Outbound::new(transport.clone(), PeerAddress::BROADCAST);

        assert!(outbound.send(b"PING").await.is_err());
        assert!(transport.sent_payloads().is_empty());
    }
}
