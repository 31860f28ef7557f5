//! Outbound transport seam between the bridge and the radio.

use async_trait::async_trait;

use super::protocol::PeerAddress;
use crate::error::Result;

/// Fire-and-forget frame transmission to a single peer
///
/// `send` reports only whether the frame was handed to the radio. Delivery
/// is reported asynchronously by the radio and never awaited here.
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, peer: &PeerAddress, payload: &[u8]) -> Result<()>;
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use crate::error::PanelError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// Mock transport recording every payload
    #[derive(Clone, Default)]
    pub struct MockTransport {
        pub sent: Arc<Mutex<Vec<(PeerAddress, Vec<u8>)>>>,
        pub fail: Arc<AtomicBool>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Payloads sent so far, as strings
        pub fn sent_payloads(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|(_, p)| String::from_utf8_lossy(p).into_owned())
                .collect()
        }

        pub fn set_failing(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&mut self, peer: &PeerAddress, payload: &[u8]) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(PanelError::Link("Mock send failure".to_string()));
            }
            self.sent.lock().unwrap().push((*peer, payload.to_vec()));
            Ok(())
        }
    }
}
