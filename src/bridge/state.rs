//! # Shared Bridge State
//!
//! Connection bookkeeping and the rendering lock that serializes every
//! display write between the rendering context and the receive context.

use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Default bound on how long the receive path waits for the rendering lock
pub const LOCK_TIMEOUT_MS: u64 = 10;

/// Radio and peer status, updated on every received frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionState {
    pub wifi_up: bool,
    pub link_up: bool,
    pub peer_count: u32,
    pub last_rssi: i32,
    pub last_estimated_distance_m: f32,
}

impl ConnectionState {
    /// Radio started with `peer_count` registered peers
    pub fn radio_up(&mut self, peer_count: u32) {
        self.wifi_up = true;
        self.link_up = true;
        self.peer_count = peer_count;
    }

    /// Radio stopped; peers are forgotten
    pub fn radio_down(&mut self) {
        self.wifi_up = false;
        self.link_up = false;
        self.peer_count = 0;
    }

    /// Record the signal measurements of a received frame
    pub fn record_signal(&mut self, rssi_dbm: i32, estimated_distance_m: Option<f32>) {
        self.last_rssi = rssi_dbm;
        if let Some(distance) = estimated_distance_m {
            self.last_estimated_distance_m = distance;
        }
    }
}

/// The single rendering lock guarding the display
///
/// The rendering context may wait for it; the receive context uses
/// [`RenderLock::try_with`], which gives up after a short bound and drops the
/// update instead of stalling the radio task.
#[derive(Debug)]
pub struct RenderLock<D> {
    display: Mutex<D>,
    timeout: Duration,
}

impl<D> RenderLock<D> {
    pub fn new(display: D, timeout: Duration) -> Self {
        Self {
            display: Mutex::new(display),
            timeout,
        }
    }

    /// Acquisition bound used by [`RenderLock::try_with`]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wait for the lock without a bound
    pub async fn lock(&self) -> MutexGuard<'_, D> {
        self.display.lock().await
    }

    /// Run `f` under the lock if it can be taken within the timeout.
    ///
    /// Returns `None`, without running `f`, when the lock stayed busy.
    pub async fn try_with<R>(&self, f: impl FnOnce(&mut D) -> R) -> Option<R> {
        match tokio::time::timeout(self.timeout, self.display.lock()).await {
            Ok(mut guard) => Some(f(&mut guard)),
            Err(_) => {
                debug!("Render lock busy for {:?}, display update dropped", self.timeout);
                None
            }
        }
    }
}
