//! # SPM Ping Scheduler
//!
//! After the far-from-home preset is sent the robot expects periodic `PING`
//! frames for a fixed window. This module handles:
//! - The IDLE / ACTIVE state machine over that window
//! - Rate limiting pings to one per interval
//! - The repeating tick task that sends them

use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use super::clock::Clock;
use super::context::PanelContext;
use super::outbound::Outbound;
use crate::command::{encode_preset, Preset};
use crate::display::DisplaySink;
use crate::link::transport::Transport;

/// Scheduler tick period
pub const TICK_MS: u64 = 100;

/// Minimum spacing between two pings
pub const PING_INTERVAL_MS: u64 = 200;

/// How long pings continue after the preset is sent
pub const SPM_WINDOW_MS: u64 = 15_000;

/// Polling state at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpmState {
    Idle,
    Active { deadline_ms: u64 },
}

/// Decides on each tick whether a ping is due
#[derive(Debug, Clone)]
pub struct PingScheduler {
    ping_interval_ms: u64,
    window_ms: u64,
    deadline_ms: Option<u64>,
    last_ping_ms: Option<u64>,
    failure_reported: bool,
}

impl Default for PingScheduler {
    fn default() -> Self {
        Self::new(PING_INTERVAL_MS, SPM_WINDOW_MS)
    }
}

impl PingScheduler {
    pub fn new(ping_interval_ms: u64, window_ms: u64) -> Self {
        Self {
            ping_interval_ms,
            window_ms,
            deadline_ms: None,
            last_ping_ms: None,
            failure_reported: false,
        }
    }

    /// Enter (or re-enter) ACTIVE: the window restarts at `now_ms` and the
    /// next tick pings immediately.
    pub fn arm(&mut self, now_ms: u64) {
        self.deadline_ms = Some(now_ms + self.window_ms);
        self.last_ping_ms = None;
        self.failure_reported = false;
        debug!("SPM window armed until {} ms", now_ms + self.window_ms);
    }

    pub fn state(&self, now_ms: u64) -> SpmState {
        match self.deadline_ms {
            Some(deadline_ms) if now_ms < deadline_ms => SpmState::Active { deadline_ms },
            _ => SpmState::Idle,
        }
    }

    pub fn last_ping_ms(&self) -> Option<u64> {
        self.last_ping_ms
    }

    /// Note a failed ping; returns `true` only for the first failure since
    /// the window was armed.
    pub fn note_send_failure(&mut self) -> bool {
        !std::mem::replace(&mut self.failure_reported, true)
    }

    /// Run one tick; returns `true` when a ping should be sent now.
    ///
    /// A due ping is recorded as sent whether or not the transport later
    /// accepts it.
    pub fn on_tick(&mut self, now_ms: u64) -> bool {
        let SpmState::Active { .. } = self.state(now_ms) else {
            if self.deadline_ms.take().is_some() {
                debug!("SPM window expired at {} ms", now_ms);
            }
            return false;
        };

        let due = match self.last_ping_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.ping_interval_ms,
        };
        if due {
            self.last_ping_ms = Some(now_ms);
        }
        due
    }
}

/// Tick forever, sending `PING` whenever the scheduler says so.
///
/// Runs until the surrounding task is dropped. Send failures are not
/// retried; the next due tick simply tries again. The first failure of each
/// window is logged as a WARN line, later ones only at debug level.
pub async fn run_ping_loop<D, T, C>(
    ctx: &PanelContext<D>,
    outbound: &Outbound<T>,
    clock: &C,
    tick: Duration,
) where
    D: DisplaySink,
    T: Transport,
    C: Clock,
{
    let mut ticker = interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let ping = encode_preset(Preset::Ping);

    loop {
        ticker.tick().await;

        let due = ctx.scheduler().on_tick(clock.now_ms());
        if due {
            if let Err(e) = outbound.send(&ping).await {
                debug!("PING send failed: {}", e);
                let first = ctx.scheduler().note_send_failure();
                if first {
                    ctx.log("W PING send failed").await;
                }
            }
        }
    }
}
