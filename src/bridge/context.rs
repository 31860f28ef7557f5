//! # Panel Context
//!
//! The explicit context object shared by the rendering context, the receive
//! context and the ping scheduler. It replaces process-wide globals: log
//! ring, connection state, current telemetry, speed and the ping window all
//! live here.
//!
//! Two kinds of locks are involved:
//! - short `std::sync::Mutex` sections around plain data (never held across
//!   an `.await`), so log appends and state updates always happen
//! - the [`RenderLock`] around the display, acquired with a bound from the
//!   receive path so a busy renderer drops the refresh instead of blocking

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info};

use super::scheduler::PingScheduler;
use super::state::{ConnectionState, RenderLock};
use crate::command::protocol::{DEFAULT_SPEED_PERCENT, SPEED_MAX_PERCENT};
use crate::display::{self, DisplaySink, TableRow, WidgetId, VALUE_COLUMN};
use crate::log_ring::LogRing;
use crate::telemetry::{ParsedFrame, TelemetrySample};

/// Terminal panel text before anything is logged
pub const READY_TEXT: &str = "System Ready";

/// Shared state of one control panel
pub struct PanelContext<D: DisplaySink> {
    display: RenderLock<D>,
    log: Mutex<LogRing>,
    connection: Mutex<ConnectionState>,
    sample: Mutex<TelemetrySample>,
    scheduler: Mutex<PingScheduler>,
    speed: AtomicU8,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<D: DisplaySink> PanelContext<D> {
    pub fn new(display: D, lock_timeout: Duration, scheduler: PingScheduler) -> Self {
        Self {
            display: RenderLock::new(display, lock_timeout),
            log: Mutex::new(LogRing::new()),
            connection: Mutex::new(ConnectionState::default()),
            sample: Mutex::new(TelemetrySample::default()),
            scheduler: Mutex::new(scheduler),
            speed: AtomicU8::new(DEFAULT_SPEED_PERCENT),
        }
    }

    /// The rendering lock around the display
    pub fn display(&self) -> &RenderLock<D> {
        &self.display
    }

    /// Append a line to the log ring and refresh the terminal panel.
    ///
    /// The line is always recorded and traced; only the panel refresh is
    /// skipped when the rendering lock is busy. The ring is rendered once the
    /// lock is held, so a late refresh never shows an older window.
    pub async fn log(&self, message: &str) {
        locked(&self.log).append(message);
        info!(target: "panel::log", "{}", message);

        self.display
            .try_with(|d| d.set_text(WidgetId::TerminalLog, &locked(&self.log).render()))
            .await;
    }

    /// Initial terminal text, shown until the first log line arrives
    pub async fn show_ready(&self) {
        self.display
            .lock()
            .await
            .set_text(WidgetId::TerminalLog, READY_TEXT);
    }

    /// Current terminal log text
    pub fn log_text(&self) -> String {
        locked(&self.log).render()
    }

    /// Show a new temperature reading
    pub async fn show_temperature(&self, celsius: f32) {
        let text = display::format_temperature(celsius);
        let shown = self
            .display
            .try_with(|d| d.set_cell(TableRow::Temp, VALUE_COLUMN, &text))
            .await;
        debug!("Temp: {:.1}°C (shown: {})", celsius, shown.is_some());
    }

    /// Show a new obstacle distance reading
    pub async fn show_distance(&self, distance_cm: f32) {
        let text = display::format_distance(distance_cm);
        let shown = self
            .display
            .try_with(|d| d.set_cell(TableRow::Range, VALUE_COLUMN, &text))
            .await;
        debug!("Dist: {:.1} cm (shown: {})", distance_cm, shown.is_some());
    }

    /// Make the fields of `frame` the current telemetry
    pub fn record_frame(&self, frame: &ParsedFrame) {
        locked(&self.sample).merge(frame);
    }

    /// Record the signal of a received frame and refresh the RSSI label
    pub async fn show_signal(&self, rssi_dbm: i32, distance_m: Option<f32>) {
        locked(&self.connection).record_signal(rssi_dbm, distance_m);
        {
            let mut sample = locked(&self.sample);
            sample.rssi_dbm = Some(rssi_dbm);
            sample.distance_m_estimated = distance_m;
        }

        if let Some(distance_m) = distance_m {
            let text = display::format_rssi(rssi_dbm, distance_m);
            self.display
                .try_with(|d| d.set_text(WidgetId::RssiLabel, &text))
                .await;
        }
    }

    /// Snapshot of the connection state
    pub fn connection(&self) -> ConnectionState {
        locked(&self.connection).clone()
    }

    /// Apply a radio lifecycle change
    pub fn update_connection(&self, f: impl FnOnce(&mut ConnectionState)) {
        f(&mut locked(&self.connection));
    }

    /// Snapshot of the currently displayed telemetry
    pub fn sample(&self) -> TelemetrySample {
        locked(&self.sample).clone()
    }

    /// Current movement speed (0-100)
    pub fn speed(&self) -> u8 {
        self.speed.load(Ordering::Relaxed)
    }

    /// Store a new movement speed, clamped to 0-100; returns the stored value
    pub fn set_speed(&self, speed_percent: u8) -> u8 {
        let speed = speed_percent.min(SPEED_MAX_PERCENT);
        self.speed.store(speed, Ordering::Relaxed);
        speed
    }

    /// Exclusive access to the ping scheduler; do not hold across `.await`
    pub fn scheduler(&self) -> MutexGuard<'_, PingScheduler> {
        locked(&self.scheduler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::state::LOCK_TIMEOUT_MS;
    use crate::display::mocks::RecordingDisplay;
    use std::sync::Arc;

    fn context() -> (PanelContext<RecordingDisplay>, RecordingDisplay) {
        let display = RecordingDisplay::new();
        let ctx = PanelContext::new(
            display.clone(),
            Duration::from_millis(LOCK_TIMEOUT_MS),
            PingScheduler::default(),
        );
        (ctx, display)
    }

    #[tokio::test]
    async fn test_log_refreshes_terminal() {
        let (ctx, display) = context();
        ctx.log("I UP").await;
        assert_eq!(display.text(WidgetId::TerminalLog).as_deref(), Some("#00FF00 I UP#\n"));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_every_repeated_line_is_traced() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _default = tracing::subscriber::set_default(subscriber);

        let (ctx, _) = context();
        for _ in 0..15 {
            ctx.log("I RSSI: -52 dBm @ ~1.41 m").await;
        }

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let traced = output
            .lines()
            .filter(|line| line.contains("panel::log") && line.contains("I RSSI: -52 dBm @ ~1.41 m"))
            .count();
        assert_eq!(traced, 15);
    }

    #[tokio::test]
    async fn test_contended_refresh_shows_latest_window() {
        let (ctx, display) = context();
        let guard = ctx.display().lock().await;

        tokio::join!(ctx.log("I first"), ctx.log("I second"), async move {
            tokio::task::yield_now().await;
            drop(guard);
        });

        let latest = ctx.log_text();
        assert!(latest.contains("I first") && latest.contains("I second"));
        let recorded = display.recorded.lock().unwrap();
        assert!(!recorded.texts.is_empty());
        for (widget, text) in &recorded.texts {
            assert_eq!(*widget, WidgetId::TerminalLog);
            assert_eq!(text, &latest);
        }
    }

    #[tokio::test]
    async fn test_show_ready_leaves_ring_empty() {
        let (ctx, display) = context();
        ctx.show_ready().await;
        assert_eq!(display.text(WidgetId::TerminalLog).as_deref(), Some(READY_TEXT));
        assert_eq!(ctx.log_text(), "");
    }

    #[tokio::test]
    async fn test_log_recorded_even_when_display_busy() {
        let (ctx, display) = context();
        let guard = ctx.display().lock().await;
        ctx.log("I RSSI: -50 dBm @ ~3.16 m").await;
        drop(guard);

        assert_eq!(display.write_count(), 0);
        assert!(ctx.log_text().contains("I RSSI: -50 dBm"));
    }

    #[tokio::test]
    async fn test_show_temperature_and_distance() {
        let (ctx, display) = context();
        ctx.show_temperature(37.777).await;
        ctx.show_distance(-1.0).await;

        assert_eq!(display.cell(TableRow::Temp).as_deref(), Some("37.8"));
        assert_eq!(display.cell(TableRow::Range).as_deref(), Some("--"));
    }

    #[test]
    fn test_record_frame_overwrites_present_fields() {
        let (ctx, _) = context();
        ctx.record_frame(&ParsedFrame {
            temperature_c: Some(20.0),
            status: Some("OK".into()),
            ..Default::default()
        });
        ctx.record_frame(&ParsedFrame {
            temperature_c: Some(21.5),
            ..Default::default()
        });

        let sample = ctx.sample();
        assert_eq!(sample.temperature_celsius, Some(21.5));
        assert_eq!(sample.status.as_deref(), Some("OK"));
    }

    #[tokio::test]
    async fn test_show_signal_updates_connection() {
        let (ctx, display) = context();
        ctx.show_signal(-40, Some(1.0)).await;

        let conn = ctx.connection();
        assert_eq!(conn.last_rssi, -40);
        assert_eq!(conn.last_estimated_distance_m, 1.0);
        assert_eq!(display.text(WidgetId::RssiLabel).as_deref(), Some("-40 dBm\n~1.00 m"));
    }

    #[test]
    fn test_speed_defaults_and_clamps() {
        let (ctx, _) = context();
        assert_eq!(ctx.speed(), DEFAULT_SPEED_PERCENT);
        assert_eq!(ctx.set_speed(140), 100);
        assert_eq!(ctx.speed(), 100);
    }

    #[test]
    fn test_update_connection() {
        let (ctx, _) = context();
        ctx.update_connection(|c| c.radio_up(1));
        assert!(ctx.connection().link_up);
    }
}
