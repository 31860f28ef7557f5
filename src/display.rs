//! # Display Sink
//!
//! Output side of the panel: the widgets the bridge writes text into.
//!
//! The widget tree itself lives outside this crate. The bridge only sets
//! label text and the two telemetry table cells, always while holding the
//! rendering lock (see [`crate::bridge::state::RenderLock`]).

use tracing::info;

/// Text widgets the bridge writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetId {
    /// Scrolling terminal log panel
    TerminalLog,
    /// Label above the speed slider
    SpeedLabel,
    /// Signal strength / estimated range label
    RssiLabel,
}

/// Rows of the telemetry table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableRow {
    Range = 1,
    Temp = 2,
}

impl TableRow {
    pub fn label(self) -> &'static str {
        match self {
            TableRow::Range => "Range",
            TableRow::Temp => "Temp",
        }
    }
}

/// Column holding telemetry values
pub const VALUE_COLUMN: u16 = 1;

/// Sentinel shown when a distance is unavailable
pub const UNAVAILABLE: &str = "--";

/// Widget text setters provided by the GUI
#[cfg_attr(test, mockall::automock)]
pub trait DisplaySink: Send {
    fn set_text(&mut self, widget: WidgetId, text: &str);
    fn set_cell(&mut self, row: TableRow, col: u16, text: &str);
}

/// Temperature cell text, one decimal place
pub fn format_temperature(celsius: f32) -> String {
    format!("{:.1}", celsius)
}

/// Range cell text: whole centimeters, or `--` for negative (error) readings
pub fn format_distance(distance_cm: f32) -> String {
    if distance_cm < 0.0 {
        UNAVAILABLE.to_string()
    } else {
        format!("{:.0}", distance_cm)
    }
}

/// RSSI label text, e.g. `"-52 dBm\n~1.41 m"`
pub fn format_rssi(rssi_dbm: i32, distance_m: f32) -> String {
    format!("{} dBm\n~{:.2} m", rssi_dbm, distance_m)
}

/// Speed label text, e.g. `"SPEED: 75%"`
pub fn format_speed(speed_percent: u8) -> String {
    format!("SPEED: {}%", speed_percent)
}

/// Display sink for headless runs: widget updates become log events.
///
/// Log lines are traced once per append by
/// [`PanelContext::log`](crate::bridge::PanelContext::log), so the terminal
/// panel text is only kept here.
#[derive(Debug, Default)]
pub struct TracingDisplay {
    terminal: String,
}

impl TracingDisplay {
    /// Text last written to the terminal panel
    pub fn terminal_text(&self) -> &str {
        &self.terminal
    }
}

impl DisplaySink for TracingDisplay {
    fn set_text(&mut self, widget: WidgetId, text: &str) {
        match widget {
            WidgetId::TerminalLog => {
                self.terminal.clear();
                self.terminal.push_str(text);
            }
            other => info!(target: "panel::widget", "{:?} = {:?}", other, text),
        }
    }

    fn set_cell(&mut self, row: TableRow, col: u16, text: &str) {
        info!(target: "panel::table", "{}[{}] = {}", row.label(), col, text);
    }
}
