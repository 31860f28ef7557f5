//! # Telemetry Types
//!
//! Values extracted from inbound frames.

use std::fmt;

/// Maximum characters kept from a JSON `"status"` value
pub const STATUS_MAX_LEN: usize = 31;

/// Free-form text recognized in a frame, destined for the log panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameNote {
    /// Remainder after a `RANGE:` token, e.g. `45cm`
    SensorRange(String),
    /// A whole frame containing `ACK`
    Ack(String),
    /// Remainder after a `STATUS:` token
    StatusText(String),
    /// A non-JSON frame no rule recognized
    Unclassified(String),
}

impl FrameNote {
    /// Log panel line for this note
    pub fn log_line(&self) -> String {
        match self {
            FrameNote::SensorRange(range) => format!("I Sensor Range: {}", range),
            FrameNote::Ack(text) => format!("I ACK: {}", text),
            FrameNote::StatusText(text) => format!("I {}", text),
            FrameNote::Unclassified(text) => format!("I RX: {}", text),
        }
    }
}

/// Result of parsing one inbound frame
///
/// Each field is filled independently; a frame may yield any combination,
/// including nothing at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFrame {
    /// Temperature in degrees Celsius
    pub temperature_c: Option<f32>,
    /// Obstacle distance in centimeters
    pub distance_cm: Option<f32>,
    /// JSON `"status"` value, at most [`STATUS_MAX_LEN`] characters
    pub status: Option<String>,
    /// Text notes in match order
    pub notes: Vec<FrameNote>,
}

impl ParsedFrame {
    /// True when no rule produced anything
    pub fn is_empty(&self) -> bool {
        self.temperature_c.is_none()
            && self.distance_cm.is_none()
            && self.status.is_none()
            && self.notes.is_empty()
    }

    /// Log panel lines produced by this frame, status first
    pub fn log_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.notes.len() + 1);
        if let Some(status) = &self.status {
            lines.push(format!("I Status: {}", status));
        }
        lines.extend(self.notes.iter().map(FrameNote::log_line));
        lines
    }
}

/// The currently displayed telemetry, overwritten by each received frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetrySample {
    pub temperature_celsius: Option<f32>,
    pub distance_cm: Option<f32>,
    pub status: Option<String>,
    pub rssi_dbm: Option<i32>,
    pub distance_m_estimated: Option<f32>,
}

impl TelemetrySample {
    /// Overwrite the fields present in `frame`, keeping the rest
    pub fn merge(&mut self, frame: &ParsedFrame) {
        if let Some(t) = frame.temperature_c {
            self.temperature_celsius = Some(t);
        }
        if let Some(d) = frame.distance_cm {
            self.distance_cm = Some(d);
        }
        if let Some(s) = &frame.status {
            self.status = Some(s.clone());
        }
    }
}

impl fmt::Display for TelemetrySample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn opt<T: fmt::Display>(v: &Option<T>) -> String {
            v.as_ref().map_or_else(|| "--".to_string(), |v| v.to_string())
        }
        write!(
            f,
            "temp={}C dist={}cm status={} rssi={}dBm est={}m",
            opt(&self.temperature_celsius),
            opt(&self.distance_cm),
            opt(&self.status),
            opt(&self.rssi_dbm),
            opt(&self.distance_m_estimated),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_log_lines() {
        assert_eq!(FrameNote::SensorRange("45cm".into()).log_line(), "I Sensor Range: 45cm");
        assert_eq!(FrameNote::Ack("ACK:UP".into()).log_line(), "I ACK: ACK:UP");
        assert_eq!(FrameNote::StatusText("READY".into()).log_line(), "I READY");
        assert_eq!(FrameNote::Unclassified("hello".into()).log_line(), "I RX: hello");
    }

    #[test]
    fn test_status_logged_before_notes() {
        let frame = ParsedFrame {
            status: Some("OK".into()),
            notes: vec![FrameNote::Ack("ACK".into())],
            ..Default::default()
        };
        assert_eq!(frame.log_lines(), vec!["I Status: OK", "I ACK: ACK"]);
    }

    #[test]
    fn test_sample_merge_keeps_absent_fields() {
        let mut sample = TelemetrySample {
            temperature_celsius: Some(20.0),
            distance_cm: Some(50.0),
            ..Default::default()
        };
        sample.merge(&ParsedFrame {
            distance_cm: Some(12.5),
            ..Default::default()
        });
        assert_eq!(sample.temperature_celsius, Some(20.0));
        assert_eq!(sample.distance_cm, Some(12.5));
    }

    #[test]
    fn test_empty_frame() {
        assert!(ParsedFrame::default().is_empty());
        assert!(ParsedFrame::default().log_lines().is_empty());
    }
}
