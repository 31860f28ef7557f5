//! # Telemetry Parser
//!
//! Tolerant scanner over inbound frame payloads.
//!
//! The robot sends several loosely formatted frame styles:
//!
//! ```text
//! {"temperature": 133.0, "distance": 16.7, "status": "OBSTACLE", "count": 4}
//! RANGE:45cm
//! TEMP:25.5C
//! ACK:UP
//! STATUS:READY
//! ```
//!
//! Parsing runs an ordered list of independent [`Matcher`] rules over a
//! bounded text view of the payload. The JSON-style key rules always run; the
//! token rules form a first-match chain. A rule that recognizes its key but
//! finds no usable value simply contributes nothing.
//!
//! JSON `"temperature"` values are Fahrenheit and get converted, while
//! `TEMP:` values are already Celsius. The robot firmware reports them that
//! way and the asymmetry is kept as is.

use super::scan::{after_token, scan_f32, scan_quoted};
use super::types::{FrameNote, ParsedFrame};

/// Hard cap on the number of payload bytes examined
pub const FRAME_TEXT_LIMIT: usize = 100;

/// Convert degrees Fahrenheit to Celsius
pub fn fahrenheit_to_celsius(temp_f: f32) -> f32 {
    (temp_f - 32.0) * 5.0 / 9.0
}

/// Build the text view of a payload.
///
/// At most `max_len` bytes are examined and text ends at the first NUL byte.
/// Invalid UTF-8 is replaced rather than rejected.
pub fn bounded_text(payload: &[u8], max_len: usize) -> String {
    let bounded = &payload[..payload.len().min(max_len)];
    let terminated = match bounded.iter().position(|&b| b == 0) {
        Some(nul) => &bounded[..nul],
        None => bounded,
    };
    String::from_utf8_lossy(terminated).into_owned()
}

/// One parsing rule.
pub trait Matcher: Send + Sync {
    /// Examine `text`, record anything found in `frame`, and report whether
    /// the rule recognized the frame.
    fn apply(&self, text: &str, frame: &mut ParsedFrame) -> bool;
}

/// Numeric field a keyed rule writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    TemperatureC,
    DistanceCm,
}

/// `"key": <number>` anywhere in the text, with an optional conversion
pub struct KeyedNumber {
    needle: String,
    field: NumericField,
    convert: fn(f32) -> f32,
}

impl KeyedNumber {
    pub fn new(key: &str, field: NumericField, convert: fn(f32) -> f32) -> Self {
        Self {
            needle: format!("\"{}\":", key),
            field,
            convert,
        }
    }
}

impl Matcher for KeyedNumber {
    fn apply(&self, text: &str, frame: &mut ParsedFrame) -> bool {
        let Some(rest) = after_token(text, &self.needle) else {
            return false;
        };
        if let Some(value) = scan_f32(rest) {
            let value = (self.convert)(value);
            match self.field {
                NumericField::TemperatureC => frame.temperature_c = Some(value),
                NumericField::DistanceCm => frame.distance_cm = Some(value),
            }
        }
        true
    }
}

/// `"status": "<text>"` anywhere in the text
pub struct KeyedStatus {
    needle: String,
}

impl KeyedStatus {
    pub fn new(key: &str) -> Self {
        Self {
            needle: format!("\"{}\":", key),
        }
    }
}

impl Matcher for KeyedStatus {
    fn apply(&self, text: &str, frame: &mut ParsedFrame) -> bool {
        let Some(rest) = after_token(text, &self.needle) else {
            return false;
        };
        if let Some(status) = scan_quoted(rest) {
            frame.status = Some(status);
        }
        true
    }
}

/// What a [`TokenRule`] does once its token is present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAction {
    /// Log the remainder after the token as a sensor range
    SensorRange,
    /// Scan a Celsius temperature directly after the token
    CelsiusTemperature,
    /// Log the whole frame as an acknowledgment
    Ack,
    /// Log the remainder after the token
    StatusText,
}

/// Fires when `token` occurs anywhere in the text
pub struct TokenRule {
    token: &'static str,
    action: TokenAction,
}

impl TokenRule {
    pub const fn new(token: &'static str, action: TokenAction) -> Self {
        Self { token, action }
    }
}

impl Matcher for TokenRule {
    fn apply(&self, text: &str, frame: &mut ParsedFrame) -> bool {
        let Some(rest) = after_token(text, self.token) else {
            return false;
        };
        match self.action {
            TokenAction::SensorRange => frame.notes.push(FrameNote::SensorRange(rest.to_string())),
            TokenAction::CelsiusTemperature => {
                if let Some(temp_c) = scan_f32(rest) {
                    frame.temperature_c = Some(temp_c);
                }
            }
            TokenAction::Ack => frame.notes.push(FrameNote::Ack(text.to_string())),
            TokenAction::StatusText => frame.notes.push(FrameNote::StatusText(rest.to_string())),
        }
        true
    }
}

/// Logs frames that carry no telemetry keys and are not raw JSON
pub struct Unclassified;

impl Matcher for Unclassified {
    fn apply(&self, text: &str, frame: &mut ParsedFrame) -> bool {
        if text.contains("distance") || text.contains("temperature") || text.starts_with('{') {
            return false;
        }
        frame.notes.push(FrameNote::Unclassified(text.to_string()));
        true
    }
}

/// Runs its rules in order and stops at the first that recognizes the frame
pub struct FirstMatch {
    rules: Vec<Box<dyn Matcher>>,
}

impl FirstMatch {
    pub fn new(rules: Vec<Box<dyn Matcher>>) -> Self {
        Self { rules }
    }
}

impl Matcher for FirstMatch {
    fn apply(&self, text: &str, frame: &mut ParsedFrame) -> bool {
        self.rules.iter().any(|rule| rule.apply(text, frame))
    }
}

/// Ordered set of independent rules over a bounded payload view
pub struct TelemetryParser {
    max_len: usize,
    rules: Vec<Box<dyn Matcher>>,
}

impl Default for TelemetryParser {
    fn default() -> Self {
        Self::new(FRAME_TEXT_LIMIT)
    }
}

impl std::fmt::Debug for TelemetryParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryParser")
            .field("max_len", &self.max_len)
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl TelemetryParser {
    /// Parser with the Biospider rule set.
    ///
    /// `max_len` is clamped to [`FRAME_TEXT_LIMIT`].
    pub fn new(max_len: usize) -> Self {
        let token_chain: Vec<Box<dyn Matcher>> = vec![
            Box::new(TokenRule::new("RANGE:", TokenAction::SensorRange)),
            Box::new(TokenRule::new("TEMP:", TokenAction::CelsiusTemperature)),
            Box::new(TokenRule::new("ACK", TokenAction::Ack)),
            Box::new(TokenRule::new("STATUS:", TokenAction::StatusText)),
            Box::new(Unclassified),
        ];
        let rules: Vec<Box<dyn Matcher>> = vec![
            Box::new(KeyedNumber::new("temperature", NumericField::TemperatureC, fahrenheit_to_celsius)),
            Box::new(KeyedNumber::new("distance", NumericField::DistanceCm, |cm| cm)),
            Box::new(KeyedStatus::new("status")),
            Box::new(FirstMatch::new(token_chain)),
        ];
        Self::with_rules(max_len, rules)
    }

    /// Parser with a caller-supplied rule list
    pub fn with_rules(max_len: usize, rules: Vec<Box<dyn Matcher>>) -> Self {
        Self {
            max_len: max_len.min(FRAME_TEXT_LIMIT),
            rules,
        }
    }

    /// Bytes examined per payload
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Parse one payload.
    ///
    /// # Examples
    ///
    /// ```
    /// use biospider_panel::telemetry::TelemetryParser;
    ///
    /// let parser = TelemetryParser::default();
    /// let frame = parser.parse(br#"{"distance": 16.7, "status": "OBSTACLE"}"#);
    /// assert_eq!(frame.distance_cm, Some(16.7));
    /// assert_eq!(frame.status.as_deref(), Some("OBSTACLE"));
    /// ```
    pub fn parse(&self, payload: &[u8]) -> ParsedFrame {
        let text = bounded_text(payload, self.max_len);
        let mut frame = ParsedFrame::default();
        for rule in &self.rules {
            rule.apply(&text, &mut frame);
        }
        frame
    }
}

/// Parse `payload` with the default rule set, examining at most `max_len` bytes
pub fn parse(payload: &[u8], max_len: usize) -> ParsedFrame {
    TelemetryParser::new(max_len).parse(payload)
}
