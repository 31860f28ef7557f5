//! # Telemetry Module
//!
//! Parses inbound frames from the robot into structured telemetry.
//!
//! This module handles:
//! - Bounding and NUL-terminating raw payloads before scanning
//! - JSON-style keys (`"temperature"`, `"distance"`, `"status"`)
//! - Token frames (`RANGE:`, `TEMP:`, `ACK`, `STATUS:`)
//! - Log lines for anything worth showing on the terminal panel

pub mod parser;
pub mod scan;
pub mod types;

pub use parser::{parse, TelemetryParser, FRAME_TEXT_LIMIT};
pub use types::{FrameNote, ParsedFrame, TelemetrySample};
