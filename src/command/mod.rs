//! # Command Module
//!
//! Outbound commands for the Biospider robot.
//!
//! This module handles:
//! - Directional moves with speed, encoded as compact JSON
//! - Named presets (gaits and routines) sent as bare tokens
//! - Emergency stop and keep-alive ping tokens

pub mod encoder;
pub mod protocol;

pub use encoder::{encode_move, encode_preset};
pub use protocol::{Direction, MovementCommand, Preset, DEFAULT_SPEED_PERCENT, SPEED_MAX_PERCENT};
