//! # Command Encoder
//!
//! Builds outbound payloads from commands.
//!
//! Moves are compact JSON, `{"cmd":"MOVE","dir":"UP","speed":75}`, which the
//! robot's receiver decodes with a JSON parser. Presets are bare ASCII tokens.

use serde::Serialize;

use super::protocol::*;
use crate::error::Result;

#[derive(Serialize)]
struct MoveMessage<'a> {
    cmd: &'a str,
    dir: &'a str,
    speed: u8,
}

/// Encode a directional move
///
/// # Arguments
///
/// * `direction` - Direction pad button
/// * `speed_percent` - Current slider speed (0-100)
///
/// # Returns
///
/// * `Result<Vec<u8>>` - JSON payload bytes
///
/// # Examples
///
/// ```
/// use biospider_panel::command::{encode_move, Direction};
///
/// let payload = encode_move(Direction::Up, 75)?;
/// assert_eq!(payload, br#"{"cmd":"MOVE","dir":"UP","speed":75}"#);
/// # Ok::<(), biospider_panel::error::PanelError>(())
/// ```
pub fn encode_move(direction: Direction, speed_percent: u8) -> Result<Vec<u8>> {
    debug_assert!(speed_percent <= SPEED_MAX_PERCENT, "speed {} out of range", speed_percent);

    let message = MoveMessage {
        cmd: MOVE_COMMAND,
        dir: direction.as_str(),
        speed: speed_percent,
    };
    Ok(serde_json::to_vec(&message)?)
}

/// Encode a preset as its bare token
pub fn encode_preset(preset: Preset) -> Vec<u8> {
    preset.token().as_bytes().to_vec()
}

impl MovementCommand {
    /// Encode this command into payload bytes
    pub fn encode(&self) -> Result<Vec<u8>> {
        match *self {
            MovementCommand::Move { direction, speed_percent } => encode_move(direction, speed_percent),
            MovementCommand::Preset(preset) => Ok(encode_preset(preset)),
        }
    }
}
