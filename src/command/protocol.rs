//! # Command Protocol Constants and Types
//!
//! Command vocabulary understood by the robot's ESP-NOW receiver.

use std::fmt;
use std::str::FromStr;

/// Command kind carried by directional moves
pub const MOVE_COMMAND: &str = "MOVE";

/// Highest speed the slider can produce
pub const SPEED_MAX_PERCENT: u8 = 100;

/// Speed used until the slider is first moved
pub const DEFAULT_SPEED_PERCENT: u8 = 75;

/// Directional pad button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Wire name, e.g. `"UP"`
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown direction '{}'", s))
    }
}

/// Named robot action sent as a single token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Scan,
    Moonwalk,
    /// Search-patrol-monitor routine; opens the ping window on success
    FarFromHome,
    Trot,
    Stop,
    /// Keep-alive used for RSSI sampling
    Ping,
}

impl Preset {
    pub const ALL: [Preset; 6] = [
        Preset::Scan,
        Preset::Moonwalk,
        Preset::FarFromHome,
        Preset::Trot,
        Preset::Stop,
        Preset::Ping,
    ];

    /// Token placed on the wire
    pub fn token(self) -> &'static str {
        match self {
            Preset::Scan => "SCAN",
            Preset::Moonwalk => "MOONWALK",
            Preset::FarFromHome => "SPM",
            Preset::Trot => "TROT",
            Preset::Stop => "STOP",
            Preset::Ping => "PING",
        }
    }

    /// Human name used in logs
    pub fn name(self) -> &'static str {
        match self {
            Preset::FarFromHome => "FARFROMHOME",
            other => other.token(),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    /// Accepts either the log name or the wire token, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s) || p.token().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown preset '{}'", s))
    }
}

/// A command ready for encoding. Not retained after sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementCommand {
    Move { direction: Direction, speed_percent: u8 },
    Preset(Preset),
}

impl MovementCommand {
    /// Build a move, clamping speed to `0..=100`
    pub fn movement(direction: Direction, speed_percent: u8) -> Self {
        MovementCommand::Move {
            direction,
            speed_percent: speed_percent.min(SPEED_MAX_PERCENT),
        }
    }
}
