//! Widget events delivered to the intent adapter.

use std::str::FromStr;

use crate::command::{Direction, Preset};

/// Presets in button-matrix order
pub const PRESET_MATRIX: [Preset; 4] = [Preset::Trot, Preset::Scan, Preset::Moonwalk, Preset::FarFromHome];

/// Pressable widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonId {
    Direction(Direction),
    EmergencyStop,
    /// Index into the preset button matrix; unknown indices are ignored
    PresetSlot(u32),
}

impl ButtonId {
    /// The preset behind a matrix slot, if any
    pub fn preset(self) -> Option<Preset> {
        match self {
            ButtonId::PresetSlot(slot) => PRESET_MATRIX.get(slot as usize).copied(),
            _ => None,
        }
    }
}

/// A discrete widget event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    ButtonPressed(ButtonId),
    /// Raw slider value; the adapter clamps it to 0-100
    SliderChanged(i32),
}

impl FromStr for UiEvent {
    type Err = String;

    /// Parse a console command line.
    ///
    /// Accepted forms: `up`, `down`, `left`, `right`, `stop`, `speed N`,
    /// `preset N`, or a preset name (`trot`, `scan`, `moonwalk`, `spm`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let command = words.next().ok_or_else(|| "empty command".to_string())?;
        let argument = words.next();

        if words.next().is_some() {
            return Err(format!("too many arguments in '{}'", s.trim()));
        }

        let number = |what: &str| -> Result<i64, String> {
            argument
                .ok_or_else(|| format!("'{}' needs a value", what))?
                .parse::<i64>()
                .map_err(|e| format!("invalid {} value: {}", what, e))
        };

        match command.to_ascii_lowercase().as_str() {
            "stop" | "estop" => Ok(UiEvent::ButtonPressed(ButtonId::EmergencyStop)),
            "speed" => {
                let value = number("speed")?.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
                Ok(UiEvent::SliderChanged(value))
            }
            "preset" => {
                let slot = u32::try_from(number("preset")?).map_err(|_| "preset slot must be positive".to_string())?;
                Ok(UiEvent::ButtonPressed(ButtonId::PresetSlot(slot)))
            }
            other => {
                if let Ok(direction) = other.parse::<Direction>() {
                    return Ok(UiEvent::ButtonPressed(ButtonId::Direction(direction)));
                }
                let preset = other.parse::<Preset>()?;
                PRESET_MATRIX
                    .iter()
                    .position(|p| *p == preset)
                    .map(|slot| UiEvent::ButtonPressed(ButtonId::PresetSlot(slot as u32)))
                    .ok_or_else(|| format!("'{}' has no panel button", other))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_matrix_order() {
        assert_eq!(ButtonId::PresetSlot(0).preset(), Some(Preset::Trot));
        assert_eq!(ButtonId::PresetSlot(1).preset(), Some(Preset::Scan));
        assert_eq!(ButtonId::PresetSlot(2).preset(), Some(Preset::Moonwalk));
        assert_eq!(ButtonId::PresetSlot(3).preset(), Some(Preset::FarFromHome));
        assert_eq!(ButtonId::PresetSlot(4).preset(), None);
        assert_eq!(ButtonId::EmergencyStop.preset(), None);
    }

    #[test]
    fn test_parse_directions() {
        assert_eq!(
            "up".parse::<UiEvent>().unwrap(),
            UiEvent::ButtonPressed(ButtonId::Direction(Direction::Up))
        );
        assert_eq!(
            "  LEFT ".parse::<UiEvent>().unwrap(),
            UiEvent::ButtonPressed(ButtonId::Direction(Direction::Left))
        );
    }

    #[test]
    fn test_parse_stop_and_speed() {
        assert_eq!("stop".parse::<UiEvent>().unwrap(), UiEvent::ButtonPressed(ButtonId::EmergencyStop));
        assert_eq!("speed 40".parse::<UiEvent>().unwrap(), UiEvent::SliderChanged(40));
        assert_eq!("speed -5".parse::<UiEvent>().unwrap(), UiEvent::SliderChanged(-5));
        assert!("speed".parse::<UiEvent>().is_err());
        assert!("speed fast".parse::<UiEvent>().is_err());
    }

    #[test]
    fn test_parse_presets() {
        assert_eq!("preset 2".parse::<UiEvent>().unwrap(), UiEvent::ButtonPressed(ButtonId::PresetSlot(2)));
        assert_eq!("trot".parse::<UiEvent>().unwrap(), UiEvent::ButtonPressed(ButtonId::PresetSlot(0)));
        assert_eq!("spm".parse::<UiEvent>().unwrap(), UiEvent::ButtonPressed(ButtonId::PresetSlot(3)));
        assert_eq!(
            "farfromhome".parse::<UiEvent>().unwrap(),
            UiEvent::ButtonPressed(ButtonId::PresetSlot(3))
        );
        assert!("preset -1".parse::<UiEvent>().is_err());
        // Valid preset without a button
        assert!("ping".parse::<UiEvent>().is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<UiEvent>().is_err());
        assert!("jump".parse::<UiEvent>().is_err());
        assert!("up now please".parse::<UiEvent>().is_err());
    }
}
