use crate::event;
use std::collections::HashMap;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

/// Logical functions the host integration layer maps to discrete buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ButtonFunction {
    ParkingBrake,
    ReverseToggle,
    IdleButton,
    ArmSpoilers,
    GearUp,
    GearDown,
    Autopilot,
    CamUp,
    CamDown,
    CamMoveMode,
    CamBase,
}

impl ButtonFunction {
    fn default_index(self) -> Option<u32> {
        match self {
            ButtonFunction::ParkingBrake => Some(1),
            ButtonFunction::ReverseToggle => Some(2),
            ButtonFunction::IdleButton => Some(3),
            ButtonFunction::GearUp | ButtonFunction::GearDown => Some(4),
            ButtonFunction::CamUp => Some(5),
            ButtonFunction::CamDown => Some(6),
            ButtonFunction::CamMoveMode => Some(8),
            ButtonFunction::CamBase => Some(10),
            ButtonFunction::ArmSpoilers | ButtonFunction::Autopilot => None,
        }
    }
}

/// Button-index table of a profile, profile entries override the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonMap {
    buttons: HashMap<ButtonFunction, u32>,
}

impl Default for ButtonMap {
    fn default() -> Self {
        use strum::IntoEnumIterator;
        let buttons = ButtonFunction::iter()
            .filter_map(|f| f.default_index().map(|i| (f, i)))
            .collect();
        Self { buttons }
    }
}

impl ButtonMap {
    /// Merges the `mappings.vjoy` table of a profile document over the defaults.
    ///
    /// Unknown function names and indices that are not positive integers are skipped.
    pub fn from_entries(entries: Option<&HashMap<String, serde_json::Value>>) -> Self {
        let mut map = Self::default();
        for (name, raw) in entries.into_iter().flatten() {
            let Ok(function) = ButtonFunction::from_str(name) else {
                event!("Ignoring unknown button function {name}");
                continue;
            };
            match raw.as_u64().and_then(|i| u32::try_from(i).ok()).filter(|i| *i > 0) {
                Some(index) => {
                    map.buttons.insert(function, index);
                }
                None => event!("Ignoring button index {raw} for {function}"),
            }
        }
        map
    }

    pub fn index(&self, function: ButtonFunction) -> Option<u32> { self.buttons.get(&function).copied() }
}
