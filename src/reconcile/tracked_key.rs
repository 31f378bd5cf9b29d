use crate::control::{Axis, ControlState, Toggle, clamp_unit};
use crate::profile::DetentSet;
use strum_macros::{Display, EnumIter, IntoStaticStr};

/// Keys of the authoritative state poll that mirror a local control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr, Display)]
pub enum TrackedKey {
    #[strum(serialize = "gear_handle")]
    Gear,
    #[strum(serialize = "parking_brake")]
    ParkingBrake,
    #[strum(serialize = "spoilers_handle")]
    SpoilersHandle,
    #[strum(serialize = "flaps_handle")]
    FlapsHandle,
    #[strum(serialize = "throttle_left")]
    Throttle,
    #[strum(serialize = "autopilot_state")]
    AutopilotState,
}

impl TrackedKey {
    /// Name of the key in the polled snapshot.
    pub fn remote_name(self) -> &'static str { self.into() }

    /// The key whose remote value reflects `axis`, if it is polled at all.
    pub fn for_axis(axis: Axis) -> Option<Self> {
        match axis {
            Axis::Flaps => Some(TrackedKey::FlapsHandle),
            Axis::Spoilers => Some(TrackedKey::SpoilersHandle),
            Axis::Throttle => Some(TrackedKey::Throttle),
            Axis::Brakes | Axis::Rudder | Axis::JoystickX | Axis::JoystickY => None,
        }
    }

    pub fn for_toggle(toggle: Toggle) -> Self {
        match toggle {
            Toggle::GearDown => TrackedKey::Gear,
            Toggle::ParkingBrake => TrackedKey::ParkingBrake,
            Toggle::SpoilersArmed => TrackedKey::SpoilersHandle,
            Toggle::Reverse => TrackedKey::Throttle,
            Toggle::Autopilot => TrackedKey::AutopilotState,
        }
    }
}

/// A polled value converted into the UI's units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RemoteValue {
    Gear { down: bool },
    ParkingBrake { set: bool },
    Spoilers { armed: bool, value: f64 },
    Flaps { value: f64 },
    Throttle { reverse: bool, value: f64 },
    Autopilot { engaged: bool },
}

impl RemoteValue {
    pub fn apply_to(self, state: &mut ControlState) {
        match self {
            RemoteValue::Gear { down } => state.set_toggle(Toggle::GearDown, down),
            RemoteValue::ParkingBrake { set } => state.set_toggle(Toggle::ParkingBrake, set),
            RemoteValue::Spoilers { armed, value } => {
                state.set_toggle(Toggle::SpoilersArmed, armed);
                state.set_axis(Axis::Spoilers, value);
            }
            RemoteValue::Flaps { value } => state.set_axis(Axis::Flaps, value),
            RemoteValue::Throttle { reverse, value } => {
                state.set_toggle(Toggle::Reverse, reverse);
                state.set_axis(Axis::Throttle, value);
            }
            RemoteValue::Autopilot { engaged } => state.set_toggle(Toggle::Autopilot, engaged),
        }
    }
}

/// Forward segment of the host's throttle lever scale.
///
/// The host reports the lever as a position number: values up to 1 are the reverse range,
/// 2 is forward idle and every following integer is the next throttle detent. Between the
/// integers the scale is linear.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrottleScale {
    breakpoints: Vec<f64>,
}

impl Default for ThrottleScale {
    fn default() -> Self { Self { breakpoints: vec![0.70, 0.85, 1.0] } }
}

impl ThrottleScale {
    const REVERSE_END: f64 = 1.0;
    const FORWARD_IDLE: f64 = 2.0;

    pub fn from_detents(detents: &DetentSet) -> Self {
        if detents.is_empty() { Self::default() } else { Self { breakpoints: detents.values() } }
    }

    /// Converts a remote lever position into `(reverse, value)`.
    ///
    /// Positions strictly between the reverse range and forward idle carry no usable value.
    #[allow(clippy::cast_precision_loss)]
    pub fn to_ui(&self, raw: f64) -> Option<(bool, f64)> {
        if raw <= Self::REVERSE_END {
            return Some((true, clamp_unit(1.0 - raw)));
        }
        if raw < Self::FORWARD_IDLE {
            return None;
        }
        let offset = raw - Self::FORWARD_IDLE;
        let mut lower = 0.0;
        for (i, upper) in self.breakpoints.iter().enumerate() {
            let segment_end = (i + 1) as f64;
            if offset <= segment_end || i + 1 == self.breakpoints.len() {
                let value = lower + (offset - i as f64) * (upper - lower);
                return Some((false, clamp_unit(value)));
            }
            lower = *upper;
        }
        Some((false, clamp_unit(offset)))
    }
}

/// Per-key conversion of raw poll values into UI units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteUnits {
    flap_detents: DetentSet,
    throttle: ThrottleScale,
}

impl RemoteUnits {
    /// Highest flap handle index of the fallback scale.
    const FLAP_POSITIONS: f64 = 4.0;

    /// Builds the conversions of a profile.
    ///
    /// # Arguments
    /// - `flap_detents`: Flap values indexed by the polled handle position.
    /// - `throttle_detents`: Breakpoints of the forward throttle scale, the defaults are
    ///   used when the profile has none.
    ///
    /// # Returns
    /// A new `RemoteUnits`.
    pub fn new(flap_detents: DetentSet, throttle_detents: &DetentSet) -> Self {
        Self { flap_detents, throttle: ThrottleScale::from_detents(throttle_detents) }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn flap_value(&self, raw: f64) -> f64 {
        let index = raw.round();
        let detent = if index >= 0.0 { self.flap_detents.get(index as usize) } else { None };
        detent.map_or_else(|| clamp_unit(raw / Self::FLAP_POSITIONS), |d| d.value())
    }

    #[allow(clippy::float_cmp)]
    pub fn convert(&self, key: TrackedKey, raw: f64) -> Option<RemoteValue> {
        match key {
            TrackedKey::Gear => Some(RemoteValue::Gear { down: raw >= 0.5 }),
            TrackedKey::ParkingBrake => Some(RemoteValue::ParkingBrake { set: raw >= 0.5 }),
            TrackedKey::SpoilersHandle => Some(RemoteValue::Spoilers {
                armed: raw == 0.0,
                value: if raw > 0.0 { clamp_unit((raw - 1.0) / 2.0) } else { 0.0 },
            }),
            TrackedKey::FlapsHandle => Some(RemoteValue::Flaps { value: self.flap_value(raw) }),
            TrackedKey::Throttle => {
                self.throttle.to_ui(raw).map(|(reverse, value)| RemoteValue::Throttle { reverse, value })
            }
            TrackedKey::AutopilotState => Some(RemoteValue::Autopilot { engaged: raw >= 0.5 }),
        }
    }
}
