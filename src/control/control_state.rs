use super::mapper::{CURVE_CENTER, clamp_unit};
use strum_macros::{Display, EnumIter};

/// Continuous control channels.
#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Axis {
    Flaps,
    Spoilers,
    Brakes,
    Rudder,
    Throttle,
    JoystickX,
    JoystickY,
}

impl Axis {
    /// Rest position of the axis: spring-loaded axes center, levers sit at 0.
    pub fn rest(self) -> f64 {
        match self {
            Axis::Rudder | Axis::JoystickX | Axis::JoystickY => CURVE_CENTER,
            _ => 0.0,
        }
    }
}

/// Discrete switches of the cockpit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Toggle {
    GearDown,
    ParkingBrake,
    SpoilersArmed,
    Reverse,
    Autopilot,
}

/// The live control vector shown to the operator.
///
/// Axis setters clamp into `[0, 1]`, so no reader ever sees an out-of-range value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlState {
    flaps: f64,
    spoilers: f64,
    brakes: f64,
    rudder: f64,
    throttle: f64,
    joystick_x: f64,
    joystick_y: f64,
    gear_down: bool,
    parking_brake: bool,
    spoilers_armed: bool,
    reverse: bool,
    autopilot: bool,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            flaps: Axis::Flaps.rest(),
            spoilers: Axis::Spoilers.rest(),
            brakes: Axis::Brakes.rest(),
            rudder: Axis::Rudder.rest(),
            throttle: Axis::Throttle.rest(),
            joystick_x: Axis::JoystickX.rest(),
            joystick_y: Axis::JoystickY.rest(),
            gear_down: true,
            parking_brake: true,
            spoilers_armed: false,
            reverse: false,
            autopilot: false,
        }
    }
}

impl ControlState {
    pub fn axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Flaps => self.flaps,
            Axis::Spoilers => self.spoilers,
            Axis::Brakes => self.brakes,
            Axis::Rudder => self.rudder,
            Axis::Throttle => self.throttle,
            Axis::JoystickX => self.joystick_x,
            Axis::JoystickY => self.joystick_y,
        }
    }

    pub fn set_axis(&mut self, axis: Axis, value: f64) {
        let value = clamp_unit(value);
        let slot = match axis {
            Axis::Flaps => &mut self.flaps,
            Axis::Spoilers => &mut self.spoilers,
            Axis::Brakes => &mut self.brakes,
            Axis::Rudder => &mut self.rudder,
            Axis::Throttle => &mut self.throttle,
            Axis::JoystickX => &mut self.joystick_x,
            Axis::JoystickY => &mut self.joystick_y,
        };
        *slot = value;
    }

    pub fn toggle(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::GearDown => self.gear_down,
            Toggle::ParkingBrake => self.parking_brake,
            Toggle::SpoilersArmed => self.spoilers_armed,
            Toggle::Reverse => self.reverse,
            Toggle::Autopilot => self.autopilot,
        }
    }

    pub fn set_toggle(&mut self, toggle: Toggle, on: bool) {
        let slot = match toggle {
            Toggle::GearDown => &mut self.gear_down,
            Toggle::ParkingBrake => &mut self.parking_brake,
            Toggle::SpoilersArmed => &mut self.spoilers_armed,
            Toggle::Reverse => &mut self.reverse,
            Toggle::Autopilot => &mut self.autopilot,
        };
        *slot = on;
    }
}
