//! Gesture intake, value mapping and the outbound command path.

mod cockpit;
mod command;
mod control_state;
mod dispatcher;
mod mapper;

#[cfg(test)]
mod tests;

pub use cockpit::Cockpit;
pub use command::{CommandKind, GearPosition, Outbound, SimCommand, VariableCommand};
pub use control_state::{Axis, ControlState, Toggle};
pub use dispatcher::{CommandDispatcher, CommandSink, CommandTransport, HttpTransport};
pub use mapper::{
    CURVE_CENTER, DEFAULT_SNAP_THRESHOLD, ResponseCurve, clamp_unit, ease_out_cubic, snap_throttle,
    snap_to_detent,
};
