use crate::control::{Axis, CURVE_CENTER, ControlState, SimCommand};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable copy of the axis levers, keyed by the profile it was taken under.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SavedControlState {
    pub profile: String,
    pub flaps: f64,
    pub throttle: f64,
    pub spoilers: f64,
    pub brakes: f64,
    pub rudder: f64,
}

impl SavedControlState {
    /// Rudder values this close to center count as centered.
    const RUDDER_TOLERANCE: f64 = 1e-4;

    /// Captures the persisted axes of `state`.
    ///
    /// # Arguments
    /// - `profile`: The profile id the snapshot is keyed by.
    /// - `state`: The live control vector.
    ///
    /// # Returns
    /// A new `SavedControlState`.
    pub fn from_state(profile: &str, state: &ControlState) -> Self {
        Self {
            profile: profile.to_string(),
            flaps: state.axis(Axis::Flaps),
            throttle: state.axis(Axis::Throttle),
            spoilers: state.axis(Axis::Spoilers),
            brakes: state.axis(Axis::Brakes),
            rudder: state.axis(Axis::Rudder),
        }
    }

    /// Whether this is the vector a fresh session starts with.
    #[allow(clippy::float_cmp)]
    /// Whether the snapshot equals a fresh session: levers at 0, rudder centered.
    pub fn is_default(&self) -> bool {
        self.flaps == 0.0
            && self.throttle == 0.0
            && self.spoilers == 0.0
            && self.brakes == 0.0
            && (self.rudder - CURVE_CENTER).abs() < Self::RUDDER_TOLERANCE
    }

    pub fn apply_to(&self, state: &mut ControlState) {
        state.set_axis(Axis::Flaps, self.flaps);
        state.set_axis(Axis::Throttle, self.throttle);
        state.set_axis(Axis::Spoilers, self.spoilers);
        state.set_axis(Axis::Brakes, self.brakes);
        state.set_axis(Axis::Rudder, self.rudder);
    }

    /// The commands that move the simulator to this vector, in replay order.
    /// One command per persisted axis, forward thrust assumed.
    pub fn replay_commands(&self) -> Vec<SimCommand> {
        vec![
            SimCommand::FlapsAxis { value: self.flaps },
            SimCommand::Throttle { value: self.throttle, reverse: false },
            SimCommand::Spoilers { value: self.spoilers },
            SimCommand::Brakes { value: self.brakes },
            SimCommand::Rudder { value: self.rudder },
        ]
    }
}

/// Decides whether `saved` should be restored into a session of `profile_id`.
///
/// Snapshots of another profile and the untouched default vector are skipped.
///
/// # Arguments
/// - `saved`: The loaded snapshot.
/// - `profile_id`: The profile of the new session.
///
/// # Returns
/// The axis commands replaying the snapshot, or `None` if it must not be restored.
pub fn restore_plan(saved: &SavedControlState, profile_id: &str) -> Option<Vec<SimCommand>> {
    if saved.profile != profile_id || saved.is_default() {
        return None;
    }
    Some(saved.replay_commands())
}

/// Durable copy of the target alarm.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedAlarmState {
    pub target: Option<DateTime<Utc>>,
    pub fired: bool,
}
