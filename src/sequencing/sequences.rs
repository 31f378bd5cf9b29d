//! The timed command bursts behind the stateful cockpit toggles.
//!
//! Every function takes ownership of the [`SequenceHandle`] of its slot and runs on the
//! schedule given by its arguments. Nothing waits for acknowledgements, delays are fixed.

use super::{SequenceHandle, SequenceResult};
use crate::config::SequenceTimings;
use crate::control::{Axis, CURVE_CENTER, Outbound, ResponseCurve, SimCommand, VariableCommand};
use crate::profile::ReverseBehavior;
use std::time::Duration;

const AP_DISCONNECT: &str = "ap_disconnect";
const AP_STATE_OFF: &str = "ap_state_off";
const AP_ENGAGE: &str = "ap_engage";

fn no_command(_: f64) -> Option<Outbound> { None }

/// Named-variable disengage: disconnect pulse followed by clearing the state variable.
pub async fn autopilot_disengage(h: SequenceHandle, step: Duration) -> SequenceResult {
    h.emit(VariableCommand::Set { key: AP_DISCONNECT, value: 1.0 }).await?;
    h.wait(step).await?;
    h.emit(VariableCommand::Set { key: AP_DISCONNECT, value: 0.0 }).await?;
    h.wait(step).await?;
    h.emit(VariableCommand::Set { key: AP_STATE_OFF, value: 0.0 }).await
}

pub async fn autopilot_engage(h: SequenceHandle) -> SequenceResult {
    h.emit(VariableCommand::Step { key: AP_ENGAGE, delta: 1.0 }).await
}

/// Entering reverse on an instant-spool profile.
pub async fn reverse_entry(h: SequenceHandle, reverse: ReverseBehavior) -> SequenceResult {
    h.set_axis(Axis::Throttle, 0.0).await?;
    h.emit(SimCommand::Throttle { value: reverse.idle_bump_down, reverse: true }).await?;
    h.wait(reverse.bump_delay()).await?;
    h.emit(SimCommand::Throttle { value: 0.0, reverse: true }).await
}

/// Leaving reverse on an instant-spool profile.
///
/// The visible lever glides from the bump value down to idle while the bump delay runs,
/// the idle value is issued when the delay is over.
pub async fn reverse_exit(h: SequenceHandle, reverse: ReverseBehavior, ramp: Duration) -> SequenceResult {
    h.set_axis(Axis::Throttle, reverse.idle_bump_up).await?;
    h.emit(SimCommand::Throttle { value: reverse.idle_bump_up, reverse: false }).await?;
    let glide = h.ramp(Axis::Throttle, reverse.idle_bump_up, reverse.idle_floor, ramp, no_command);
    let settle = async {
        h.wait(reverse.bump_delay()).await?;
        h.emit(SimCommand::Throttle { value: reverse.idle_floor, reverse: false }).await
    };
    let (glided, settled) = tokio::join!(glide, settle);
    settled?;
    glided
}

/// Reverse toggle on profiles with a spool-down lockout, in either direction.
pub async fn spool_toggle(h: SequenceHandle, reverse: bool) -> SequenceResult {
    h.set_axis(Axis::Throttle, 0.0).await?;
    h.emit(SimCommand::Throttle { value: 0.0, reverse }).await
}

/// Glides the throttle to its idle target and issues the target once the glide is done.
pub async fn idle_snap(h: SequenceHandle, from: f64, target: f64, reverse: bool, ramp: Duration) -> SequenceResult {
    h.ramp(Axis::Throttle, from, target, ramp, no_command).await?;
    h.emit(SimCommand::Throttle { value: target, reverse }).await
}

/// Idle press on profiles without reverse behaviour: the host handles the idle itself.
pub async fn idle_command(h: SequenceHandle, from: f64, ramp: Duration) -> SequenceResult {
    h.emit(SimCommand::IdleCommand).await?;
    h.ramp(Axis::Throttle, from, 0.0, ramp, no_command).await
}

/// Blinks the idle indicator `timings.flash_count` times.
pub async fn flash_indicator(h: SequenceHandle, timings: SequenceTimings) -> SequenceResult {
    let mut lit = true;
    h.indicator(lit).await?;
    for _ in 1..timings.flash_count {
        h.wait(timings.flash_interval).await?;
        lit = !lit;
        h.indicator(lit).await?;
    }
    h.wait(timings.flash_interval).await?;
    h.indicator(false).await
}

/// Arming through the profile's `ARM_SPOILERS` button.
///
/// A deployed handle is retracted and confirmed at zero first, the press follows after
/// the settle delay.
pub async fn arm_spoilers_button(h: SequenceHandle, deployed: bool, button: u32, settle: Duration) -> SequenceResult {
    h.set_axis(Axis::Spoilers, 0.0).await?;
    if deployed {
        h.emit(SimCommand::Spoilers { value: 0.0 }).await?;
        h.wait(settle).await?;
    }
    h.emit(SimCommand::VjoyButton { button }).await
}

/// Arming through the `arm_spoilers` command, the handle glides back to zero.
pub async fn arm_spoilers_command(h: SequenceHandle, from: f64, ramp: Duration) -> SequenceResult {
    h.emit(SimCommand::ArmSpoilers { value: 0.0 }).await?;
    h.ramp(Axis::Spoilers, from, 0.0, ramp, no_command).await
}

/// Spring return of a released rudder pedal, every frame is sent through the curve.
pub async fn rudder_return(h: SequenceHandle, from: f64, curve: ResponseCurve, duration: Duration) -> SequenceResult {
    h.ramp(Axis::Rudder, from, CURVE_CENTER, duration, move |v| {
        Some(SimCommand::Rudder { value: curve.apply(v) }.into())
    })
    .await
}
