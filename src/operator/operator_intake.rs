use super::{OperatorMessage, OperatorReply};
use crate::alarm::AlarmService;
use crate::control::Cockpit;
use crate::event;
use std::sync::Arc;

/// Routes decoded operator messages to the [`Cockpit`] and the [`AlarmService`].
pub struct OperatorIntake {
    /// Gesture intake of the session.
    cockpit: Arc<Cockpit>,
    /// The session's target alarm.
    alarm: Arc<AlarmService>,
}

impl OperatorIntake {
    /// Creates the intake for one session.
    ///
    /// # Arguments
    /// - `cockpit`: The gesture handler that turns messages into simulator commands.
    /// - `alarm`: The alarm service receiving `alarm_set` and `alarm_cancel`.
    ///
    /// # Returns
    /// A new `OperatorIntake`, shared by every intake connection.
    pub fn new(cockpit: Arc<Cockpit>, alarm: Arc<AlarmService>) -> Self { Self { cockpit, alarm } }

    /// Applies one operator message.
    ///
    /// # Arguments
    /// - `message`: The decoded message.
    ///
    /// # Returns
    /// The reply for the front-end. Only alarm requests can be rejected, every gesture is
    /// acknowledged once it has been handed to the cockpit.
    pub async fn handle(&self, message: OperatorMessage) -> OperatorReply {
        event!("Operator message {message:?}");
        match message {
            OperatorMessage::Axis { axis, value, released } => {
                self.cockpit.on_axis_sample(axis, value, released).await;
            }
            OperatorMessage::Joystick { x, y, released } => self.cockpit.on_joystick(x, y, released).await,
            OperatorMessage::Reverse => self.cockpit.toggle_reverse().await,
            OperatorMessage::Idle => self.cockpit.press_idle().await,
            OperatorMessage::Gear => self.cockpit.toggle_gear().await,
            OperatorMessage::ParkingBrake => self.cockpit.toggle_parking_brake().await,
            OperatorMessage::SpoilerArm => self.cockpit.toggle_spoiler_arm().await,
            OperatorMessage::Autopilot => self.cockpit.toggle_autopilot().await,
            OperatorMessage::Camera { cam_id } => self.cockpit.select_camera(cam_id),
            OperatorMessage::CameraStep { up } => self.cockpit.camera_step(up),
            OperatorMessage::AlarmSet { time } => {
                return match self.alarm.arm_at(&time).await {
                    Ok(target) => OperatorReply::AlarmArmed { target: target.to_rfc3339() },
                    Err(e) => OperatorReply::rejected(e),
                };
            }
            OperatorMessage::AlarmCancel => self.alarm.cancel().await,
        }
        OperatorReply::Ack
    }
}
