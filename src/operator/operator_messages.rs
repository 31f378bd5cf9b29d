use crate::control::Axis;
use serde::{Deserialize, Serialize};

/// One operator input, sent by a front-end as a single JSON line tagged by `type`.
///
/// Examples:
/// - `{"type": "axis", "axis": "throttle", "value": 0.72}`
/// - `{"type": "axis", "axis": "flaps", "value": 0.6, "released": true}`
/// - `{"type": "reverse"}`
/// - `{"type": "alarm_set", "time": "14:30"}`
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperatorMessage {
    /// A raw sample of one axis, `released` marks the end of the gesture.
    Axis {
        axis: Axis,
        value: f64,
        #[serde(default)]
        released: bool,
    },
    /// Both joystick axes at once.
    Joystick {
        x: f64,
        y: f64,
        #[serde(default)]
        released: bool,
    },
    Reverse,
    Idle,
    Gear,
    ParkingBrake,
    SpoilerArm,
    Autopilot,
    Camera { cam_id: u32 },
    CameraStep { up: bool },
    /// Arms the target alarm for the next `HH:MM` UTC.
    AlarmSet { time: String },
    AlarmCancel,
}

impl OperatorMessage {
    /// Decodes one line of the intake stream.
    ///
    /// # Arguments
    /// - `line`: A single JSON object, surrounding whitespace is ignored.
    ///
    /// # Returns
    /// The decoded message or the `serde_json` error describing why the line was rejected.
    pub fn decode(line: &str) -> Result<Self, serde_json::Error> { serde_json::from_str(line.trim()) }
}

/// Answer written back to the front-end for every line it sent.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperatorReply {
    Ack,
    AlarmArmed { target: String },
    Rejected { reason: String },
}

impl OperatorReply {
    pub fn rejected(reason: impl ToString) -> Self { OperatorReply::Rejected { reason: reason.to_string() } }

    /// Encodes the reply as one newline terminated JSON line.
    pub fn encode_line(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}
