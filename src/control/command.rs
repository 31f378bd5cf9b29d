use strum_macros::EnumDiscriminants;

/// Position requested by a `gear_command`.
#[derive(serde::Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum GearPosition {
    Up,
    Down,
}

impl From<bool> for GearPosition {
    fn from(down: bool) -> Self { if down { GearPosition::Down } else { GearPosition::Up } }
}

/// A logical command for the /update_sim endpoint, serialized as an object tagged by `type`.
#[derive(serde::Serialize, Debug, Clone, PartialEq, EnumDiscriminants)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum_discriminants(name(CommandKind), derive(Hash))]
pub enum SimCommand {
    Throttle { value: f64, reverse: bool },
    FlapsAxis { value: f64 },
    Spoilers { value: f64 },
    Brakes { value: f64 },
    Rudder { value: f64 },
    FlightControls { val_x: f64, val_y: f64 },
    GearCommand { state: GearPosition },
    VjoyButton { button: u32 },
    Camera { cam_id: u32 },
    IdleCommand,
    ArmSpoilers { value: f64 },
}

impl SimCommand {
    pub fn kind(&self) -> CommandKind { CommandKind::from(self) }
}

/// A write to a named simulator variable.
#[derive(Debug, Clone, PartialEq)]
pub enum VariableCommand {
    Set { key: &'static str, value: f64 },
    Step { key: &'static str, delta: f64 },
}

/// Anything the client hands to the outbound transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Sim(SimCommand),
    Variable(VariableCommand),
}

impl From<SimCommand> for Outbound {
    fn from(value: SimCommand) -> Self { Outbound::Sim(value) }
}

impl From<VariableCommand> for Outbound {
    fn from(value: VariableCommand) -> Self { Outbound::Variable(value) }
}

impl std::fmt::Display for Outbound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outbound::Sim(cmd) => write!(f, "{cmd:?}"),
            Outbound::Variable(VariableCommand::Set { key, value }) => write!(f, "{key}:{value}"),
            Outbound::Variable(VariableCommand::Step { key, delta }) => write!(f, "{key}+={delta}"),
        }
    }
}
