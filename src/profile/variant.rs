use super::ReverseBehavior;
use crate::control::{CommandKind, Outbound, SimCommand};
use std::collections::HashMap;
use std::sync::LazyLock;

/// How a profile engages and disengages the autopilot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutopilotVariant {
    /// A single press of the profile's `AUTOPILOT` button toggles it.
    Button,
    /// Named-variable writes: a stepped engage and a timed disconnect burst.
    VariableSequence,
}

/// Declarative rewrite applied to outgoing commands of one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RewriteKind {
    IdleFloorThrottle,
}

struct VariantDecl {
    autopilot: AutopilotVariant,
    rewrites: &'static [(CommandKind, RewriteKind)],
}

const GENERIC_VARIANT: VariantDecl = VariantDecl { autopilot: AutopilotVariant::Button, rewrites: &[] };

/// Idle floor and reverse idle used by the throttle rewrite when the profile has no reverse block.
const FALLBACK_IDLE_FLOOR: f64 = 0.007;
const FALLBACK_IDLE_REV: f64 = 0.0069;

static PROFILE_VARIANTS: LazyLock<HashMap<&'static str, VariantDecl>> = LazyLock::new(|| {
    let mut lookup = HashMap::new();
    lookup.insert(
        "fenix_a320",
        VariantDecl {
            autopilot: AutopilotVariant::VariableSequence,
            rewrites: &[(CommandKind::Throttle, RewriteKind::IdleFloorThrottle)],
        },
    );
    lookup
});

/// A resolved, pure transform of one command type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RewriteRule {
    /// Maps a normalized throttle into the simulator's idle-floor/idle-reverse domain:
    /// forward values are raised to at least `idle_floor`, reverse values become
    /// `idle_rev * (1 - v)`.
    IdleFloorThrottle { idle_floor: f64, idle_rev: f64 },
}

impl RewriteRule {
    fn apply(self, command: SimCommand) -> Vec<SimCommand> {
        match (self, command) {
            (
                RewriteRule::IdleFloorThrottle { idle_floor, idle_rev },
                SimCommand::Throttle { value, reverse },
            ) => {
                let mapped = if reverse { idle_rev * (1.0 - value) } else { value.max(idle_floor) };
                vec![SimCommand::Throttle { value: mapped, reverse }]
            }
            (_, other) => vec![other],
        }
    }
}

/// Per-type rewrites of a profile, resolved once at profile load.
///
/// A rewrite may turn one logical command into zero, one or several physical messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewriteTable {
    rules: HashMap<CommandKind, RewriteRule>,
}

impl RewriteTable {
    pub fn with_rule(mut self, kind: CommandKind, rule: RewriteRule) -> Self {
        self.rules.insert(kind, rule);
        self
    }

    pub fn is_empty(&self) -> bool { self.rules.is_empty() }

    /// Rewrites one logical message.
    ///
    /// # Arguments
    /// - `message`: The message as emitted by the cockpit or a sequence.
    ///
    /// # Returns
    /// The physical messages to deliver in order. Types without a rule pass unchanged.
    pub fn apply(&self, message: Outbound) -> Vec<Outbound> {
        match message {
            Outbound::Sim(command) => match self.rules.get(&command.kind()) {
                Some(rule) => rule.apply(command).into_iter().map(Outbound::Sim).collect(),
                None => vec![Outbound::Sim(command)],
            },
            other @ Outbound::Variable(_) => vec![other],
        }
    }
}

/// Behavioural traits bound to a profile id.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileVariant {
    autopilot: AutopilotVariant,
    rewrites: RewriteTable,
}

impl ProfileVariant {
    /// Looks up the declarations of `profile_id` and binds them to the profile's parameters.
    /// Unknown ids get the generic variant.
    pub fn resolve(profile_id: &str, reverse: Option<&ReverseBehavior>) -> Self {
        let decl = PROFILE_VARIANTS.get(profile_id).unwrap_or(&GENERIC_VARIANT);
        let rewrites = decl.rewrites.iter().fold(RewriteTable::default(), |table, (kind, rewrite)| {
            let rule = match rewrite {
                RewriteKind::IdleFloorThrottle => RewriteRule::IdleFloorThrottle {
                    idle_floor: reverse.map_or(FALLBACK_IDLE_FLOOR, |r| r.idle_floor),
                    idle_rev: reverse.map_or(FALLBACK_IDLE_REV, |r| r.idle_rev),
                },
            };
            table.with_rule(*kind, rule)
        });
        Self { autopilot: decl.autopilot, rewrites }
    }

    pub fn autopilot(&self) -> AutopilotVariant { self.autopilot }
    pub fn rewrites(&self) -> &RewriteTable { &self.rewrites }
}
