use crate::http_handler::http_response::profile::ReverseBehaviorEntry;
use std::time::Duration;

/// Reverse-thrust choreography parameters of a profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverseBehavior {
    /// Throttle lockout after leaving reverse, 0 selects the bump sequences.
    pub spool_down_ms: u64,
    /// Lowest forward value the simulator accepts as idle.
    pub idle_floor: f64,
    /// Reverse idle value.
    pub idle_rev: f64,
    /// Forward value sent first when leaving reverse.
    pub idle_bump_up: f64,
    /// Gap between a bump and the settle value.
    pub idle_bump_ms: u64,
    /// Reverse value sent first when entering reverse.
    pub idle_bump_down: f64,
}

impl Default for ReverseBehavior {
    fn default() -> Self { Self::from(&ReverseBehaviorEntry::default()) }
}

impl From<&ReverseBehaviorEntry> for ReverseBehavior {
    fn from(value: &ReverseBehaviorEntry) -> Self {
        let unit = |v: Option<f64>| v.filter(|x| x.is_finite()).map(|x| x.clamp(0.0, 1.0));
        let idle_floor = unit(value.idle_floor).unwrap_or(0.0);
        Self {
            spool_down_ms: value.spool_down_ms.unwrap_or(0),
            idle_floor,
            idle_rev: unit(value.idle_rev).unwrap_or(0.0),
            idle_bump_up: unit(value.idle_bump_up).unwrap_or(idle_floor),
            idle_bump_ms: value.idle_bump_ms.unwrap_or(0),
            idle_bump_down: unit(value.idle_bump_down).unwrap_or(1.0),
        }
    }
}

impl ReverseBehavior {
    /// Whether reverse transitions use the bump sequences instead of a lockout.
    pub fn is_instant_spool(&self) -> bool { self.spool_down_ms == 0 }
    pub fn bump_delay(&self) -> Duration { Duration::from_millis(self.idle_bump_ms) }
    pub fn spool_down(&self) -> Duration { Duration::from_millis(self.spool_down_ms) }
    /// Idle target of the throttle for the given mode.
    pub fn idle_target(&self, reverse: bool) -> f64 { if reverse { self.idle_rev } else { self.idle_floor } }
}
