//! Static per-aircraft description consumed by every other component.

mod aircraft_profile;
mod button_map;
mod detent;
mod reverse_behavior;
mod variant;

#[cfg(test)]
mod tests;

pub use aircraft_profile::{Camera, Profile, ProfileLoadError};
pub use button_map::{ButtonFunction, ButtonMap};
pub use detent::{Detent, DetentSet};
pub use reverse_behavior::ReverseBehavior;
pub use variant::{AutopilotVariant, ProfileVariant, RewriteRule, RewriteTable};
