//! Arbitration between optimistic local writes and the polled simulator state.

mod pending_edits;
mod poller;
mod reconciler;
mod tracked_key;

#[cfg(test)]
mod tests;

pub use pending_edits::PendingLocalEdits;
pub use poller::StatePoller;
pub use reconciler::{PollOutcome, Reconciler};
pub use tracked_key::{RemoteUnits, RemoteValue, ThrottleScale, TrackedKey};
