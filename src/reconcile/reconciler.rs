use super::{PendingLocalEdits, RemoteUnits, TrackedKey};
use crate::control::{Axis, ControlState, Toggle};
use crate::event;
use crate::http_handler::http_response::lvars::VariableSnapshotResponse;
use std::time::Duration;
use strum::IntoEnumIterator;
use tokio::sync::{Mutex, watch};
use tokio::time::Instant;

/// Result of applying one poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollOutcome {
    pub applied: Vec<TrackedKey>,
    pub suppressed: Vec<TrackedKey>,
}

/// Owner of the live [`ControlState`].
///
/// Local writes are applied immediately and stamp the affected tracked keys. Polled values
/// of a stamped key are discarded until its suppression window has elapsed, afterwards the
/// remote value wins. Presentation layers only get read access through [`Self::subscribe`].
pub struct Reconciler {
    state: watch::Sender<ControlState>,
    pending: Mutex<PendingLocalEdits>,
    units: RemoteUnits,
}

impl Reconciler {
    /// Creates the owner of the control vector.
    ///
    /// # Arguments
    /// - `initial`: The state presented before the first write or poll.
    /// - `window`: The suppression window of local writes.
    /// - `units`: Conversion of raw poll values into UI units.
    ///
    /// # Returns
    /// A new `Reconciler` without pending local edits.
    pub fn new(initial: ControlState, window: Duration, units: RemoteUnits) -> Self {
        let (state, _) = watch::channel(initial);
        Self { state, pending: Mutex::new(PendingLocalEdits::new(window)), units }
    }

    pub fn subscribe(&self) -> watch::Receiver<ControlState> { self.state.subscribe() }

    pub fn current(&self) -> ControlState { *self.state.borrow() }

    /// Applies `f` to the state and stamps `keys` with the current time, atomically with
    /// respect to polls.
    ///
    /// # Arguments
    /// - `keys`: The tracked keys whose polled values must be ignored for a window.
    /// - `f`: The state mutation, subscribers are notified once it returns.
    pub async fn local_write<F>(&self, keys: &[TrackedKey], f: F)
    where F: FnOnce(&mut ControlState) {
        let now = Instant::now();
        let mut pending = self.pending.lock().await;
        for key in keys {
            pending.stamp(*key, now);
        }
        self.state.send_modify(f);
    }

    pub async fn set_axis(&self, axis: Axis, value: f64) {
        let keys: Vec<TrackedKey> = TrackedKey::for_axis(axis).into_iter().collect();
        self.local_write(&keys, |s| s.set_axis(axis, value)).await;
    }

    pub async fn set_toggle(&self, toggle: Toggle, on: bool) {
        self.local_write(&[TrackedKey::for_toggle(toggle)], |s| s.set_toggle(toggle, on)).await;
    }

    /// Flips `toggle` and returns its new value.
    pub async fn flip_toggle(&self, toggle: Toggle) -> bool {
        let mut flipped = false;
        self.local_write(&[TrackedKey::for_toggle(toggle)], |s| {
            flipped = !s.toggle(toggle);
            s.set_toggle(toggle, flipped);
        })
        .await;
        flipped
    }

    /// Merges an authoritative snapshot into the state.
    ///
    /// Keys missing from the snapshot, non-numeric values and values without a UI meaning
    /// are skipped silently.
    ///
    /// # Arguments
    /// - `snapshot`: The polled key/value snapshot.
    ///
    /// # Returns
    /// A `PollOutcome` listing the applied and the suppressed keys.
    pub async fn apply_poll(&self, snapshot: &VariableSnapshotResponse) -> PollOutcome {
        let now = Instant::now();
        let mut pending = self.pending.lock().await;
        pending.prune(now);

        let mut outcome = PollOutcome::default();
        let mut updates = Vec::new();
        for key in TrackedKey::iter() {
            let Some(raw) = snapshot.number(key.remote_name()) else {
                continue;
            };
            if pending.is_suppressed(key, now) {
                event!("Ignoring polled {key}={raw}, local write pending");
                outcome.suppressed.push(key);
                continue;
            }
            if let Some(value) = self.units.convert(key, raw) {
                updates.push(value);
                outcome.applied.push(key);
            }
        }
        self.state.send_if_modified(|state| {
            let before = *state;
            for value in &updates {
                value.apply_to(state);
            }
            *state != before
        });
        outcome
    }
}
