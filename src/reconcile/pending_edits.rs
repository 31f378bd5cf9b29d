use super::TrackedKey;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Most recent local write per tracked key.
///
/// A key stays suppressed for `window` after its latest write, every write restarts the
/// window of its own key only.
#[derive(Debug, Clone)]
pub struct PendingLocalEdits {
    window: Duration,
    stamps: HashMap<TrackedKey, Instant>,
}

impl PendingLocalEdits {
    pub fn new(window: Duration) -> Self { Self { window, stamps: HashMap::new() } }

    pub fn window(&self) -> Duration { self.window }

    pub fn stamp(&mut self, key: TrackedKey, now: Instant) { self.stamps.insert(key, now); }

    /// Whether polled values of `key` are still ignored at `now`.
    ///
    /// # Arguments
    /// - `key`: The tracked key.
    /// - `now`: The arrival time of the poll.
    ///
    /// # Returns
    /// `true` while `now` lies before the last local write plus the window.
    pub fn is_suppressed(&self, key: TrackedKey, now: Instant) -> bool {
        self.stamps.get(&key).is_some_and(|written| now < *written + self.window)
    }

    /// Forgets every entry whose window has elapsed.
    /// Forgets every stamp whose window has elapsed at `now`.
    pub fn prune(&mut self, now: Instant) {
        let window = self.window;
        self.stamps.retain(|_, written| now < *written + window);
    }

    pub fn len(&self) -> usize { self.stamps.len() }
    pub fn is_empty(&self) -> bool { self.stamps.is_empty() }
}
