use super::{FileStateStore, SavedControlState};
use crate::reconcile::Reconciler;
use crate::{error, event, log};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Periodic snapshot of the control vector, independent of the input path.
pub struct PersistenceWriter {
    store: Arc<FileStateStore>,
    reconciler: Arc<Reconciler>,
    profile_id: String,
    interval: Duration,
}

impl PersistenceWriter {
    /// Creates the periodic writer.
    ///
    /// # Arguments
    /// - `store`: The record store.
    /// - `reconciler`: Source of the control vector.
    /// - `profile_id`: The profile the snapshots are keyed by.
    /// - `interval`: Period between snapshots.
    ///
    /// # Returns
    /// A new `PersistenceWriter`, started with [`Self::run`].
    pub fn new(store: Arc<FileStateStore>, reconciler: Arc<Reconciler>, profile_id: &str, interval: Duration) -> Self {
        Self { store, reconciler, profile_id: profile_id.to_string(), interval }
    }

    /// Saves every interval and once more when `c_tok` is cancelled.
    pub async fn run(&self, c_tok: CancellationToken) {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_saved: Option<SavedControlState> = None;
        loop {
            tokio::select! {
                () = c_tok.cancelled() => break,
                _ = ticker.tick() => {}
            }
            self.save_if_changed(&mut last_saved).await;
        }
        last_saved = None;
        self.save_if_changed(&mut last_saved).await;
        log!("Persistence writer stopped after final snapshot");
    }

    async fn save_if_changed(&self, last_saved: &mut Option<SavedControlState>) {
        let snapshot = SavedControlState::from_state(&self.profile_id, &self.reconciler.current());
        if last_saved.as_ref() == Some(&snapshot) {
            event!("Control vector unchanged, skipping snapshot");
            return;
        }
        match self.store.save_controls(&snapshot).await {
            Ok(()) => *last_saved = Some(snapshot),
            Err(e) => error!("Saving control snapshot failed: {e}"),
        }
    }
}
