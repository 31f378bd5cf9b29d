use super::Reconciler;
use crate::http_handler::{
    http_client::HTTPClient,
    http_request::{lvars_get::VariableSnapshotRequest, request_common::NoBodyHTTPRequestType},
};
use crate::{event, log};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Periodic fetch of the authoritative state.
pub struct StatePoller {
    client: Arc<HTTPClient>,
    reconciler: Arc<Reconciler>,
    period: Duration,
}

impl StatePoller {
    /// Creates the poller.
    ///
    /// # Arguments
    /// - `client`: The HTTP client of the session.
    /// - `reconciler`: Receiver of the polled snapshots.
    /// - `period`: The fixed poll period.
    ///
    /// # Returns
    /// A new `StatePoller`, started with [`Self::run`].
    pub(crate) fn new(client: Arc<HTTPClient>, reconciler: Arc<Reconciler>, period: Duration) -> Self {
        Self { client, reconciler, period }
    }

    /// Polls every period until `c_tok` is cancelled.
    ///
    /// A failed poll is skipped, the next tick simply tries again. Ticks missed while a
    /// slow request is in flight are dropped instead of bursting.
    pub async fn run(&self, c_tok: CancellationToken) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut failures = 0u32;
        loop {
            tokio::select! {
                () = c_tok.cancelled() => break,
                _ = interval.tick() => {}
            }
            let request = VariableSnapshotRequest {};
            match request.send_request(&self.client).await {
                Ok(snapshot) => {
                    if failures > 0 {
                        log!("State poll recovered after {failures} failed attempts");
                        failures = 0;
                    }
                    let outcome = self.reconciler.apply_poll(&snapshot).await;
                    event!(
                        "Polled {} keys, applied {:?}, suppressed {:?}",
                        snapshot.len(),
                        outcome.applied,
                        outcome.suppressed
                    );
                }
                Err(e) => {
                    if failures == 0 {
                        log!("State poll failed: {e}, skipping until the host answers");
                    }
                    failures = failures.saturating_add(1);
                }
            }
        }
        log!("State poller stopped");
    }
}
