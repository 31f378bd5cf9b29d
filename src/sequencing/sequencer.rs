use crate::control::{Axis, CommandSink, Outbound, Toggle, ease_out_cubic};
use crate::event;
use crate::reconcile::Reconciler;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use strum_macros::Display;
use tokio::sync::{Mutex, MutexGuard, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Logical controls that own at most one running sequence each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum SequenceSlot {
    Autopilot,
    Throttle,
    Spoilers,
    Rudder,
    IdleIndicator,
}

/// Returned by every sequence step once a newer sequence took over the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Superseded;

impl std::fmt::Display for Superseded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "superseded") }
}

impl std::error::Error for Superseded {}

pub type SequenceResult = Result<(), Superseded>;

struct ActiveSequence {
    id: u64,
    c_tok: CancellationToken,
}

struct SequencerCore {
    active: Mutex<HashMap<SequenceSlot, ActiveSequence>>,
    next_id: AtomicU64,
    sink: CommandSink,
    reconciler: Arc<Reconciler>,
    indicator: watch::Sender<bool>,
    frame: Duration,
    teardown: CancellationToken,
}

/// Runs timed command bursts, one per [`SequenceSlot`].
///
/// Starting a sequence cancels the slot's previous one. Every effect of a sequence (sending,
/// writing local state, driving the indicator) first checks under the slot table lock that
/// the sequence still owns its slot, so a superseded sequence cannot apply any further step.
#[derive(Clone)]
pub struct Sequencer {
    core: Arc<SequencerCore>,
}

impl Sequencer {
    /// Creates an empty sequencer.
    ///
    /// # Arguments
    /// - `sink`: The command queue every sequence emits into.
    /// - `reconciler`: Owner of the local state the sequences animate.
    /// - `frame`: Frame period of ramps, at least 1 ms.
    /// - `teardown`: Session token, every sequence token is a child of it.
    ///
    /// # Returns
    /// A new `Sequencer` with no running sequence and the indicator lamp off.
    pub fn new(
        sink: CommandSink,
        reconciler: Arc<Reconciler>,
        frame: Duration,
        teardown: CancellationToken,
    ) -> Self {
        let (indicator, _) = watch::channel(false);
        Self {
            core: Arc::new(SequencerCore {
                active: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
                sink,
                reconciler,
                indicator,
                frame: frame.max(Duration::from_millis(1)),
                teardown,
            }),
        }
    }

    /// Read-only view of the idle indicator lamp.
    pub fn indicator(&self) -> watch::Receiver<bool> { self.core.indicator.subscribe() }

    /// Cancels whatever runs in `slot` and spawns `body` in its place.
    ///
    /// The previous sequence is cancelled under the slot table lock before the new one is
    /// registered, so the two never apply steps interleaved.
    ///
    /// # Arguments
    /// - `slot`: The control the sequence belongs to.
    /// - `body`: Builds the sequence future from its [`SequenceHandle`].
    ///
    /// # Returns
    /// The `JoinHandle` of the spawned sequence task.
    pub async fn start<F, Fut>(&self, slot: SequenceSlot, body: F) -> JoinHandle<()>
    where
        F: FnOnce(SequenceHandle) -> Fut,
        Fut: Future<Output = SequenceResult> + Send + 'static,
    {
        let id = self.core.next_id.fetch_add(1, Ordering::Relaxed);
        let c_tok = self.core.teardown.child_token();
        {
            let mut active = self.core.active.lock().await;
            let previous = active.insert(slot, ActiveSequence { id, c_tok: c_tok.clone() });
            if let Some(previous) = previous {
                previous.c_tok.cancel();
                event!("{slot} sequence {} superseded by {id}", previous.id);
            }
        }
        let handle = SequenceHandle { core: Arc::clone(&self.core), slot, id, c_tok };
        let core = Arc::clone(&self.core);
        let sequence = body(handle);
        tokio::spawn(async move {
            if sequence.await.is_err() {
                event!("{slot} sequence {id} stopped early");
            }
            let mut active = core.active.lock().await;
            if active.get(&slot).is_some_and(|a| a.id == id) {
                active.remove(&slot);
            }
        })
    }

    /// Cancels the sequence of `slot`, if any.
    ///
    /// # Arguments
    /// - `slot`: The control whose sequence is stopped.
    ///
    /// # Returns
    /// `true` if a sequence was running.
    pub async fn cancel(&self, slot: SequenceSlot) -> bool {
        let removed = self.core.active.lock().await.remove(&slot);
        match removed {
            Some(sequence) => {
                sequence.c_tok.cancel();
                true
            }
            None => false,
        }
    }

    pub async fn is_running(&self, slot: SequenceSlot) -> bool {
        self.core.active.lock().await.contains_key(&slot)
    }
}

/// The capabilities a running sequence has. Every step fails with [`Superseded`] once the
/// sequence lost its slot.
pub struct SequenceHandle {
    core: Arc<SequencerCore>,
    slot: SequenceSlot,
    id: u64,
    c_tok: CancellationToken,
}

impl SequenceHandle {
    async fn claim(&self) -> Result<MutexGuard<'_, HashMap<SequenceSlot, ActiveSequence>>, Superseded> {
        let active = self.core.active.lock().await;
        let owned = active.get(&self.slot).is_some_and(|a| a.id == self.id);
        if owned && !self.c_tok.is_cancelled() { Ok(active) } else { Err(Superseded) }
    }

    pub fn reconciler(&self) -> &Reconciler { &self.core.reconciler }

    pub async fn emit(&self, message: impl Into<Outbound>) -> SequenceResult {
        let _slot = self.claim().await?;
        self.core.sink.send(message);
        Ok(())
    }

    pub async fn set_axis(&self, axis: Axis, value: f64) -> SequenceResult {
        let _slot = self.claim().await?;
        self.core.reconciler.set_axis(axis, value).await;
        Ok(())
    }

    pub async fn set_toggle(&self, toggle: Toggle, on: bool) -> SequenceResult {
        let _slot = self.claim().await?;
        self.core.reconciler.set_toggle(toggle, on).await;
        Ok(())
    }

    pub async fn indicator(&self, on: bool) -> SequenceResult {
        let _slot = self.claim().await?;
        self.core.indicator.send_replace(on);
        Ok(())
    }

    /// Sleeps for `delay` unless the sequence is cancelled first.
    pub async fn wait(&self, delay: Duration) -> SequenceResult {
        tokio::select! {
            biased;
            () = self.c_tok.cancelled() => Err(Superseded),
            () = tokio::time::sleep(delay) => Ok(()),
        }
    }

    /// Animates `axis` from `from` to `to` with an ease-out cubic over `duration`.
    ///
    /// One frame is written per frame period, the last one lands exactly on `to` at
    /// `duration`. A zero duration writes `to` at once.
    ///
    /// # Arguments
    /// - `axis`: The animated axis.
    /// - `from`: Start value.
    /// - `to`: Final value.
    /// - `duration`: Length of the animation.
    /// - `per_frame`: May turn a frame value into a command that is sent along.
    ///
    /// # Returns
    /// `Ok(())` once `to` was written, [`Superseded`] if the sequence lost its slot first.
    pub async fn ramp<P>(&self, axis: Axis, from: f64, to: f64, duration: Duration, per_frame: P) -> SequenceResult
    where P: Fn(f64) -> Option<Outbound> {
        if duration.is_zero() {
            let _slot = self.claim().await?;
            self.core.reconciler.set_axis(axis, to).await;
            if let Some(message) = per_frame(to) {
                self.core.sink.send(message);
            }
            return Ok(());
        }
        let start = Instant::now();
        let mut elapsed = Duration::ZERO;
        while elapsed < duration {
            elapsed = (elapsed + self.core.frame).min(duration);
            tokio::select! {
                biased;
                () = self.c_tok.cancelled() => return Err(Superseded),
                () = tokio::time::sleep_until(start + elapsed) => {}
            }
            let value = if elapsed == duration {
                to
            } else {
                from + (to - from) * ease_out_cubic(elapsed.as_secs_f64() / duration.as_secs_f64())
            };
            let _slot = self.claim().await?;
            self.core.reconciler.set_axis(axis, value).await;
            if let Some(message) = per_frame(value) {
                self.core.sink.send(message);
            }
        }
        Ok(())
    }
}
