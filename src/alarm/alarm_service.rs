use super::{AlarmError, AlarmNotifier, AlarmPhase, AlarmTick, TargetAlarm, next_occurrence};
use crate::persistence::FileStateStore;
use crate::{error, event, log};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Owns the session's [`TargetAlarm`]: operator requests, the 1 s fire check and persistence.
///
/// Every phase change is written to the state store before the call returns.
pub struct AlarmService {
    alarm: Mutex<TargetAlarm>,
    phase: watch::Sender<AlarmPhase>,
    store: Arc<FileStateStore>,
    notifier: Arc<dyn AlarmNotifier>,
}

impl AlarmService {
    const TICK: Duration = Duration::from_secs(1);

    /// Restores the saved alarm, if any.
    ///
    /// # Arguments
    /// - `store`: The record store the alarm is persisted in.
    /// - `notifier`: Receives the alert when the alarm fires.
    /// - `clear_after`: How long a fired alarm stays visible.
    ///
    /// # Returns
    /// The service in the phase of the saved record, or idle if there is none.
    pub async fn restore(store: Arc<FileStateStore>, notifier: Arc<dyn AlarmNotifier>, clear_after: Duration) -> Self {
        let clear_after = TimeDelta::from_std(clear_after).unwrap_or(TimeDelta::MAX);
        let alarm = match store.load_alarm().await {
            Some(saved) => {
                let alarm = TargetAlarm::restore(saved, clear_after);
                log!("Restored target alarm in phase {}", alarm.phase());
                alarm
            }
            None => TargetAlarm::new(clear_after),
        };
        let (phase, _) = watch::channel(alarm.phase());
        Self { alarm: Mutex::new(alarm), phase, store, notifier }
    }

    pub fn subscribe(&self) -> watch::Receiver<AlarmPhase> { self.phase.subscribe() }

    pub async fn snapshot(&self) -> TargetAlarm { self.alarm.lock().await.clone() }

    /// Arms `target` and persists the new state.
    ///
    /// # Arguments
    /// - `target`: The target instant, it must lie in the future.
    ///
    /// # Returns
    /// `Ok(())` once armed, [`AlarmError::TargetNotInFuture`] otherwise.
    pub async fn arm(&self, target: DateTime<Utc>) -> Result<(), AlarmError> {
        let mut alarm = self.alarm.lock().await;
        alarm.arm(target, Utc::now())?;
        log!("Target alarm armed for {}", target.format("%Y-%m-%d %H:%M UTC"));
        self.commit(&alarm).await;
        Ok(())
    }

    /// Arms the next occurrence of an `HH:MM` UTC time.
    ///
    /// # Arguments
    /// - `hhmm`: The operator's time of day.
    ///
    /// # Returns
    /// The armed target instant, or the `AlarmError` of a malformed time.
    pub async fn arm_at(&self, hhmm: &str) -> Result<DateTime<Utc>, AlarmError> {
        let target = next_occurrence(hhmm, Utc::now())?;
        self.arm(target).await?;
        Ok(target)
    }

    pub async fn cancel(&self) {
        let mut alarm = self.alarm.lock().await;
        if alarm.cancel() {
            log!("Target alarm cancelled");
            self.commit(&alarm).await;
        }
    }

    /// Advances the alarm to `now`, notifying and persisting on change.
    pub async fn tick_at(&self, now: DateTime<Utc>) -> AlarmTick {
        let mut alarm = self.alarm.lock().await;
        let tick = alarm.tick(now);
        match tick {
            AlarmTick::Fired(target) => {
                self.notifier.alarm_fired(target);
                self.commit(&alarm).await;
            }
            AlarmTick::Cleared => {
                event!("Fired target alarm cleared");
                self.commit(&alarm).await;
            }
            AlarmTick::Unchanged => {}
        }
        tick
    }

    /// Checks the alarm once a second until `c_tok` is cancelled.
    pub async fn run(&self, c_tok: CancellationToken) {
        let mut ticker = tokio::time::interval(Self::TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                () = c_tok.cancelled() => break,
                _ = ticker.tick() => {}
            }
            self.tick_at(Utc::now()).await;
        }
    }

    async fn commit(&self, alarm: &TargetAlarm) {
        self.phase.send_replace(alarm.phase());
        if let Err(e) = self.store.save_alarm(&alarm.snapshot()).await {
            error!("Saving target alarm failed: {e}");
        }
    }
}
