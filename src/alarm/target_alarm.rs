use crate::persistence::SavedAlarmState;
use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AlarmPhase {
    Idle,
    Armed,
    Fired,
}

#[derive(Debug, Display, PartialEq, Eq)]
pub enum AlarmError {
    TargetNotInFuture,
    InvalidTime(String),
}

impl std::error::Error for AlarmError {}

/// What a tick changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmTick {
    Unchanged,
    Fired(DateTime<Utc>),
    Cleared,
}

/// Countdown towards a pilot-set UTC instant.
///
/// `fired` flips to true at most once per armed target, arming always resets it. A fired
/// alarm stays visible for `clear_after` and then returns to idle by itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetAlarm {
    target: Option<DateTime<Utc>>,
    fired: bool,
    fired_at: Option<DateTime<Utc>>,
    clear_after: TimeDelta,
}

impl TargetAlarm {
    pub fn new(clear_after: TimeDelta) -> Self { Self { target: None, fired: false, fired_at: None, clear_after } }

    /// Rebuilds the alarm from a saved record. A restored fired alarm clears relative to its target.
    pub fn restore(saved: SavedAlarmState, clear_after: TimeDelta) -> Self {
        match saved.target {
            Some(target) => Self {
                target: Some(target),
                fired: saved.fired,
                fired_at: saved.fired.then_some(target),
                clear_after,
            },
            None => Self::new(clear_after),
        }
    }

    pub fn snapshot(&self) -> SavedAlarmState { SavedAlarmState { target: self.target, fired: self.fired } }

    pub fn phase(&self) -> AlarmPhase {
        match (self.target, self.fired) {
            (None, _) => AlarmPhase::Idle,
            (Some(_), false) => AlarmPhase::Armed,
            (Some(_), true) => AlarmPhase::Fired,
        }
    }

    pub fn target(&self) -> Option<DateTime<Utc>> { self.target }
    pub fn fired(&self) -> bool { self.fired }

    /// Time left until the target, zero once it has passed.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.target.map(|t| (t - now).max(TimeDelta::zero()))
    }

    /// Arms `target` from any phase, clearing a previous firing.
    ///
    /// # Arguments
    /// - `target`: The new target instant.
    /// - `now`: The current time.
    ///
    /// # Returns
    /// [`AlarmError::TargetNotInFuture`] if `target` is not after `now`, the alarm is
    /// unchanged then.
    pub fn arm(&mut self, target: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), AlarmError> {
        if target <= now {
            return Err(AlarmError::TargetNotInFuture);
        }
        self.target = Some(target);
        self.fired = false;
        self.fired_at = None;
        Ok(())
    }

    /// Returns to idle. Returns whether anything was set.
    pub fn cancel(&mut self) -> bool {
        let was_set = self.target.is_some();
        self.target = None;
        self.fired = false;
        self.fired_at = None;
        was_set
    }

    fn clear_due(&self, now: DateTime<Utc>) -> bool {
        self.fired_at
            .and_then(|at| at.checked_add_signed(self.clear_after))
            .is_some_and(|clear_at| now >= clear_at)
    }

    /// Fires an armed alarm whose target has been reached and clears a fired one after its timeout.
    pub fn tick(&mut self, now: DateTime<Utc>) -> AlarmTick {
        match (self.phase(), self.target) {
            (AlarmPhase::Armed, Some(target)) if now >= target => {
                self.fired = true;
                self.fired_at = Some(now);
                AlarmTick::Fired(target)
            }
            (AlarmPhase::Fired, _) if self.clear_due(now) => {
                self.cancel();
                AlarmTick::Cleared
            }
            _ => AlarmTick::Unchanged,
        }
    }
}

/// Parses `HH:MM` as the next such UTC instant strictly after `now`.
///
/// # Arguments
/// - `text`: Hours and minutes, surrounding whitespace is ignored.
/// - `now`: The reference instant.
///
/// # Returns
/// Today's instant if it still lies ahead, otherwise tomorrow's.
pub fn next_occurrence(text: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, AlarmError> {
    let time = NaiveTime::parse_from_str(text.trim(), "%H:%M")
        .map_err(|e| AlarmError::InvalidTime(format!("{text}: {e}")))?;
    let today = now.date_naive().and_time(time).and_utc();
    if today > now { Ok(today) } else { Ok(today + TimeDelta::days(1)) }
}
