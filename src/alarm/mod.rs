//! Pilot-settable target time with a one-shot alert.

mod alarm_service;
mod notifier;
mod target_alarm;


pub use alarm_service::AlarmService;
pub use notifier::{AlarmNotifier, LogNotifier};
pub use target_alarm::{AlarmError, AlarmPhase, AlarmTick, TargetAlarm, next_occurrence};
