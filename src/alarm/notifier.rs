use crate::info;
use chrono::{DateTime, Utc};

/// Receiver of the alert when the target alarm fires.
pub trait AlarmNotifier: Send + Sync {
    fn alarm_fired(&self, target: DateTime<Utc>);
}

/// Prints the alert to the console.
pub struct LogNotifier;

impl AlarmNotifier for LogNotifier {
    fn alarm_fired(&self, target: DateTime<Utc>) {
        info!("Target time {} reached", target.format("%H:%M UTC"));
    }
}
