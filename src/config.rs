use crate::warn;
use std::{env, path::PathBuf, str::FromStr, time::Duration};

/// Runtime configuration of the client, read once from the process environment.
///
/// Every variable is optional. A missing or malformed value falls back to the documented
/// default so a bare invocation connects to a local simulator host with the default profile.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the simulator host.
    pub base_url: String,
    /// Id of the aircraft profile requested at session start.
    pub profile_id: String,
    /// Listen address of the operator intake.
    pub intake_addr: String,
    /// Directory holding the persisted control and alarm records.
    pub state_dir: PathBuf,
    /// Period of the authoritative state poll.
    pub poll_period: Duration,
    /// How long polled values of a key are ignored after a local write to it.
    pub suppression_window: Duration,
    /// Interval of the periodic persistence writer.
    pub persist_interval: Duration,
    /// How long a fired alarm stays visible before it clears itself.
    pub alarm_clear_after: Duration,
    /// Timings of the multi-step command sequences.
    pub timings: SequenceTimings,
}

/// Fixed delays and animation lengths used by the command sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceTimings {
    /// Gap between the steps of the autopilot disengage burst.
    pub autopilot_step: Duration,
    /// Length of the ease-out throttle and spoiler ramps.
    pub ramp: Duration,
    /// Delay between zeroing a deployed spoiler and issuing the arm command.
    pub spoiler_settle: Duration,
    /// Toggle period of the idle indicator lamp.
    pub flash_interval: Duration,
    /// Number of lamp toggles after an idle snap.
    pub flash_count: u32,
    /// Length of the rudder spring return.
    pub rudder_return: Duration,
    /// Frame period of visual animations.
    pub frame: Duration,
    /// Throttle lockout after leaving reverse when no spool-down is configured.
    pub default_spool_down: Duration,
}

impl Default for SequenceTimings {
    fn default() -> Self {
        Self {
            autopilot_step: Duration::from_millis(50),
            ramp: Duration::from_millis(300),
            spoiler_settle: Duration::from_millis(300),
            flash_interval: Duration::from_millis(500),
            flash_count: 6,
            rudder_return: Duration::from_millis(250),
            frame: Duration::from_millis(16),
            default_spool_down: Duration::from_millis(2000),
        }
    }
}

impl ClientConfig {
    const DEFAULT_BASE_URL: &'static str = "http://localhost:5000";
    const DEFAULT_PROFILE: &'static str = "pmdg_777";
    const DEFAULT_INTAKE_ADDR: &'static str = "127.0.0.1:1337";
    const DEFAULT_STATE_DIR: &'static str = "./cockpit_state";
    const DEFAULT_POLL_MS: u64 = 1000;
    const DEFAULT_SUPPRESSION_MS: u64 = 1500;
    /// Upper bound of the persistence interval, snapshots must never be older than this.
    const MAX_PERSIST_SECS: u64 = 60;
    const DEFAULT_ALARM_CLEAR_SECS: u64 = 300;

    /// Builds the configuration from `COCKPIT_*` environment variables.
    pub fn from_env() -> Self {
        let base_url =
            env::var("COCKPIT_BASE_URL").unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string());
        let profile_id =
            env::var("COCKPIT_PROFILE").unwrap_or_else(|_| Self::DEFAULT_PROFILE.to_string());
        let intake_addr =
            env::var("COCKPIT_INTAKE_ADDR").unwrap_or_else(|_| Self::DEFAULT_INTAKE_ADDR.to_string());
        let state_dir = env::var("COCKPIT_STATE_DIR")
            .map_or_else(|_| PathBuf::from(Self::DEFAULT_STATE_DIR), PathBuf::from);
        let poll_ms = Self::numeric_var("COCKPIT_POLL_MS", Self::DEFAULT_POLL_MS);
        let suppression_ms = Self::numeric_var("COCKPIT_SUPPRESSION_MS", Self::DEFAULT_SUPPRESSION_MS);
        let persist_secs = Self::numeric_var("COCKPIT_PERSIST_SECS", Self::MAX_PERSIST_SECS);
        let clear_secs = Self::numeric_var("COCKPIT_ALARM_CLEAR_SECS", Self::DEFAULT_ALARM_CLEAR_SECS);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            profile_id,
            intake_addr,
            state_dir,
            poll_period: Duration::from_millis(poll_ms.max(1)),
            suppression_window: Duration::from_millis(suppression_ms),
            persist_interval: Duration::from_secs(persist_secs.clamp(1, Self::MAX_PERSIST_SECS)),
            alarm_clear_after: Duration::from_secs(clear_secs),
            timings: SequenceTimings::default(),
        }
    }

    fn numeric_var<T: FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
        match env::var(name) {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("Ignoring malformed {name}={raw}, using {default}");
                default
            }),
            Err(_) => default,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            profile_id: Self::DEFAULT_PROFILE.to_string(),
            intake_addr: Self::DEFAULT_INTAKE_ADDR.to_string(),
            state_dir: PathBuf::from(Self::DEFAULT_STATE_DIR),
            poll_period: Duration::from_millis(Self::DEFAULT_POLL_MS),
            suppression_window: Duration::from_millis(Self::DEFAULT_SUPPRESSION_MS),
            persist_interval: Duration::from_secs(Self::MAX_PERSIST_SECS),
            alarm_clear_after: Duration::from_secs(Self::DEFAULT_ALARM_CLEAR_SECS),
            timings: SequenceTimings::default(),
        }
    }
}
