use super::mapper::{CURVE_CENTER, clamp_unit, snap_throttle, snap_to_detent};
use super::{Axis, CommandSink, ControlState, SimCommand, Toggle};
use crate::config::SequenceTimings;
use crate::persistence::SavedControlState;
use crate::profile::{AutopilotVariant, ButtonFunction, Profile, ReverseBehavior};
use crate::reconcile::{Reconciler, TrackedKey};
use crate::sequencing::{SequenceSlot, Sequencer, sequences};
use crate::{event, log, warn};
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tokio::time::Instant;

/// Gesture intake of the client.
///
/// Raw samples and presses go in, local state is updated optimistically through the
/// [`Reconciler`] and the resulting commands are queued on the [`CommandSink`]. Stateful
/// toggles are handed to the [`Sequencer`]; a new gesture on a control supersedes the
/// control's running sequence.
pub struct Cockpit {
    profile: Arc<Profile>,
    reconciler: Arc<Reconciler>,
    sequencer: Sequencer,
    sink: CommandSink,
    timings: SequenceTimings,
    spool_lock: Mutex<Option<Instant>>,
}

impl Cockpit {
    /// Spoiler deflection above which a manual move disarms the spoilers.
    const DISARM_THRESHOLD: f64 = 0.05;

    /// Creates the gesture intake of a session.
    ///
    /// # Arguments
    /// - `profile`: The active aircraft profile.
    /// - `reconciler`: Owner of the local control vector.
    /// - `sequencer`: Runs the timed bursts of the stateful toggles.
    /// - `sink`: The outbound command queue.
    /// - `timings`: Delays and animation lengths of the sequences.
    ///
    /// # Returns
    /// A new `Cockpit` with no spool-down lock active.
    pub fn new(
        profile: Arc<Profile>,
        reconciler: Arc<Reconciler>,
        sequencer: Sequencer,
        sink: CommandSink,
        timings: SequenceTimings,
    ) -> Self {
        Self { profile, reconciler, sequencer, sink, timings, spool_lock: Mutex::new(None) }
    }

    pub fn state(&self) -> watch::Receiver<ControlState> { self.reconciler.subscribe() }
    pub fn indicator(&self) -> watch::Receiver<bool> { self.sequencer.indicator() }
    pub fn profile(&self) -> &Profile { &self.profile }

    /// Routes a raw sample of one axis. `released` marks the end of the gesture.
    pub async fn on_axis_sample(&self, axis: Axis, value: f64, released: bool) {
        match axis {
            Axis::Flaps => self.on_flaps(value, released).await,
            Axis::Spoilers => self.on_spoilers(value).await,
            Axis::Brakes => self.on_brakes(value).await,
            Axis::Rudder => self.on_rudder(value, released).await,
            Axis::Throttle => self.on_throttle(value).await,
            Axis::JoystickX => {
                let y = self.reconciler.current().axis(Axis::JoystickY);
                self.on_joystick(value, y, released).await;
            }
            Axis::JoystickY => {
                let x = self.reconciler.current().axis(Axis::JoystickX);
                self.on_joystick(x, value, released).await;
            }
        }
    }

    async fn spool_locked(&self) -> bool {
        let mut lock = self.spool_lock.lock().await;
        match *lock {
            Some(until) if Instant::now() < until => true,
            Some(_) => {
                *lock = None;
                log!("Spool-down finished, throttle released");
                false
            }
            None => false,
        }
    }

    /// Moves the throttle lever.
    ///
    /// While the spool-down lock is active the lever is held at 0 and nothing is sent.
    /// Otherwise the throttle sequence is superseded and the sample goes out snapped.
    ///
    /// # Arguments
    /// - `value`: The raw lever position.
    pub async fn on_throttle(&self, value: f64) {
        if self.spool_locked().await {
            self.reconciler.set_axis(Axis::Throttle, 0.0).await;
            return;
        }
        self.sequencer.cancel(SequenceSlot::Throttle).await;
        let reverse = self.reconciler.current().toggle(Toggle::Reverse);
        let value = snap_throttle(
            value,
            self.profile.throttle_detents(),
            self.profile.throttle_snap(),
            reverse,
        );
        self.reconciler.set_axis(Axis::Throttle, value).await;
        self.sink.send(SimCommand::Throttle { value, reverse });
    }

    /// Flaps follow the finger while dragging and commit to the nearest detent on release.
    pub async fn on_flaps(&self, value: f64, released: bool) {
        if !released {
            self.reconciler.set_axis(Axis::Flaps, value).await;
            return;
        }
        let value = snap_to_detent(value, self.profile.flap_detents());
        self.reconciler.set_axis(Axis::Flaps, value).await;
        self.sink.send(SimCommand::FlapsAxis { value });
    }

    /// Moves the spoiler handle, disarming armed spoilers once it leaves the stowed range.
    pub async fn on_spoilers(&self, value: f64) {
        self.sequencer.cancel(SequenceSlot::Spoilers).await;
        let value = clamp_unit(value);
        let mut disarmed = false;
        self.reconciler
            .local_write(&[TrackedKey::SpoilersHandle], |s| {
                s.set_axis(Axis::Spoilers, value);
                if s.toggle(Toggle::SpoilersArmed) && value > Self::DISARM_THRESHOLD {
                    s.set_toggle(Toggle::SpoilersArmed, false);
                    disarmed = true;
                }
            })
            .await;
        if disarmed {
            event!("Spoilers disarmed by manual deflection {value:.2}");
        }
        self.sink.send(SimCommand::Spoilers { value });
    }

    pub async fn on_brakes(&self, value: f64) {
        let value = clamp_unit(value);
        self.reconciler.set_axis(Axis::Brakes, value).await;
        self.sink.send(SimCommand::Brakes { value });
    }

    /// Rudder samples go out through the response curve, a release springs the pedal back.
    pub async fn on_rudder(&self, value: f64, released: bool) {
        self.sequencer.cancel(SequenceSlot::Rudder).await;
        let value = clamp_unit(value);
        let curve = self.profile.curve();
        self.reconciler.set_axis(Axis::Rudder, value).await;
        self.sink.send(SimCommand::Rudder { value: curve.apply(value) });
        if released {
            let duration = self.timings.rudder_return;
            self.sequencer
                .start(SequenceSlot::Rudder, move |h| sequences::rudder_return(h, value, curve, duration))
                .await;
        }
    }

    /// Moves the joystick. A release recenters both axes at once.
    ///
    /// # Arguments
    /// - `x`: Raw roll sample.
    /// - `y`: Raw pitch sample.
    /// - `released`: Whether the finger left the stick.
    pub async fn on_joystick(&self, x: f64, y: f64, released: bool) {
        let (x, y) = if released { (CURVE_CENTER, CURVE_CENTER) } else { (clamp_unit(x), clamp_unit(y)) };
        self.reconciler
            .local_write(&[], |s| {
                s.set_axis(Axis::JoystickX, x);
                s.set_axis(Axis::JoystickY, y);
            })
            .await;
        let curve = self.profile.curve();
        self.sink.send(SimCommand::FlightControls { val_x: curve.apply(x), val_y: curve.apply(y) });
    }

    /// Toggles reverse thrust.
    ///
    /// Instant-spool profiles run the bump sequences, all others send the plain reverse
    /// flag and lock the throttle for the spool-down time when leaving reverse.
    pub async fn toggle_reverse(&self) {
        let reverse = self.reconciler.flip_toggle(Toggle::Reverse).await;
        let instant = self.profile.reverse_behavior().copied().filter(ReverseBehavior::is_instant_spool);
        let ramp = self.timings.ramp;
        match instant {
            Some(behavior) if reverse => {
                *self.spool_lock.lock().await = None;
                self.sequencer
                    .start(SequenceSlot::Throttle, move |h| sequences::reverse_entry(h, behavior))
                    .await;
            }
            Some(behavior) => {
                *self.spool_lock.lock().await = None;
                self.sequencer
                    .start(SequenceSlot::Throttle, move |h| sequences::reverse_exit(h, behavior, ramp))
                    .await;
            }
            None => {
                if !reverse {
                    let spool = self
                        .profile
                        .reverse_behavior()
                        .map_or(self.timings.default_spool_down, ReverseBehavior::spool_down);
                    *self.spool_lock.lock().await = Some(Instant::now() + spool);
                    log!("Throttle locked for {}ms spool-down", spool.as_millis());
                }
                self.sequencer
                    .start(SequenceSlot::Throttle, move |h| sequences::spool_toggle(h, reverse))
                    .await;
            }
        }
    }

    /// Snaps the throttle to idle and blinks the idle indicator.
    #[allow(clippy::float_cmp)]
    pub async fn press_idle(&self) {
        let state = self.reconciler.current();
        let from = state.axis(Axis::Throttle);
        if from == 0.0 || self.spool_locked().await {
            event!("Idle press ignored, throttle already closed or locked");
            return;
        }
        let reverse = state.toggle(Toggle::Reverse);
        let ramp = self.timings.ramp;
        match self.profile.reverse_behavior().copied() {
            Some(behavior) => {
                let target = behavior.idle_target(reverse);
                self.sequencer
                    .start(SequenceSlot::Throttle, move |h| sequences::idle_snap(h, from, target, reverse, ramp))
                    .await;
            }
            None => {
                self.sequencer
                    .start(SequenceSlot::Throttle, move |h| sequences::idle_command(h, from, ramp))
                    .await;
            }
        }
        let timings = self.timings;
        self.sequencer
            .start(SequenceSlot::IdleIndicator, move |h| sequences::flash_indicator(h, timings))
            .await;
    }

    /// Flips the gear lever and commands the new position.
    pub async fn toggle_gear(&self) {
        let down = self.reconciler.flip_toggle(Toggle::GearDown).await;
        self.sink.send(SimCommand::GearCommand { state: down.into() });
    }

    pub async fn toggle_parking_brake(&self) {
        self.reconciler.flip_toggle(Toggle::ParkingBrake).await;
        self.press(ButtonFunction::ParkingBrake);
    }

    /// Arms or disarms the ground spoilers.
    ///
    /// A profile that arms through its `ARM_SPOILERS` button but maps none drops the
    /// request without touching the local armed flag.
    pub async fn toggle_spoiler_arm(&self) {
        let button = if self.profile.arm_spoilers_button() {
            let Some(button) = self.profile.buttons().index(ButtonFunction::ArmSpoilers) else {
                warn!("Profile {} maps no ARM_SPOILERS button, dropping arm request", self.profile.id());
                return;
            };
            Some(button)
        } else {
            None
        };
        let deflection = self.reconciler.current().axis(Axis::Spoilers);
        let armed = self.reconciler.flip_toggle(Toggle::SpoilersArmed).await;
        let timings = self.timings;
        match button {
            Some(button) if armed => {
                self.sequencer
                    .start(SequenceSlot::Spoilers, move |h| {
                        sequences::arm_spoilers_button(h, deflection > 0.0, button, timings.spoiler_settle)
                    })
                    .await;
            }
            Some(button) => {
                self.sequencer.cancel(SequenceSlot::Spoilers).await;
                self.sink.send(SimCommand::VjoyButton { button });
            }
            None if armed => {
                self.sequencer
                    .start(SequenceSlot::Spoilers, move |h| {
                        sequences::arm_spoilers_command(h, deflection, timings.ramp)
                    })
                    .await;
            }
            None => {
                self.sequencer.cancel(SequenceSlot::Spoilers).await;
                self.sink.send(SimCommand::Spoilers { value: 0.0 });
            }
        }
    }

    /// Engages or disengages the autopilot the way the profile variant prescribes.
    pub async fn toggle_autopilot(&self) {
        let engaged = self.reconciler.flip_toggle(Toggle::Autopilot).await;
        match self.profile.autopilot() {
            AutopilotVariant::VariableSequence if engaged => {
                self.sequencer.start(SequenceSlot::Autopilot, sequences::autopilot_engage).await;
            }
            AutopilotVariant::VariableSequence => {
                let step = self.timings.autopilot_step;
                self.sequencer
                    .start(SequenceSlot::Autopilot, move |h| sequences::autopilot_disengage(h, step))
                    .await;
            }
            AutopilotVariant::Button => {
                self.press(ButtonFunction::Autopilot);
            }
        }
    }

    /// Switches to the camera `cam_id`. Ids the profile does not list are dropped.
    pub fn select_camera(&self, cam_id: u32) {
        let cameras = self.profile.cameras();
        if !cameras.is_empty() && !cameras.iter().any(|c| c.id == cam_id) {
            warn!("Camera {cam_id} is not part of profile {}", self.profile.id());
            return;
        }
        self.sink.send(SimCommand::Camera { cam_id });
    }

    /// Cycles to the next or previous simulator camera.
    pub fn camera_step(&self, up: bool) {
        self.press(if up { ButtonFunction::CamUp } else { ButtonFunction::CamDown });
    }

    /// Adopts a restored control vector locally and replays it to the simulator.
    pub async fn restore(&self, saved: &SavedControlState, replay: Vec<SimCommand>) {
        self.reconciler
            .local_write(&[TrackedKey::FlapsHandle, TrackedKey::Throttle, TrackedKey::SpoilersHandle], |s| {
                saved.apply_to(s);
            })
            .await;
        log!("Replaying {} restored axis commands", replay.len());
        for command in replay {
            self.sink.send(command);
        }
    }

    fn press(&self, function: ButtonFunction) {
        match self.profile.buttons().index(function) {
            Some(button) => self.sink.send(SimCommand::VjoyButton { button }),
            None => warn!("Profile {} maps no {function} button, dropping press", self.profile.id()),
        }
    }
}
