use super::{
    Axis, Cockpit, CommandDispatcher, CommandSink, CommandTransport, ControlState, GearPosition, Outbound,
    ResponseCurve, SimCommand, Toggle, VariableCommand, ease_out_cubic, snap_throttle, snap_to_detent,
};
use crate::config::SequenceTimings;
use crate::http_handler::http_request::update_sim_post::UpdateSimRequest;
use crate::http_handler::http_response::{
    profile::ProfileResponse,
    response_common::{ErrorReturn, ResponseError},
};
use crate::profile::{Detent, DetentSet, Profile, RewriteTable};
use crate::reconcile::{Reconciler, RemoteUnits};
use crate::sequencing::Sequencer;
use async_trait::async_trait;
use rand::{Rng, rng};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;

fn detents(values: &[f64]) -> DetentSet {
    DetentSet::new(values.iter().enumerate().map(|(i, v)| Detent::new(format!("D{i}"), *v)))
}

#[test]
fn test_unit_curve_is_identity() {
    let curve = ResponseCurve::default();
    for _ in 0..10_000 {
        let v: f64 = rng().random_range(0.0..=1.0);
        assert_eq!(curve.apply(v).to_bits(), v.to_bits());
    }
    assert_eq!(curve.apply(0.0).to_bits(), 0.0f64.to_bits());
    assert_eq!(curve.apply(1.0).to_bits(), 1.0f64.to_bits());
}

#[test]
fn test_curve_shape() {
    let squared = ResponseCurve::new(Some(2.0), None);
    assert!((squared.apply(0.75) - 0.625).abs() < 1e-12);
    assert!((squared.apply(0.25) - 0.375).abs() < 1e-12);
    assert!((squared.apply(0.5) - 0.5).abs() < 1e-12);
    assert!((squared.apply(1.0) - 1.0).abs() < 1e-12);

    let gained = ResponseCurve::new(None, Some(2.0));
    assert!((gained.apply(0.6) - 0.7).abs() < 1e-12);
    assert!((gained.apply(0.9) - 1.0).abs() < 1e-12);
    assert!(gained.apply(0.1).abs() < 1e-12);

    // both scalars compose, response first
    let both = ResponseCurve::new(Some(2.0), Some(0.5));
    assert!((both.apply(1.0) - 0.75).abs() < 1e-12);

    let broken = ResponseCurve::new(Some(-3.0), Some(f64::NAN));
    assert_eq!(broken, ResponseCurve::default());
}

#[test]
fn test_snap_picks_nearest_detent() {
    let mut r = rng();
    for _ in 0..2_000 {
        let count = r.random_range(1..8);
        let values: Vec<f64> = (0..count).map(|_| r.random_range(0.0..=1.0)).collect();
        let set = detents(&values);
        let v: f64 = r.random_range(-0.2..=1.2);
        let snapped = snap_to_detent(v, &set);
        let clamped = v.clamp(0.0, 1.0);
        assert!(set.iter().any(|d| d.value().to_bits() == snapped.to_bits()));
        assert!(set.iter().all(|d| (snapped - clamped).abs() <= (d.value() - clamped).abs()));
    }
}

#[test]
fn test_snap_tie_prefers_earliest() {
    let set = detents(&[0.25, 0.75]);
    assert!((snap_to_detent(0.5, &set) - 0.25).abs() < f64::EPSILON);
}

#[test]
fn test_flap_snap_scenario() {
    let set = detents(&[0.0, 0.25, 0.5, 0.75, 1.0]);
    assert!((snap_to_detent(0.6, &set) - 0.5).abs() < f64::EPSILON);
    assert!((snap_to_detent(0.2, &DetentSet::default()) - 0.2).abs() < f64::EPSILON);
}

#[test]
fn test_throttle_snap_rules() {
    let set = detents(&[0.70, 0.85, 1.0]);
    assert!((snap_throttle(0.72, &set, 0.05, false) - 0.70).abs() < f64::EPSILON);
    assert!((snap_throttle(0.72, &set, 0.05, true) - 0.72).abs() < f64::EPSILON);
    assert!((snap_throttle(0.68, &set, 0.05, false) - 0.68).abs() < f64::EPSILON);
    assert!((snap_throttle(0.78, &set, 0.05, false) - 0.78).abs() < f64::EPSILON);
    assert!((snap_throttle(0.83, &set, 0.05, false) - 0.85).abs() < f64::EPSILON);
    assert!((snap_throttle(0.3, &DetentSet::default(), 0.05, false) - 0.3).abs() < f64::EPSILON);
}

#[test]
fn test_throttle_snap_property() {
    let set = detents(&[0.6, 0.75, 0.9]);
    let threshold = 0.04;
    let mut r = rng();
    for _ in 0..5_000 {
        let v: f64 = r.random_range(0.0..=1.0);
        let reverse = r.random_bool(0.3);
        let out = snap_throttle(v, &set, threshold, reverse);
        if out.to_bits() != v.to_bits() {
            assert!(!reverse && v >= 0.6);
            assert!((out - v).abs() <= threshold);
        }
    }
}

#[test]
fn test_ease_out_cubic_endpoints() {
    assert!(ease_out_cubic(0.0).abs() < f64::EPSILON);
    assert!((ease_out_cubic(1.0) - 1.0).abs() < f64::EPSILON);
    assert!((ease_out_cubic(0.5) - 0.875).abs() < f64::EPSILON);
    assert!(ease_out_cubic(0.3) > 0.3);
}

#[test]
fn test_control_state_clamps() {
    let mut state = ControlState::default();
    assert!((state.axis(Axis::Rudder) - 0.5).abs() < f64::EPSILON);
    assert!(state.toggle(Toggle::GearDown));
    state.set_axis(Axis::Throttle, 1.7);
    state.set_axis(Axis::Brakes, -0.2);
    state.set_axis(Axis::Flaps, f64::NAN);
    assert!((state.axis(Axis::Throttle) - 1.0).abs() < f64::EPSILON);
    assert!(state.axis(Axis::Brakes).abs() < f64::EPSILON);
    assert!(state.axis(Axis::Flaps).abs() < f64::EPSILON);
}

#[test]
fn test_update_sim_body() {
    let request = UpdateSimRequest::new(&SimCommand::Throttle { value: 0.5, reverse: true }, Some("pmdg_777")).unwrap();
    assert_eq!(
        request.body_ref(),
        &serde_json::json!({"type": "throttle", "value": 0.5, "reverse": true, "profile": "pmdg_777"})
    );
    let gear = UpdateSimRequest::new(&SimCommand::GearCommand { state: GearPosition::Up }, None).unwrap();
    assert_eq!(gear.body_ref(), &serde_json::json!({"type": "gear_command", "state": "UP"}));
    let idle = UpdateSimRequest::new(&SimCommand::IdleCommand, None).unwrap();
    assert_eq!(idle.body_ref(), &serde_json::json!({"type": "idle_command"}));
    let joy = UpdateSimRequest::new(&SimCommand::FlightControls { val_x: 0.5, val_y: 0.25 }, None).unwrap();
    assert_eq!(joy.body_ref(), &serde_json::json!({"type": "flight_controls", "val_x": 0.5, "val_y": 0.25}));
}

#[derive(Default)]
struct RecordingTransport {
    delivered: Mutex<Vec<Outbound>>,
    fail_first: bool,
}

#[async_trait]
impl CommandTransport for RecordingTransport {
    async fn deliver(&self, message: &Outbound) -> Result<(), ResponseError> {
        let mut delivered = self.delivered.lock().unwrap();
        delivered.push(message.clone());
        if self.fail_first && delivered.len() == 1 {
            return Err(ResponseError::InternalServer(ErrorReturn::default()));
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_dispatcher_preserves_order_and_drops_failures() {
    let (sink, rx) = CommandSink::channel();
    let transport = Arc::new(RecordingTransport { fail_first: true, ..Default::default() });
    let dispatcher = CommandDispatcher::new(rx, RewriteTable::default(), transport.clone());
    for i in 0..5u32 {
        sink.send(SimCommand::VjoyButton { button: i });
    }
    drop(sink);
    dispatcher.run(CancellationToken::new()).await;

    let delivered = transport.delivered.lock().unwrap().clone();
    let expected: Vec<Outbound> = (0..5u32).map(|i| SimCommand::VjoyButton { button: i }.into()).collect();
    assert_eq!(delivered, expected);
}

#[tokio::test]
async fn test_dispatcher_applies_rewrites_and_flushes_on_teardown() {
    let (sink, rx) = CommandSink::channel();
    let transport = Arc::new(RecordingTransport::default());
    let rewrites = Profile::generic("fenix_a320").rewrites().clone();
    let dispatcher = CommandDispatcher::new(rx, rewrites, transport.clone());
    sink.send(SimCommand::Throttle { value: 0.0, reverse: false });
    sink.send(VariableCommand::Step { key: "ap_engage", delta: 1.0 });

    let c_tok = CancellationToken::new();
    c_tok.cancel();
    dispatcher.run(c_tok).await;
    let delivered = transport.delivered.lock().unwrap().clone();
    assert_eq!(
        delivered,
        vec![
            SimCommand::Throttle { value: 0.007, reverse: false }.into(),
            VariableCommand::Step { key: "ap_engage", delta: 1.0 }.into(),
        ]
    );
}

struct CockpitFixture {
    cockpit: Cockpit,
    rx: UnboundedReceiver<Outbound>,
}

impl CockpitFixture {
    fn new(id: &str, doc: &str) -> Self {
        let response: ProfileResponse = serde_json::from_str(doc).unwrap();
        let profile = Arc::new(Profile::from_response(id, &response));
        let (sink, rx) = CommandSink::channel();
        let units = RemoteUnits::new(profile.flap_detents().clone(), profile.throttle_detents());
        let reconciler = Arc::new(Reconciler::new(ControlState::default(), Duration::from_millis(1500), units));
        let timings = SequenceTimings::default();
        let sequencer = Sequencer::new(sink.clone(), Arc::clone(&reconciler), timings.frame, CancellationToken::new());
        Self { cockpit: Cockpit::new(profile, reconciler, sequencer, sink, timings), rx }
    }

    fn generic() -> Self { Self::new("pmdg_777", "{}") }

    fn state(&self) -> ControlState { *self.cockpit.state().borrow() }

    async fn next(&mut self) -> Outbound { self.rx.recv().await.unwrap() }

    fn try_next(&mut self) -> Option<Outbound> { self.rx.try_recv().ok() }
}

const SNAPPY_DOC: &str = r#"{"ui": {
    "flap_detents": [{"index": 0, "label": "UP", "val": 0}, {"index": 1, "label": "1", "val": 0.25},
                     {"index": 2, "label": "2", "val": 0.5}, {"index": 3, "label": "3", "val": 0.75},
                     {"index": 4, "label": "FULL", "val": 1}],
    "throttle_detents": [{"label": "CL", "val": 0.7}, {"label": "FLX", "val": 0.85}, {"label": "TOGA", "val": 1}],
    "camera_config": [{"id": 3, "name": "Cabin"}]
}}"#;

#[tokio::test(start_paused = true)]
async fn test_cockpit_axes() {
    let mut fx = CockpitFixture::new("pmdg_777", SNAPPY_DOC);
    fx.cockpit.on_axis_sample(Axis::Throttle, 0.72, false).await;
    assert_eq!(fx.next().await, SimCommand::Throttle { value: 0.7, reverse: false }.into());
    assert!((fx.state().axis(Axis::Throttle) - 0.7).abs() < f64::EPSILON);

    fx.cockpit.on_axis_sample(Axis::Flaps, 0.6, false).await;
    assert!(fx.try_next().is_none());
    fx.cockpit.on_axis_sample(Axis::Flaps, 0.6, true).await;
    assert_eq!(fx.next().await, SimCommand::FlapsAxis { value: 0.5 }.into());

    fx.cockpit.on_axis_sample(Axis::Brakes, 1.4, false).await;
    assert_eq!(fx.next().await, SimCommand::Brakes { value: 1.0 }.into());

    fx.cockpit.on_axis_sample(Axis::JoystickX, 0.9, false).await;
    assert_eq!(fx.next().await, SimCommand::FlightControls { val_x: 0.9, val_y: 0.5 }.into());
    fx.cockpit.on_joystick(0.1, 0.2, true).await;
    assert_eq!(fx.next().await, SimCommand::FlightControls { val_x: 0.5, val_y: 0.5 }.into());
}

#[tokio::test(start_paused = true)]
async fn test_rudder_release_springs_back() {
    let mut fx = CockpitFixture::generic();
    fx.cockpit.on_rudder(0.8, true).await;
    assert_eq!(fx.next().await, SimCommand::Rudder { value: 0.8 }.into());
    let mut last = None;
    while let Ok(Some(message)) = tokio::time::timeout(Duration::from_secs(1), fx.rx.recv()).await {
        last = Some(message);
    }
    assert_eq!(last, Some(SimCommand::Rudder { value: 0.5 }.into()));
    assert!((fx.state().axis(Axis::Rudder) - 0.5).abs() < f64::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn test_toggles_send_commands() {
    let mut fx = CockpitFixture::new("pmdg_777", SNAPPY_DOC);
    fx.cockpit.toggle_gear().await;
    assert_eq!(fx.next().await, SimCommand::GearCommand { state: GearPosition::Up }.into());
    assert!(!fx.state().toggle(Toggle::GearDown));

    fx.cockpit.toggle_parking_brake().await;
    assert_eq!(fx.next().await, SimCommand::VjoyButton { button: 1 }.into());
    assert!(!fx.state().toggle(Toggle::ParkingBrake));

    fx.cockpit.camera_step(true);
    assert_eq!(fx.next().await, SimCommand::VjoyButton { button: 5 }.into());
    fx.cockpit.select_camera(3);
    assert_eq!(fx.next().await, SimCommand::Camera { cam_id: 3 }.into());
    fx.cockpit.select_camera(4);
    assert!(fx.try_next().is_none());

    // no AUTOPILOT button mapped on the generic variant
    fx.cockpit.toggle_autopilot().await;
    assert!(fx.state().toggle(Toggle::Autopilot));
    assert!(fx.try_next().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_variable_autopilot() {
    let mut fx = CockpitFixture::new("fenix_a320", "{}");
    fx.cockpit.toggle_autopilot().await;
    assert_eq!(fx.next().await, VariableCommand::Step { key: "ap_engage", delta: 1.0 }.into());
    fx.cockpit.toggle_autopilot().await;
    assert_eq!(fx.next().await, VariableCommand::Set { key: "ap_disconnect", value: 1.0 }.into());
    assert_eq!(fx.next().await, VariableCommand::Set { key: "ap_disconnect", value: 0.0 }.into());
    assert_eq!(fx.next().await, VariableCommand::Set { key: "ap_state_off", value: 0.0 }.into());
}

#[tokio::test(start_paused = true)]
async fn test_spool_down_lockout() {
    let mut fx = CockpitFixture::generic();
    fx.cockpit.on_throttle(0.4).await;
    fx.next().await;

    fx.cockpit.toggle_reverse().await;
    assert_eq!(fx.next().await, SimCommand::Throttle { value: 0.0, reverse: true }.into());
    fx.cockpit.toggle_reverse().await;
    assert_eq!(fx.next().await, SimCommand::Throttle { value: 0.0, reverse: false }.into());

    fx.cockpit.on_throttle(0.5).await;
    assert!(fx.try_next().is_none());
    assert!(fx.state().axis(Axis::Throttle).abs() < f64::EPSILON);

    tokio::time::sleep(Duration::from_millis(2000)).await;
    fx.cockpit.on_throttle(0.5).await;
    assert_eq!(fx.next().await, SimCommand::Throttle { value: 0.5, reverse: false }.into());
}

#[tokio::test(start_paused = true)]
async fn test_throttle_gesture_supersedes_reverse_sequence() {
    let doc = r#"{"ui": {"reverse_behavior": {"spool_down_ms": 0, "idle_floor": 0.007, "idle_rev": 0.0065,
                                              "idle_bump_down": 0.0005, "idle_bump_ms": 150}}}"#;
    let mut fx = CockpitFixture::new("pmdg_777", doc);
    fx.cockpit.toggle_reverse().await;
    assert_eq!(fx.next().await, SimCommand::Throttle { value: 0.0005, reverse: true }.into());
    fx.cockpit.on_throttle(0.3).await;
    assert_eq!(fx.next().await, SimCommand::Throttle { value: 0.3, reverse: true }.into());
    let rest = tokio::time::timeout(Duration::from_secs(1), fx.rx.recv()).await;
    assert!(rest.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_idle_press() {
    let mut fx = CockpitFixture::generic();
    let lamp = fx.cockpit.indicator();
    fx.cockpit.press_idle().await;
    assert!(fx.try_next().is_none());

    fx.cockpit.on_throttle(0.5).await;
    fx.next().await;
    fx.cockpit.press_idle().await;
    assert_eq!(fx.next().await, SimCommand::IdleCommand.into());
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(*lamp.borrow());
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(fx.state().axis(Axis::Throttle).abs() < f64::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn test_spoiler_handling_without_arm_button() {
    let mut fx = CockpitFixture::generic();
    fx.cockpit.toggle_spoiler_arm().await;
    assert_eq!(fx.next().await, SimCommand::ArmSpoilers { value: 0.0 }.into());
    assert!(fx.state().toggle(Toggle::SpoilersArmed));

    fx.cockpit.on_spoilers(0.03).await;
    assert_eq!(fx.next().await, SimCommand::Spoilers { value: 0.03 }.into());
    assert!(fx.state().toggle(Toggle::SpoilersArmed));
    fx.cockpit.on_spoilers(0.2).await;
    assert_eq!(fx.next().await, SimCommand::Spoilers { value: 0.2 }.into());
    assert!(!fx.state().toggle(Toggle::SpoilersArmed));

    fx.cockpit.toggle_spoiler_arm().await;
    fx.next().await;
    fx.cockpit.toggle_spoiler_arm().await;
    assert_eq!(fx.next().await, SimCommand::Spoilers { value: 0.0 }.into());
}

#[tokio::test(start_paused = true)]
async fn test_spoiler_arm_button_must_be_mapped() {
    let mut unmapped = CockpitFixture::new("pmdg_777", r#"{"ui": {"arm_spoilers_button": true}}"#);
    unmapped.cockpit.toggle_spoiler_arm().await;
    assert!(!unmapped.state().toggle(Toggle::SpoilersArmed));
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(unmapped.try_next().is_none());

    let mut mapped = CockpitFixture::new(
        "pmdg_777",
        r#"{"ui": {"arm_spoilers_button": true}, "mappings": {"vjoy": {"ARM_SPOILERS": 12}}}"#,
    );
    mapped.cockpit.on_spoilers(0.4).await;
    assert_eq!(mapped.next().await, SimCommand::Spoilers { value: 0.4 }.into());
    mapped.cockpit.toggle_spoiler_arm().await;
    assert!(mapped.state().toggle(Toggle::SpoilersArmed));
    assert_eq!(mapped.next().await, SimCommand::Spoilers { value: 0.0 }.into());
    assert_eq!(mapped.next().await, SimCommand::VjoyButton { button: 12 }.into());
    mapped.cockpit.toggle_spoiler_arm().await;
    assert!(!mapped.state().toggle(Toggle::SpoilersArmed));
    assert_eq!(mapped.next().await, SimCommand::VjoyButton { button: 12 }.into());
}
