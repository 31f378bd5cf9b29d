use super::{PendingLocalEdits, Reconciler, RemoteUnits, RemoteValue, ThrottleScale, TrackedKey};
use crate::control::{Axis, ControlState, Toggle};
use crate::http_handler::http_response::lvars::VariableSnapshotResponse;
use crate::profile::{Detent, DetentSet};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

const WINDOW: Duration = Duration::from_millis(1500);

fn snapshot(entries: &[(&str, serde_json::Value)]) -> VariableSnapshotResponse {
    let values: HashMap<String, serde_json::Value> =
        entries.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect();
    VariableSnapshotResponse::from_values(values)
}

fn flap_detents() -> DetentSet {
    DetentSet::new([
        Detent::new("UP", 0.0),
        Detent::new("1", 0.25),
        Detent::new("2", 0.5),
        Detent::new("3", 0.75),
        Detent::new("FULL", 1.0),
    ])
}

fn reconciler() -> Reconciler {
    Reconciler::new(ControlState::default(), WINDOW, RemoteUnits::default())
}

#[test]
fn test_pending_edit_window_bounds() {
    let t = Instant::now();
    let mut pending = PendingLocalEdits::new(WINDOW);
    pending.stamp(TrackedKey::Gear, t);
    assert!(pending.is_suppressed(TrackedKey::Gear, t));
    assert!(pending.is_suppressed(TrackedKey::Gear, t + Duration::from_millis(1499)));
    assert!(!pending.is_suppressed(TrackedKey::Gear, t + WINDOW));
    assert!(!pending.is_suppressed(TrackedKey::ParkingBrake, t));

    // a second write renews the window of its own key only
    pending.stamp(TrackedKey::ParkingBrake, t);
    pending.stamp(TrackedKey::Gear, t + Duration::from_millis(1000));
    assert!(pending.is_suppressed(TrackedKey::Gear, t + Duration::from_millis(2000)));
    assert!(!pending.is_suppressed(TrackedKey::ParkingBrake, t + Duration::from_millis(2000)));

    pending.prune(t + Duration::from_millis(2000));
    assert_eq!(pending.len(), 1);
    pending.prune(t + Duration::from_millis(2500));
    assert!(pending.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_local_write_suppresses_poll() {
    let rec = reconciler();
    rec.set_toggle(Toggle::GearDown, false).await;
    let remote = snapshot(&[("gear_handle", serde_json::json!(1.0)), ("parking_brake", serde_json::json!(0))]);

    tokio::time::advance(Duration::from_millis(1000)).await;
    let outcome = rec.apply_poll(&remote).await;
    assert_eq!(outcome.suppressed, vec![TrackedKey::Gear]);
    assert_eq!(outcome.applied, vec![TrackedKey::ParkingBrake]);
    assert!(!rec.current().toggle(Toggle::GearDown));
    assert!(!rec.current().toggle(Toggle::ParkingBrake));

    tokio::time::advance(Duration::from_millis(500)).await;
    let outcome = rec.apply_poll(&remote).await;
    assert!(outcome.suppressed.is_empty());
    assert!(rec.current().toggle(Toggle::GearDown));
}

#[tokio::test(start_paused = true)]
async fn test_repeated_writes_extend_window() {
    let rec = reconciler();
    rec.set_axis(Axis::Flaps, 0.25).await;
    tokio::time::advance(Duration::from_millis(1200)).await;
    rec.set_axis(Axis::Flaps, 0.5).await;
    tokio::time::advance(Duration::from_millis(1200)).await;

    let remote = snapshot(&[("flaps_handle", serde_json::json!(0))]);
    rec.apply_poll(&remote).await;
    assert!((rec.current().axis(Axis::Flaps) - 0.5).abs() < f64::EPSILON);

    tokio::time::advance(Duration::from_millis(300)).await;
    rec.apply_poll(&remote).await;
    assert!(rec.current().axis(Axis::Flaps).abs() < f64::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn test_untracked_axis_does_not_stamp() {
    let rec = reconciler();
    rec.set_axis(Axis::Brakes, 0.8).await;
    let remote = snapshot(&[("throttle_left", serde_json::json!(3.0))]);
    let outcome = rec.apply_poll(&remote).await;
    assert_eq!(outcome.applied, vec![TrackedKey::Throttle]);
    assert!((rec.current().axis(Axis::Throttle) - 0.7).abs() < 1e-9);
    assert!((rec.current().axis(Axis::Brakes) - 0.8).abs() < f64::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_applied_polls() {
    let rec = reconciler();
    let mut view = rec.subscribe();
    let remote = snapshot(&[("autopilot_state", serde_json::json!("1")), ("unrelated", serde_json::json!(5))]);
    rec.apply_poll(&remote).await;
    assert!(view.has_changed().unwrap());
    assert!(view.borrow_and_update().toggle(Toggle::Autopilot));

    // an identical poll leaves the subscription quiet
    rec.apply_poll(&remote).await;
    assert!(!view.has_changed().unwrap());
}

#[test]
fn test_throttle_scale_segments() {
    let scale = ThrottleScale::default();
    let check = |raw: f64, reverse: bool, value: f64| {
        let (r, v) = scale.to_ui(raw).unwrap();
        assert_eq!(r, reverse, "raw {raw}");
        assert!((v - value).abs() < 1e-9, "raw {raw}: {v} != {value}");
    };
    check(0.0, true, 1.0);
    check(0.75, true, 0.25);
    check(1.0, true, 0.0);
    check(2.0, false, 0.0);
    check(2.5, false, 0.35);
    check(3.0, false, 0.7);
    check(3.5, false, 0.775);
    check(4.0, false, 0.85);
    check(5.0, false, 1.0);
    check(7.0, false, 1.0);
    assert!(scale.to_ui(1.5).is_none());
}

#[test]
fn test_throttle_scale_follows_profile_detents() {
    let detents = DetentSet::new([Detent::new("CL", 0.6), Detent::new("TOGA", 1.0)]);
    let scale = ThrottleScale::from_detents(&detents);
    let (_, v) = scale.to_ui(3.5).unwrap();
    assert!((v - 0.8).abs() < 1e-9);
}

#[test]
fn test_remote_unit_conversions() {
    let units = RemoteUnits::new(flap_detents(), &DetentSet::default());
    assert_eq!(units.convert(TrackedKey::Gear, 0.49), Some(RemoteValue::Gear { down: false }));
    assert_eq!(units.convert(TrackedKey::Gear, 0.5), Some(RemoteValue::Gear { down: true }));
    assert_eq!(units.convert(TrackedKey::ParkingBrake, 1.0), Some(RemoteValue::ParkingBrake { set: true }));
    assert_eq!(
        units.convert(TrackedKey::SpoilersHandle, 0.0),
        Some(RemoteValue::Spoilers { armed: true, value: 0.0 })
    );
    assert_eq!(
        units.convert(TrackedKey::SpoilersHandle, 2.0),
        Some(RemoteValue::Spoilers { armed: false, value: 0.5 })
    );
    assert_eq!(units.convert(TrackedKey::FlapsHandle, 2.2), Some(RemoteValue::Flaps { value: 0.5 }));
    assert_eq!(units.convert(TrackedKey::Throttle, 1.5), None);
    assert_eq!(units.convert(TrackedKey::AutopilotState, 0.0), Some(RemoteValue::Autopilot { engaged: false }));
}

#[test]
fn test_flap_conversion_without_detents() {
    let units = RemoteUnits::default();
    assert_eq!(units.convert(TrackedKey::FlapsHandle, 3.0), Some(RemoteValue::Flaps { value: 0.75 }));
    assert_eq!(units.convert(TrackedKey::FlapsHandle, 9.0), Some(RemoteValue::Flaps { value: 1.0 }));
    assert_eq!(units.convert(TrackedKey::FlapsHandle, -1.0), Some(RemoteValue::Flaps { value: 0.0 }));
}

#[test]
fn test_snapshot_number_parsing() {
    let snap = snapshot(&[
        ("a", serde_json::json!(1.5)),
        ("b", serde_json::json!(" 2 ")),
        ("c", serde_json::json!(true)),
        ("d", serde_json::Value::Null),
        ("e", serde_json::json!("abc")),
    ]);
    assert_eq!(snap.number("a"), Some(1.5));
    assert_eq!(snap.number("b"), Some(2.0));
    assert_eq!(snap.number("c"), Some(1.0));
    assert_eq!(snap.number("d"), None);
    assert_eq!(snap.number("e"), None);
    assert_eq!(snap.number("missing"), None);
}
