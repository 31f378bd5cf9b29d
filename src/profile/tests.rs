use super::{AutopilotVariant, ButtonFunction, Detent, DetentSet, Profile, ProfileLoadError, RewriteTable};
use crate::control::{CommandKind, Outbound, SimCommand, VariableCommand};
use crate::http_handler::http_client::HTTPClient;
use crate::http_handler::http_response::{
    profile::ProfileResponse,
    response_common::{ErrorReturn, ResponseError},
};

fn profile_from_json(id: &str, doc: &str) -> Profile {
    let response: ProfileResponse = serde_json::from_str(doc).unwrap();
    Profile::from_response(id, &response)
}

const A320_DOC: &str = r#"{
    "name": "Fenix A320",
    "ui": {
        "camera_config": [{"id": 1, "name": "Captain"}, {"id": 2, "name": "Overhead"}],
        "flap_detents": [
            {"index": 2, "label": "2", "val": 0.5},
            {"index": 0, "label": "UP", "val": 0.0},
            {"index": 1, "label": "1", "val": 0.25}
        ],
        "throttle_detents": [
            {"label": "CL", "val": 0.7},
            {"label": "FLX", "val": 0.85},
            {"label": "TOGA", "val": 1.0}
        ],
        "control_response": 2.0,
        "control_sensitivity": "loud",
        "reverse_behavior": {"spool_down_ms": 0, "idle_floor": 0.007, "idle_rev": 0.0065,
                             "idle_bump_down": 0.0005, "idle_bump_ms": 150},
        "arm_spoilers_button": true
    },
    "mappings": {"vjoy": {"AUTOPILOT": 12, "PARKING_BRAKE": 7, "WARP_DRIVE": 3, "CAM_UP": -1}}
}"#;

#[test]
fn test_profile_resolves_document() {
    let profile = profile_from_json("fenix_a320", A320_DOC);
    assert_eq!(profile.name(), "Fenix A320");
    assert_eq!(profile.cameras().len(), 2);
    assert_eq!(profile.flap_detents().values(), vec![0.0, 0.25, 0.5]);
    assert_eq!(profile.flap_detents().get(0).map(Detent::label), Some("UP"));
    assert_eq!(profile.throttle_detents().values(), vec![0.7, 0.85, 1.0]);
    assert!((profile.curve().response() - 2.0).abs() < f64::EPSILON);
    // malformed sensitivity falls back to the default
    assert!((profile.curve().sensitivity() - 1.0).abs() < f64::EPSILON);
    assert!((profile.throttle_snap() - 0.05).abs() < f64::EPSILON);
    assert!(profile.arm_spoilers_button());

    let reverse = profile.reverse_behavior().unwrap();
    assert!(reverse.is_instant_spool());
    assert_eq!(reverse.idle_bump_ms, 150);
    assert!((reverse.idle_bump_up - 0.007).abs() < f64::EPSILON);

    assert_eq!(profile.buttons().index(ButtonFunction::Autopilot), Some(12));
    assert_eq!(profile.buttons().index(ButtonFunction::ParkingBrake), Some(7));
    assert_eq!(profile.buttons().index(ButtonFunction::CamUp), Some(5));
    assert_eq!(profile.buttons().index(ButtonFunction::ArmSpoilers), None);
    assert_eq!(profile.autopilot(), AutopilotVariant::VariableSequence);
}

#[test]
fn test_generic_profile_defaults() {
    let profile = Profile::generic("pmdg_777");
    assert_eq!(profile.name(), "pmdg_777");
    assert!(profile.flap_detents().is_empty());
    assert!(profile.throttle_detents().is_empty());
    assert!(profile.reverse_behavior().is_none());
    assert!(!profile.arm_spoilers_button());
    assert_eq!(profile.autopilot(), AutopilotVariant::Button);
    assert!(profile.rewrites().is_empty());
    assert_eq!(profile.buttons().index(ButtonFunction::GearUp), Some(4));
    assert_eq!(profile.buttons().index(ButtonFunction::GearDown), Some(4));
    assert_eq!(profile.buttons().index(ButtonFunction::CamBase), Some(10));
}

#[test]
fn test_malformed_sections_fall_back() {
    let profile = profile_from_json(
        "odd",
        r#"{"ui": {"flap_detents": "none", "throttle_detents": [{"label": "x"}, {"label": "CL", "val": 0.8}],
                   "reverse_behavior": 5}, "mappings": []}"#,
    );
    assert!(profile.flap_detents().is_empty());
    assert_eq!(profile.throttle_detents().values(), vec![0.8]);
    assert!(profile.reverse_behavior().is_none());
    assert_eq!(profile.buttons().index(ButtonFunction::IdleButton), Some(3));
}

#[test]
fn test_detent_set_repairs_input() {
    let set = DetentSet::new([
        Detent::new("b", 0.5),
        Detent::new("a", 0.25),
        Detent::new("dup", 0.5),
        Detent::new("nan", f64::NAN),
        Detent::new("over", 1.4),
    ]);
    assert_eq!(set.values(), vec![0.25, 0.5, 1.0]);
    assert_eq!(set.get(1).map(Detent::label), Some("b"));
}

#[test]
fn test_nearest_prefers_earliest_on_tie() {
    let set = DetentSet::new([Detent::new("lo", 0.2), Detent::new("hi", 0.4)]);
    let (index, detent) = set.nearest(0.3).unwrap();
    assert_eq!(index, 0);
    assert_eq!(detent.label(), "lo");
}

#[test]
fn test_throttle_rewrite_table() {
    let profile = profile_from_json("fenix_a320", A320_DOC);
    let rewrites = profile.rewrites();

    let forward = rewrites.apply(SimCommand::Throttle { value: 0.0, reverse: false }.into());
    assert_eq!(forward, vec![Outbound::Sim(SimCommand::Throttle { value: 0.007, reverse: false })]);

    let high = rewrites.apply(SimCommand::Throttle { value: 0.6, reverse: false }.into());
    assert_eq!(high, vec![Outbound::Sim(SimCommand::Throttle { value: 0.6, reverse: false })]);

    let Outbound::Sim(SimCommand::Throttle { value, reverse }) =
        rewrites.apply(SimCommand::Throttle { value: 0.5, reverse: true }.into())[0].clone()
    else {
        panic!("throttle rewrite changed the command type");
    };
    assert!(reverse);
    assert!((value - 0.0065 * 0.5).abs() < 1e-12);

    let untouched = rewrites.apply(SimCommand::Brakes { value: 0.3 }.into());
    assert_eq!(untouched, vec![Outbound::Sim(SimCommand::Brakes { value: 0.3 })]);
    let variable = VariableCommand::Step { key: "ap_engage", delta: 1.0 };
    assert_eq!(rewrites.apply(variable.clone().into()), vec![Outbound::Variable(variable)]);
}

#[test]
fn test_rewrite_without_reverse_block_uses_fallback() {
    let profile = Profile::generic("fenix_a320");
    let out = profile.rewrites().apply(SimCommand::Throttle { value: 1.0, reverse: true }.into());
    let Outbound::Sim(SimCommand::Throttle { value, .. }) = out[0] else {
        panic!("unexpected rewrite output");
    };
    assert!(value.abs() < 1e-12);
    let out = profile.rewrites().apply(SimCommand::Throttle { value: 0.0, reverse: false }.into());
    assert_eq!(out, vec![Outbound::Sim(SimCommand::Throttle { value: 0.007, reverse: false })]);
}

#[test]
fn test_empty_rewrite_table_passes_through() {
    let table = RewriteTable::default();
    let cmd = SimCommand::Throttle { value: 0.0, reverse: false };
    assert_eq!(table.apply(cmd.clone().into()), vec![Outbound::Sim(cmd)]);
    assert_eq!(SimCommand::IdleCommand.kind(), CommandKind::IdleCommand);
}

#[tokio::test]
async fn test_illegal_profile_ids_are_final() {
    let client = HTTPClient::new("http://127.0.0.1:9");
    for id in ["", "../secrets", "a/b", "fenix.a320", "c:\\x"] {
        let err = Profile::fetch(&client, id).await.unwrap_err();
        assert!(matches!(err, ProfileLoadError::Invalid(_)), "{id} gave {err}");
        assert!(!err.is_retryable());
    }
    let transport = ProfileLoadError::from(ResponseError::InternalServer(ErrorReturn::default()));
    assert!(transport.is_retryable());
    assert!(ProfileLoadError::from(ResponseError::NoConnection).is_retryable());
}
