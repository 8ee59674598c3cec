use std::path::PathBuf;

use applicator_capture_model::keyframes::KeyframeLog;
use applicator_capture_model::scene::{Axis, ChannelTarget, TargetNode};
use applicator_capture_model::scene_graph::SceneGraph;
use applicator_common::config::{ApplyConfig, ApplyDefaults};
use applicator_processing_core::pipeline::Applicator;
use applicator_processing_core::walker::WalkMode;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("sample-take")
        .join(name)
}

fn load_scene() -> SceneGraph {
    SceneGraph::load(fixture("scene.json")).expect("fixture scene should load")
}

fn fixture_config() -> ApplyConfig {
    let mut config = ApplyConfig::new(fixture("capture.csv"), &ApplyDefaults::default());
    config.neutral_path = Some(fixture("neutral.csv"));
    config.mapping_path = Some(fixture("mapping.csv"));
    config
}

fn fnv1a_64(input: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in input.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

fn strength() -> ChannelTarget {
    ChannelTarget::Channel("strength".to_string())
}

#[test]
fn item_mode_fixture_signature_is_stable() {
    let scene = load_scene();
    let mut log = KeyframeLog::new();
    let summary = Applicator::new(fixture_config())
        .run(&scene, &mut log)
        .expect("fixture run should succeed");

    assert_eq!(summary.mode, WalkMode::Item);
    assert_eq!(summary.root, "Head");
    assert_eq!(summary.output_frames, 6);
    assert_eq!(summary.bindings_applied, 6);
    assert_eq!(summary.keys_written, 36);
    assert_eq!(summary.dropped_rows, 0);
    assert_eq!(log.len(), 36);

    let signature = log
        .keys()
        .iter()
        .map(|key| {
            format!(
                "{}|{}|{}|{:.4}",
                key.frame, key.node_name, key.target, key.value
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    assert_eq!(fnv1a_64(&signature), 0x3e05cf8793e9e7d8, "{signature}");
}

#[test]
fn item_mode_fixture_values() {
    let scene = load_scene();
    let mut log = KeyframeLog::new();
    Applicator::new(fixture_config())
        .run(&scene, &mut log)
        .expect("fixture run should succeed");

    let jaw = scene.find("JawOpen").unwrap().id();
    let jaw_curve = log.curve(jaw, &strength());
    // (0.2 - 0.1) / (1 - 0.1)
    assert!((jaw_curve[0].value - 0.1111).abs() < 1e-9);
    assert!((jaw_curve[3].value - 0.5).abs() < 1e-9);
    assert!((jaw_curve[5].time - 5.0 / 30.0).abs() < 1e-12);

    // Only the first Smile_L binding applies; it is smoothed and doubled,
    // and the 1.2 spike at capture frame 10 is averaged in before clamping.
    let smile = scene.find("Smile_L").unwrap().id();
    let smile_curve = log.curve(smile, &strength());
    assert_eq!(smile_curve.len(), 6);
    assert!((smile_curve[5].value - 0.8863).abs() < 1e-9);

    let head = scene.find("Head").unwrap().id();
    let yaw = log.curve(head, &ChannelTarget::Rotation(Axis::Y));
    let pitch = log.curve(head, &ChannelTarget::Rotation(Axis::X));
    assert!((yaw[0].value - 9f64.to_radians()).abs() < 1e-12);
    assert!((pitch[0].value - 4.5f64.to_radians()).abs() < 1e-12);
    assert!(log.curve(head, &ChannelTarget::Rotation(Axis::Z)).is_empty());

    let neck = scene.find("Neck").unwrap().id();
    assert!(log.keys().iter().all(|k| k.node != neck));
    assert!(log.keys().iter().all(|k| k.take.is_none()));
}

#[test]
fn actor_fixture_creates_take() {
    let scene = load_scene();
    let mut config = fixture_config();
    config.target_name = Some("hero".to_string());
    config.take_name = Some("Talk".to_string());
    config.start_frame = 24;

    let mut log = KeyframeLog::new();
    let summary = Applicator::new(config)
        .run(&scene, &mut log)
        .expect("actor run should succeed");

    assert_eq!(summary.mode, WalkMode::Actor);
    assert_eq!(summary.root, "Hero");
    assert!(summary.take_created);
    // Head yaw and pitch plus JawOpen; FaceMesh deformers are not members.
    assert_eq!(summary.bindings_applied, 3);
    assert_eq!(log.created_takes().len(), 1);
    assert!(log.keys().iter().all(|k| k.take.as_deref() == Some("Talk")));
    assert_eq!(log.keys().iter().map(|k| k.frame).min(), Some(24));
    assert_eq!(log.keys().iter().map(|k| k.frame).max(), Some(29));
}

#[test]
fn actor_fixture_existing_take_is_rejected() {
    let scene = load_scene();
    let mut config = fixture_config();
    config.target_name = Some("Hero".to_string());
    config.take_name = Some("idle".to_string());

    let mut log = KeyframeLog::new();
    let err = Applicator::new(config)
        .run(&scene, &mut log)
        .expect_err("existing take without append should fail");
    assert!(err.is_validation());
    assert!(log.is_empty());
}

#[test]
fn actor_fixture_appends_to_existing_take() {
    let scene = load_scene();
    let mut config = fixture_config();
    config.target_name = Some("Hero".to_string());
    config.take_name = Some("Idle".to_string());
    config.append_to_existing_take = true;

    let mut log = KeyframeLog::new();
    let summary = Applicator::new(config)
        .run(&scene, &mut log)
        .expect("append run should succeed");

    assert_eq!(summary.take.as_deref(), Some("Idle"));
    assert!(!summary.take_created);
    assert!(log.created_takes().is_empty());
    assert!(log.export().created_takes.is_empty());
    assert!(!log.is_empty());
    assert!(log.keys().iter().all(|k| k.take.as_deref() == Some("Idle")));
}

#[test]
fn dry_plan_matches_committed_keys() {
    let scene = load_scene();
    let applicator = Applicator::new(fixture_config());
    let planned = applicator.plan(&scene).expect("fixture plan should succeed");

    let mut log = KeyframeLog::new();
    applicator
        .run(&scene, &mut log)
        .expect("fixture run should succeed");

    assert_eq!(planned.capture_frames, 12);
    assert_eq!(planned.outcome.plan.writes(), log.keys());
}

#[test]
fn lower_scene_rate_drops_more_frames() {
    let mut scene = load_scene();
    scene.fps = 24.0;

    let mut log = KeyframeLog::new();
    let summary = Applicator::new(fixture_config())
        .run(&scene, &mut log)
        .expect("24 fps run should succeed");

    // YnYnYnnnYnYn over 12 capture frames
    assert_eq!(summary.output_frames, 5);
    assert_eq!(summary.keys_written, 30);
}
