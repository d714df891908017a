use super::*;
use crate::Raster;

fn small_config() -> EngineConfig {
    EngineConfig {
        grunge_texture_size: 32,
        grunge_scratch_count: 10,
        ..EngineConfig::default()
    }
}

#[test]
fn parses_tagged_steps() {
    let script = ReplayScript::from_json_str(
        r##"{
            "width": 64, "height": 48,
            "steps": [
                { "op": "frame", "frame": 2 },
                { "op": "tools", "tools": { "active": "grunge", "color": "#112233" } },
                { "op": "onion", "config": { "enabled": true, "depth": 3 } },
                { "op": "stroke", "points": [[1, 2], [3, 4]] },
                { "op": "clear_frame", "frame": 2 }
            ]
        }"##,
    )
    .unwrap();
    assert_eq!(script.media, MediaKind::Video);
    assert_eq!(script.steps.len(), 5);
    assert_eq!(script.steps[0], ReplayStep::Frame { frame: 2 });
}

#[test]
fn rejects_empty_media_and_empty_strokes() {
    assert!(ReplayScript::from_json_str(r#"{ "width": 0, "height": 5 }"#).is_err());
    assert!(
        ReplayScript::from_json_str(
            r#"{ "width": 5, "height": 5, "steps": [{ "op": "stroke", "points": [] }] }"#
        )
        .is_err()
    );
}

#[test]
fn replay_commits_each_stroke_to_its_frame() {
    let script = ReplayScript::from_json_str(
        r#"{
            "width": 40, "height": 40,
            "steps": [
                { "op": "tools", "tools": { "brush": { "size": 216, "opacity": 1.0 } } },
                { "op": "frame", "frame": 1 },
                { "op": "stroke", "points": [[10, 10], [30, 10]] },
                { "op": "frame", "frame": 2 },
                { "op": "stroke", "points": [[20, 30]] }
            ]
        }"#,
    )
    .unwrap();
    let out = replay(&script, small_config()).unwrap();
    assert_eq!(out.strokes_committed, 2);
    assert!(out.store.contains(FrameIndex(1)));
    assert!(out.store.contains(FrameIndex(2)));
    assert_eq!(out.display.width(), 40);
    assert_eq!(out.display.pixel(20, 30).unwrap(), [255, 0, 0, 255]);
    assert_eq!(out.display.pixel(20, 10).unwrap()[3], 0);
}

#[test]
fn clear_frame_removes_annotation() {
    let script = ReplayScript::from_json_str(
        r#"{
            "width": 16, "height": 16,
            "steps": [
                { "op": "stroke", "points": [[8, 8]] },
                { "op": "clear_frame", "frame": 0 }
            ]
        }"#,
    )
    .unwrap();
    let out = replay(&script, small_config()).unwrap();
    assert!(out.store.is_empty());
    assert!(out.display.is_blank());
}
