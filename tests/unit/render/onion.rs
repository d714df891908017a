use super::*;
use crate::assets::decode::encode_png;

fn frames(layers: &[OnionLayer]) -> Vec<u64> {
    layers.iter().map(|l| l.frame.0).collect()
}

#[test]
fn layers_alternate_before_and_after() {
    let layers = onion_layers(FrameIndex(10), 2, OnionOpacity::default());
    assert_eq!(frames(&layers), vec![9, 11, 8, 12]);
    assert!((layers[0].opacity - 0.25).abs() < 1e-6);
    assert!((layers[2].opacity - 0.20).abs() < 1e-6);
}

#[test]
fn layers_stop_at_frame_zero() {
    let layers = onion_layers(FrameIndex(1), 3, OnionOpacity::default());
    assert_eq!(frames(&layers), vec![0, 2, 3, 4]);
}

#[test]
fn opacity_falls_monotonically_to_floor() {
    let policy = OnionOpacity::default();
    for depth in 1..=MAX_ONION_DEPTH {
        let layers = onion_layers(FrameIndex(100), depth, policy);
        assert_eq!(layers.len(), 2 * depth as usize);
        for pair in layers.windows(2) {
            assert!(pair[1].opacity <= pair[0].opacity);
        }
        assert!(layers.iter().all(|l| l.opacity >= policy.floor));
    }
}

#[test]
fn depth_is_clamped() {
    assert_eq!(OnionSkinConfig { enabled: true, depth: 0 }.clamped_depth(), 1);
    assert_eq!(OnionSkinConfig { enabled: true, depth: 9 }.clamped_depth(), 5);
    assert_eq!(onion_layers(FrameIndex(50), 9, OnionOpacity::default()).len(), 10);
}

#[test]
fn render_draws_present_ready_neighbors_only() {
    let mut store = AnnotationStore::new();
    let mut px = Surface::new(2, 2);
    px.fill([255, 255, 255, 255]);
    let blob = encode_png(&px).unwrap();
    for f in [7, 8, 9, 11] {
        store.insert(FrameIndex(f), blob.clone());
    }
    let mut cache = ImageCache::default();
    cache.get_or_decode(&blob);
    cache.poll();

    let mut target = Surface::new(2, 2);
    let cfg = OnionSkinConfig {
        enabled: true,
        depth: 2,
    };
    let report = render_onion_skins(
        &mut target,
        &store,
        &mut cache,
        FrameIndex(10),
        cfg,
        OnionOpacity::default(),
    );
    assert_eq!(frames(&report.drawn), vec![9, 11, 8]);
    assert_eq!(report.pending, 0);
    assert!(target.pixel(0, 0).unwrap()[3] > 0);
}

#[test]
fn render_skips_pending_and_disabled() {
    let mut store = AnnotationStore::new();
    let mut px = Surface::new(2, 2);
    px.fill([0, 0, 0, 255]);
    store.insert(FrameIndex(4), encode_png(&px).unwrap());
    let mut cache = ImageCache::default();
    let mut target = Surface::new(2, 2);

    let off = OnionSkinConfig::default();
    let r = render_onion_skins(&mut target, &store, &mut cache, FrameIndex(5), off, OnionOpacity::default());
    assert!(r.drawn.is_empty());
    assert!(cache.is_empty());

    let on = OnionSkinConfig { enabled: true, ..off };
    let r = render_onion_skins(&mut target, &store, &mut cache, FrameIndex(5), on, OnionOpacity::default());
    assert!(r.drawn.is_empty());
    assert_eq!(r.pending, 1);
    assert!(target.is_blank());
}
