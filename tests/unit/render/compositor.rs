use super::*;
use crate::assets::decode::encode_png;

fn scene(store: &AnnotationStore) -> SceneState<'_> {
    SceneState {
        store,
        frame: FrameIndex(1),
        onion: OnionSkinConfig {
            enabled: true,
            depth: 1,
        },
        onion_opacity: OnionOpacity::default(),
        suppress_onion: false,
        visible: true,
    }
}

fn solid_blob(color: [u8; 4]) -> crate::assets::blob::Blob {
    let mut s = Surface::new(4, 4);
    s.fill(color);
    encode_png(&s).unwrap()
}

#[test]
fn settled_draws_onion_under_backing() {
    let mut store = AnnotationStore::new();
    let neighbor = solid_blob([0, 0, 255, 255]);
    store.insert(FrameIndex(0), neighbor.clone());

    let mut cache = ImageCache::default();
    cache.get_or_decode(&neighbor);
    cache.poll();

    let mut backing = BackingBuffer::new(MediaGeometry::new(4, 4));
    backing.surface_mut().data_mut()[..4].copy_from_slice(&[255, 0, 0, 255]);

    let mut comp = Compositor::new(MediaGeometry::new(4, 4));
    let report = comp.render_settled(&scene(&store), &mut cache, &backing).unwrap();
    assert_eq!(report.drawn.len(), 1);

    assert_eq!(comp.display().pixel(0, 0).unwrap(), [255, 0, 0, 255]);
    let onion_only = comp.display().pixel(3, 3).unwrap();
    assert_eq!(onion_only, crate::raster::composite::over([0; 4], [0, 0, 255, 255], 0.25));
    assert_eq!(comp.stats().settled, 1);
}

#[test]
fn playback_suppresses_onion_and_hidden_clears_all() {
    let mut store = AnnotationStore::new();
    let neighbor = solid_blob([0, 0, 255, 255]);
    store.insert(FrameIndex(2), neighbor.clone());
    let mut cache = ImageCache::default();
    cache.get_or_decode(&neighbor);
    cache.poll();

    let mut backing = BackingBuffer::new(MediaGeometry::new(4, 4));
    backing.surface_mut().fill([0, 255, 0, 255]);
    let mut comp = Compositor::new(MediaGeometry::new(4, 4));

    let playing = SceneState {
        suppress_onion: true,
        ..scene(&store)
    };
    let report = comp.render_settled(&playing, &mut cache, &backing).unwrap();
    assert!(report.drawn.is_empty());
    assert_eq!(comp.display().pixel(1, 1).unwrap(), [0, 255, 0, 255]);

    let hidden = SceneState {
        visible: false,
        ..scene(&store)
    };
    comp.render_settled(&hidden, &mut cache, &backing);
    assert!(comp.display().is_blank());
}

#[test]
fn live_stroke_is_drawn_on_top_at_opacity() {
    let store = AnnotationStore::new();
    let mut cache = ImageCache::default();
    let backing = BackingBuffer::new(MediaGeometry::new(2, 2));
    let mut stroke = Surface::new(2, 2);
    stroke.fill([255, 0, 0, 255]);

    let mut comp = Compositor::new(MediaGeometry::new(2, 2));
    comp.render_with_live_stroke(&scene(&store), &mut cache, &backing, &stroke, 0.5);
    assert_eq!(comp.display().pixel(0, 0).unwrap(), [128, 0, 0, 128]);
    assert_eq!(comp.stats().live, 1);

    comp.render_settled(&scene(&store), &mut cache, &backing);
    assert!(comp.display().is_blank());
}

#[test]
fn zero_sized_display_is_a_noop() {
    let store = AnnotationStore::new();
    let mut cache = ImageCache::default();
    let backing = BackingBuffer::new(MediaGeometry::new(0, 0));
    let mut comp = Compositor::new(MediaGeometry::new(0, 0));
    assert!(comp.render_settled(&scene(&store), &mut cache, &backing).is_none());
    assert_eq!(comp.stats().skipped, 1);
    assert_eq!(comp.stats().settled, 0);
}
