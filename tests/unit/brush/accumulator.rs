use super::*;
use crate::assets::decode::decode_image;
use crate::brush::texture::TextureParams;
use crate::foundation::core::StrokeColor;

fn accumulator(w: u32, h: u32) -> (StrokeAccumulator, Surface) {
    let tex = GrungeTexture::generate(TextureParams {
        size: 32,
        scratch_count: 10,
        seed: 1,
    });
    let mut acc = StrokeAccumulator::new(BrushMetrics::default(), Arc::new(tex));
    acc.resize(MediaGeometry::new(w, h));
    (acc, Surface::new(w, h))
}

fn tools(active: ToolKind, size: f64, opacity: f32) -> ToolState {
    let mut t = ToolState::default().with_active(active);
    let s = ToolSettings::new(size, opacity);
    match active {
        ToolKind::Brush => t.brush = s,
        ToolKind::Grunge => t.grunge = s,
        ToolKind::Eraser => t.eraser = s,
        ToolKind::None => {}
    }
    t
}

#[test]
fn brush_tap_leaves_a_dot() {
    let (mut acc, mut backing) = accumulator(108, 108);
    let t = tools(ToolKind::Brush, 100.0, 1.0);
    acc.begin(&t, FrameIndex(3), Point::new(50.0, 50.0), &mut backing).unwrap();
    let done = acc.commit(&mut backing).unwrap();

    assert_eq!(done.frame, FrameIndex(3));
    assert_eq!(done.tool, ToolKind::Brush);
    assert_eq!(backing.pixel(50, 50).unwrap(), [255, 0, 0, 255]);
    assert_eq!(backing.pixel(0, 0).unwrap(), [0, 0, 0, 0]);
    assert!(acc.scratch().is_blank());
    assert!(!acc.is_active());
}

#[test]
fn brush_self_intersection_composites_once() {
    let (mut acc, mut backing) = accumulator(200, 200);
    let t = tools(ToolKind::Brush, 10.0 * 1080.0 / 200.0, 0.5);

    acc.begin(&t, FrameIndex(0), Point::new(20.0, 100.0), &mut backing).unwrap();
    for p in [
        Point::new(180.0, 100.0),
        Point::new(100.0, 20.0),
        Point::new(100.0, 180.0),
    ] {
        acc.extend(p, &mut backing);
    }
    acc.commit(&mut backing).unwrap();

    let single = crate::raster::composite::over([0, 0, 0, 0], [255, 0, 0, 255], 0.5);
    // Horizontal and vertical passes cross at (100, 100); joints at the turn points.
    assert_eq!(backing.pixel(100, 100).unwrap(), single);
    assert_eq!(backing.pixel(180, 100).unwrap(), single);
    assert_eq!(backing.pixel(60, 100).unwrap(), single);
}

#[test]
fn brush_commit_blends_over_existing_content() {
    let (mut acc, mut backing) = accumulator(20, 20);
    backing.fill([0, 0, 255, 255]);
    let t = tools(ToolKind::Brush, 1080.0, 0.5);
    acc.begin(&t, FrameIndex(0), Point::new(10.0, 10.0), &mut backing).unwrap();
    acc.commit(&mut backing).unwrap();

    let expect = crate::raster::composite::over([0, 0, 255, 255], [255, 0, 0, 255], 0.5);
    assert_eq!(backing.pixel(10, 10).unwrap(), expect);
}

#[test]
fn scratch_is_shown_at_tool_opacity_until_commit() {
    let (mut acc, mut backing) = accumulator(50, 50);
    let t = tools(ToolKind::Grunge, 20.0, 0.5);
    acc.begin(&t, FrameIndex(0), Point::new(25.0, 25.0), &mut backing).unwrap();
    assert_eq!(acc.live_overlay_opacity(), Some(0.5));
    assert!(backing.is_blank());
    acc.extend(Point::new(30.0, 25.0), &mut backing);
    assert!(backing.is_blank());
    acc.commit(&mut backing).unwrap();
    assert_eq!(acc.live_overlay_opacity(), None);
}

#[test]
fn grunge_dabs_are_stamped_from_one_reused_surface() {
    let (mut acc, mut backing) = accumulator(200, 200);
    let t = tools(ToolKind::Grunge, 20.0, 1.0);
    acc.begin(&t, FrameIndex(0), Point::new(100.0, 100.0), &mut backing).unwrap();
    for i in 0..5 {
        acc.extend(Point::new(100.0 + i as f64, 100.0), &mut backing);
    }
    assert!(!acc.scratch().is_blank());
    assert_eq!(acc.stamp().rebuilds(), 1);
    acc.commit(&mut backing).unwrap();
    assert!(!backing.is_blank());
}

#[test]
fn eraser_is_live_and_exact_at_centerline() {
    let (mut acc, mut backing) = accumulator(200, 200);
    backing.fill([255, 0, 0, 255]);
    let t = tools(ToolKind::Eraser, 20.0, 0.5);

    acc.begin(&t, FrameIndex(1), Point::new(50.0, 100.5), &mut backing).unwrap();
    acc.extend(Point::new(150.0, 100.5), &mut backing);
    // Double back over the same pixels: must not erase twice.
    acc.extend(Point::new(60.0, 100.5), &mut backing);

    let centre = backing.pixel(100, 100).unwrap();
    assert!((i32::from(centre[3]) - 127).abs() <= 1, "alpha {}", centre[3]);
    assert_eq!(acc.live_overlay_opacity(), None);

    let done = acc.commit(&mut backing).unwrap();
    let decoded = decode_image(done.blob.bytes()).unwrap();
    let i = (100 * 200 + 100) * 4;
    assert!((i32::from(decoded.rgba8_premul[i + 3]) - 127).abs() <= 1);
    assert_eq!(&decoded.rgba8_premul[..4], &[255, 0, 0, 255]);
}

#[test]
fn eraser_tap_punches_once() {
    let (mut acc, mut backing) = accumulator(100, 100);
    backing.fill([0, 255, 0, 255]);
    let t = tools(ToolKind::Eraser, 50.0, 1.0);
    acc.begin(&t, FrameIndex(0), Point::new(50.0, 50.0), &mut backing).unwrap();
    assert_eq!(backing.pixel(50, 50).unwrap(), [0, 0, 0, 0]);
    acc.commit(&mut backing).unwrap();
    assert_eq!(backing.pixel(50, 50).unwrap(), [0, 0, 0, 0]);
}

#[test]
fn cancel_restores_erased_backing_and_produces_nothing() {
    let (mut acc, mut backing) = accumulator(100, 100);
    backing.fill([0, 255, 0, 255]);
    let before = backing.clone();
    let t = tools(ToolKind::Eraser, 50.0, 1.0);
    acc.begin(&t, FrameIndex(0), Point::new(50.0, 50.0), &mut backing).unwrap();
    acc.cancel(&mut backing);
    assert_eq!(backing.pixels(), before.pixels());
    assert!(acc.commit(&mut backing).is_err());
}

#[test]
fn cancel_brush_leaves_backing_untouched() {
    let (mut acc, mut backing) = accumulator(40, 40);
    let t = tools(ToolKind::Brush, 100.0, 1.0);
    acc.begin(&t, FrameIndex(0), Point::new(20.0, 20.0), &mut backing).unwrap();
    acc.extend(Point::new(30.0, 20.0), &mut backing);
    acc.cancel(&mut backing);
    assert!(backing.is_blank());
    assert!(acc.scratch().is_blank());
}

#[test]
fn begin_rejects_overlapping_strokes_and_no_tool() {
    let (mut acc, mut backing) = accumulator(40, 40);
    let t = tools(ToolKind::Brush, 10.0, 1.0);
    acc.begin(&t, FrameIndex(0), Point::new(1.0, 1.0), &mut backing).unwrap();
    assert!(acc.begin(&t, FrameIndex(0), Point::new(2.0, 2.0), &mut backing).is_err());
    acc.cancel(&mut backing);

    let none = ToolState::default().with_active(ToolKind::None);
    assert!(acc.begin(&none, FrameIndex(0), Point::new(1.0, 1.0), &mut backing).is_err());
}

#[test]
fn zero_sized_accumulator_refuses_strokes() {
    let (mut acc, mut backing) = accumulator(0, 0);
    let t = tools(ToolKind::Brush, 10.0, 1.0);
    assert!(acc.begin(&t, FrameIndex(0), Point::new(0.0, 0.0), &mut backing).is_err());
}

#[test]
fn stroke_color_is_premultiplied() {
    let (mut acc, mut backing) = accumulator(108, 108);
    let mut t = tools(ToolKind::Brush, 100.0, 1.0);
    t.color = StrokeColor::from_hex("#00ff0080").unwrap();
    acc.begin(&t, FrameIndex(0), Point::new(50.0, 50.0), &mut backing).unwrap();
    acc.commit(&mut backing).unwrap();
    assert_eq!(backing.pixel(50, 50).unwrap(), [0, 128, 0, 128]);
}

#[test]
fn resize_drops_active_stroke() {
    let (mut acc, mut backing) = accumulator(40, 40);
    let t = tools(ToolKind::Brush, 10.0, 1.0);
    acc.begin(&t, FrameIndex(0), Point::new(1.0, 1.0), &mut backing).unwrap();
    acc.resize(MediaGeometry::new(80, 80));
    assert!(!acc.is_active());
    assert_eq!(acc.scratch().geometry(), MediaGeometry::new(80, 80));
}

#[test]
fn opacity_change_mid_stroke_applies_to_overlay_and_commit() {
    let (mut acc, mut backing) = accumulator(108, 108);
    let t = tools(ToolKind::Brush, 100.0, 1.0);
    acc.begin(&t, FrameIndex(0), Point::new(54.0, 54.0), &mut backing).unwrap();
    assert_eq!(acc.live_overlay_opacity(), Some(1.0));

    acc.apply_tool_state(&tools(ToolKind::Brush, 100.0, 0.5), &mut backing);
    assert_eq!(acc.live_overlay_opacity(), Some(0.5));

    acc.commit(&mut backing).unwrap();
    assert_eq!(backing.pixel(54, 54).unwrap(), [128, 0, 0, 128]);
}

#[test]
fn eraser_opacity_change_rederives_from_baseline() {
    let (mut acc, mut backing) = accumulator(200, 200);
    backing.fill([255, 0, 0, 255]);
    let t = tools(ToolKind::Eraser, 20.0, 1.0);
    acc.begin(&t, FrameIndex(0), Point::new(100.5, 100.5), &mut backing).unwrap();
    assert_eq!(backing.pixel(100, 100).unwrap()[3], 0);

    acc.apply_tool_state(&tools(ToolKind::Eraser, 20.0, 0.5), &mut backing);
    let centre = backing.pixel(100, 100).unwrap();
    assert!((i32::from(centre[3]) - 127).abs() <= 1, "alpha {}", centre[3]);
    assert_eq!(backing.pixel(0, 0).unwrap(), [255, 0, 0, 255]);
}

#[test]
fn oversized_grunge_stamp_is_bounded_by_media() {
    let (mut acc, mut backing) = accumulator(50, 40);
    let t = tools(ToolKind::Grunge, 1e6, 1.0);
    acc.begin(&t, FrameIndex(0), Point::new(25.0, 20.0), &mut backing).unwrap();
    assert_eq!(acc.stamp().surface().width(), 100);
    assert_eq!(acc.stamp().surface().height(), 100);
    acc.commit(&mut backing).unwrap();
}
