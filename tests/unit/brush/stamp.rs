use super::*;
use crate::brush::texture::TextureParams;

fn texture() -> GrungeTexture {
    GrungeTexture::generate(TextureParams {
        size: 32,
        scratch_count: 20,
        seed: 5,
    })
}

#[test]
fn side_for_rounds_and_never_collapses() {
    assert_eq!(GrungeStamp::side_for(10.0, 6.0, 4096), 60);
    assert_eq!(GrungeStamp::side_for(0.01, 6.0, 4096), 1);
    assert_eq!(GrungeStamp::side_for(f64::NAN, 6.0, 4096), 1);
    assert_eq!(GrungeStamp::side_for(10.0, 6.0, 0), 1);
}

#[test]
fn huge_sizes_are_capped_by_the_target() {
    let cap = GrungeStamp::max_side_for(MediaGeometry::new(800, 600));
    assert_eq!(cap, 1600);
    assert_eq!(GrungeStamp::side_for(1e6 * 600.0 / 1080.0, 6.0, cap), 1600);
    assert_eq!(GrungeStamp::side_for(f64::INFINITY, 6.0, cap), 1);
}

#[test]
fn stamp_is_centered_and_shaped_by_texture() {
    let tex = texture();
    let mut stamp = GrungeStamp::new();
    let mut target = Surface::new(100, 100);

    let rect = stamp
        .stamp(&mut target, Point::new(50.0, 50.0), 20, [255, 0, 0, 255], &tex)
        .unwrap();
    assert_eq!(rect, Rect::new(40.0, 40.0, 60.0, 60.0));

    // Corners of the dab sit on the faded rim of the mask.
    assert_eq!(target.pixel(40, 40).unwrap()[3], 0);
    assert!(target.pixel(10, 10).unwrap() == [0, 0, 0, 0]);

    // Color channels never exceed alpha (still premultiplied red).
    for y in 40..60 {
        for x in 40..60 {
            let px = target.pixel(x, y).unwrap();
            assert_eq!(px[0], px[3]);
            assert_eq!((px[1], px[2]), (0, 0));
        }
    }
}

#[test]
fn stamp_surface_is_reused_across_dabs() {
    let tex = texture();
    let mut stamp = GrungeStamp::new();
    let mut target = Surface::new(64, 64);

    for i in 0..10 {
        stamp.stamp(&mut target, Point::new(10.0 + i as f64, 20.0), 12, [0, 0, 255, 255], &tex);
    }
    assert_eq!(stamp.rebuilds(), 1);
    assert_eq!(stamp.surface().realloc_count(), 1);

    stamp.stamp(&mut target, Point::new(5.0, 5.0), 12, [0, 255, 0, 255], &tex);
    assert_eq!(stamp.rebuilds(), 2);
    assert_eq!(stamp.surface().realloc_count(), 1);

    stamp.stamp(&mut target, Point::new(5.0, 5.0), 8, [0, 255, 0, 255], &tex);
    assert_eq!(stamp.rebuilds(), 3);
    assert_eq!(stamp.surface().realloc_count(), 1);
}

#[test]
fn off_surface_dab_touches_nothing() {
    let tex = texture();
    let mut stamp = GrungeStamp::new();
    let mut target = Surface::new(16, 16);
    assert!(stamp
        .stamp(&mut target, Point::new(-100.0, -100.0), 10, [255, 0, 0, 255], &tex)
        .is_none());
    assert!(target.is_blank());
}
