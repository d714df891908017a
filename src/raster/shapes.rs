use crate::foundation::core::{Point, Rect};
use crate::foundation::math::unit_to_u8;
use crate::raster::composite::{PremulRgba8, lighten_coverage, over_u8};
use crate::raster::surface::{Raster, Surface};

/// How coverage of a painted shape lands on the destination surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintMode {
    /// Source-over of the color scaled by coverage.
    Over(PremulRgba8),
    /// Max-coverage of a color that is constant for the whole surface.
    Lighten(PremulRgba8),
}

/// Paint a filled disc. Returns the touched pixel rectangle.
pub fn fill_disc(
    surface: &mut Surface,
    center: Point,
    radius: f64,
    mode: PaintMode,
) -> Option<Rect> {
    stroke_segment(surface, center, center, radius, mode)
}

/// Paint the segment `a -> b` as a line of width `2 * radius` with round caps.
///
/// Coverage is anti-aliased over one pixel: pixel centers within `radius - 0.5` of the segment are
/// fully covered. Returns the clipped rectangle of pixels that may have changed.
pub fn stroke_segment(
    surface: &mut Surface,
    a: Point,
    b: Point,
    radius: f64,
    mode: PaintMode,
) -> Option<Rect> {
    if !(radius.is_finite() && radius > 0.0) || !is_finite_point(a) || !is_finite_point(b) {
        return None;
    }
    let pad = radius + 1.0;
    let (x0, y0, x1, y1) = surface.clip_span(Rect::from_points(a, b).inflate(pad, pad))?;

    let stride = surface.width() as usize;
    let data = surface.data_mut();
    for y in y0..y1 {
        for x in x0..x1 {
            let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let cov = radius + 0.5 - distance_to_segment(center, a, b);
            if cov <= 0.0 {
                continue;
            }
            let cov = unit_to_u8(cov as f32);
            let i = ((y as usize) * stride + (x as usize)) * 4;
            let d = [data[i], data[i + 1], data[i + 2], data[i + 3]];
            let out = match mode {
                PaintMode::Over(color) => over_u8(d, color, cov),
                PaintMode::Lighten(color) => lighten_coverage(d, color, cov),
            };
            data[i..i + 4].copy_from_slice(&out);
        }
    }

    Some(Rect::new(
        f64::from(x0),
        f64::from(y0),
        f64::from(x1),
        f64::from(y1),
    ))
}

/// Euclidean distance from `p` to the closed segment `a -> b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let ap = p - a;
    let len2 = ab.hypot2();
    if len2 <= f64::EPSILON {
        return ap.hypot();
    }
    let t = (ap.dot(ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).hypot()
}

fn is_finite_point(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

#[cfg(test)]
#[path = "../../tests/unit/raster/shapes.rs"]
mod tests;
