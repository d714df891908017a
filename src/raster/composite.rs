use crate::foundation::math::{mul_div255_u8, unit_to_u8};

pub type PremulRgba8 = [u8; 4];

/// Source-over with a global opacity applied to `src`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let op = unit_to_u8(opacity);
    over_u8(dst, src, op)
}

pub(crate) fn over_u8(dst: PremulRgba8, src: PremulRgba8, op: u8) -> PremulRgba8 {
    if op == 0 || src[3] == 0 {
        return dst;
    }
    let op = u16::from(op);
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Destination-out ("clear") with mask alpha `a`: keeps `dst * (1 - a)`.
pub fn destination_out(dst: PremulRgba8, a: u8) -> PremulRgba8 {
    if a == 0 {
        return dst;
    }
    let keep = 255u16 - u16::from(a);
    dst.map(|c| mul_div255_u8(u16::from(c), keep))
}

/// Destination-in with mask alpha `a`: keeps `dst * a`.
pub fn destination_in(dst: PremulRgba8, a: u8) -> PremulRgba8 {
    if a == 255 {
        return dst;
    }
    let a = u16::from(a);
    dst.map(|c| mul_div255_u8(u16::from(c), a))
}

/// Max-coverage paint of a constant color.
///
/// `dst` must only ever hold `color` at some coverage, which is the case for a stroke surface that
/// is cleared per stroke. Overlapping coverage never accumulates, so joints and self-intersections
/// of one stroke keep the stroke's alpha.
pub fn lighten_coverage(dst: PremulRgba8, color: PremulRgba8, coverage: u8) -> PremulRgba8 {
    let cov = u16::from(coverage);
    let a = mul_div255_u8(u16::from(color[3]), cov);
    if a <= dst[3] {
        return dst;
    }
    color.map(|c| mul_div255_u8(u16::from(c), cov))
}

#[cfg(test)]
#[path = "../../tests/unit/raster/composite.rs"]
mod tests;
