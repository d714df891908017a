use std::f64::consts::TAU;

use crate::foundation::core::Point;
use crate::foundation::math::{Rng64, unit_to_u8};
use crate::raster::composite::destination_in;
use crate::raster::shapes::{PaintMode, fill_disc, stroke_segment};
use crate::raster::surface::{Raster, Surface};

/// Inputs of the procedural grunge mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TextureParams {
    pub size: u32,
    pub scratch_count: u32,
    pub seed: u64,
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            size: 512,
            scratch_count: 800,
            seed: 0x6772_756e_6765,
        }
    }
}

/// Radial fade applied over the dots and scratches: opaque center, transparent rim.
const FADE_STOPS: [(f64, f64); 4] = [(0.0, 1.0), (0.55, 0.85), (0.8, 0.3), (1.0, 0.0)];

/// Square alpha mask that shapes grunge dabs. Generated once and reused for every stamp.
#[derive(Clone, Debug)]
pub struct GrungeTexture {
    size: u32,
    alpha: Vec<u8>,
}

impl GrungeTexture {
    /// Synthesize the mask: scattered dots, short scratches, then the radial fade.
    ///
    /// Deterministic for a given `params`.
    #[tracing::instrument]
    pub fn generate(params: TextureParams) -> Self {
        let size = params.size;
        let mut canvas = Surface::new(size, size);
        let mut rng = Rng64::new(params.seed);
        let side = f64::from(size);

        let dot_count = (u64::from(size) * u64::from(size)) / 4;
        for _ in 0..dot_count {
            let center = Point::new(rng.range(0.0, side), rng.range(0.0, side));
            let radius = rng.range(0.3, 2.8);
            let alpha = unit_to_u8(rng.range(0.1, 1.0) as f32);
            fill_disc(&mut canvas, center, radius, PaintMode::Over([0, 0, 0, alpha]));
        }

        for _ in 0..params.scratch_count {
            let start = Point::new(rng.range(0.0, side), rng.range(0.0, side));
            let len = rng.range(2.0, 12.0);
            let angle = rng.range(0.0, TAU);
            let end = Point::new(start.x + angle.cos() * len, start.y + angle.sin() * len);
            let alpha = unit_to_u8(rng.range(0.1, 0.7) as f32);
            stroke_segment(&mut canvas, start, end, 0.5, PaintMode::Over([0, 0, 0, alpha]));
        }

        let half = side / 2.0;
        let stride = size as usize;
        let data = canvas.data_mut();
        for y in 0..size {
            for x in 0..size {
                let dx = f64::from(x) + 0.5 - half;
                let dy = f64::from(y) + 0.5 - half;
                let t = if half > 0.0 { (dx * dx + dy * dy).sqrt() / half } else { 1.0 };
                let fade = unit_to_u8(radial_fade(t) as f32);
                let i = ((y as usize) * stride + (x as usize)) * 4;
                let px = destination_in([data[i], data[i + 1], data[i + 2], data[i + 3]], fade);
                data[i..i + 4].copy_from_slice(&px);
            }
        }

        let alpha = canvas.pixels().chunks_exact(4).map(|px| px[3]).collect();
        Self { size, alpha }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn alpha(&self) -> &[u8] {
        &self.alpha
    }

    /// Bilinear alpha lookup at normalized coordinates `u, v` in `[0, 1]`.
    pub fn sample(&self, u: f64, v: f64) -> u8 {
        if self.size == 0 {
            return 0;
        }
        let max = f64::from(self.size - 1);
        let x = (u * f64::from(self.size) - 0.5).clamp(0.0, max);
        let y = (v * f64::from(self.size) - 0.5).clamp(0.0, max);
        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let x1 = (x0 + 1).min(self.size as usize - 1);
        let y1 = (y0 + 1).min(self.size as usize - 1);
        let fx = x - x0 as f64;
        let fy = y - y0 as f64;

        let stride = self.size as usize;
        let at = |x: usize, y: usize| f64::from(self.alpha[y * stride + x]);
        let top = at(x0, y0) * (1.0 - fx) + at(x1, y0) * fx;
        let bottom = at(x0, y1) * (1.0 - fx) + at(x1, y1) * fx;
        (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8
    }

    /// Render the mask as black ink on transparent, e.g. for export.
    pub fn to_surface(&self) -> Surface {
        let mut s = Surface::new(self.size, self.size);
        for (px, &a) in s.data_mut().chunks_exact_mut(4).zip(&self.alpha) {
            px[3] = a;
        }
        s
    }
}

/// Piecewise-linear fade over [`FADE_STOPS`]; 0 outside the unit radius.
fn radial_fade(t: f64) -> f64 {
    if !t.is_finite() || t >= 1.0 {
        return 0.0;
    }
    let t = t.max(0.0);
    for pair in FADE_STOPS.windows(2) {
        let (t0, a0) = pair[0];
        let (t1, a1) = pair[1];
        if t <= t1 {
            let k = (t - t0) / (t1 - t0);
            return a0 + (a1 - a0) * k;
        }
    }
    0.0
}

#[cfg(test)]
#[path = "../../tests/unit/brush/texture.rs"]
mod tests;
