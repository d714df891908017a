use crate::brush::texture::GrungeTexture;
use crate::foundation::core::{MediaGeometry, Point, Rect};
use crate::raster::composite::{PremulRgba8, destination_in};
use crate::raster::surface::{Raster, Surface};

/// Reusable offscreen dab for the grunge brush.
///
/// The stamp is the brush color masked by the grunge texture. It is rebuilt only when its side
/// length or color changes, and its surface is resized only when the side length changes.
#[derive(Debug, Default)]
pub struct GrungeStamp {
    surface: Surface,
    key: Option<(u32, PremulRgba8)>,
    rebuilds: u64,
}

impl GrungeStamp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Side length in pixels for a normalized tool size, capped at `max_side`.
    pub fn side_for(normalized_size: f64, scale: f64, max_side: u32) -> u32 {
        let side = (normalized_size * scale).round();
        let max = max_side.max(1);
        if side.is_finite() && side >= 1.0 {
            side.min(f64::from(max)) as u32
        } else {
            1
        }
    }

    /// Largest useful stamp for a target: twice its long side.
    pub fn max_side_for(geometry: MediaGeometry) -> u32 {
        geometry.width.max(geometry.height).saturating_mul(2)
    }

    fn prepare(&mut self, side: u32, color: PremulRgba8, texture: &GrungeTexture) {
        if self.key == Some((side, color)) {
            return;
        }
        if self.surface.width() != side || self.surface.height() != side {
            self.surface.resize(side, side);
        }
        self.surface.fill(color);

        let inv = 1.0 / f64::from(side);
        let data = self.surface.data_mut();
        for y in 0..side {
            let v = (f64::from(y) + 0.5) * inv;
            for x in 0..side {
                let u = (f64::from(x) + 0.5) * inv;
                let i = ((y as usize) * (side as usize) + (x as usize)) * 4;
                let px = destination_in(color, texture.sample(u, v));
                data[i..i + 4].copy_from_slice(&px);
            }
        }
        self.key = Some((side, color));
        self.rebuilds += 1;
    }

    /// Blit one dab of `side` pixels centered on `center` into `target`. Returns the touched rect.
    pub fn stamp(
        &mut self,
        target: &mut Surface,
        center: Point,
        side: u32,
        color: PremulRgba8,
        texture: &GrungeTexture,
    ) -> Option<Rect> {
        if side == 0 || !(center.x.is_finite() && center.y.is_finite()) {
            return None;
        }
        self.prepare(side, color, texture);

        let half = f64::from(side) / 2.0;
        let x = (center.x - half).round() as i64;
        let y = (center.y - half).round() as i64;
        target.draw_at(&self.surface, x, y, 1.0);

        let s = f64::from(side);
        let r = Rect::new(x as f64, y as f64, x as f64 + s, y as f64 + s);
        let clipped = r.intersect(target.geometry().bounds());
        (clipped.width() > 0.0 && clipped.height() > 0.0).then_some(clipped)
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// How many times the dab pixels were regenerated.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}

#[cfg(test)]
#[path = "../../tests/unit/brush/stamp.rs"]
mod tests;
