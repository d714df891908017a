use crate::foundation::core::{MediaGeometry, Rect};
use crate::foundation::math::unit_to_u8;
use crate::raster::composite::{PremulRgba8, over_u8};

/// Read access to a premultiplied RGBA8 raster, row-major and tightly packed.
pub trait Raster {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn pixels(&self) -> &[u8];

    fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Owned premultiplied RGBA8 raster surface.
///
/// Surfaces are long-lived: [`Surface::resize`] reuses the existing allocation whenever it is
/// large enough, and `realloc_count` records how often it was not.
#[derive(Clone, Debug, Default)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
    realloc_count: u64,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        let mut s = Self::default();
        s.resize(width, height);
        s
    }

    pub fn geometry(&self) -> MediaGeometry {
        MediaGeometry::new(self.width, self.height)
    }

    /// Number of times a resize had to grow the backing allocation.
    pub fn realloc_count(&self) -> u64 {
        self.realloc_count
    }

    /// Resize in place. Content is never preserved across a resize; the surface comes back fully
    /// transparent, even when the size did not change.
    pub fn resize(&mut self, width: u32, height: u32) {
        let len = byte_len(width, height);
        if len > self.data.capacity() {
            self.realloc_count += 1;
        }
        self.data.clear();
        self.data.resize(len, 0);
        self.width = width;
        self.height = height;
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<PremulRgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    pub(crate) fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    /// Integer pixel span `[x0, x1) x [y0, y1)` covering `rect`, clipped to the surface.
    pub(crate) fn clip_span(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let x0 = rect.x0.floor().max(0.0);
        let y0 = rect.y0.floor().max(0.0);
        let x1 = rect.x1.ceil().min(f64::from(self.width));
        let y1 = rect.y1.ceil().min(f64::from(self.height));
        if !(x0 < x1 && y0 < y1) {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    /// Copy `src` into this surface with matching size.
    pub fn copy_from(&mut self, src: &Surface) {
        if self.width == src.width && self.height == src.height {
            self.data.copy_from_slice(&src.data);
        } else {
            self.replace_with(src);
        }
    }

    /// Replace the content with `src` stretched to this surface's size.
    pub fn replace_with(&mut self, src: &dyn Raster) {
        if src.width() == self.width && src.height() == self.height {
            self.data.copy_from_slice(src.pixels());
            return;
        }
        self.clear();
        self.draw_fit(src, 1.0);
    }

    /// Source-over `src` stretched to cover the whole surface, at `opacity`.
    pub fn draw_fit(&mut self, src: &dyn Raster, opacity: f32) {
        let op = unit_to_u8(opacity);
        if op == 0 || src.is_empty() || self.width == 0 || self.height == 0 {
            return;
        }

        if src.width() == self.width && src.height() == self.height {
            for (d, s) in self.data.chunks_exact_mut(4).zip(src.pixels().chunks_exact(4)) {
                let out = over_u8([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], op);
                d.copy_from_slice(&out);
            }
            return;
        }

        let sx = src.width() as f32 / self.width as f32;
        let sy = src.height() as f32 / self.height as f32;
        for y in 0..self.height {
            let v = (y as f32 + 0.5) * sy - 0.5;
            for x in 0..self.width {
                let u = (x as f32 + 0.5) * sx - 0.5;
                let s = sample_bilinear(src, u, v);
                let i = self.index(x, y);
                let d = [
                    self.data[i],
                    self.data[i + 1],
                    self.data[i + 2],
                    self.data[i + 3],
                ];
                self.data[i..i + 4].copy_from_slice(&over_u8(d, s, op));
            }
        }
    }

    /// Source-over `src` unscaled with its top-left corner at `(x, y)`, clipped to the surface.
    pub fn draw_at(&mut self, src: &dyn Raster, x: i64, y: i64, opacity: f32) {
        let op = unit_to_u8(opacity);
        if op == 0 || src.is_empty() {
            return;
        }
        let sw = i64::from(src.width());
        let sh = i64::from(src.height());
        let dx0 = x.max(0);
        let dy0 = y.max(0);
        let dx1 = (x + sw).min(i64::from(self.width));
        let dy1 = (y + sh).min(i64::from(self.height));
        if dx0 >= dx1 || dy0 >= dy1 {
            return;
        }

        let pixels = src.pixels();
        for dy in dy0..dy1 {
            let sy = (dy - y) as usize;
            for dx in dx0..dx1 {
                let sx = (dx - x) as usize;
                let si = (sy * sw as usize + sx) * 4;
                let s = [pixels[si], pixels[si + 1], pixels[si + 2], pixels[si + 3]];
                let i = self.index(dx as u32, dy as u32);
                let d = [
                    self.data[i],
                    self.data[i + 1],
                    self.data[i + 2],
                    self.data[i + 3],
                ];
                self.data[i..i + 4].copy_from_slice(&over_u8(d, s, op));
            }
        }
    }

    /// Fill the whole surface with one premultiplied color.
    pub fn fill(&mut self, color: PremulRgba8) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    /// True when every pixel is fully transparent.
    pub fn is_blank(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }
}

impl Raster for Surface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixels(&self) -> &[u8] {
        &self.data
    }
}

fn byte_len(width: u32, height: u32) -> usize {
    (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4)
}

fn sample_bilinear(src: &dyn Raster, u: f32, v: f32) -> PremulRgba8 {
    let w = src.width() as i64;
    let h = src.height() as i64;
    let u = u.clamp(0.0, (w - 1) as f32);
    let v = v.clamp(0.0, (h - 1) as f32);
    let x0 = u.floor() as i64;
    let y0 = v.floor() as i64;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = u - x0 as f32;
    let fy = v - y0 as f32;

    let pixels = src.pixels();
    let at = |x: i64, y: i64, c: usize| -> f32 { f32::from(pixels[((y * w + x) as usize) * 4 + c]) };

    let mut out = [0u8; 4];
    for (c, o) in out.iter_mut().enumerate() {
        let top = at(x0, y0, c) * (1.0 - fx) + at(x1, y0, c) * fx;
        let bottom = at(x0, y1, c) * (1.0 - fx) + at(x1, y1, c) * fx;
        *o = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/raster/surface.rs"]
mod tests;
