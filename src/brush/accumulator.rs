use std::sync::Arc;

use crate::{
    assets::blob::Blob,
    assets::decode::encode_png,
    brush::stamp::GrungeStamp,
    brush::texture::GrungeTexture,
    brush::tool::{ToolKind, ToolSettings, ToolState},
    foundation::config::EngineConfig,
    foundation::core::{FrameIndex, MediaGeometry, Point, Rect},
    foundation::error::{InkframeError, InkframeResult},
    foundation::math::{mul_div255_u8, unit_to_u8},
    raster::composite::{PremulRgba8, destination_out},
    raster::shapes::{PaintMode, fill_disc, stroke_segment},
    raster::surface::{Raster, Surface},
};

/// Size scaling shared by all tools.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushMetrics {
    pub reference_resolution: f64,
    pub grunge_stamp_scale: f64,
    pub eraser_width_scale: f64,
}

impl Default for BrushMetrics {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl BrushMetrics {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            reference_resolution: config.reference_resolution,
            grunge_stamp_scale: config.grunge_stamp_scale,
            eraser_width_scale: config.eraser_width_scale,
        }
    }
}

/// A finished stroke: the frame it was drawn on and the full new raster for that frame.
#[derive(Clone, Debug, PartialEq)]
pub struct CommittedStroke {
    pub frame: FrameIndex,
    pub tool: ToolKind,
    pub blob: Blob,
}

#[derive(Clone, Copy, Debug)]
struct ActiveStroke {
    tool: ToolKind,
    frame: FrameIndex,
    opacity: f32,
    color: PremulRgba8,
    /// Brush and eraser half-width; unused by grunge.
    radius: f64,
    stamp_side: u32,
    last: Point,
    moved: bool,
}

/// Stroke staging area.
///
/// Brush and grunge strokes accumulate at full opacity in a scratch surface that is composited
/// onto the backing buffer exactly once, at the tool opacity, on [`StrokeAccumulator::commit`].
/// Brush coverage is merged with max-coverage so segment joints never darken.
///
/// The eraser writes into the backing buffer live. At gesture start the backing buffer is
/// snapshotted into a baseline; the scratch surface then collects eraser coverage, and every
/// touched pixel is re-derived as `baseline * (1 - coverage * opacity)`. Overlapping segments
/// therefore erase once, not once per segment.
pub struct StrokeAccumulator {
    scratch: Surface,
    baseline: Surface,
    stamp: GrungeStamp,
    texture: Arc<GrungeTexture>,
    metrics: BrushMetrics,
    active: Option<ActiveStroke>,
}

impl StrokeAccumulator {
    pub fn new(metrics: BrushMetrics, texture: Arc<GrungeTexture>) -> Self {
        Self {
            scratch: Surface::default(),
            baseline: Surface::default(),
            stamp: GrungeStamp::new(),
            texture,
            metrics,
            active: None,
        }
    }

    /// Match the media size. Drops any stroke in progress; content is not preserved.
    pub fn resize(&mut self, geometry: MediaGeometry) {
        if self.active.take().is_some() {
            tracing::warn!("stroke dropped by resize");
        }
        self.scratch.resize(geometry.width, geometry.height);
        if self.baseline.width() != geometry.width || self.baseline.height() != geometry.height {
            self.baseline.resize(geometry.width, geometry.height);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Opacity the scratch surface is shown at while the stroke is live. `None` for the eraser,
    /// whose effect is already in the backing buffer.
    pub fn live_overlay_opacity(&self) -> Option<f32> {
        self.active
            .filter(|s| s.tool != ToolKind::Eraser)
            .map(|s| s.opacity)
    }

    pub fn scratch(&self) -> &Surface {
        &self.scratch
    }

    pub fn stamp(&self) -> &GrungeStamp {
        &self.stamp
    }

    /// Start a stroke of the active tool at `point` (media pixels).
    ///
    /// Brush paints a dot and grunge a dab, so a tap without movement still marks. The eraser
    /// punches at the start point.
    pub fn begin(
        &mut self,
        tools: &ToolState,
        frame: FrameIndex,
        point: Point,
        backing: &mut Surface,
    ) -> InkframeResult<()> {
        if self.active.is_some() {
            return Err(InkframeError::validation("a stroke is already in progress"));
        }
        let settings: ToolSettings = tools
            .active_settings()
            .ok_or_else(|| InkframeError::validation("no drawing tool selected"))?;
        if self.scratch.is_empty() {
            return Err(InkframeError::validation("stroke surface has zero size"));
        }
        if backing.geometry() != self.scratch.geometry() {
            return Err(InkframeError::validation(
                "backing buffer and stroke surface sizes differ",
            ));
        }

        let normalized = settings.normalized_size(
            self.scratch.geometry(),
            self.metrics.reference_resolution,
        );
        let radius = match tools.active {
            ToolKind::Eraser => normalized * self.metrics.eraser_width_scale / 2.0,
            _ => normalized / 2.0,
        };
        let stroke = ActiveStroke {
            tool: tools.active,
            frame,
            opacity: settings.clamped_opacity(),
            color: tools.color.premultiplied().to_array(),
            radius,
            stamp_side: GrungeStamp::side_for(
                normalized,
                self.metrics.grunge_stamp_scale,
                GrungeStamp::max_side_for(self.scratch.geometry()),
            ),
            last: point,
            moved: false,
        };

        self.scratch.clear();
        if stroke.tool == ToolKind::Eraser {
            self.baseline.copy_from(backing);
        }
        self.active = Some(stroke);
        self.paint(&stroke, point, point, backing);
        tracing::debug!(tool = ?stroke.tool, frame = frame.0, radius, "stroke begin");
        Ok(())
    }

    /// Continue the stroke to `point`. Each call paints only the new segment or dab.
    pub fn extend(&mut self, point: Point, backing: &mut Surface) -> Option<Rect> {
        let mut stroke = self.active?;
        let touched = self.paint(&stroke, stroke.last, point, backing);
        stroke.last = point;
        stroke.moved = true;
        self.active = Some(stroke);
        touched
    }

    /// Pick up opacity changes for the stroke's tool while it is live.
    ///
    /// Brush and grunge read the new value at the next render and at commit. The eraser
    /// re-derives the whole backing buffer from its baseline at the new opacity.
    pub fn apply_tool_state(&mut self, tools: &ToolState, backing: &mut Surface) {
        let Some(mut stroke) = self.active else {
            return;
        };
        let Some(settings) = tools.settings(stroke.tool) else {
            return;
        };
        let opacity = settings.clamped_opacity();
        if opacity == stroke.opacity {
            return;
        }
        stroke.opacity = opacity;
        self.active = Some(stroke);
        if stroke.tool == ToolKind::Eraser && backing.geometry() == self.baseline.geometry() {
            self.apply_erase(backing.geometry().bounds(), opacity, backing);
        }
        tracing::trace!(tool = ?stroke.tool, opacity, "stroke opacity changed");
    }

    /// True once the stroke received at least one `extend`.
    pub fn has_moved(&self) -> bool {
        self.active.is_some_and(|s| s.moved)
    }

    fn paint(
        &mut self,
        stroke: &ActiveStroke,
        from: Point,
        to: Point,
        backing: &mut Surface,
    ) -> Option<Rect> {
        match stroke.tool {
            ToolKind::Brush => {
                let mode = PaintMode::Lighten(stroke.color);
                if from == to {
                    fill_disc(&mut self.scratch, to, stroke.radius, mode)
                } else {
                    stroke_segment(&mut self.scratch, from, to, stroke.radius, mode)
                }
            }
            ToolKind::Grunge => self.stamp.stamp(
                &mut self.scratch,
                to,
                stroke.stamp_side,
                stroke.color,
                &self.texture,
            ),
            ToolKind::Eraser => {
                let mode = PaintMode::Lighten([0, 0, 0, 255]);
                let rect = stroke_segment(&mut self.scratch, from, to, stroke.radius, mode)?;
                self.apply_erase(rect, stroke.opacity, backing);
                Some(rect)
            }
            ToolKind::None => None,
        }
    }

    fn apply_erase(&self, rect: Rect, opacity: f32, backing: &mut Surface) {
        let Some((x0, y0, x1, y1)) = backing.clip_span(rect) else {
            return;
        };
        let op = u16::from(unit_to_u8(opacity));
        let mask = self.scratch.pixels();
        let base = self.baseline.pixels();
        let stride = backing.width() as usize;
        let out = backing.data_mut();
        for y in y0..y1 {
            for x in x0..x1 {
                let i = ((y as usize) * stride + (x as usize)) * 4;
                let a = mul_div255_u8(u16::from(mask[i + 3]), op);
                let px = destination_out([base[i], base[i + 1], base[i + 2], base[i + 3]], a);
                out[i..i + 4].copy_from_slice(&px);
            }
        }
    }

    /// Flatten the stroke into `backing` and encode the result.
    ///
    /// Brush and grunge composite the scratch surface once at the tool opacity; the eraser has
    /// already modified `backing`. The scratch surface is cleared either way.
    #[tracing::instrument(skip_all)]
    pub fn commit(&mut self, backing: &mut Surface) -> InkframeResult<CommittedStroke> {
        let stroke = self
            .active
            .take()
            .ok_or_else(|| InkframeError::validation("no stroke in progress"))?;

        if stroke.tool != ToolKind::Eraser {
            backing.draw_fit(&self.scratch, stroke.opacity);
        }
        self.scratch.clear();

        let blob = encode_png(backing)?;
        tracing::debug!(
            tool = ?stroke.tool,
            frame = stroke.frame.0,
            bytes = blob.len(),
            "stroke committed"
        );
        Ok(CommittedStroke {
            frame: stroke.frame,
            tool: stroke.tool,
            blob,
        })
    }

    /// Drop the stroke without producing a blob. An eraser gesture restores the backing buffer
    /// to its state at gesture start.
    pub fn cancel(&mut self, backing: &mut Surface) {
        let Some(stroke) = self.active.take() else {
            return;
        };
        if stroke.tool == ToolKind::Eraser && backing.geometry() == self.baseline.geometry() {
            backing.copy_from(&self.baseline);
        }
        self.scratch.clear();
        tracing::debug!(tool = ?stroke.tool, "stroke cancelled");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/brush/accumulator.rs"]
mod tests;
