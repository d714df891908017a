use crate::{
    assets::blob::AnnotationStore,
    assets::cache::ImageCache,
    foundation::config::OnionOpacity,
    foundation::core::{FrameIndex, MediaGeometry},
    raster::surface::{Raster, Surface},
    render::backing::BackingBuffer,
    render::onion::{OnionReport, OnionSkinConfig, render_onion_skins},
};

/// Per-render view of engine state the compositor reads.
#[derive(Clone, Copy, Debug)]
pub struct SceneState<'a> {
    pub store: &'a AnnotationStore,
    pub frame: FrameIndex,
    pub onion: OnionSkinConfig,
    pub onion_opacity: OnionOpacity,
    /// Set during playback and for stills, where neighbors do not exist.
    pub suppress_onion: bool,
    pub visible: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub settled: u64,
    pub live: u64,
    /// Render requests ignored because the display has zero size.
    pub skipped: u64,
    pub onion_drawn: u64,
}

/// Owns the display surface and draws onion skins, the backing buffer and the live stroke into it.
#[derive(Debug, Default)]
pub struct Compositor {
    display: Surface,
    stats: RenderStats,
}

impl Compositor {
    pub fn new(geometry: MediaGeometry) -> Self {
        Self {
            display: Surface::new(geometry.width, geometry.height),
            stats: RenderStats::default(),
        }
    }

    pub fn display(&self) -> &Surface {
        &self.display
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn resize(&mut self, geometry: MediaGeometry) {
        self.display.resize(geometry.width, geometry.height);
    }

    /// Onion skins, then the backing buffer at full opacity.
    #[tracing::instrument(skip_all, fields(frame = scene.frame.0))]
    pub fn render_settled(
        &mut self,
        scene: &SceneState<'_>,
        cache: &mut ImageCache,
        backing: &BackingBuffer,
    ) -> Option<OnionReport> {
        let report = self.compose_base(scene, cache, backing)?;
        self.stats.settled += 1;
        Some(report)
    }

    /// Like [`Compositor::render_settled`], then the stroke surface at the tool opacity on top.
    pub fn render_with_live_stroke(
        &mut self,
        scene: &SceneState<'_>,
        cache: &mut ImageCache,
        backing: &BackingBuffer,
        stroke: &Surface,
        opacity: f32,
    ) -> Option<OnionReport> {
        let report = self.compose_base(scene, cache, backing)?;
        if scene.visible {
            self.display.draw_fit(stroke, opacity);
        }
        self.stats.live += 1;
        Some(report)
    }

    fn compose_base(
        &mut self,
        scene: &SceneState<'_>,
        cache: &mut ImageCache,
        backing: &BackingBuffer,
    ) -> Option<OnionReport> {
        if self.display.is_empty() {
            self.stats.skipped += 1;
            return None;
        }
        self.display.clear();
        if !scene.visible {
            return Some(OnionReport::default());
        }

        let report = if scene.suppress_onion {
            OnionReport::default()
        } else {
            render_onion_skins(
                &mut self.display,
                scene.store,
                cache,
                scene.frame,
                scene.onion,
                scene.onion_opacity,
            )
        };
        self.stats.onion_drawn += report.drawn.len() as u64;

        self.display.draw_fit(backing.surface(), 1.0);
        Some(report)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
