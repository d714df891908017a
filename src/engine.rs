use std::sync::Arc;

use crate::{
    assets::blob::{AnnotationStore, CommitSink},
    assets::cache::{CacheStats, ImageCache},
    assets::decode::decode_image,
    brush::accumulator::{BrushMetrics, StrokeAccumulator},
    brush::texture::GrungeTexture,
    brush::tool::{ToolKind, ToolState},
    foundation::config::EngineConfig,
    foundation::core::{FrameIndex, MediaGeometry, MediaKind, Point, Viewport},
    foundation::error::InkframeResult,
    raster::surface::Surface,
    render::backing::BackingBuffer,
    render::compositor::{Compositor, RenderStats, SceneState},
    render::onion::OnionSkinConfig,
    render::refresh::{LoopState, LoopToken, RefreshLoop},
};

/// Frame-indexed annotation compositing engine.
///
/// The host owns the [`AnnotationStore`] and passes it in wherever rendering needs it. Outside a
/// stroke, rendering is event-driven: every setter that changes what is visible re-renders the
/// display once. During a stroke the host drives [`AnnotationEngine::on_refresh_tick`] with the
/// token returned by [`AnnotationEngine::pointer_down`] once per display refresh.
///
/// Decodes complete at [`AnnotationEngine::poll_decodes`], which re-renders when a decode that
/// affects the display lands and no stroke is in progress.
pub struct AnnotationEngine {
    config: EngineConfig,
    geometry: MediaGeometry,
    viewport: Option<Viewport>,
    media_kind: MediaKind,
    host_frame: FrameIndex,
    playing: bool,
    visible: bool,
    tools: ToolState,
    onion: OnionSkinConfig,
    texture: Arc<GrungeTexture>,
    cache: ImageCache,
    backing: BackingBuffer,
    accumulator: StrokeAccumulator,
    compositor: Compositor,
    refresh: RefreshLoop,
}

impl AnnotationEngine {
    /// Build an engine with zero-sized surfaces; call [`AnnotationEngine::set_geometry`] next.
    #[tracing::instrument(skip_all)]
    pub fn new(config: EngineConfig) -> InkframeResult<Self> {
        config.validate()?;
        let executor = config.build_executor()?;
        let texture = Arc::new(GrungeTexture::generate(config.texture_params()));
        let metrics = BrushMetrics::from_config(&config);
        tracing::debug!(decode = ?config.decode, "annotation engine created");
        Ok(Self {
            geometry: MediaGeometry::default(),
            viewport: None,
            media_kind: MediaKind::default(),
            host_frame: FrameIndex(0),
            playing: false,
            visible: true,
            tools: ToolState::default(),
            onion: OnionSkinConfig::default(),
            cache: ImageCache::new(executor),
            backing: BackingBuffer::default(),
            accumulator: StrokeAccumulator::new(metrics, Arc::clone(&texture)),
            compositor: Compositor::default(),
            refresh: RefreshLoop::new(),
            texture,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The visible composite.
    pub fn display(&self) -> &Surface {
        self.compositor.display()
    }

    pub fn backing(&self) -> &BackingBuffer {
        &self.backing
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn render_stats(&self) -> RenderStats {
        self.compositor.stats()
    }

    pub fn texture(&self) -> &GrungeTexture {
        &self.texture
    }

    pub fn geometry(&self) -> MediaGeometry {
        self.geometry
    }

    pub fn tool_state(&self) -> &ToolState {
        &self.tools
    }

    /// Frame annotations are read from and committed to (always 0 for stills).
    pub fn current_frame(&self) -> FrameIndex {
        self.media_kind.resolve_frame(self.host_frame)
    }

    pub fn is_drawing(&self) -> bool {
        self.accumulator.is_active()
    }

    pub fn live_token(&self) -> Option<LoopToken> {
        match self.refresh.state() {
            LoopState::Drawing(t) => Some(t),
            LoopState::Idle => None,
        }
    }

    /// New native media size. Surfaces are resized in place and reloaded from the store.
    ///
    /// A collapsed (zero-sized) geometry keeps the old surfaces and turns renders into no-ops.
    #[tracing::instrument(skip(self, store))]
    pub fn set_geometry(&mut self, geometry: MediaGeometry, store: &AnnotationStore) {
        if geometry == self.geometry {
            return;
        }
        self.cancel_stroke();
        self.geometry = geometry;
        if geometry.is_empty() {
            tracing::debug!("media collapsed; rendering suspended");
            return;
        }
        self.backing.resize(geometry);
        self.accumulator.resize(geometry);
        self.compositor.resize(geometry);
        self.sync_backing(store);
        self.render(store);
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    #[tracing::instrument(skip(self, store))]
    pub fn set_frame(&mut self, frame: FrameIndex, store: &AnnotationStore) {
        let before = self.current_frame();
        self.host_frame = frame;
        if self.current_frame() == before {
            return;
        }
        if self.accumulator.is_active() {
            tracing::warn!(
                from = before.0,
                to = self.current_frame().0,
                "frame changed mid-stroke; stroke cancelled"
            );
            self.cancel_stroke();
        }
        self.sync_backing(store);
        self.render(store);
    }

    pub fn set_media_kind(&mut self, kind: MediaKind, store: &AnnotationStore) {
        if kind == self.media_kind {
            return;
        }
        let before = self.current_frame();
        self.media_kind = kind;
        if self.current_frame() != before {
            self.cancel_stroke();
            self.sync_backing(store);
        }
        self.render(store);
    }

    /// Playback state. Onion skins and stroke starts are suppressed while playing.
    pub fn set_playing(&mut self, playing: bool, store: &AnnotationStore) {
        if playing == self.playing {
            return;
        }
        self.playing = playing;
        if playing && self.accumulator.is_active() {
            tracing::warn!("playback started mid-stroke; stroke cancelled");
            self.cancel_stroke();
        }
        self.render(store);
    }

    /// Tool and size changes take effect at the next stroke start. An opacity change of the
    /// live stroke's tool applies to that stroke immediately.
    pub fn set_tool_state(&mut self, tools: ToolState) {
        self.tools = tools;
        self.accumulator
            .apply_tool_state(&self.tools, self.backing.surface_mut());
    }

    pub fn set_onion_config(&mut self, onion: OnionSkinConfig, store: &AnnotationStore) {
        if onion == self.onion {
            return;
        }
        self.onion = onion;
        self.render(store);
    }

    pub fn set_annotations_visible(&mut self, visible: bool, store: &AnnotationStore) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        self.render(store);
    }

    /// The host's store changed: evict decodes of blobs no longer referenced, reload the current
    /// frame and re-render.
    #[tracing::instrument(skip_all, fields(revision = store.revision()))]
    pub fn store_changed(&mut self, store: &AnnotationStore) {
        let evicted = self.cache.evict_absent(&store.live_ids());
        tracing::trace!(evicted, "store changed");
        if !self.accumulator.is_active() {
            self.sync_backing(store);
        }
        self.render(store);
    }

    /// Apply finished decodes. Returns how many blobs became ready.
    ///
    /// A failed decode of the current frame leaves it blank and open for drawing.
    pub fn poll_decodes(&mut self, store: &AnnotationStore) -> usize {
        let report = self.cache.poll();
        for &id in &report.failed {
            self.backing.on_failed(id);
        }
        if report.ready.is_empty() {
            return 0;
        }
        for &id in &report.ready {
            self.backing.on_decoded(id, &self.cache);
        }
        if !self.accumulator.is_active() {
            self.render(store);
        }
        report.ready.len()
    }

    /// Start a stroke at a viewport position. Returns the refresh-loop token the host must tick,
    /// or `None` when no stroke started: playing, no tool, already drawing, zero-sized media, or
    /// the current frame's annotation has not finished decoding.
    #[tracing::instrument(skip(self))]
    pub fn pointer_down(&mut self, position: Point) -> Option<LoopToken> {
        if self.playing || self.tools.active == ToolKind::None || self.accumulator.is_active() {
            return None;
        }
        if let Some(pending) = self.backing.pending() {
            tracing::debug!(
                generation = pending.generation,
                "current frame still decoding; stroke not started"
            );
            return None;
        }
        let point = self.to_media(position)?;
        let frame = self.current_frame();
        if let Err(err) =
            self.accumulator
                .begin(&self.tools, frame, point, self.backing.surface_mut())
        {
            tracing::debug!(error = %err, "stroke not started");
            return None;
        }
        Some(self.refresh.start())
    }

    pub fn pointer_move(&mut self, position: Point) {
        if !self.accumulator.is_active() {
            return;
        }
        if let Some(point) = self.to_media(position) {
            self.accumulator.extend(point, self.backing.surface_mut());
        }
    }

    /// Finish the stroke, hand the new frame raster to `sink` and return the frame it belongs to.
    ///
    /// The host writes the blob into its store and then calls
    /// [`AnnotationEngine::store_changed`], which re-renders.
    #[tracing::instrument(skip_all)]
    pub fn pointer_up<S>(&mut self, sink: &mut S) -> InkframeResult<Option<FrameIndex>>
    where
        S: CommitSink + ?Sized,
    {
        if !self.accumulator.is_active() {
            return Ok(None);
        }
        self.refresh.cancel();
        let committed = match self.accumulator.commit(self.backing.surface_mut()) {
            Ok(c) => c,
            Err(err) => {
                // The backing buffer holds unpersisted pixels now; reload on the next sync.
                self.backing.clear();
                return Err(err);
            }
        };

        let id = committed.blob.id();
        self.backing.mark_committed(id);
        // Show and cache what a reload of the blob yields; the PNG round trip rounds
        // partially transparent pixels.
        match decode_image(committed.blob.bytes()) {
            Ok(img) => {
                self.backing.surface_mut().replace_with(&img);
                self.cache.insert_ready(id, Arc::new(img));
            }
            Err(err) => tracing::warn!(error = %err, "committed blob did not decode"),
        }
        sink.annotation_committed(committed.frame, committed.blob);
        Ok(Some(committed.frame))
    }

    /// [`AnnotationEngine::pointer_up`] writing straight into `store`, followed by the re-render.
    pub fn pointer_up_into(
        &mut self,
        store: &mut AnnotationStore,
    ) -> InkframeResult<Option<FrameIndex>> {
        let frame = self.pointer_up(store)?;
        if frame.is_some() {
            self.store_changed(store);
        }
        Ok(frame)
    }

    /// Pointer left the canvas: a stroke that moved is committed, a stroke that never moved is
    /// dropped.
    pub fn pointer_leave<S>(&mut self, sink: &mut S) -> InkframeResult<Option<FrameIndex>>
    where
        S: CommitSink + ?Sized,
    {
        if self.accumulator.has_moved() {
            return self.pointer_up(sink);
        }
        self.cancel_stroke();
        Ok(None)
    }

    /// Drop the stroke in progress without committing anything.
    pub fn cancel_stroke(&mut self) {
        self.refresh.cancel();
        self.accumulator.cancel(self.backing.surface_mut());
    }

    /// One display refresh while drawing. Returns false once `token` is no longer live, which
    /// tells the host to stop scheduling ticks.
    pub fn on_refresh_tick(&mut self, token: LoopToken, store: &AnnotationStore) -> bool {
        if !self.refresh.tick(token) {
            return false;
        }
        self.render(store);
        true
    }

    /// Re-render the display from current state.
    pub fn render(&mut self, store: &AnnotationStore) {
        if self.geometry.is_empty() {
            return;
        }
        let scene = SceneState {
            store,
            frame: self.current_frame(),
            onion: self.onion,
            onion_opacity: self.config.onion,
            suppress_onion: self.playing || self.media_kind == MediaKind::Still,
            visible: self.visible,
        };
        match self.accumulator.live_overlay_opacity() {
            Some(opacity) => {
                self.compositor.render_with_live_stroke(
                    &scene,
                    &mut self.cache,
                    &self.backing,
                    self.accumulator.scratch(),
                    opacity,
                );
            }
            None => {
                self.compositor
                    .render_settled(&scene, &mut self.cache, &self.backing);
            }
        }
    }

    fn sync_backing(&mut self, store: &AnnotationStore) {
        if self.geometry.is_empty() {
            return;
        }
        let outcome = self
            .backing
            .load(store.get(self.current_frame()), &mut self.cache);
        tracing::trace!(?outcome, frame = self.current_frame().0, "backing sync");
    }

    fn to_media(&self, position: Point) -> Option<Point> {
        let viewport = self
            .viewport
            .unwrap_or_else(|| Viewport::matching(self.geometry));
        viewport.to_media(position, self.geometry)
    }
}

#[cfg(test)]
#[path = "../tests/unit/engine.rs"]
mod tests;
