use crate::{
    assets::blob::{Blob, BlobId},
    assets::cache::{CacheLookup, ImageCache},
    foundation::core::MediaGeometry,
    raster::surface::Surface,
};

/// What a [`BackingBuffer::load`] call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Already showing (or already waiting for) this blob.
    Unchanged,
    /// Decoded raster was ready and has been blitted.
    Loaded,
    /// Decode pending; the blit happens in [`BackingBuffer::on_decoded`].
    Deferred,
    /// No blob for this frame; the buffer was emptied.
    Cleared,
    /// The blob cannot be decoded; the buffer stays blank and accepts new strokes.
    Unreadable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingLoad {
    pub id: BlobId,
    pub generation: u64,
}

/// Committed raster of the current frame.
///
/// Every state change bumps a request generation. A deferred load only lands when the completion
/// matches the outstanding request's blob and that request is still the newest one.
#[derive(Debug, Default)]
pub struct BackingBuffer {
    surface: Surface,
    represents: Option<BlobId>,
    pending: Option<PendingLoad>,
    unreadable: Option<BlobId>,
    generation: u64,
    blits: u64,
}

impl BackingBuffer {
    pub fn new(geometry: MediaGeometry) -> Self {
        Self {
            surface: Surface::new(geometry.width, geometry.height),
            ..Self::default()
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub(crate) fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    pub fn geometry(&self) -> MediaGeometry {
        self.surface.geometry()
    }

    /// Blob whose pixels the buffer currently holds.
    pub fn represents(&self) -> Option<BlobId> {
        self.represents
    }

    pub fn pending(&self) -> Option<PendingLoad> {
        self.pending
    }

    /// Blob the buffer was asked to show but whose decode failed.
    pub fn unreadable(&self) -> Option<BlobId> {
        self.unreadable
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of blits into the buffer so far.
    pub fn blits(&self) -> u64 {
        self.blits
    }

    /// Show `blob` (or nothing, for a frame without annotation).
    pub fn load(&mut self, blob: Option<&Blob>, cache: &mut ImageCache) -> LoadOutcome {
        let Some(blob) = blob else {
            if self.represents.is_none()
                && self.pending.is_none()
                && self.unreadable.is_none()
                && self.surface.is_blank()
            {
                return LoadOutcome::Unchanged;
            }
            self.clear();
            return LoadOutcome::Cleared;
        };

        let id = blob.id();
        let settled = self.represents == Some(id) || self.unreadable == Some(id);
        if self.pending.is_none() && settled {
            return LoadOutcome::Unchanged;
        }
        if self.pending.is_some_and(|p| p.id == id) {
            return LoadOutcome::Unchanged;
        }

        self.generation += 1;
        self.unreadable = None;
        match cache.get_or_decode(blob) {
            CacheLookup::Ready(img) => {
                self.surface.replace_with(&*img);
                self.represents = Some(id);
                self.pending = None;
                self.blits += 1;
                LoadOutcome::Loaded
            }
            CacheLookup::Pending if cache.has_failed(id) => {
                self.surface.clear();
                self.represents = None;
                self.pending = None;
                self.unreadable = Some(id);
                LoadOutcome::Unreadable
            }
            CacheLookup::Pending => {
                // Nothing stale may show while the new frame decodes.
                self.surface.clear();
                self.represents = None;
                self.pending = Some(PendingLoad {
                    id,
                    generation: self.generation,
                });
                LoadOutcome::Deferred
            }
        }
    }

    /// Apply a finished decode of `id`. Returns true when it was the outstanding request and the
    /// buffer now shows it; superseded completions are ignored.
    pub fn on_decoded(&mut self, id: BlobId, cache: &ImageCache) -> bool {
        let Some(pending) = self.pending else {
            return false;
        };
        if pending.id != id || pending.generation != self.generation {
            tracing::trace!(generation = pending.generation, "superseded backing load ignored");
            return false;
        }
        let Some(img) = cache.peek(id) else {
            return false;
        };
        self.surface.replace_with(&*img);
        self.represents = Some(id);
        self.pending = None;
        self.blits += 1;
        true
    }

    /// The outstanding decode of `id` failed. The buffer stays blank and stops waiting, so
    /// the frame can be drawn over. Returns false for superseded or unknown requests.
    pub fn on_failed(&mut self, id: BlobId) -> bool {
        let Some(pending) = self.pending else {
            return false;
        };
        if pending.id != id || pending.generation != self.generation {
            return false;
        }
        self.pending = None;
        self.unreadable = Some(id);
        tracing::debug!(generation = pending.generation, "backing load failed; frame left blank");
        true
    }

    /// Record that the buffer's pixels were just encoded into `id`.
    pub fn mark_committed(&mut self, id: BlobId) {
        self.generation += 1;
        self.represents = Some(id);
        self.pending = None;
        self.unreadable = None;
    }

    pub fn clear(&mut self) {
        self.generation += 1;
        self.surface.clear();
        self.represents = None;
        self.pending = None;
        self.unreadable = None;
    }

    /// Change size. Content never survives; the next `load` reloads from the store.
    pub fn resize(&mut self, geometry: MediaGeometry) {
        self.generation += 1;
        self.surface.resize(geometry.width, geometry.height);
        self.represents = None;
        self.pending = None;
        self.unreadable = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backing.rs"]
mod tests;
