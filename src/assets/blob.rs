use std::{collections::BTreeMap, collections::HashSet, sync::Arc};

use crate::foundation::core::FrameIndex;

/// Content-derived identity of a [`Blob`] (xxh3-64 of its bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlobId(pub(crate) u64);

impl BlobId {
    /// Construct a [`BlobId`] from a raw 64-bit value.
    pub fn from_u64(raw: u64) -> Self {
        Self(raw)
    }

    /// Access the raw 64-bit identifier.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Opaque, immutable encoded raster (PNG bytes) holding one frame's annotation.
///
/// Cloning is cheap; two blobs with identical bytes share an identity.
#[derive(Clone)]
pub struct Blob {
    id: BlobId,
    bytes: Arc<[u8]>,
}

impl Blob {
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        let id = BlobId(xxhash_rust::xxh3::xxh3_64(&bytes));
        Self { id, bytes }
    }

    pub fn id(&self) -> BlobId {
        self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl PartialEq for Blob {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.bytes == other.bytes
    }
}

impl Eq for Blob {}

impl std::fmt::Debug for Blob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blob")
            .field("id", &format_args!("{:016x}", self.id.0))
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Sparse frame -> blob map owned by the host application.
///
/// Every mutation bumps [`AnnotationStore::revision`], which is how the engine notices key-set
/// changes it must evict against.
#[derive(Clone, Debug, Default)]
pub struct AnnotationStore {
    frames: BTreeMap<FrameIndex, Blob>,
    revision: u64,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, frame: FrameIndex) -> Option<&Blob> {
        self.frames.get(&frame)
    }

    pub fn contains(&self, frame: FrameIndex) -> bool {
        self.frames.contains_key(&frame)
    }

    /// Store `blob` for `frame`, returning the blob it replaced.
    pub fn insert(&mut self, frame: FrameIndex, blob: Blob) -> Option<Blob> {
        self.revision += 1;
        self.frames.insert(frame, blob)
    }

    /// Drop the annotation for one frame.
    pub fn remove(&mut self, frame: FrameIndex) -> Option<Blob> {
        let removed = self.frames.remove(&frame);
        if removed.is_some() {
            self.revision += 1;
        }
        removed
    }

    /// Drop every annotation.
    pub fn clear(&mut self) {
        if !self.frames.is_empty() {
            self.frames.clear();
            self.revision += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn iter(&self) -> impl Iterator<Item = (FrameIndex, &Blob)> {
        self.frames.iter().map(|(f, b)| (*f, b))
    }

    /// Identities of every blob currently referenced by some frame.
    pub fn live_ids(&self) -> HashSet<BlobId> {
        self.frames.values().map(Blob::id).collect()
    }
}

/// Receiver of committed annotations, invoked exactly once per completed stroke or erase gesture.
pub trait CommitSink {
    fn annotation_committed(&mut self, frame: FrameIndex, blob: Blob);
}

impl CommitSink for AnnotationStore {
    fn annotation_committed(&mut self, frame: FrameIndex, blob: Blob) {
        self.insert(frame, blob);
    }
}

impl<F> CommitSink for F
where
    F: FnMut(FrameIndex, Blob),
{
    fn annotation_committed(&mut self, frame: FrameIndex, blob: Blob) {
        self(frame, blob)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/blob.rs"]
mod tests;
