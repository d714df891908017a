use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{Arc, mpsc},
};

use crate::{
    assets::blob::{Blob, BlobId},
    assets::decode::{DecodedImage, decode_image},
    foundation::error::{InkframeError, InkframeResult},
};

/// Result of asking the cache for a blob's raster.
#[derive(Clone, Debug)]
pub enum CacheLookup {
    /// Decoded and ready to draw.
    Ready(Arc<DecodedImage>),
    /// Not decoded yet, or never will be (failed decodes stay pending).
    Pending,
}

impl CacheLookup {
    pub fn ready(self) -> Option<Arc<DecodedImage>> {
        match self {
            Self::Ready(img) => Some(img),
            Self::Pending => None,
        }
    }
}

/// One queued decode. Running it reports through the cache's completion channel.
pub struct DecodeJob {
    ticket: u64,
    blob: Blob,
    done: mpsc::Sender<DecodeCompletion>,
}

impl DecodeJob {
    pub fn blob_id(&self) -> BlobId {
        self.blob.id()
    }

    pub fn run(self) {
        let result = decode_image(self.blob.bytes()).map(Arc::new);
        // The receiver only disappears when the cache is dropped; nothing is waiting then.
        let _ = self.done.send(DecodeCompletion {
            id: self.blob.id(),
            ticket: self.ticket,
            result,
        });
    }
}

struct DecodeCompletion {
    id: BlobId,
    ticket: u64,
    result: InkframeResult<Arc<DecodedImage>>,
}

/// Where decode jobs run.
pub trait DecodeExecutor {
    fn submit(&mut self, job: DecodeJob);

    /// Run jobs that execute on the polling thread. Returns how many ran.
    fn run_pending(&mut self) -> usize {
        0
    }
}

/// Single-threaded executor: jobs queue up and run when the cache is polled.
#[derive(Default)]
pub struct CooperativeExecutor {
    queue: VecDeque<DecodeJob>,
}

impl CooperativeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }
}

impl DecodeExecutor for CooperativeExecutor {
    fn submit(&mut self, job: DecodeJob) {
        self.queue.push_back(job);
    }

    fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Some(job) = self.queue.pop_front() {
            job.run();
            ran += 1;
        }
        ran
    }
}

/// Decodes on a dedicated rayon pool; completions are picked up on the next poll.
pub struct PooledExecutor {
    pool: rayon::ThreadPool,
}

impl PooledExecutor {
    pub fn new(threads: Option<usize>) -> InkframeResult<Self> {
        if let Some(n) = threads
            && n == 0
        {
            return Err(InkframeError::config(
                "decode executor 'threads' must be >= 1 when set",
            ));
        }

        let mut builder =
            rayon::ThreadPoolBuilder::new().thread_name(|i| format!("inkframe-decode-{i}"));
        if let Some(n) = threads {
            builder = builder.num_threads(n);
        }
        let pool = builder.build().map_err(|e| {
            InkframeError::config(format!("failed to build decode thread pool: {e}"))
        })?;
        Ok(Self { pool })
    }
}

impl DecodeExecutor for PooledExecutor {
    fn submit(&mut self, job: DecodeJob) {
        self.pool.spawn(move || job.run());
    }
}

enum EntryState {
    Pending,
    Ready(Arc<DecodedImage>),
    Failed,
}

struct CacheEntry {
    ticket: u64,
    state: EntryState,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
    pub evicted: u64,
    /// Completions that arrived for entries evicted or re-registered in the meantime.
    pub discarded: u64,
}

/// Blobs whose decode finished during one [`ImageCache::poll`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PollReport {
    pub ready: Vec<BlobId>,
    /// Failed decodes. These blobs keep reporting [`CacheLookup::Pending`].
    pub failed: Vec<BlobId>,
}

impl PollReport {
    pub fn is_empty(&self) -> bool {
        self.ready.is_empty() && self.failed.is_empty()
    }
}

/// Memoizes decoded blob rasters by blob identity.
///
/// At most one decode per blob is in flight. Entries are dropped by [`ImageCache::evict_absent`]
/// once their blob is no longer referenced by the annotation store, and completions for dropped
/// entries are discarded.
pub struct ImageCache {
    entries: HashMap<BlobId, CacheEntry>,
    decode_counts: HashMap<BlobId, u32>,
    executor: Box<dyn DecodeExecutor>,
    done_tx: mpsc::Sender<DecodeCompletion>,
    done_rx: mpsc::Receiver<DecodeCompletion>,
    next_ticket: u64,
    stats: CacheStats,
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(Box::new(CooperativeExecutor::new()))
    }
}

impl ImageCache {
    pub fn new(executor: Box<dyn DecodeExecutor>) -> Self {
        let (done_tx, done_rx) = mpsc::channel();
        Self {
            entries: HashMap::new(),
            decode_counts: HashMap::new(),
            executor,
            done_tx,
            done_rx,
            next_ticket: 0,
            stats: CacheStats::default(),
        }
    }

    /// Return the decoded raster if ready; otherwise register the blob (starting its decode the
    /// first time it is seen) and report [`CacheLookup::Pending`].
    pub fn get_or_decode(&mut self, blob: &Blob) -> CacheLookup {
        let id = blob.id();
        if let Some(entry) = self.entries.get(&id) {
            return match &entry.state {
                EntryState::Ready(img) => CacheLookup::Ready(Arc::clone(img)),
                EntryState::Pending | EntryState::Failed => CacheLookup::Pending,
            };
        }

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.entries.insert(
            id,
            CacheEntry {
                ticket,
                state: EntryState::Pending,
            },
        );
        *self.decode_counts.entry(id).or_insert(0) += 1;
        self.stats.submitted += 1;
        tracing::debug!(blob = %format_args!("{:016x}", id.0), ticket, "decode submitted");

        self.executor.submit(DecodeJob {
            ticket,
            blob: blob.clone(),
            done: self.done_tx.clone(),
        });
        CacheLookup::Pending
    }

    /// Ready raster for `id`, without registering anything.
    pub fn peek(&self, id: BlobId) -> Option<Arc<DecodedImage>> {
        match &self.entries.get(&id)?.state {
            EntryState::Ready(img) => Some(Arc::clone(img)),
            EntryState::Pending | EntryState::Failed => None,
        }
    }

    /// True when the decode of `id` finished with an error.
    pub fn has_failed(&self, id: BlobId) -> bool {
        self.entries
            .get(&id)
            .is_some_and(|e| matches!(e.state, EntryState::Failed))
    }

    pub fn contains(&self, id: BlobId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Record an already-decoded raster for `id` (used after a commit, where the pixels are known).
    pub fn insert_ready(&mut self, id: BlobId, image: Arc<DecodedImage>) {
        self.next_ticket += 1;
        self.entries.insert(
            id,
            CacheEntry {
                ticket: self.next_ticket,
                state: EntryState::Ready(image),
            },
        );
    }

    /// Drop every entry whose blob is not in `live`. Returns how many were removed.
    pub fn evict_absent(&mut self, live: &HashSet<BlobId>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| live.contains(id));
        self.decode_counts.retain(|id, _| live.contains(id));
        let evicted = before - self.entries.len();
        if evicted > 0 {
            self.stats.evicted += evicted as u64;
            tracing::debug!(evicted, remaining = self.entries.len(), "image cache eviction");
        }
        evicted
    }

    /// Run cooperative decodes and apply finished ones.
    pub fn poll(&mut self) -> PollReport {
        self.executor.run_pending();

        let mut report = PollReport::default();
        while let Ok(done) = self.done_rx.try_recv() {
            let Some(entry) = self.entries.get_mut(&done.id) else {
                self.stats.discarded += 1;
                continue;
            };
            if entry.ticket != done.ticket || !matches!(entry.state, EntryState::Pending) {
                self.stats.discarded += 1;
                continue;
            }
            match done.result {
                Ok(img) => {
                    entry.state = EntryState::Ready(img);
                    self.stats.completed += 1;
                    report.ready.push(done.id);
                }
                Err(err) => {
                    entry.state = EntryState::Failed;
                    self.stats.failed += 1;
                    report.failed.push(done.id);
                    tracing::warn!(
                        blob = %format_args!("{:016x}", done.id.0),
                        error = %err,
                        "annotation blob failed to decode; frame stays blank"
                    );
                }
            }
        }
        report
    }

    /// Number of decodes started for `id` while it has been cached.
    pub fn decode_count(&self, id: BlobId) -> u32 {
        self.decode_counts.get(&id).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
