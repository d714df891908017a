//! Annotation blobs, their PNG codec and the decoded-image cache.

/// Content-addressed blobs and the frame -> blob store.
pub mod blob;
/// Memoized asynchronous blob decoding.
pub mod cache;
/// PNG encode/decode between blobs and premultiplied rasters.
pub mod decode;
