//! Shared vocabulary: frame and geometry types, errors, pixel math and engine configuration.

/// Engine tunables and their JSON/env loading.
pub mod config;
/// Frame, geometry, viewport and color types.
pub mod core;
/// Error taxonomy.
pub mod error;
pub(crate) mod math;
