//! Premultiplied RGBA8 surfaces and the pixel operations the engine composes with.

/// Per-pixel blend operators.
pub mod composite;
/// Anti-aliased discs and round-capped segments.
pub mod shapes;
/// Owned, resizable raster surface.
pub mod surface;
