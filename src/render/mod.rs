//! Display composition: backing buffer, onion skins, compositor and the live refresh loop.

/// Committed raster of the current frame.
pub mod backing;
/// Draw order into the display surface.
pub mod compositor;
/// Neighbor-frame previews.
pub mod onion;
/// Idle/Drawing refresh state machine.
pub mod refresh;
