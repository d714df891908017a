//! Drawing tools and the stroke staging area.

/// Stroke begin/extend/commit/cancel.
pub mod accumulator;
/// Grunge dab built from the texture mask.
pub mod stamp;
/// Procedural grunge alpha mask.
pub mod texture;
/// Tool selection and per-tool settings.
pub mod tool;
