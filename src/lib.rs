//! Inkframe is a frame-indexed raster annotation engine for media viewers.
//!
//! A host shows a still image or video and lets the user draw over it with a brush, a textured
//! "grunge" brush or an eraser. The engine keeps one committed raster per annotated frame (an
//! opaque PNG [`Blob`] in the host's [`AnnotationStore`]) and composes the visible display:
//!
//! - onion skins of neighboring frames at falling opacity
//! - the committed raster of the current frame
//! - the in-progress stroke at the tool opacity
//!
//! Entry point is [`AnnotationEngine`].
#![forbid(unsafe_code)]

/// Blobs, the annotation store and the decoded-image cache.
pub mod assets;
/// Tools, grunge texture and stroke accumulation.
pub mod brush;
mod engine;
/// Core types, errors and configuration.
pub mod foundation;
/// Raster surfaces and pixel operations.
pub mod raster;
/// Display composition.
pub mod render;
/// Headless replay of scripted drawing sessions.
pub mod session;

pub use crate::assets::blob::{AnnotationStore, Blob, BlobId, CommitSink};
pub use crate::assets::cache::{CacheLookup, CacheStats, ImageCache, PollReport};
pub use crate::assets::decode::{DecodedImage, decode_image, encode_png};
pub use crate::brush::texture::{GrungeTexture, TextureParams};
pub use crate::brush::tool::{ToolKind, ToolSettings, ToolState};
pub use crate::engine::AnnotationEngine;
pub use crate::foundation::config::{DecodeMode, EngineConfig, OnionOpacity};
pub use crate::foundation::core::{
    FrameIndex, MediaGeometry, MediaKind, Point, Rect, Rgba8Premul, StrokeColor, Viewport,
};
pub use crate::foundation::error::{InkframeError, InkframeResult};
pub use crate::raster::surface::{Raster, Surface};
pub use crate::render::compositor::RenderStats;
pub use crate::render::onion::OnionSkinConfig;
pub use crate::render::refresh::LoopToken;
