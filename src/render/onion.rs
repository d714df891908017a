use smallvec::SmallVec;

use crate::{
    assets::blob::AnnotationStore,
    assets::cache::ImageCache,
    foundation::config::OnionOpacity,
    foundation::core::FrameIndex,
    raster::surface::Surface,
};

pub const MAX_ONION_DEPTH: u32 = 5;

/// Host-controlled onion-skin switch and reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OnionSkinConfig {
    pub enabled: bool,
    /// Frames shown on each side of the current one, clamped to `1..=5`.
    pub depth: u32,
}

impl Default for OnionSkinConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            depth: 2,
        }
    }
}

impl OnionSkinConfig {
    pub fn clamped_depth(self) -> u32 {
        self.depth.clamp(1, MAX_ONION_DEPTH)
    }
}

/// One neighbor frame to draw behind the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OnionLayer {
    pub frame: FrameIndex,
    pub distance: u32,
    pub opacity: f32,
}

/// Neighbor frames `current - i` and `current + i` for `i` in `1..=depth`, nearest first.
///
/// Frames below zero are skipped. Presence in the store is not checked here.
pub fn onion_layers(
    current: FrameIndex,
    depth: u32,
    policy: OnionOpacity,
) -> SmallVec<[OnionLayer; 10]> {
    let mut out = SmallVec::new();
    for distance in 1..=depth.min(MAX_ONION_DEPTH) {
        let opacity = policy.at(distance);
        let d = i64::from(distance);
        for frame in [current.offset(-d), current.offset(d)].into_iter().flatten() {
            out.push(OnionLayer {
                frame,
                distance,
                opacity,
            });
        }
    }
    out
}

/// What an onion pass drew.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OnionReport {
    pub drawn: SmallVec<[OnionLayer; 10]>,
    /// Neighbors present in the store whose decode has not finished.
    pub pending: u32,
}

/// Draw the current frame's annotated neighbors into `target` at falling opacity.
///
/// Neighbors still decoding are skipped; they show up on the render that follows their decode.
pub fn render_onion_skins(
    target: &mut Surface,
    store: &AnnotationStore,
    cache: &mut ImageCache,
    current: FrameIndex,
    config: OnionSkinConfig,
    policy: OnionOpacity,
) -> OnionReport {
    let mut report = OnionReport::default();
    if !config.enabled {
        return report;
    }
    for layer in onion_layers(current, config.clamped_depth(), policy) {
        let Some(blob) = store.get(layer.frame) else {
            continue;
        };
        match cache.get_or_decode(blob).ready() {
            Some(img) => {
                target.draw_fit(&*img, layer.opacity);
                report.drawn.push(layer);
            }
            None => report.pending += 1,
        }
    }
    report
}

#[cfg(test)]
#[path = "../../tests/unit/render/onion.rs"]
mod tests;
