use std::path::Path;

use anyhow::Context;

use crate::{
    assets::cache::{CooperativeExecutor, DecodeExecutor, PooledExecutor},
    brush::texture::TextureParams,
    foundation::error::{InkframeError, InkframeResult},
};

/// Env var that forces a pooled decode executor with the given thread count.
pub const DECODE_THREADS_ENV: &str = "INKFRAME_DECODE_THREADS";

/// Onion-skin opacity falloff: `max(floor, base - distance * step)`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OnionOpacity {
    pub base: f32,
    pub step: f32,
    pub floor: f32,
}

impl Default for OnionOpacity {
    fn default() -> Self {
        Self {
            base: 0.3,
            step: 0.05,
            floor: 0.05,
        }
    }
}

impl OnionOpacity {
    /// Opacity for a neighbor `distance` frames away (`distance >= 1`).
    pub fn at(self, distance: u32) -> f32 {
        (self.base - distance as f32 * self.step).max(self.floor)
    }
}

/// Where blob decodes run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeMode {
    /// Queue on the engine's thread; drained at every poll.
    #[default]
    Cooperative,
    /// Dedicated rayon pool. `threads: None` lets rayon pick.
    Pooled { threads: Option<usize> },
}

/// Engine tunables. Every field has a default, so `{}` is a valid config document.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub grunge_texture_size: u32,
    pub grunge_scratch_count: u32,
    pub texture_seed: u64,
    /// Tool sizes are authored against a media whose short side is this many pixels.
    pub reference_resolution: f64,
    pub grunge_stamp_scale: f64,
    pub eraser_width_scale: f64,
    pub onion: OnionOpacity,
    pub decode: DecodeMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let texture = TextureParams::default();
        Self {
            grunge_texture_size: texture.size,
            grunge_scratch_count: texture.scratch_count,
            texture_seed: texture.seed,
            reference_resolution: 1080.0,
            grunge_stamp_scale: 6.0,
            eraser_width_scale: 2.0,
            onion: OnionOpacity::default(),
            decode: DecodeMode::Cooperative,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(s: &str) -> InkframeResult<Self> {
        let cfg: Self = serde_json::from_str(s).context("parse engine config json")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> InkframeResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read engine config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Apply `INKFRAME_DECODE_THREADS` if it holds a positive integer; other values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(threads) = std::env::var(DECODE_THREADS_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
        {
            self.decode = DecodeMode::Pooled {
                threads: Some(threads),
            };
        }
        self
    }

    pub fn validate(&self) -> InkframeResult<()> {
        if self.grunge_texture_size == 0 {
            return Err(InkframeError::config("grunge_texture_size must be > 0"));
        }
        for (name, v) in [
            ("reference_resolution", self.reference_resolution),
            ("grunge_stamp_scale", self.grunge_stamp_scale),
            ("eraser_width_scale", self.eraser_width_scale),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(InkframeError::config(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }

        let o = self.onion;
        if ![o.base, o.step, o.floor].iter().all(|v| v.is_finite()) {
            return Err(InkframeError::config("onion opacity values must be finite"));
        }
        if o.step < 0.0 {
            return Err(InkframeError::config("onion.step must be >= 0"));
        }
        if o.floor < 0.0 || o.floor > o.base || o.base > 1.0 {
            return Err(InkframeError::config(
                "onion opacity must satisfy 0 <= floor <= base <= 1",
            ));
        }

        if let DecodeMode::Pooled { threads: Some(0) } = self.decode {
            return Err(InkframeError::config("decode.threads must be >= 1 when set"));
        }
        Ok(())
    }

    pub fn texture_params(&self) -> TextureParams {
        TextureParams {
            size: self.grunge_texture_size,
            scratch_count: self.grunge_scratch_count,
            seed: self.texture_seed,
        }
    }

    pub fn build_executor(&self) -> InkframeResult<Box<dyn DecodeExecutor>> {
        Ok(match self.decode {
            DecodeMode::Cooperative => Box::new(CooperativeExecutor::new()),
            DecodeMode::Pooled { threads } => Box::new(PooledExecutor::new(threads)?),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
