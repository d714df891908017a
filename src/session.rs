use std::path::Path;

use anyhow::Context;

use crate::{
    AnnotationEngine, AnnotationStore, EngineConfig, FrameIndex, InkframeError, InkframeResult,
    MediaGeometry, MediaKind, OnionSkinConfig, Point, Surface, ToolState, Viewport,
};

/// Scripted drawing session, replayed headlessly through an [`AnnotationEngine`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplayScript {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub media: MediaKind,
    #[serde(default)]
    pub steps: Vec<ReplayStep>,
}

/// One host event.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ReplayStep {
    Frame { frame: u64 },
    Tools { tools: ToolState },
    Onion { config: OnionSkinConfig },
    Viewport { width: f64, height: f64 },
    Visible { visible: bool },
    /// Pointer down at the first point, moves through the rest, then up.
    Stroke { points: Vec<[f64; 2]> },
    ClearFrame { frame: u64 },
}

impl ReplayScript {
    pub fn from_json_str(s: &str) -> InkframeResult<Self> {
        let script: Self = serde_json::from_str(s).context("parse replay script json")?;
        script.validate()?;
        Ok(script)
    }

    pub fn from_path(path: &Path) -> InkframeResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read replay script '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> InkframeResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(InkframeError::validation(
                "replay media width/height must be > 0",
            ));
        }
        for (i, step) in self.steps.iter().enumerate() {
            if let ReplayStep::Stroke { points } = step {
                if points.is_empty() {
                    return Err(InkframeError::validation(format!(
                        "step {i}: stroke needs at least one point"
                    )));
                }
                if points.iter().flatten().any(|v| !v.is_finite()) {
                    return Err(InkframeError::validation(format!(
                        "step {i}: stroke points must be finite"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// State after a replay.
pub struct ReplayOutcome {
    pub store: AnnotationStore,
    /// Final display composite.
    pub display: Surface,
    pub strokes_committed: usize,
}

/// Run `script` against a fresh engine. Decodes are drained after every step, so the result does
/// not depend on the decode executor.
#[tracing::instrument(skip_all, fields(steps = script.steps.len()))]
pub fn replay(script: &ReplayScript, config: EngineConfig) -> InkframeResult<ReplayOutcome> {
    script.validate()?;
    let mut engine = AnnotationEngine::new(config)?;
    let mut store = AnnotationStore::new();
    engine.set_media_kind(script.media, &store);
    engine.set_geometry(MediaGeometry::new(script.width, script.height), &store);

    let mut strokes_committed = 0;
    for step in &script.steps {
        match step {
            ReplayStep::Frame { frame } => engine.set_frame(FrameIndex(*frame), &store),
            ReplayStep::Tools { tools } => engine.set_tool_state(*tools),
            ReplayStep::Onion { config } => engine.set_onion_config(*config, &store),
            ReplayStep::Viewport { width, height } => {
                engine.set_viewport(Viewport::new(*width, *height))
            }
            ReplayStep::Visible { visible } => engine.set_annotations_visible(*visible, &store),
            ReplayStep::Stroke { points } => {
                let mut pts = points.iter().map(|&[x, y]| Point::new(x, y));
                let Some(first) = pts.next() else {
                    continue;
                };
                let Some(token) = engine.pointer_down(first) else {
                    tracing::warn!("stroke skipped: engine refused to start it");
                    continue;
                };
                for p in pts {
                    engine.pointer_move(p);
                    engine.on_refresh_tick(token, &store);
                }
                if engine.pointer_up_into(&mut store)?.is_some() {
                    strokes_committed += 1;
                }
            }
            ReplayStep::ClearFrame { frame } => {
                store.remove(FrameIndex(*frame));
                engine.store_changed(&store);
            }
        }
        engine.poll_decodes(&store);
    }

    Ok(ReplayOutcome {
        display: engine.display().clone(),
        store,
        strokes_committed,
    })
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
