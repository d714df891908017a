use crate::foundation::core::{MediaGeometry, StrokeColor};

/// Drawing tool selected by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Brush,
    Grunge,
    Eraser,
    /// Pointer input is ignored.
    None,
}

/// Size (in reference pixels) and opacity of one tool.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolSettings {
    pub size: f64,
    pub opacity: f32,
}

impl ToolSettings {
    pub const fn new(size: f64, opacity: f32) -> Self {
        Self { size, opacity }
    }

    /// Tool size scaled to the media: `size * min(width, height) / reference_resolution`.
    pub fn normalized_size(self, geometry: MediaGeometry, reference_resolution: f64) -> f64 {
        if !(reference_resolution.is_finite() && reference_resolution > 0.0) {
            return 0.0;
        }
        let size = if self.size.is_finite() { self.size.max(0.0) } else { 0.0 };
        size * f64::from(geometry.min_side()) / reference_resolution
    }

    pub fn clamped_opacity(self) -> f32 {
        if self.opacity.is_finite() {
            self.opacity.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Everything the host's drawing-state owner tells the engine about tools.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ToolState {
    pub active: ToolKind,
    pub color: StrokeColor,
    pub brush: ToolSettings,
    pub grunge: ToolSettings,
    pub eraser: ToolSettings,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            active: ToolKind::Brush,
            color: StrokeColor::default(),
            brush: ToolSettings::new(10.0, 1.0),
            grunge: ToolSettings::new(20.0, 0.5),
            eraser: ToolSettings::new(20.0, 1.0),
        }
    }
}

impl ToolState {
    /// Settings of `tool`, or `None` for [`ToolKind::None`].
    pub fn settings(&self, tool: ToolKind) -> Option<ToolSettings> {
        match tool {
            ToolKind::Brush => Some(self.brush),
            ToolKind::Grunge => Some(self.grunge),
            ToolKind::Eraser => Some(self.eraser),
            ToolKind::None => None,
        }
    }

    pub fn active_settings(&self) -> Option<ToolSettings> {
        self.settings(self.active)
    }

    pub fn with_active(mut self, tool: ToolKind) -> Self {
        self.active = tool;
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/brush/tool.rs"]
mod tests;
