use crate::foundation::error::{InkframeError, InkframeResult};

pub use kurbo::{Point, Rect, Vec2};

/// Frame number of the annotated media. Stills always use frame 0.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// Frame `delta` steps away, or `None` when that would fall below frame 0.
    pub fn offset(self, delta: i64) -> Option<Self> {
        if delta >= 0 {
            self.0.checked_add(delta as u64).map(Self)
        } else {
            self.0.checked_sub(delta.unsigned_abs()).map(Self)
        }
    }
}

/// Whether the annotated media is a single still image or a frame sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Single image: every annotation lives on frame 0.
    Still,
    /// Video: annotations are keyed by the displayed frame.
    #[default]
    Video,
}

impl MediaKind {
    /// Map a host frame number to the frame annotations are stored under.
    pub fn resolve_frame(self, frame: FrameIndex) -> FrameIndex {
        match self {
            Self::Still => FrameIndex(0),
            Self::Video => frame,
        }
    }
}

/// Native pixel size of the annotated media.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MediaGeometry {
    pub width: u32,
    pub height: u32,
}

impl MediaGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A collapsed container (either side 0). Renders against it are no-ops.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn min_side(self) -> u32 {
        self.width.min(self.height)
    }

    pub fn bounds(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// On-screen size of the element displaying the media, used to map pointer positions.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Identity viewport for a media geometry (display pixels == media pixels).
    pub fn matching(geometry: MediaGeometry) -> Self {
        Self {
            width: f64::from(geometry.width),
            height: f64::from(geometry.height),
        }
    }

    /// Convert a viewport-relative position into media pixel coordinates.
    ///
    /// Returns `None` when either side is degenerate, so callers never divide by zero.
    pub fn to_media(self, p: Point, geometry: MediaGeometry) -> Option<Point> {
        if geometry.is_empty()
            || !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return None;
        }
        let sx = f64::from(geometry.width) / self.width;
        let sy = f64::from(geometry.height) / self.height;
        Some(Point::new(p.x * sx, p.y * sy))
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Straight-alpha stroke color as picked by the host, serialized as `#rrggbb` or `#rrggbbaa`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StrokeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl StrokeColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn from_hex(s: &str) -> InkframeResult<Self> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return Err(InkframeError::validation(format!(
                "color '{s}' must be #rrggbb or #rrggbbaa"
            )));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| InkframeError::validation(format!("color '{s}' is not valid hex")))
        };
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a,
        })
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn premultiplied(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }
}

impl Default for StrokeColor {
    fn default() -> Self {
        Self::rgb(255, 0, 0)
    }
}

impl TryFrom<String> for StrokeColor {
    type Error = InkframeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<StrokeColor> for String {
    fn from(value: StrokeColor) -> Self {
        value.to_hex()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
