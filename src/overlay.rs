use crate::foundation::core::{Canvas, Point};

/// Font size below which caption text stops being readable on any canvas.
pub const MIN_FONT_FLOOR_PX: u32 = 20;

/// Where a caption block is anchored on the canvas.
///
/// Unknown configured values degrade to `Center` instead of failing: a
/// caption must always land somewhere on screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextPosition {
    #[default]
    Center,
    Top,
    Bottom,
}

impl TextPosition {
    /// Lenient parse: unrecognized values fall back to `Center` with a
    /// warning rather than aborting the run.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "center" => Self::Center,
            "top" => Self::Top,
            "bottom" => Self::Bottom,
            other => {
                tracing::warn!(position = other, "unknown text position, using center");
                Self::Center
            }
        }
    }
}

impl<'de> serde::Deserialize<'de> for TextPosition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&s))
    }
}

impl std::fmt::Display for TextPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Center => write!(f, "center"),
            Self::Top => write!(f, "top"),
            Self::Bottom => write!(f, "bottom"),
        }
    }
}

/// Caption rendering parameters for one scene.
///
/// Derived deterministically from the scene text; never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct OverlaySpec {
    pub text: String,
    pub font_size_px: u32,
    pub position: TextPosition,
    pub stroke_width_px: u32,
}

impl OverlaySpec {
    /// Anchor point of the caption block on the canvas.
    ///
    /// `x` is always the horizontal center; `y` is the top of the block.
    pub fn anchor(&self, canvas: Canvas) -> Point {
        let cx = canvas.center().x;
        let fs = f64::from(self.font_size_px);
        match self.position {
            TextPosition::Center => canvas.center(),
            TextPosition::Top => Point::new(cx, fs),
            TextPosition::Bottom => Point::new(cx, f64::from(canvas.height) - 2.0 * fs),
        }
    }
}

/// Computes adaptive caption sizing for scene text.
///
/// Long captions shrink so they stay inside the caption width budget
/// instead of overflowing, down to [`MIN_FONT_FLOOR_PX`].
#[derive(Clone, Copy, Debug)]
pub struct TextOverlayBuilder {
    base_font_size_px: u32,
    stroke_width_px: u32,
    position: TextPosition,
}

impl TextOverlayBuilder {
    pub fn new(base_font_size_px: u32, stroke_width_px: u32, position: TextPosition) -> Self {
        Self {
            base_font_size_px,
            stroke_width_px,
            position,
        }
    }

    pub fn build(&self, scene_text: &str) -> OverlaySpec {
        let shrink = (scene_text.chars().count() / 10) as u32;
        let font_size_px = self
            .base_font_size_px
            .saturating_sub(shrink)
            .max(MIN_FONT_FLOOR_PX);
        OverlaySpec {
            text: scene_text.to_string(),
            font_size_px,
            position: self.position,
            stroke_width_px: self.stroke_width_px,
        }
    }
}
