use std::path::PathBuf;

use crate::background::MediaKind;
use crate::duration::DurationSpec;
use crate::foundation::core::Canvas;
use crate::foundation::error::{ScenecastError, ScenecastResult};
use crate::overlay::TextPosition;
use crate::timeline::TransitionKind;

/// Caption font and styling.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontConfig {
    /// Path to a TTF/OTF file. Must exist when the engine is constructed.
    pub path: PathBuf,
    pub base_size_px: u32,
    /// Straight-alpha RGBA fill color.
    pub color_rgba: [u8; 4],
    pub stroke_width_px: u32,
    pub position: TextPosition,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            base_size_px: 48,
            color_rgba: [255, 255, 255, 255],
            stroke_width_px: 2,
            position: TextPosition::Bottom,
        }
    }
}

/// Inter-scene transition settings.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransitionConfig {
    pub kind: TransitionKind,
    pub duration_sec: f64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            kind: TransitionKind::Fade,
            duration_sec: 0.5,
        }
    }
}

/// How per-scene durations are chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneTiming {
    /// Derive from text length (word count), clamped to the duration bounds.
    #[default]
    Estimate,
    /// Every scene gets the configured default duration.
    Fixed,
}

/// Process-wide engine configuration, constructed once and passed by
/// reference into each component. No component reads ambient global state.
///
/// All fields are strict (`InvalidConfiguration` at engine construction)
/// except `font.position`, which degrades to center.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub canvas: Canvas,
    pub fps: u32,
    pub font: FontConfig,
    /// Caption width budget as a fraction of canvas width.
    pub caption_width_frac: f64,
    pub transition: TransitionConfig,
    /// Per-clip fade-in/fade-out length in seconds.
    pub fade_sec: f64,
    pub scene_duration: DurationSpec,
    pub scene_timing: SceneTiming,
    /// Preferred background asset kind for media lookups.
    pub background_kind: MediaKind,
    /// Solid background color used when media resolution falls through.
    pub fallback_rgb: [u8; 3],
    /// Worker pool size for per-scene composition; `None` = one per core.
    pub worker_threads: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1920,
                height: 1080,
            },
            fps: 30,
            font: FontConfig::default(),
            caption_width_frac: 0.8,
            transition: TransitionConfig::default(),
            fade_sec: 0.5,
            scene_duration: DurationSpec::default(),
            scene_timing: SceneTiming::Estimate,
            background_kind: MediaKind::Image,
            fallback_rgb: [44, 51, 51],
            worker_threads: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> ScenecastResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ScenecastError::invalid_configuration(
                "canvas width/height must be > 0",
            ));
        }
        if self.fps == 0 {
            return Err(ScenecastError::invalid_configuration("fps must be > 0"));
        }
        if self.font.base_size_px == 0 {
            return Err(ScenecastError::invalid_configuration(
                "base font size must be > 0",
            ));
        }
        if !self.caption_width_frac.is_finite()
            || self.caption_width_frac <= 0.0
            || self.caption_width_frac > 1.0
        {
            return Err(ScenecastError::invalid_configuration(
                "caption width fraction must be in (0, 1]",
            ));
        }
        if !self.transition.duration_sec.is_finite() || self.transition.duration_sec < 0.0 {
            return Err(ScenecastError::invalid_configuration(
                "transition duration must be finite and >= 0",
            ));
        }
        if !self.fade_sec.is_finite() || self.fade_sec < 0.0 {
            return Err(ScenecastError::invalid_configuration(
                "fade length must be finite and >= 0",
            ));
        }
        self.scene_duration.validate()?;
        if self.worker_threads == Some(0) {
            return Err(ScenecastError::invalid_configuration(
                "worker thread count must be > 0 when set",
            ));
        }
        Ok(())
    }
}

/// Parse an `EngineConfig` from JSON. Unrecognized options are rejected
/// here rather than silently ignored.
pub fn config_from_json(json: &str) -> ScenecastResult<EngineConfig> {
    let config: EngineConfig = serde_json::from_str(json)
        .map_err(|e| ScenecastError::invalid_configuration(format!("bad config JSON: {e}")))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn unrecognized_option_fails_fast() {
        let err = config_from_json(r#"{ "frame_rate": 30 }"#).unwrap_err();
        assert!(matches!(err, ScenecastError::InvalidConfiguration(_)));
    }

    #[test]
    fn unknown_transition_kind_fails_fast() {
        let err =
            config_from_json(r#"{ "transition": { "kind": "wipe" } }"#).unwrap_err();
        assert!(matches!(err, ScenecastError::InvalidConfiguration(_)));
    }

    #[test]
    fn unknown_text_position_degrades_to_center() {
        let config =
            config_from_json(r#"{ "font": { "position": "underneath" } }"#).unwrap();
        assert_eq!(config.font.position, TextPosition::Center);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut config = EngineConfig::default();
        config.fps = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.caption_width_frac = 1.5;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.scene_duration.min_sec = -1.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.worker_threads = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = config_from_json(r#"{ "fps": 24, "fallback_rgb": [0, 0, 0] }"#).unwrap();
        assert_eq!(config.fps, 24);
        assert_eq!(config.fallback_rgb, [0, 0, 0]);
        assert_eq!(config.canvas.width, 1920);
        assert_eq!(config.transition.kind, TransitionKind::Fade);
    }
}
