use crate::foundation::error::{ScenecastError, ScenecastResult};

/// Speaking pace assumed when deriving a scene's on-screen duration from its
/// word count.
const SECONDS_PER_WORD: f64 = 0.5;

/// Per-scene duration bounds, loaded once from configuration.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DurationSpec {
    /// Nominal scene length used when estimation is bypassed.
    pub default_sec: f64,
    pub min_sec: f64,
    pub max_sec: f64,
}

impl Default for DurationSpec {
    fn default() -> Self {
        Self {
            default_sec: 5.0,
            min_sec: 1.0,
            max_sec: 30.0,
        }
    }
}

impl DurationSpec {
    pub fn validate(&self) -> ScenecastResult<()> {
        if !(self.min_sec.is_finite() && self.max_sec.is_finite() && self.default_sec.is_finite()) {
            return Err(ScenecastError::invalid_configuration(
                "scene duration bounds must be finite",
            ));
        }
        if self.min_sec <= 0.0 {
            return Err(ScenecastError::invalid_configuration(
                "scene min duration must be > 0",
            ));
        }
        if self.max_sec < self.min_sec {
            return Err(ScenecastError::invalid_configuration(
                "scene max duration must be >= min duration",
            ));
        }
        if self.default_sec < self.min_sec || self.default_sec > self.max_sec {
            return Err(ScenecastError::invalid_configuration(
                "scene default duration must lie within [min, max]",
            ));
        }
        Ok(())
    }
}

/// Derive a scene's on-screen duration from its text length.
///
/// `word_count * 0.5s`, clamped to the configured bounds. Deterministic:
/// the same text and spec always yield the same duration, which keeps test
/// fixtures and preview caches reproducible.
///
/// A scene with no narratable words is rejected: there is nothing to time.
pub fn estimate(scene_text: &str, spec: &DurationSpec) -> ScenecastResult<f64> {
    spec.validate()?;
    let words = scene_text.split_whitespace().count();
    if words == 0 {
        return Err(ScenecastError::invalid_scene(
            "scene text has no narratable words",
        ));
    }
    let raw = words as f64 * SECONDS_PER_WORD;
    Ok(raw.clamp(spec.min_sec, spec.max_sec))
}
