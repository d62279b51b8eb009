use std::str::FromStr;

use crate::compose::SceneClip;
use crate::foundation::error::{ScenecastError, ScenecastResult};
use crate::narration::NarrationTrack;

/// Inter-scene transition. Unlike the overlay-position fallback, an unknown
/// kind is rejected outright: transition choice is an explicit user setting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    #[default]
    Fade,
    Slide,
    None,
}

impl FromStr for TransitionKind {
    type Err = ScenecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fade" => Ok(Self::Fade),
            "slide" => Ok(Self::Slide),
            "none" => Ok(Self::None),
            other => Err(ScenecastError::invalid_configuration(format!(
                "unknown transition kind '{other}' (expected fade, slide or none)"
            ))),
        }
    }
}

impl<'de> serde::Deserialize<'de> for TransitionKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fade => write!(f, "fade"),
            Self::Slide => write!(f, "slide"),
            Self::None => write!(f, "none"),
        }
    }
}

/// A scene clip placed at an absolute position on the timeline.
#[derive(Clone, Debug)]
pub struct PlacedClip {
    pub clip: SceneClip,
    pub start_sec: f64,
}

impl PlacedClip {
    pub fn end_sec(&self) -> f64 {
        self.start_sec + self.clip.duration_sec
    }
}

/// The fully ordered, transition-joined sequence of scene clips with an
/// optional narration track. Handed to the export collaborator and then
/// dropped.
#[derive(Clone, Debug)]
pub struct Timeline {
    pub clips: Vec<PlacedClip>,
    /// End of the last clip (includes transition overlaps).
    pub visual_duration_sec: f64,
    /// Final duration after narration reconciliation.
    pub total_duration_sec: f64,
    pub narration: Option<NarrationTrack>,
    pub transition: TransitionKind,
    pub transition_sec: f64,
}

impl Timeline {
    /// Seconds the final clip's last frame is held beyond the visual end to
    /// cover a longer narration track.
    pub fn tail_hold_sec(&self) -> f64 {
        (self.total_duration_sec - self.visual_duration_sec).max(0.0)
    }

    pub fn validate(&self) -> ScenecastResult<()> {
        if self.clips.is_empty() {
            return Err(ScenecastError::empty_timeline(
                "timeline must contain at least one clip",
            ));
        }
        if self.clips[0].start_sec != 0.0 {
            return Err(ScenecastError::invalid_scene(
                "timeline must start at 0 seconds",
            ));
        }
        for pair in self.clips.windows(2) {
            if pair[1].start_sec < pair[0].start_sec {
                return Err(ScenecastError::invalid_scene(
                    "timeline clips must be placed in order",
                ));
            }
        }
        let visual = self
            .clips
            .last()
            .map(PlacedClip::end_sec)
            .unwrap_or_default();
        if (self.visual_duration_sec - visual).abs() > 1e-9 {
            return Err(ScenecastError::invalid_scene(
                "visual duration does not match clip placements",
            ));
        }
        let expected_total = match &self.narration {
            Some(n) => visual.max(n.duration_sec),
            None => visual,
        };
        if (self.total_duration_sec - expected_total).abs() > 1e-9 {
            return Err(ScenecastError::invalid_scene(
                "total duration does not match narration reconciliation",
            ));
        }
        Ok(())
    }
}

/// Orders scene clips, applies the configured transition, and reconciles
/// the visual length against an optional narration track.
#[derive(Clone, Copy, Debug)]
pub struct TimelineAssembler {
    transition: TransitionKind,
    transition_sec: f64,
}

impl TimelineAssembler {
    pub fn new(transition: TransitionKind, transition_sec: f64) -> ScenecastResult<Self> {
        if !transition_sec.is_finite() || transition_sec < 0.0 {
            return Err(ScenecastError::invalid_configuration(
                "transition duration must be finite and >= 0",
            ));
        }
        Ok(Self {
            transition,
            transition_sec,
        })
    }

    /// Concatenate `clips` (already ordered by scene index) into one
    /// timeline.
    ///
    /// Only `fade` overlaps adjacent clips in the duration math; `slide`
    /// differs from `none` solely in how the cut window is rendered.
    /// Narration is never truncated: a longer track extends the timeline by
    /// holding the final frame.
    #[tracing::instrument(skip_all, fields(clips = clips.len()))]
    pub fn assemble(
        &self,
        clips: Vec<SceneClip>,
        narration: Option<NarrationTrack>,
    ) -> ScenecastResult<Timeline> {
        if clips.is_empty() {
            return Err(ScenecastError::empty_timeline(
                "cannot assemble a timeline from zero scenes",
            ));
        }
        for pair in clips.windows(2) {
            if pair[1].source_scene <= pair[0].source_scene {
                return Err(ScenecastError::invalid_scene(
                    "scene clips must be ordered by scene index",
                ));
            }
        }

        let mut placed = Vec::with_capacity(clips.len());
        let mut cursor = 0.0f64;
        for clip in clips {
            let start_sec = if placed.is_empty() {
                0.0
            } else if self.transition == TransitionKind::Fade {
                let prev: &PlacedClip = placed.last().unwrap();
                // Overlap cannot exceed either neighbour, or a clip would
                // start before its predecessor.
                let overlap = self
                    .transition_sec
                    .min(prev.clip.duration_sec)
                    .min(clip.duration_sec);
                cursor - overlap
            } else {
                cursor
            };
            cursor = start_sec + clip.duration_sec;
            placed.push(PlacedClip { clip, start_sec });
        }

        let visual_duration_sec = cursor;
        let total_duration_sec = match &narration {
            Some(n) if n.duration_sec > visual_duration_sec => {
                tracing::info!(
                    narration_sec = n.duration_sec,
                    visual_sec = visual_duration_sec,
                    "narration outlasts visuals, holding final frame"
                );
                n.duration_sec
            }
            Some(n) => {
                if n.duration_sec < visual_duration_sec {
                    tracing::info!(
                        narration_sec = n.duration_sec,
                        visual_sec = visual_duration_sec,
                        "narration ends before visuals, trailing silence"
                    );
                }
                visual_duration_sec
            }
            None => visual_duration_sec,
        };

        let timeline = Timeline {
            clips: placed,
            visual_duration_sec,
            total_duration_sec,
            narration,
            transition: self.transition,
            transition_sec: self.transition_sec,
        };
        timeline.validate()?;
        Ok(timeline)
    }
}
