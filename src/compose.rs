use crate::background::ResolvedBackground;
use crate::foundation::error::{ScenecastError, ScenecastResult};
use crate::overlay::OverlaySpec;

/// Fade-in/fade-out lengths applied to a scene clip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeWindows {
    pub fade_in_sec: f64,
    pub fade_out_sec: f64,
}

impl FadeWindows {
    /// Fit the configured fade length to a clip duration. When the clip is
    /// shorter than two full fades, both are compressed to half the clip so
    /// it never appears instantaneously cut.
    pub fn for_duration(fade_sec: f64, duration_sec: f64) -> Self {
        let fade = fade_sec.max(0.0).min(duration_sec / 2.0);
        Self {
            fade_in_sec: fade,
            fade_out_sec: fade,
        }
    }

    /// Opacity gain at clip-local time `t`, in `[0, 1]`.
    pub fn gain_at(&self, t: f64, duration_sec: f64) -> f64 {
        let mut gain = 1.0f64;
        if self.fade_in_sec > 0.0 {
            gain *= (t / self.fade_in_sec).clamp(0.0, 1.0);
        }
        if self.fade_out_sec > 0.0 {
            let remaining = (duration_sec - t).max(0.0);
            gain *= (remaining / self.fade_out_sec).clamp(0.0, 1.0);
        }
        gain
    }
}

/// The composed visual unit of one scene: background plus caption overlay
/// plus fade envelope. Pixels are produced lazily by the renderer; text and
/// background fade in lockstep because they share the envelope.
#[derive(Clone, Debug)]
pub struct ClipVisual {
    pub background: ResolvedBackground,
    pub overlay: OverlaySpec,
    pub fades: FadeWindows,
}

/// One scene rendered into a timed visual unit, ready for assembly.
#[derive(Clone, Debug)]
pub struct SceneClip {
    /// `Scene.index` this clip was produced from.
    pub source_scene: u32,
    pub duration_sec: f64,
    pub visual: ClipVisual,
}

/// Merges one background and one overlay into a timed scene clip.
#[derive(Clone, Copy, Debug)]
pub struct SceneCompositor {
    fade_sec: f64,
}

impl SceneCompositor {
    pub fn new(fade_sec: f64) -> Self {
        Self { fade_sec }
    }

    /// The returned clip's duration equals the request exactly, regardless
    /// of the background media's native length (video backgrounds are
    /// trimmed or frozen on their last frame at render time).
    pub fn compose(
        &self,
        scene_index: u32,
        background: ResolvedBackground,
        overlay: OverlaySpec,
        duration_sec: f64,
    ) -> ScenecastResult<SceneClip> {
        if !duration_sec.is_finite() || duration_sec <= 0.0 {
            return Err(ScenecastError::invalid_scene(format!(
                "scene {scene_index} clip duration must be > 0, got {duration_sec}"
            )));
        }
        Ok(SceneClip {
            source_scene: scene_index,
            duration_sec,
            visual: ClipVisual {
                background,
                overlay,
                fades: FadeWindows::for_duration(self.fade_sec, duration_sec),
            },
        })
    }
}
