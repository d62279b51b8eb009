use std::path::PathBuf;

use crate::foundation::error::{ScenecastError, ScenecastResult};
use crate::probe;

/// A synthesized (or pre-recorded) voice-over track.
#[derive(Clone, Debug, PartialEq)]
pub struct NarrationTrack {
    pub path: PathBuf,
    pub duration_sec: f64,
}

/// External text-to-speech collaborator.
///
/// A failure here never aborts the run: the pipeline degrades to a silent
/// video, because voice-over is enhancement rather than mandatory content.
pub trait NarrationProvider: Send + Sync {
    fn synthesize(&self, text: &str) -> ScenecastResult<NarrationTrack>;
}

/// Narration provider backed by an already-rendered audio file; only the
/// duration is probed. Useful when voice-over is produced out-of-band.
pub struct PrerenderedNarration {
    path: PathBuf,
}

impl PrerenderedNarration {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl NarrationProvider for PrerenderedNarration {
    fn synthesize(&self, _text: &str) -> ScenecastResult<NarrationTrack> {
        let duration_sec = probe::probe_media_duration(&self.path).map_err(|e| {
            ScenecastError::narration_synthesis(format!(
                "cannot use narration file '{}': {e}",
                self.path.display()
            ))
        })?;
        Ok(NarrationTrack {
            path: self.path.clone(),
            duration_sec,
        })
    }
}
