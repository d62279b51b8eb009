pub type ScenecastResult<T> = Result<T, ScenecastError>;

/// Error taxonomy for the composition engine.
///
/// Recoverable conditions (a missing background, a failed narration synthesis)
/// are absorbed into documented fallbacks by their components and only show up
/// here when a caller opted out of the fallback. Structural violations (bad
/// configuration, empty scene list) always propagate and terminate the run.
#[derive(thiserror::Error, Debug)]
pub enum ScenecastError {
    #[error("invalid scene: {0}")]
    InvalidScene(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("media resolution failed: {0}")]
    MediaResolution(String),

    #[error("empty timeline: {0}")]
    EmptyTimeline(String),

    #[error("narration synthesis failed: {0}")]
    NarrationSynthesis(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScenecastError {
    pub fn invalid_scene(msg: impl Into<String>) -> Self {
        Self::InvalidScene(msg.into())
    }

    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn media_resolution(msg: impl Into<String>) -> Self {
        Self::MediaResolution(msg.into())
    }

    pub fn empty_timeline(msg: impl Into<String>) -> Self {
        Self::EmptyTimeline(msg.into())
    }

    pub fn narration_synthesis(msg: impl Into<String>) -> Self {
        Self::NarrationSynthesis(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}
