//! Scenecast turns a timed scene script into an assembled video.
//!
//! The pipeline:
//!
//! 1. **Time**: derive each scene's on-screen duration from its text
//!    ([`duration`])
//! 2. **Resolve**: pick a background per scene — stock/local media or the
//!    guaranteed color fallback ([`BackgroundResolver`])
//! 3. **Overlay**: compute adaptive caption sizing and placement
//!    ([`TextOverlayBuilder`])
//! 4. **Compose**: merge background + caption + fade envelope into a timed
//!    scene clip ([`SceneCompositor`])
//! 5. **Assemble**: join clips with transitions and reconcile against an
//!    optional narration track ([`TimelineAssembler`])
//! 6. **Render/Encode** (optional): evaluate frames on the CPU and stream
//!    them to the system `ffmpeg` binary ([`TimelineRenderer`],
//!    [`export_timeline`])
//!
//! External capabilities (stock media lookup, text-to-speech, container
//! writing) sit behind narrow collaborator traits so the core stays pure
//! and unit-testable.
#![forbid(unsafe_code)]

pub mod background;
pub mod composite;
pub mod compose;
pub mod config;
pub mod duration;
pub mod encode;
mod foundation;
pub mod media_library;
pub mod narration;
pub mod overlay;
pub mod pipeline;
pub mod probe;
pub mod raster;
pub mod render;
pub mod scene;
pub mod timeline;

pub use background::{
    BackgroundKind, BackgroundResolver, CoverFit, MediaKind, MediaSource, PreparedImage,
    ResolvedBackground, cover_fit,
};
pub use compose::{ClipVisual, FadeWindows, SceneClip, SceneCompositor};
pub use config::{EngineConfig, FontConfig, SceneTiming, TransitionConfig, config_from_json};
pub use duration::{DurationSpec, estimate};
pub use encode::{ExportConfig, FfmpegEncoder, default_mp4_config, export_timeline, is_ffmpeg_on_path};
pub use foundation::core::{Canvas, Fps, Point, Rgba8Premul};
pub use foundation::error::{ScenecastError, ScenecastResult};
pub use media_library::{LocalLibrary, NoMedia};
pub use narration::{NarrationProvider, NarrationTrack, PrerenderedNarration};
pub use overlay::{MIN_FONT_FLOOR_PX, OverlaySpec, TextOverlayBuilder, TextPosition};
pub use pipeline::Engine;
pub use probe::VideoSourceInfo;
pub use raster::{CaptionPainter, FrameRgba};
pub use render::TimelineRenderer;
pub use scene::{Scene, validate_scene_order};
pub use timeline::{PlacedClip, Timeline, TimelineAssembler, TransitionKind};
