use std::path::PathBuf;

use rayon::prelude::*;

use crate::background::{BackgroundResolver, MediaSource};
use crate::compose::{SceneClip, SceneCompositor};
use crate::config::{EngineConfig, SceneTiming};
use crate::duration;
use crate::encode;
use crate::foundation::core::{Fps, Rgba8Premul};
use crate::foundation::error::{ScenecastError, ScenecastResult};
use crate::narration::{NarrationProvider, NarrationTrack};
use crate::overlay::TextOverlayBuilder;
use crate::raster::CaptionPainter;
use crate::render::TimelineRenderer;
use crate::scene::{self, Scene};
use crate::timeline::{Timeline, TimelineAssembler};

/// The scene timing & composition engine.
///
/// Construction is fail-fast: configuration and the caption font are
/// validated before any scene work starts. Collaborators (media lookup,
/// narration synthesis) are injected so the core stays testable without
/// network or provider access.
pub struct Engine {
    config: EngineConfig,
    fps: Fps,
    font_bytes: Vec<u8>,
    media: Box<dyn MediaSource>,
    narration: Option<Box<dyn NarrationProvider>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("fps", &self.fps)
            .field("font_bytes", &self.font_bytes.len())
            .field("has_narration", &self.narration.is_some())
            .finish()
    }
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        media: Box<dyn MediaSource>,
        narration: Option<Box<dyn NarrationProvider>>,
    ) -> ScenecastResult<Self> {
        config.validate()?;
        let font_bytes = std::fs::read(&config.font.path).map_err(|e| {
            ScenecastError::invalid_configuration(format!(
                "cannot read caption font '{}': {e}",
                config.font.path.display()
            ))
        })?;
        // Parse once up front so a broken font aborts before any rendering.
        CaptionPainter::from_bytes(&font_bytes, config.font.color_rgba)?;
        let fps = Fps::new(config.fps, 1)?;

        Ok(Self {
            config,
            fps,
            font_bytes,
            media,
            narration,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    fn fallback_color(&self) -> Rgba8Premul {
        let [r, g, b] = self.config.fallback_rgb;
        Rgba8Premul::opaque(r, g, b)
    }

    fn scene_duration(&self, scene: &Scene) -> ScenecastResult<f64> {
        let spec = &self.config.scene_duration;
        match self.config.scene_timing {
            SceneTiming::Estimate => duration::estimate(&scene.text, spec),
            // Fixed timing still validates the text; a scene without words
            // has nothing to narrate either way.
            SceneTiming::Fixed => duration::estimate(&scene.text, spec).map(|_| spec.default_sec),
        }
    }

    /// Convert parsed scenes into an assembled timeline.
    ///
    /// Scenes that fail validation are dropped with a warning and their
    /// siblings continue. Scene clip construction runs across a bounded
    /// worker pool, each worker writing only its own slot; assembly is
    /// strictly sequential and only happens once every clip is present.
    #[tracing::instrument(skip_all, fields(scenes = scenes.len()))]
    pub fn build_timeline(&self, scenes: &[Scene]) -> ScenecastResult<Timeline> {
        scene::validate_scene_order(scenes)?;

        let mut timed: Vec<(&Scene, f64)> = Vec::with_capacity(scenes.len());
        for scene in scenes {
            match self.scene_duration(scene) {
                Ok(duration_sec) => timed.push((scene, duration_sec)),
                Err(err) => {
                    tracing::warn!(scene = scene.index, error = %err, "dropping invalid scene");
                }
            }
        }

        let resolver = BackgroundResolver::new(self.fallback_color(), self.config.background_kind);
        let builder = TextOverlayBuilder::new(
            self.config.font.base_size_px,
            self.config.font.stroke_width_px,
            self.config.font.position,
        );
        let compositor = SceneCompositor::new(self.config.fade_sec);
        let canvas = self.config.canvas;
        let media = self.media.as_ref();

        let pool = build_worker_pool(self.config.worker_threads)?;
        let results: Vec<ScenecastResult<SceneClip>> = pool.install(|| {
            timed
                .par_iter()
                .map(|(scene, duration_sec)| {
                    let background = resolver.resolve(media, &scene.keywords, canvas);
                    let overlay = builder.build(&scene.text);
                    compositor.compose(scene.index, background, overlay, *duration_sec)
                })
                .collect()
        });

        // A fatal composition failure means no partial timeline: every clip
        // must be present before assembly.
        let mut clips = Vec::with_capacity(results.len());
        for result in results {
            clips.push(result?);
        }

        let narration = self.synthesize_narration(&timed);
        let assembler = TimelineAssembler::new(
            self.config.transition.kind,
            self.config.transition.duration_sec,
        )?;
        assembler.assemble(clips, narration)
    }

    fn synthesize_narration(&self, timed: &[(&Scene, f64)]) -> Option<NarrationTrack> {
        let provider = self.narration.as_ref()?;
        let script = timed
            .iter()
            .map(|(scene, _)| scene.text.trim())
            .collect::<Vec<_>>()
            .join(" ");
        match provider.synthesize(&script) {
            Ok(track) => Some(track),
            Err(err) => {
                tracing::warn!(error = %err, "narration unavailable, producing silent video");
                None
            }
        }
    }

    /// A renderer for timelines built by this engine.
    pub fn renderer(&self) -> ScenecastResult<TimelineRenderer> {
        let painter = CaptionPainter::from_bytes(&self.font_bytes, self.config.font.color_rgba)?;
        Ok(TimelineRenderer::new(
            self.config.canvas,
            painter,
            self.config.caption_width_frac,
            self.fallback_color(),
        ))
    }

    /// Build the timeline and export it as an MP4 in one call.
    pub fn render_video(
        &self,
        scenes: &[Scene],
        out_path: impl Into<PathBuf>,
    ) -> ScenecastResult<PathBuf> {
        let timeline = self.build_timeline(scenes)?;
        let mut renderer = self.renderer()?;

        let mut cfg = encode::default_mp4_config(
            out_path,
            self.config.canvas.width,
            self.config.canvas.height,
            self.config.fps,
        );
        cfg.narration_path = timeline.narration.as_ref().map(|n| n.path.clone());

        let [r, g, b] = self.config.fallback_rgb;
        encode::export_timeline(&timeline, &mut renderer, &cfg, [r, g, b, 255])
    }
}

fn build_worker_pool(threads: Option<usize>) -> ScenecastResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        ScenecastError::invalid_configuration(format!("failed to build worker pool: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media_library::NoMedia;

    #[test]
    fn missing_font_fails_at_construction() {
        let mut config = EngineConfig::default();
        config.font.path = "no/such/font.ttf".into();
        let err = Engine::new(config, Box::new(NoMedia), None).unwrap_err();
        assert!(matches!(err, ScenecastError::InvalidConfiguration(_)));
    }

    #[test]
    fn invalid_config_fails_before_font_io() {
        let mut config = EngineConfig::default();
        config.fps = 0;
        let err = Engine::new(config, Box::new(NoMedia), None).unwrap_err();
        assert!(matches!(err, ScenecastError::InvalidConfiguration(_)));
    }

    #[test]
    fn worker_pool_honours_explicit_thread_count() {
        let pool = build_worker_pool(Some(2)).unwrap();
        assert_eq!(pool.current_num_threads(), 2);
        assert!(build_worker_pool(None).is_ok());
    }
}
