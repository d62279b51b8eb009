//! End-to-end timeline construction with stub collaborators: no network,
//! no media files, no ffmpeg.

mod support;

use std::path::PathBuf;

use scenecast::{
    BackgroundKind, Engine, EngineConfig, MediaKind, MediaSource, NarrationProvider,
    NarrationTrack, Scene, SceneTiming, ScenecastError, ScenecastResult, TransitionKind,
};

struct StubMedia;
impl MediaSource for StubMedia {
    fn lookup(&self, _: &[String], _: MediaKind) -> ScenecastResult<Option<PathBuf>> {
        Ok(None)
    }
}

struct StubNarration {
    duration_sec: f64,
}
impl NarrationProvider for StubNarration {
    fn synthesize(&self, _text: &str) -> ScenecastResult<NarrationTrack> {
        Ok(NarrationTrack {
            path: "stub-narration.wav".into(),
            duration_sec: self.duration_sec,
        })
    }
}

struct FailingNarration;
impl NarrationProvider for FailingNarration {
    fn synthesize(&self, _text: &str) -> ScenecastResult<NarrationTrack> {
        Err(ScenecastError::narration_synthesis("tts provider is down"))
    }
}

fn base_config() -> Option<EngineConfig> {
    let font = support::find_system_font()?;
    let mut config = EngineConfig::default();
    config.canvas.width = 64;
    config.canvas.height = 36;
    config.fps = 10;
    config.font.path = font;
    config.transition.kind = TransitionKind::None;
    config.transition.duration_sec = 0.0;
    config.fade_sec = 0.0;
    config.scene_duration.min_sec = 3.0;
    config.scene_duration.max_sec = 15.0;
    config.scene_duration.default_sec = 5.0;
    Some(config)
}

fn engine(
    config: EngineConfig,
    narration: Option<Box<dyn NarrationProvider>>,
) -> Engine {
    Engine::new(config, Box::new(StubMedia), narration).unwrap()
}

fn scene(index: u32, words: usize) -> Scene {
    Scene {
        index,
        text: vec!["word"; words].join(" "),
        keywords: vec!["anything".to_string()],
    }
}

#[test]
fn three_scene_durations_follow_the_estimator() {
    let Some(config) = base_config() else {
        eprintln!("skipping: no system font found");
        return;
    };
    let engine = engine(config, None);
    let scenes = vec![scene(1, 10), scene(2, 40), scene(3, 5)];
    let timeline = engine.build_timeline(&scenes).unwrap();

    let durations: Vec<f64> = timeline
        .clips
        .iter()
        .map(|p| p.clip.duration_sec)
        .collect();
    assert_eq!(durations, vec![5.0, 15.0, 3.0]);

    let starts: Vec<f64> = timeline.clips.iter().map(|p| p.start_sec).collect();
    assert_eq!(starts, vec![0.0, 5.0, 20.0]);
    assert_eq!(timeline.total_duration_sec, 23.0);
}

#[test]
fn fixed_timing_uses_the_default_duration() {
    let Some(mut config) = base_config() else {
        eprintln!("skipping: no system font found");
        return;
    };
    config.scene_timing = SceneTiming::Fixed;
    let engine = engine(config, None);
    let timeline = engine
        .build_timeline(&[scene(1, 10), scene(2, 40)])
        .unwrap();
    let durations: Vec<f64> = timeline
        .clips
        .iter()
        .map(|p| p.clip.duration_sec)
        .collect();
    assert_eq!(durations, vec![5.0, 5.0]);
}

#[test]
fn empty_scene_is_dropped_but_siblings_survive() {
    let Some(config) = base_config() else {
        eprintln!("skipping: no system font found");
        return;
    };
    let engine = engine(config, None);
    let scenes = vec![
        scene(1, 6),
        Scene {
            index: 2,
            text: "   ".to_string(),
            keywords: vec![],
        },
        scene(3, 6),
    ];
    let timeline = engine.build_timeline(&scenes).unwrap();
    let indices: Vec<u32> = timeline
        .clips
        .iter()
        .map(|p| p.clip.source_scene)
        .collect();
    assert_eq!(indices, vec![1, 3]);
}

#[test]
fn all_invalid_scenes_yield_an_empty_timeline_error() {
    let Some(config) = base_config() else {
        eprintln!("skipping: no system font found");
        return;
    };
    let engine = engine(config, None);
    let scenes = vec![Scene {
        index: 1,
        text: String::new(),
        keywords: vec![],
    }];
    let err = engine.build_timeline(&scenes).unwrap_err();
    assert!(matches!(err, ScenecastError::EmptyTimeline(_)));
}

#[test]
fn non_contiguous_indices_abort_the_run() {
    let Some(config) = base_config() else {
        eprintln!("skipping: no system font found");
        return;
    };
    let engine = engine(config, None);
    let err = engine
        .build_timeline(&[scene(1, 6), scene(3, 6)])
        .unwrap_err();
    assert!(matches!(err, ScenecastError::InvalidScene(_)));
}

#[test]
fn stub_backgrounds_fall_back_to_generated_color() {
    let Some(config) = base_config() else {
        eprintln!("skipping: no system font found");
        return;
    };
    let engine = engine(config, None);
    let timeline = engine.build_timeline(&[scene(1, 6)]).unwrap();
    assert!(matches!(
        timeline.clips[0].clip.visual.background.kind,
        BackgroundKind::GeneratedColor(_)
    ));
    assert_eq!(
        timeline.clips[0].clip.visual.background.fit_size.width,
        64
    );
}

#[test]
fn longer_narration_extends_the_total_duration() {
    let Some(config) = base_config() else {
        eprintln!("skipping: no system font found");
        return;
    };
    let engine = engine(config, Some(Box::new(StubNarration { duration_sec: 60.0 })));
    let timeline = engine
        .build_timeline(&[scene(1, 10), scene(2, 10)])
        .unwrap();
    assert_eq!(timeline.visual_duration_sec, 10.0);
    assert_eq!(timeline.total_duration_sec, 60.0);
    assert!(timeline.narration.is_some());
}

#[test]
fn failed_narration_degrades_to_a_silent_video() {
    let Some(config) = base_config() else {
        eprintln!("skipping: no system font found");
        return;
    };
    let engine = engine(config, Some(Box::new(FailingNarration)));
    let timeline = engine.build_timeline(&[scene(1, 10)]).unwrap();
    assert!(timeline.narration.is_none());
    assert_eq!(timeline.total_duration_sec, 5.0);
}

#[test]
fn fade_transition_overlaps_in_the_assembled_timeline() {
    let Some(mut config) = base_config() else {
        eprintln!("skipping: no system font found");
        return;
    };
    config.transition.kind = TransitionKind::Fade;
    config.transition.duration_sec = 1.0;
    let engine = engine(config, None);
    let timeline = engine
        .build_timeline(&[scene(1, 10), scene(2, 10)])
        .unwrap();
    assert_eq!(timeline.visual_duration_sec, 9.0);
}

#[test]
fn timeline_build_is_idempotent() {
    let Some(config) = base_config() else {
        eprintln!("skipping: no system font found");
        return;
    };
    let engine = engine(config, Some(Box::new(StubNarration { duration_sec: 30.0 })));
    let scenes = vec![scene(1, 8), scene(2, 20), scene(3, 4)];
    let a = engine.build_timeline(&scenes).unwrap();
    let b = engine.build_timeline(&scenes).unwrap();
    assert_eq!(a.total_duration_sec, b.total_duration_sec);
    assert_eq!(a.visual_duration_sec, b.visual_duration_sec);
    assert_eq!(a.clips.len(), b.clips.len());
}
