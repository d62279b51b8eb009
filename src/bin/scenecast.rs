use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use scenecast::{
    BackgroundKind, Engine, EngineConfig, LocalLibrary, MediaSource, NarrationProvider, NoMedia,
    PrerenderedNarration, Scene, Timeline,
};

#[derive(Parser, Debug)]
#[command(name = "scenecast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a scene project into an MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Print the assembled timeline as JSON without encoding anything.
    Plan(PlanArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Local media library for background lookups (overrides the project).
    #[arg(long)]
    media_dir: Option<PathBuf>,

    /// Pre-rendered narration audio file (overrides the project).
    #[arg(long)]
    narration: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Local media library for background lookups (overrides the project).
    #[arg(long)]
    media_dir: Option<PathBuf>,

    /// Pre-rendered narration audio file (overrides the project).
    #[arg(long)]
    narration: Option<PathBuf>,

    /// Pretty-print the plan JSON.
    #[arg(long)]
    pretty: bool,
}

/// Input project: parsed scenes plus engine settings.
#[derive(serde::Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct Project {
    scenes: Vec<Scene>,
    #[serde(default)]
    config: EngineConfig,
    #[serde(default)]
    media_dir: Option<PathBuf>,
    #[serde(default)]
    narration: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Plan(args) => cmd_plan(args),
    }
}

fn read_project(path: &Path) -> anyhow::Result<Project> {
    let f = File::open(path).with_context(|| format!("open project '{}'", path.display()))?;
    let r = BufReader::new(f);
    let project: Project = serde_json::from_reader(r).with_context(|| "parse project JSON")?;
    Ok(project)
}

fn make_engine(
    project: &Project,
    media_dir: Option<PathBuf>,
    narration: Option<PathBuf>,
) -> anyhow::Result<Engine> {
    let media: Box<dyn MediaSource> = match media_dir.or_else(|| project.media_dir.clone()) {
        Some(dir) => Box::new(LocalLibrary::new(dir)),
        None => Box::new(NoMedia),
    };
    let narration: Option<Box<dyn NarrationProvider>> = narration
        .or_else(|| project.narration.clone())
        .map(|path| Box::new(PrerenderedNarration::new(path)) as Box<dyn NarrationProvider>);

    Ok(Engine::new(project.config.clone(), media, narration)?)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let project = read_project(&args.in_path)?;
    let engine = make_engine(&project, args.media_dir, args.narration)?;
    let out = engine.render_video(&project.scenes, &args.out)?;
    println!("wrote {}", out.display());
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let project = read_project(&args.in_path)?;
    let engine = make_engine(&project, args.media_dir, args.narration)?;
    let timeline = engine.build_timeline(&project.scenes)?;

    let plan = TimelinePlan::from_timeline(&timeline);
    let json = if args.pretty {
        serde_json::to_string_pretty(&plan)?
    } else {
        serde_json::to_string(&plan)?
    };
    println!("{json}");
    Ok(())
}

#[derive(serde::Serialize, Debug)]
struct ScenePlan {
    scene: u32,
    start_sec: f64,
    duration_sec: f64,
    caption_px: u32,
    background: &'static str,
}

#[derive(serde::Serialize, Debug)]
struct TimelinePlan {
    scenes: Vec<ScenePlan>,
    visual_duration_sec: f64,
    total_duration_sec: f64,
    narration_sec: Option<f64>,
    transition: String,
}

impl TimelinePlan {
    fn from_timeline(timeline: &Timeline) -> Self {
        let scenes = timeline
            .clips
            .iter()
            .map(|placed| ScenePlan {
                scene: placed.clip.source_scene,
                start_sec: placed.start_sec,
                duration_sec: placed.clip.duration_sec,
                caption_px: placed.clip.visual.overlay.font_size_px,
                background: match placed.clip.visual.background.kind {
                    BackgroundKind::Image(_) => "image",
                    BackgroundKind::Video(_) => "video",
                    BackgroundKind::GeneratedColor(_) => "color",
                },
            })
            .collect();
        Self {
            scenes,
            visual_duration_sec: timeline.visual_duration_sec,
            total_duration_sec: timeline.total_duration_sec,
            narration_sec: timeline.narration.as_ref().map(|n| n.duration_sec),
            transition: timeline.transition.to_string(),
        }
    }
}
