use std::{
    io::Write as _,
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::foundation::core::Fps;
use crate::foundation::error::{ScenecastError, ScenecastResult};
use crate::raster::FrameRgba;
use crate::render::TimelineRenderer;
use crate::timeline::Timeline;

/// Export target settings handed to the container writer.
#[derive(Clone, Debug)]
pub struct ExportConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub out_path: PathBuf,
    pub overwrite: bool,
    pub video_codec: String,
    /// Target video bitrate; `None` lets the codec pick.
    pub bitrate_kbps: Option<u32>,
    /// Narration file muxed in as the single audio track.
    pub narration_path: Option<PathBuf>,
}

impl ExportConfig {
    pub fn validate(&self) -> ScenecastResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ScenecastError::invalid_configuration(
                "encode width/height must be non-zero",
            ));
        }
        if self.fps == 0 {
            return Err(ScenecastError::invalid_configuration(
                "encode fps must be non-zero",
            ));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // Default settings target yuv420p output for maximum
            // compatibility, which needs even dimensions.
            return Err(ScenecastError::invalid_configuration(
                "encode width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        if self.video_codec.trim().is_empty() {
            return Err(ScenecastError::invalid_configuration(
                "video codec must be non-empty",
            ));
        }
        if self.bitrate_kbps == Some(0) {
            return Err(ScenecastError::invalid_configuration(
                "video bitrate must be > 0 when set",
            ));
        }
        Ok(())
    }
}

pub fn default_mp4_config(
    out_path: impl Into<PathBuf>,
    width: u32,
    height: u32,
    fps: u32,
) -> ExportConfig {
    ExportConfig {
        width,
        height,
        fps,
        out_path: out_path.into(),
        overwrite: true,
        video_codec: "libx264".to_string(),
        bitrate_kbps: None,
        narration_path: None,
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> ScenecastResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Streams raw RGBA frames into the system `ffmpeg` binary.
///
/// We intentionally use the `ffmpeg` binary rather than native bindings to
/// avoid FFmpeg dev header/lib requirements.
pub struct FfmpegEncoder {
    cfg: ExportConfig,
    bg_rgba: [u8; 4],
    child: Child,
    stdin: Option<ChildStdin>,
    scratch: Vec<u8>,
}

impl FfmpegEncoder {
    pub fn new(cfg: ExportConfig, bg_rgba: [u8; 4]) -> ScenecastResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(ScenecastError::encode(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(ScenecastError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if cfg.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        cmd.args(["-loglevel", "error"]);
        cmd.args([
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
        ]);

        if let Some(narration) = &cfg.narration_path {
            cmd.arg("-i").arg(narration);
            // Video is never shorter than narration after reconciliation,
            // so mapping both streams cannot truncate spoken content.
            cmd.args(["-map", "0:v", "-map", "1:a", "-c:a", "aac"]);
        } else {
            cmd.args(["-map", "0:v"]);
        }

        cmd.args(["-c:v", &cfg.video_codec]);
        if let Some(kbps) = cfg.bitrate_kbps {
            cmd.args(["-b:v", &format!("{kbps}k")]);
        }
        cmd.args(["-pix_fmt", "yuv420p"]);
        cmd.arg(&cfg.out_path);

        let mut child = cmd
            .spawn()
            .map_err(|e| ScenecastError::encode(format!("failed to spawn ffmpeg: {e}")))?;
        let stdin = child.stdin.take();

        Ok(Self {
            scratch: vec![0u8; cfg.width as usize * cfg.height as usize * 4],
            cfg,
            bg_rgba,
            child,
            stdin,
        })
    }

    /// Flatten a premultiplied frame over the background color and pipe it
    /// to the encoder.
    pub fn write_frame(&mut self, frame: &FrameRgba) -> ScenecastResult<()> {
        if frame.width != self.cfg.width || frame.height != self.cfg.height {
            return Err(ScenecastError::encode(
                "frame dimensions do not match encoder configuration",
            ));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(ScenecastError::encode(
                "frame byte length does not match encoder configuration",
            ));
        }

        for (dst, src) in self.scratch.chunks_exact_mut(4).zip(frame.data.chunks_exact(4)) {
            let a = u16::from(src[3]);
            let inv = 255 - a;
            for i in 0..3 {
                let flat = u16::from(src[i]) + ((u16::from(self.bg_rgba[i]) * inv + 127) / 255);
                dst[i] = flat.min(255) as u8;
            }
            dst[3] = 255;
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ScenecastError::encode("encoder already finished"));
        };
        stdin
            .write_all(&self.scratch)
            .map_err(|e| ScenecastError::encode(format!("failed to write frame to ffmpeg: {e}")))
    }

    /// Stop the encoder and discard whatever ffmpeg had written so far.
    pub fn abort(mut self) {
        drop(self.stdin.take());
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_file(&self.cfg.out_path);
    }

    /// Close the stream and wait for ffmpeg to finish the container.
    pub fn finish(mut self) -> ScenecastResult<PathBuf> {
        drop(self.stdin.take());
        let out = self
            .child
            .wait_with_output()
            .map_err(|e| ScenecastError::encode(format!("failed to wait for ffmpeg: {e}")))?;
        if !out.status.success() {
            return Err(ScenecastError::encode(format!(
                "ffmpeg exited with {}: {}",
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        Ok(self.cfg.out_path.clone())
    }
}

/// Render every frame of `timeline` and hand the stream to ffmpeg.
///
/// Either produces a complete file or fails with a specific error; a
/// half-written container is removed rather than left behind.
#[tracing::instrument(skip_all, fields(out = %cfg.out_path.display()))]
pub fn export_timeline(
    timeline: &Timeline,
    renderer: &mut TimelineRenderer,
    cfg: &ExportConfig,
    bg_rgba: [u8; 4],
) -> ScenecastResult<PathBuf> {
    timeline.validate()?;
    let fps = Fps::new(cfg.fps, 1)?;
    let total = renderer.total_frames(timeline, fps);

    let mut encoder = FfmpegEncoder::new(cfg.clone(), bg_rgba)?;
    let result = (|| -> ScenecastResult<()> {
        for frame_idx in 0..total {
            let frame = renderer.render_frame(timeline, frame_idx, fps)?;
            encoder.write_frame(&frame)?;
        }
        Ok(())
    })();

    match result {
        Ok(()) => {
            let path = encoder.finish()?;
            tracing::info!(frames = total, "export complete");
            Ok(path)
        }
        Err(err) => {
            // Never leave a truncated container behind.
            encoder.abort();
            Err(err)
        }
    }
}
