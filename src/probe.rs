use std::path::{Path, PathBuf};

use crate::foundation::error::{ScenecastError, ScenecastResult};

/// Probed metadata for a video background source.
#[derive(Clone, Debug)]
pub struct VideoSourceInfo {
    pub source_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps_num: u32,
    pub fps_den: u32,
    pub duration_sec: f64,
}

impl VideoSourceInfo {
    pub fn source_fps(&self) -> f64 {
        if self.fps_den == 0 {
            0.0
        } else {
            f64::from(self.fps_num) / f64::from(self.fps_den)
        }
    }
}

/// Probe a video file with the system `ffprobe` binary.
pub fn probe_video(source_path: &Path) -> ScenecastResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| ScenecastError::media_resolution(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ScenecastError::media_resolution(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| ScenecastError::media_resolution(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ScenecastError::media_resolution("no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| ScenecastError::media_resolution("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| ScenecastError::media_resolution("missing video height from ffprobe"))?;

    let (fps_num, fps_den) = parse_ff_ratio(video_stream.r_frame_rate.as_deref().unwrap_or("0/1"))
        .ok_or_else(|| ScenecastError::media_resolution("invalid video r_frame_rate"))?;
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        fps_num,
        fps_den,
        duration_sec,
    })
}

/// Probe the container duration of any media file (used for narration
/// tracks, where only the length matters).
pub fn probe_media_duration(path: &Path) -> ScenecastResult<f64> {
    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .map_err(|e| ScenecastError::media_resolution(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ScenecastError::media_resolution(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let text = String::from_utf8_lossy(&out.stdout);
    let duration = text.trim().parse::<f64>().map_err(|_| {
        ScenecastError::media_resolution(format!(
            "ffprobe returned no duration for '{}'",
            path.display()
        ))
    })?;
    if !duration.is_finite() || duration <= 0.0 {
        return Err(ScenecastError::media_resolution(format!(
            "non-positive media duration for '{}'",
            path.display()
        )));
    }
    Ok(duration)
}

/// Decode one RGBA8 frame at `source_time_sec` with the system `ffmpeg`
/// binary. The caller is responsible for clamping the time into the
/// source's duration.
pub fn decode_video_frame_rgba8(
    source: &VideoSourceInfo,
    source_time_sec: f64,
) -> ScenecastResult<Vec<u8>> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-ss", &format!("{source_time_sec:.9}")])
        .arg("-i")
        .arg(&source.source_path)
        .args([
            "-frames:v",
            "1",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .output()
        .map_err(|e| {
            ScenecastError::media_resolution(format!("failed to run ffmpeg for video decode: {e}"))
        })?;

    if !out.status.success() {
        return Err(ScenecastError::media_resolution(format!(
            "ffmpeg video decode failed for '{}': {}",
            source.source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let expected_len = source.width as usize * source.height as usize * 4;
    if expected_len == 0 {
        return Err(ScenecastError::media_resolution(
            "decoded video frame size is zero (invalid source dimensions)",
        ));
    }
    if out.stdout.len() < expected_len {
        return Err(ScenecastError::media_resolution(format!(
            "ffmpeg returned no frame at {source_time_sec:.3}s for '{}'",
            source.source_path.display()
        )));
    }

    Ok(out.stdout[..expected_len].to_vec())
}

fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.parse::<u32>().ok()?;
    let b = parts.next()?.parse::<u32>().ok()?;
    if b == 0 {
        return None;
    }
    Some((a, b))
}
