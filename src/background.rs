use std::path::{Path, PathBuf};

use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::{ScenecastError, ScenecastResult};
use crate::probe::{self, VideoSourceInfo};

/// What kind of asset a media lookup should return.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// External stock/local media collaborator.
///
/// Implementations must return `Ok(None)` on no-match rather than erroring;
/// any `Err` is treated the same as a miss by the resolver. Timeout policy
/// lives behind this boundary, not in the engine.
pub trait MediaSource: Send + Sync {
    fn lookup(&self, keywords: &[String], kind: MediaKind) -> ScenecastResult<Option<PathBuf>>;
}

/// A decoded still image already fitted to the canvas, premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Vec<u8>,
}

/// Background payload as a tagged variant; call sites match on this instead
/// of re-checking file extensions.
#[derive(Clone, Debug)]
pub enum BackgroundKind {
    Image(PreparedImage),
    Video(VideoSourceInfo),
    GeneratedColor(Rgba8Premul),
}

/// One scene's background visual, sized to the target canvas.
///
/// Owned by the compositor call that requested it; the engine never caches
/// or shares these.
#[derive(Clone, Debug)]
pub struct ResolvedBackground {
    pub kind: BackgroundKind,
    pub fit_size: Canvas,
}

/// Scale/crop placement that covers a canvas with a source image: the
/// less-overflowing dimension matches the canvas exactly, the other is
/// center-cropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoverFit {
    pub resize_w: u32,
    pub resize_h: u32,
    pub crop_x: u32,
    pub crop_y: u32,
}

pub fn cover_fit(src_w: u32, src_h: u32, canvas: Canvas) -> ScenecastResult<CoverFit> {
    if src_w == 0 || src_h == 0 {
        return Err(ScenecastError::media_resolution(
            "source media has zero dimensions",
        ));
    }
    let scale_w = f64::from(canvas.width) / f64::from(src_w);
    let scale_h = f64::from(canvas.height) / f64::from(src_h);
    let scale = scale_w.max(scale_h);

    let resize_w = ((f64::from(src_w) * scale).round() as u32).max(canvas.width);
    let resize_h = ((f64::from(src_h) * scale).round() as u32).max(canvas.height);

    Ok(CoverFit {
        resize_w,
        resize_h,
        crop_x: (resize_w - canvas.width) / 2,
        crop_y: (resize_h - canvas.height) / 2,
    })
}

/// Cover-fit an RGBA image buffer to the canvas (resize, then center-crop).
pub fn fit_rgba_to_canvas(img: &image::RgbaImage, canvas: Canvas) -> ScenecastResult<image::RgbaImage> {
    let fit = cover_fit(img.width(), img.height(), canvas)?;
    let resized = image::imageops::resize(
        img,
        fit.resize_w,
        fit.resize_h,
        image::imageops::FilterType::Triangle,
    );
    let cropped = image::imageops::crop_imm(&resized, fit.crop_x, fit.crop_y, canvas.width, canvas.height)
        .to_image();
    Ok(cropped)
}

/// Resolves one scene's background.
///
/// Decision table (a missing background must never abort the video):
///
/// | condition                              | result           |
/// |----------------------------------------|------------------|
/// | empty keyword set                      | generated color  |
/// | lookup returns `Ok(None)`              | generated color  |
/// | lookup returns `Err`                   | generated color  |
/// | asset unreadable / malformed           | generated color  |
/// | asset loads                            | fitted image/video |
#[derive(Clone, Copy, Debug)]
pub struct BackgroundResolver {
    fallback: Rgba8Premul,
    preferred_kind: MediaKind,
}

impl BackgroundResolver {
    pub fn new(fallback: Rgba8Premul, preferred_kind: MediaKind) -> Self {
        Self {
            fallback,
            preferred_kind,
        }
    }

    /// Resolve a background for `keywords`, sized to `canvas`. Infallible:
    /// the generated solid color is the guaranteed last resort.
    pub fn resolve(
        &self,
        source: &dyn MediaSource,
        keywords: &[String],
        canvas: Canvas,
    ) -> ResolvedBackground {
        if keywords.is_empty() {
            return self.generated(canvas);
        }
        match self.try_resolve(source, keywords, canvas) {
            Ok(Some(bg)) => bg,
            Ok(None) => {
                tracing::warn!(?keywords, "no background match, using color fallback");
                self.generated(canvas)
            }
            Err(err) => {
                tracing::warn!(?keywords, error = %err, "background load failed, using color fallback");
                self.generated(canvas)
            }
        }
    }

    fn try_resolve(
        &self,
        source: &dyn MediaSource,
        keywords: &[String],
        canvas: Canvas,
    ) -> ScenecastResult<Option<ResolvedBackground>> {
        let Some(path) = source.lookup(keywords, self.preferred_kind)? else {
            return Ok(None);
        };
        let kind = match self.preferred_kind {
            MediaKind::Image => BackgroundKind::Image(load_image(&path, canvas)?),
            MediaKind::Video => BackgroundKind::Video(probe::probe_video(&path)?),
        };
        Ok(Some(ResolvedBackground {
            kind,
            fit_size: canvas,
        }))
    }

    fn generated(&self, canvas: Canvas) -> ResolvedBackground {
        ResolvedBackground {
            kind: BackgroundKind::GeneratedColor(self.fallback),
            fit_size: canvas,
        }
    }
}

fn load_image(path: &Path, canvas: Canvas) -> ScenecastResult<PreparedImage> {
    let decoded = image::open(path)
        .map_err(|e| {
            ScenecastError::media_resolution(format!(
                "failed to decode image '{}': {e}",
                path.display()
            ))
        })?
        .to_rgba8();
    let fitted = fit_rgba_to_canvas(&decoded, canvas)?;
    let mut rgba8_premul = fitted.into_raw();
    premultiply_in_place(&mut rgba8_premul);
    Ok(PreparedImage {
        width: canvas.width,
        height: canvas.height,
        rgba8_premul,
    })
}

fn premultiply_in_place(rgba8: &mut [u8]) {
    for px in rgba8.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        for c in px.iter_mut().take(3) {
            *c = (((u16::from(*c) * a) + 127) / 255) as u8;
        }
    }
}
