use std::collections::HashMap;

use fontdue::layout::{
    CoordinateSystem, GlyphPosition, HorizontalAlign, Layout, LayoutSettings, TextStyle,
    VerticalAlign, WrapStyle,
};
use fontdue::{Font, FontSettings};

use crate::background::{self, BackgroundKind, ResolvedBackground};
use crate::composite;
use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::{ScenecastError, ScenecastResult};
use crate::overlay::{OverlaySpec, TextPosition};
use crate::probe;

/// One rendered frame, premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl FrameRgba {
    pub fn solid(canvas: Canvas, color: Rgba8Premul) -> Self {
        let px = color.to_array();
        let mut data = Vec::with_capacity(canvas.pixel_count() * 4);
        for _ in 0..canvas.pixel_count() {
            data.extend_from_slice(&px);
        }
        Self {
            width: canvas.width,
            height: canvas.height,
            data,
        }
    }
}

/// Produce the background pixels of a clip at a clip-local time.
///
/// Still images hold for the whole clip; video sources freeze on their last
/// frame when the cue outlasts them, so the clip duration is honored
/// regardless of the source's native length.
pub fn background_frame(bg: &ResolvedBackground, clip_local_sec: f64) -> ScenecastResult<FrameRgba> {
    match &bg.kind {
        BackgroundKind::GeneratedColor(color) => Ok(FrameRgba::solid(bg.fit_size, *color)),
        BackgroundKind::Image(img) => Ok(FrameRgba {
            width: img.width,
            height: img.height,
            data: img.rgba8_premul.clone(),
        }),
        BackgroundKind::Video(info) => {
            let source_fps = info.source_fps().max(1.0);
            let last_frame_sec = (info.duration_sec - 1.0 / source_fps).max(0.0);
            let t = clip_local_sec.clamp(0.0, last_frame_sec);
            let raw = probe::decode_video_frame_rgba8(info, t)?;
            let native = image::RgbaImage::from_raw(info.width, info.height, raw)
                .ok_or_else(|| ScenecastError::render("decoded video frame has wrong size"))?;
            let fitted = background::fit_rgba_to_canvas(&native, bg.fit_size)?;
            Ok(FrameRgba {
                width: bg.fit_size.width,
                height: bg.fit_size.height,
                data: fitted.into_raw(),
            })
        }
    }
}

#[derive(Debug, Clone)]
struct GlyphBitmap {
    width: usize,
    height: usize,
    bitmap: Vec<u8>,
}

/// CPU caption rasterizer: fontdue glyph layout blended straight onto a
/// premultiplied frame, with an optional offset-stroke outline.
pub struct CaptionPainter {
    font: Font,
    color_rgba: [u8; 4],
    stroke_rgba: [u8; 4],
    glyph_cache: HashMap<fontdue::layout::GlyphRasterConfig, GlyphBitmap>,
}

impl std::fmt::Debug for CaptionPainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionPainter")
            .field("color_rgba", &self.color_rgba)
            .field("stroke_rgba", &self.stroke_rgba)
            .field("cached_glyphs", &self.glyph_cache.len())
            .finish()
    }
}

impl CaptionPainter {
    pub fn from_bytes(font_bytes: &[u8], color_rgba: [u8; 4]) -> ScenecastResult<Self> {
        let font = Font::from_bytes(font_bytes, FontSettings::default())
            .map_err(|e| ScenecastError::invalid_configuration(format!("bad caption font: {e}")))?;
        Ok(Self {
            font,
            color_rgba,
            stroke_rgba: [0, 0, 0, 255],
            glyph_cache: HashMap::new(),
        })
    }

    /// Blend a caption onto `frame` at the overlay's anchored position,
    /// wrapped to the caption width budget, scaled by `gain` (the clip's
    /// fade envelope).
    pub fn paint(
        &mut self,
        frame: &mut FrameRgba,
        spec: &OverlaySpec,
        canvas: Canvas,
        caption_width_frac: f64,
        gain: f32,
    ) -> ScenecastResult<()> {
        if spec.text.trim().is_empty() || gain <= 0.0 {
            return Ok(());
        }

        let wrap_width = (f64::from(canvas.width) * caption_width_frac) as f32;
        let x0 = (canvas.width as f32 - wrap_width) / 2.0;

        // Measuring pass at y=0, then anchor the measured block.
        let measured = self.layout_glyphs(spec, x0, 0.0, wrap_width);
        let block_h = measured
            .iter()
            .map(|g| g.y + g.height as f32)
            .fold(0.0f32, f32::max);

        let anchor = spec.anchor(canvas);
        let block_top = match spec.position {
            TextPosition::Center => anchor.y as f32 - block_h / 2.0,
            TextPosition::Top | TextPosition::Bottom => anchor.y as f32,
        };
        // Keep the block on screen even when the anchor formula would push
        // a tall wrapped caption past an edge.
        let block_top = block_top.clamp(0.0, (canvas.height as f32 - block_h).max(0.0));

        let glyphs = self.layout_glyphs(spec, x0, block_top, wrap_width);

        if spec.stroke_width_px > 0 {
            let s = spec.stroke_width_px as i32;
            let stroke = self.stroke_rgba;
            for (dx, dy) in [
                (-s, 0),
                (s, 0),
                (0, -s),
                (0, s),
                (-s, -s),
                (-s, s),
                (s, -s),
                (s, s),
            ] {
                self.blend_glyphs(frame, &glyphs, dx, dy, stroke, gain)?;
            }
        }
        let fill = self.color_rgba;
        self.blend_glyphs(frame, &glyphs, 0, 0, fill, gain)
    }

    fn layout_glyphs(
        &self,
        spec: &OverlaySpec,
        x: f32,
        y: f32,
        wrap_width: f32,
    ) -> Vec<GlyphPosition> {
        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings {
            x,
            y,
            max_width: Some(wrap_width),
            horizontal_align: HorizontalAlign::Center,
            vertical_align: VerticalAlign::Top,
            wrap_style: WrapStyle::Word,
            ..LayoutSettings::default()
        });
        layout.append(
            &[&self.font],
            &TextStyle::new(&spec.text, spec.font_size_px as f32, 0),
        );
        layout.glyphs().clone()
    }

    fn blend_glyphs(
        &mut self,
        frame: &mut FrameRgba,
        glyphs: &[GlyphPosition],
        dx: i32,
        dy: i32,
        color: [u8; 4],
        gain: f32,
    ) -> ScenecastResult<()> {
        for glyph in glyphs {
            if glyph.width == 0 || glyph.height == 0 {
                continue;
            }
            let bitmap = self.glyph_cache.entry(glyph.key).or_insert_with(|| {
                let (_, bitmap) = self.font.rasterize_config(glyph.key);
                GlyphBitmap {
                    width: glyph.width,
                    height: glyph.height,
                    bitmap,
                }
            });
            blend_glyph(
                frame,
                glyph.x.round() as i32 + dx,
                glyph.y.round() as i32 + dy,
                bitmap,
                color,
                gain,
            );
        }
        Ok(())
    }
}

fn blend_glyph(
    frame: &mut FrameRgba,
    gx: i32,
    gy: i32,
    bitmap: &GlyphBitmap,
    color: [u8; 4],
    gain: f32,
) {
    let fw = frame.width as i32;
    let fh = frame.height as i32;
    for by in 0..bitmap.height {
        let py = gy + by as i32;
        if py < 0 || py >= fh {
            continue;
        }
        for bx in 0..bitmap.width {
            let px = gx + bx as i32;
            if px < 0 || px >= fw {
                continue;
            }
            let coverage = bitmap.bitmap[by * bitmap.width + bx];
            if coverage == 0 {
                continue;
            }
            let alpha = (f32::from(coverage) / 255.0)
                * (f32::from(color[3]) / 255.0)
                * gain.clamp(0.0, 1.0);
            let src =
                Rgba8Premul::from_straight_rgba(color[0], color[1], color[2], (alpha * 255.0) as u8)
                    .to_array();

            let off = (py as usize * frame.width as usize + px as usize) * 4;
            let dst = [
                frame.data[off],
                frame.data[off + 1],
                frame.data[off + 2],
                frame.data[off + 3],
            ];
            let out = composite::over(dst, src, 1.0);
            frame.data[off..off + 4].copy_from_slice(&out);
        }
    }
}

/// Locate a parseable system font for tests that need real glyphs.
#[cfg(test)]
pub(crate) mod test_support {
    use fontdue::{Font, FontSettings};

    pub(crate) fn find_system_font() -> Option<Vec<u8>> {
        for root in ["/usr/share/fonts", "/usr/local/share/fonts"] {
            for entry in walkdir::WalkDir::new(root)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
            {
                let path = entry.path();
                let ext = path.extension().and_then(|e| e.to_str());
                if matches!(ext, Some("ttf") | Some("otf"))
                    && let Ok(bytes) = std::fs::read(path)
                    && Font::from_bytes(bytes.as_slice(), FontSettings::default()).is_ok()
                {
                    return Some(bytes);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::find_system_font;
    use super::*;
    use crate::overlay::TextOverlayBuilder;

    #[test]
    fn solid_frame_is_uniform() {
        let frame = FrameRgba::solid(
            Canvas::new(4, 2).unwrap(),
            Rgba8Premul::opaque(10, 20, 30),
        );
        assert_eq!(frame.data.len(), 4 * 2 * 4);
        assert_eq!(&frame.data[..4], &[10, 20, 30, 255]);
        assert_eq!(&frame.data[frame.data.len() - 4..], &[10, 20, 30, 255]);
    }

    #[test]
    fn garbage_font_bytes_are_a_configuration_error() {
        let err = CaptionPainter::from_bytes(b"not a font", [255; 4]).unwrap_err();
        assert!(matches!(err, ScenecastError::InvalidConfiguration(_)));
    }

    #[test]
    fn painting_marks_pixels() {
        let Some(font_bytes) = find_system_font() else {
            eprintln!("skipping: no system font found");
            return;
        };
        let mut painter = CaptionPainter::from_bytes(&font_bytes, [255, 255, 255, 255]).unwrap();
        let canvas = Canvas::new(320, 180).unwrap();
        let mut frame = FrameRgba::solid(canvas, Rgba8Premul::opaque(0, 0, 0));
        let before = frame.data.clone();

        let spec = TextOverlayBuilder::new(40, 0, TextPosition::Center).build("Hello");
        painter.paint(&mut frame, &spec, canvas, 0.8, 1.0).unwrap();
        assert_ne!(frame.data, before);
    }

    #[test]
    fn zero_gain_paints_nothing() {
        let Some(font_bytes) = find_system_font() else {
            eprintln!("skipping: no system font found");
            return;
        };
        let mut painter = CaptionPainter::from_bytes(&font_bytes, [255, 255, 255, 255]).unwrap();
        let canvas = Canvas::new(320, 180).unwrap();
        let mut frame = FrameRgba::solid(canvas, Rgba8Premul::opaque(0, 0, 0));
        let before = frame.data.clone();

        let spec = TextOverlayBuilder::new(40, 0, TextPosition::Center).build("Hello");
        painter.paint(&mut frame, &spec, canvas, 0.8, 0.0).unwrap();
        assert_eq!(frame.data, before);
    }
}
