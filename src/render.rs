use crate::composite;
use crate::compose::SceneClip;
use crate::foundation::core::{Canvas, Fps, Rgba8Premul};
use crate::foundation::error::{ScenecastError, ScenecastResult};
use crate::raster::{self, CaptionPainter, FrameRgba};
use crate::timeline::{PlacedClip, Timeline, TransitionKind};

/// Evaluates an assembled [`Timeline`] into premultiplied RGBA frames.
///
/// The renderer owns the caption painter (glyph cache) and the fallback
/// color used when a previously-probed background fails to decode mid-run;
/// a broken background degrades to the solid color instead of aborting.
pub struct TimelineRenderer {
    canvas: Canvas,
    painter: CaptionPainter,
    caption_width_frac: f64,
    fallback: Rgba8Premul,
}

impl TimelineRenderer {
    pub fn new(
        canvas: Canvas,
        painter: CaptionPainter,
        caption_width_frac: f64,
        fallback: Rgba8Premul,
    ) -> Self {
        Self {
            canvas,
            painter,
            caption_width_frac,
            fallback,
        }
    }

    /// Number of frames needed to cover the timeline's total duration.
    pub fn total_frames(&self, timeline: &Timeline, fps: Fps) -> u64 {
        fps.secs_to_frames_ceil(timeline.total_duration_sec).max(1)
    }

    /// Render the frame at `frame / fps` seconds.
    #[tracing::instrument(skip(self, timeline))]
    pub fn render_frame(
        &mut self,
        timeline: &Timeline,
        frame: u64,
        fps: Fps,
    ) -> ScenecastResult<FrameRgba> {
        timeline.validate()?;
        if frame >= self.total_frames(timeline, fps) {
            return Err(ScenecastError::render("frame is out of bounds"));
        }
        let t = fps.frames_to_secs(frame);

        let active: Vec<usize> = timeline
            .clips
            .iter()
            .enumerate()
            .filter(|(_, p)| p.start_sec <= t && t < p.end_sec())
            .map(|(i, _)| i)
            .collect();

        if active.is_empty() {
            // Narration outlasts the visuals: hold the final clip's last
            // frame for the remainder.
            let last = timeline.clips.last().expect("validated non-empty");
            return self.clip_frame(last, last.end_sec());
        }

        let first = &timeline.clips[active[0]];
        let mut out = self.clip_frame(first, t)?;

        if active.len() == 1 {
            let idx = active[0];
            let since_cut = t - first.start_sec;
            if timeline.transition == TransitionKind::Slide
                && idx > 0
                && timeline.transition_sec > 0.0
                && since_cut < timeline.transition_sec
            {
                // Slide renders the cut window: the previous clip's held
                // last frame underneath, the incoming clip sliding over it.
                let prev = &timeline.clips[idx - 1];
                let incoming = out;
                out = self.clip_frame(prev, prev.end_sec())?;
                let progress = (since_cut / timeline.transition_sec) as f32;
                composite::slide_in_place(
                    &mut out.data,
                    &incoming.data,
                    self.canvas.width,
                    self.canvas.height,
                    progress,
                )?;
            }
            return Ok(out);
        }

        // Fade overlap: crossfade toward each later clip by its own window
        // progress. More than two clips only overlap in degenerate
        // configurations; the fold keeps those well-defined.
        let mut window_end = first.end_sec();
        for &idx in &active[1..] {
            let placed = &timeline.clips[idx];
            let overlap = window_end - placed.start_sec;
            let progress = if overlap > 0.0 {
                ((t - placed.start_sec) / overlap).clamp(0.0, 1.0)
            } else {
                1.0
            };
            let next = self.clip_frame(placed, t)?;
            composite::crossfade_in_place(&mut out.data, &next.data, progress as f32)?;
            window_end = window_end.min(placed.end_sec());
        }
        Ok(out)
    }

    fn clip_frame(&mut self, placed: &PlacedClip, t_global: f64) -> ScenecastResult<FrameRgba> {
        let local = (t_global - placed.start_sec).clamp(0.0, placed.clip.duration_sec);
        self.clip_frame_local(&placed.clip, local)
    }

    fn clip_frame_local(&mut self, clip: &SceneClip, local_sec: f64) -> ScenecastResult<FrameRgba> {
        let mut frame = match raster::background_frame(&clip.visual.background, local_sec) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!(
                    scene = clip.source_scene,
                    error = %err,
                    "background frame failed, substituting color fallback"
                );
                FrameRgba::solid(self.canvas, self.fallback)
            }
        };

        let gain = clip.visual.fades.gain_at(local_sec, clip.duration_sec) as f32;
        // Background and caption take the same envelope, independently
        // applied, so both layers fade in lockstep.
        composite::scale_in_place(&mut frame.data, gain)?;
        self.painter.paint(
            &mut frame,
            &clip.visual.overlay,
            self.canvas,
            self.caption_width_frac,
            gain,
        )?;
        Ok(frame)
    }
}
