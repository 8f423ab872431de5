use std::path::{Path, PathBuf};

use crate::{
    encode::{GifConfig, encode_gif},
    engine::{Animation, Session, Shape},
    foundation::error::{ConvertError, ConvertResult},
    render::{CpuRasterizer, RenderSettings},
};

/// Renders animations to GIF files.
///
/// [`Saver::save`] only stages the job; the work happens in [`Saver::sync`], which returns once
/// the file is on disk.
#[derive(Debug)]
pub struct Saver<'s> {
    session: &'s Session,
    background: Option<Shape>,
    pending: Option<SaveJob>,
}

#[derive(Debug)]
struct SaveJob {
    animation: Animation,
    out_path: PathBuf,
    loop_count: u16,
    fps: f64,
}

impl<'s> Saver<'s> {
    pub(crate) fn new(session: &'s Session) -> Self {
        Self {
            session,
            background: None,
            pending: None,
        }
    }

    /// Draw `shape` under every frame of the next saved animation.
    pub fn background(&mut self, shape: Shape) -> ConvertResult<()> {
        if shape.fill().is_none() {
            return Err(ConvertError::session("background shape has no fill"));
        }
        self.background = Some(shape);
        Ok(())
    }

    /// Stage `animation` for encoding to `path`.
    ///
    /// `loop_count == 0` loops forever. `fps == 0` samples at the animation's own frame rate.
    pub fn save(
        &mut self,
        animation: Animation,
        path: impl AsRef<Path>,
        loop_count: u16,
        fps: u32,
    ) -> ConvertResult<()> {
        if self.pending.is_some() {
            return Err(ConvertError::session(
                "a save is already pending; call sync first",
            ));
        }
        if !animation.size().is_valid() {
            return Err(ConvertError::config("animation has no usable size"));
        }
        let (width, height) = animation.canvas_pixels();
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(ConvertError::config(format!(
                "output size {width}x{height} exceeds the gif limit of 65535"
            )));
        }

        let fps = if fps == 0 {
            animation.frame_rate()
        } else {
            f64::from(fps)
        };
        self.pending = Some(SaveJob {
            animation,
            out_path: path.as_ref().to_path_buf(),
            loop_count,
            fps,
        });
        Ok(())
    }

    /// Render and encode the staged animation, blocking until the file is durably written.
    pub fn sync(&mut self) -> ConvertResult<()> {
        let job = self
            .pending
            .take()
            .ok_or_else(|| ConvertError::session("nothing to sync; call save first"))?;
        let background = self.background.take();

        let (width, height) = job.animation.canvas_pixels();
        // A full-canvas background is painted by the rasterizer and makes every pixel opaque.
        let full_bg = background.filter(|bg| bg.covers(width, height));
        let partial_bg = background.filter(|_| full_bg.is_none());

        let mut settings = RenderSettings {
            background: None,
            ..self.session.settings()
        };
        if let Some(color) = full_bg.and_then(|bg| bg.fill()) {
            settings.background = Some([color.r, color.g, color.b]);
        }
        let mut rasterizer = CpuRasterizer::new(settings);

        let gif_fps = job.fps.round().clamp(1.0, f64::from(u32::MAX)) as u32;
        let cfg = GifConfig {
            width,
            height,
            fps: gif_fps,
            loop_count: job.loop_count,
            opaque: full_bg.is_some(),
            out_path: job.out_path.clone(),
        };

        let count = job.animation.frame_count(job.fps);
        tracing::debug!(
            path = %job.out_path.display(),
            width,
            height,
            fps = job.fps,
            frames = count,
            "encoding"
        );

        let underlay = partial_bg.and_then(|bg| bg.draw_op());
        let frames = (0..count).map(|index| {
            let mut plan = job.animation.plan(index, job.fps);
            if let Some(op) = &underlay {
                plan.ops.insert(0, op.clone());
            }
            rasterizer.render(&plan)
        });
        encode_gif(&cfg, frames)?;
        Ok(())
    }
}
