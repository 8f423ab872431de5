use crate::{
    foundation::core::{Affine, Size},
    foundation::error::{ConvertError, ConvertResult},
    lottie::model::Document,
    render::{FramePlan, compile_frame},
};

/// A loaded animation and the size it will be rendered at.
#[derive(Clone, Debug)]
pub struct Animation {
    doc: Document,
    size: Size,
}

impl Animation {
    pub(crate) fn new(doc: Document) -> Self {
        let size = doc.size();
        Self { doc, size }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// The size the animation was authored at.
    pub fn natural_size(&self) -> Size {
        self.doc.size()
    }

    /// The current render size; equal to the natural size until [`Animation::set_size`].
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, width: f64, height: f64) -> ConvertResult<()> {
        let size = Size::new(width, height);
        if !size.is_valid() {
            return Err(ConvertError::config(format!(
                "animation size must be positive, got {width}x{height}"
            )));
        }
        self.size = size;
        Ok(())
    }

    /// Whole-pixel canvas for the current size.
    pub fn canvas_pixels(&self) -> (u32, u32) {
        self.size.to_pixels()
    }

    /// Native frame rate of the document.
    pub fn frame_rate(&self) -> f64 {
        self.doc.fr
    }

    pub fn duration_secs(&self) -> f64 {
        self.doc.duration_secs()
    }

    /// Number of output frames when sampling at `fps`.
    pub fn frame_count(&self, fps: f64) -> usize {
        ((self.duration_secs() * fps).round() as usize).max(1)
    }

    /// Composition frame sampled by output frame `index` at `fps`.
    pub fn frame_time(&self, index: usize, fps: f64) -> f64 {
        self.doc.ip + index as f64 * self.doc.fr / fps
    }

    fn root_transform(&self) -> Affine {
        let natural = self.natural_size();
        Affine::scale_non_uniform(
            self.size.width / natural.width,
            self.size.height / natural.height,
        )
    }

    /// Draw list for output frame `index` at `fps`.
    pub fn plan(&self, index: usize, fps: f64) -> FramePlan {
        let (width, height) = self.canvas_pixels();
        compile_frame(
            &self.doc,
            self.frame_time(index, fps),
            self.root_transform(),
            width,
            height,
        )
    }
}
