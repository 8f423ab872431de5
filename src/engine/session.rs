use std::{
    path::Path,
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::{
    engine::{Animation, Saver},
    foundation::error::{ConvertError, ConvertResult},
    lottie::model::parse_document,
    render::RenderSettings,
};

static ACTIVE_SESSIONS: AtomicUsize = AtomicUsize::new(0);

/// An initialised engine. Dropping it ends the session.
#[derive(Debug)]
pub struct Session {
    settings: RenderSettings,
}

impl Session {
    pub fn init() -> ConvertResult<Self> {
        Self::with_settings(RenderSettings::default())
    }

    pub fn with_settings(settings: RenderSettings) -> ConvertResult<Self> {
        let active = ACTIVE_SESSIONS.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(active, threads = settings.num_threads, "engine session started");
        Ok(Self { settings })
    }

    /// Number of sessions alive in this process.
    pub fn active() -> usize {
        ACTIVE_SESSIONS.load(Ordering::SeqCst)
    }

    pub fn settings(&self) -> RenderSettings {
        self.settings
    }

    /// Read and parse a Lottie file.
    pub fn load(&self, path: impl AsRef<Path>) -> ConvertResult<Animation> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ConvertError::load(format!("failed to read '{}': {e}", path.display()))
        })?;
        let doc = parse_document(&json)
            .map_err(|e| ConvertError::load(format!("'{}': {e}", path.display())))?;
        tracing::debug!(
            path = %path.display(),
            width = doc.w,
            height = doc.h,
            fps = doc.fr,
            frames = doc.total_frames(),
            layers = doc.layers.len(),
            "animation loaded"
        );
        Ok(Animation::new(doc))
    }

    pub fn saver(&self) -> Saver<'_> {
        Saver::new(self)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let active = ACTIVE_SESSIONS.fetch_sub(1, Ordering::SeqCst) - 1;
        tracing::debug!(active, "engine session ended");
    }
}
