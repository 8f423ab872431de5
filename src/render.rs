//! Frame rendering: compile a document frame into a draw list, then rasterize it on the CPU.

pub mod compile;
pub mod cpu;

pub use compile::{DrawOp, FramePlan, compile_frame};
pub use cpu::CpuRasterizer;

/// A rendered frame. `data` is tightly packed RGBA8, row-major.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RenderSettings {
    /// Opaque color painted under every frame.
    pub background: Option<[u8; 3]>,
    /// Worker threads for the rasterizer; `0` renders on the calling thread.
    pub num_threads: u16,
}
