use std::{
    fs::File,
    io::Write as _,
    path::{Path, PathBuf},
};

use image::{
    Delay, Frame, RgbaImage,
    codecs::gif::{GifEncoder, Repeat},
};

use crate::{
    encode::ensure_parent_dir,
    foundation::error::{ConvertError, ConvertResult},
    render::FrameRGBA,
};

// Quantizer speed handed to the encoder (1 is best quality, 30 fastest).
const QUANTIZE_SPEED: i32 = 10;

#[derive(Clone, Debug)]
pub struct GifConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// `0` loops forever, otherwise the number of repetitions after the first play.
    pub loop_count: u16,
    /// When set, frames are flattened onto an opaque canvas and carry no transparency.
    pub opaque: bool,
    pub out_path: PathBuf,
}

impl GifConfig {
    pub fn validate(&self) -> ConvertResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConvertError::encode("gif width/height must be non-zero"));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(ConvertError::encode(format!(
                "gif size {}x{} exceeds the format limit of 65535",
                self.width, self.height
            )));
        }
        if self.fps == 0 {
            return Err(ConvertError::encode("gif fps must be non-zero"));
        }
        Ok(())
    }

    fn repeat(&self) -> Repeat {
        match self.loop_count {
            0 => Repeat::Infinite,
            n => Repeat::Finite(n),
        }
    }
}

/// Encode `frames` into an animated GIF at `cfg.out_path`.
///
/// Frames are pulled one at a time; the first error from the iterator aborts the encode before
/// anything is written. The file is flushed and synced to disk before returning. Returns the
/// number of frames written.
pub fn encode_gif<I>(cfg: &GifConfig, frames: I) -> ConvertResult<usize>
where
    I: IntoIterator<Item = ConvertResult<FrameRGBA>>,
{
    cfg.validate()?;

    let mut bytes = Vec::new();
    let mut written = 0usize;
    {
        let mut encoder = GifEncoder::new_with_speed(&mut bytes, QUANTIZE_SPEED);
        encoder
            .set_repeat(cfg.repeat())
            .map_err(|e| ConvertError::encode(e.to_string()))?;

        let delay = Delay::from_numer_denom_ms(1000, cfg.fps);
        for frame in frames {
            let frame = frame?;
            if frame.width != cfg.width || frame.height != cfg.height {
                return Err(ConvertError::encode(format!(
                    "frame size mismatch: expected {}x{}, got {}x{}",
                    cfg.width, cfg.height, frame.width, frame.height
                )));
            }
            let rgba = to_gif_rgba8(&frame, cfg.opaque)?;
            let image = RgbaImage::from_raw(frame.width, frame.height, rgba)
                .ok_or_else(|| ConvertError::encode("frame buffer has the wrong length"))?;
            encoder
                .encode_frame(Frame::from_parts(image, 0, 0, delay))
                .map_err(|e| ConvertError::encode(e.to_string()))?;
            written += 1;
        }
        // Dropping the encoder writes the GIF trailer.
    }
    if written == 0 {
        return Err(ConvertError::encode("no frames to encode"));
    }

    write_synced(&cfg.out_path, &bytes)?;
    tracing::debug!(
        path = %cfg.out_path.display(),
        frames = written,
        bytes = bytes.len(),
        "gif written"
    );
    Ok(written)
}

fn write_synced(path: &Path, bytes: &[u8]) -> ConvertResult<()> {
    ensure_parent_dir(path)?;
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.sync_all()?;
    Ok(())
}

/// Convert a rendered frame to straight RGBA8 suitable for GIF's 1-bit transparency.
fn to_gif_rgba8(frame: &FrameRGBA, opaque: bool) -> ConvertResult<Vec<u8>> {
    let mut out = vec![0u8; frame.data.len()];
    if opaque {
        flatten_to_opaque_rgba8(&mut out, &frame.data, frame.premultiplied, [0, 0, 0, 255])?;
    } else {
        threshold_alpha_rgba8(&mut out, &frame.data, frame.premultiplied)?;
    }
    Ok(out)
}

/// Pixels with alpha below one half become fully transparent; the rest are made opaque using
/// their unpremultiplied color.
fn threshold_alpha_rgba8(dst: &mut [u8], src: &[u8], src_is_premul: bool) -> ConvertResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(ConvertError::encode(
            "threshold_alpha_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = s[3];
        if a < 128 {
            d.copy_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        if a == 255 || !src_is_premul {
            d[..3].copy_from_slice(&s[..3]);
        } else {
            for c in 0..3 {
                d[c] = unpremul(s[c], a);
            }
        }
        d[3] = 255;
    }
    Ok(())
}

fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> ConvertResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(ConvertError::encode(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg = [bg_rgba[0] as u16, bg_rgba[1] as u16, bg_rgba[2] as u16];
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        for c in 0..3 {
            let v = if src_is_premul {
                s[c] as u16 + mul_div255(bg[c], inv)
            } else {
                mul_div255(s[c] as u16, a) + mul_div255(bg[c], inv)
            };
            d[c] = v.min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

fn unpremul(c: u8, a: u8) -> u8 {
    ((u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a)).min(255) as u8
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}
