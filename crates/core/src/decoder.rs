//! QR decoding over raw pixel buffers.

use std::panic::{AssertUnwindSafe, catch_unwind};

use rqrr::PreparedImage;
use tracing::trace;

use crate::frames::{RasterSurface, buffer_len, rgba_to_luma};

/// Decodes a text payload from a frame.
pub trait FrameDecoder {
    /// Decode the first readable QR symbol in `frame`, if any.
    fn decode(&self, frame: &RasterSurface) -> Option<String>;
}

/// [`FrameDecoder`] backed by [`decode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct QrDecoder;

impl FrameDecoder for QrDecoder {
    fn decode(&self, frame: &RasterSurface) -> Option<String> {
        decode(frame.pixels(), frame.width(), frame.height())
    }
}

/// Decode a QR symbol from RGBA8 pixels.
///
/// Dark-on-light symbols are tried first, then light-on-dark. Never panics: short buffers,
/// unreadable frames and failures inside the decoding routine all yield `None`.
#[must_use]
pub fn decode(pixels: &[u8], width: u32, height: u32) -> Option<String> {
    let expected = buffer_len(width, height)?;

    if expected == 0 || pixels.len() < expected {
        return None;
    }

    let w = usize::try_from(width).ok()?;
    let h = usize::try_from(height).ok()?;

    let luma = rgba_to_luma(pixels.get(..expected)?);

    decode_luma(&luma, w, h, false).or_else(|| decode_luma(&luma, w, h, true))
}

fn decode_luma(luma: &[u8], width: usize, height: usize, inverted: bool) -> Option<String> {
    let attempt = catch_unwind(AssertUnwindSafe(|| {
        let mut prepared = PreparedImage::prepare_from_greyscale(width, height, |x, y| {
            let value = luma.get(y * width + x).copied().unwrap_or(u8::MAX);

            if inverted { u8::MAX - value } else { value }
        });

        prepared
            .detect_grids()
            .into_iter()
            .find_map(|grid| match grid.decode() {
                Ok((_, content)) => Some(content),
                Err(error) => {
                    trace!(?error, inverted, "grid decode failed");

                    None
                }
            })
    }));

    attempt.ok().flatten().filter(|content| !content.is_empty())
}
