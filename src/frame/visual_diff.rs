use serde::{Deserialize, Serialize};

use crate::frame::frame_model::FrameCapture;

/// Stride used by [`DiffPolicy::Strided`]: a 3-bytes-per-pixel channel
/// layout assumption.
pub const STRIDE_BYTES: usize = 3;

/// How thoroughly two frames are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffPolicy {
    /// Every full pixel is decoded and compared, then any trailing bytes
    /// that do not form a full pixel are compared raw.
    #[default]
    Exhaustive,

    /// Decode at every third byte offset and stop three bytes before the
    /// end of the buffer, so no decode ever reads past the final full pixel.
    ///
    /// This is a performance opt-in, not full coverage: a difference that
    /// only touches skipped offsets goes undetected.
    Strided,
}

/// Pixel equality of two captures under `policy`.
///
/// Buffers of different lengths are never equal. The relation is reflexive
/// and symmetric for both policies.
pub fn frames_equal(a: &FrameCapture, b: &FrameCapture, policy: DiffPolicy) -> bool {
    if a.data.len() != b.data.len() {
        return false;
    }

    match policy {
        DiffPolicy::Exhaustive => exhaustive_equal(a, b),
        DiffPolicy::Strided => strided_equal(a, b),
    }
}

fn exhaustive_equal(a: &FrameCapture, b: &FrameCapture) -> bool {
    let bpp_a = a.format.bytes_per_pixel();
    let bpp_b = b.format.bytes_per_pixel();

    // Differently-sized pixels cannot be paired up by index.
    if bpp_a != bpp_b {
        return a.data == b.data;
    }

    let pixels = a.pixel_count();
    let pixels_equal = (0..pixels).all(|i| a.argb_at(i * bpp_a) == b.argb_at(i * bpp_b));

    pixels_equal && a.data[pixels * bpp_a..] == b.data[pixels * bpp_b..]
}

fn strided_equal(a: &FrameCapture, b: &FrameCapture) -> bool {
    let end = a.data.len().saturating_sub(STRIDE_BYTES);
    (0..end)
        .step_by(STRIDE_BYTES)
        .all(|offset| a.argb_at(offset) == b.argb_at(offset))
}
