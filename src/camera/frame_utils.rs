//! Pixel-level helpers for captured frames.

use super::types::Frame;

/// Decode a nokhwa buffer (MJPEG, YUYV, NV12, ...) into an RGB [`Frame`].
///
/// `None` when the buffer cannot be decoded.
#[cfg(feature = "vision")]
pub fn convert_to_rgb(buffer: &nokhwa::Buffer) -> Option<Frame> {
    use nokhwa::pixel_format::RgbFormat;

    let resolution = buffer.resolution();
    let decoded = buffer.decode_image::<RgbFormat>().ok()?;
    Some(Frame::rgb(
        decoded.into_raw(),
        resolution.width(),
        resolution.height(),
    ))
}

/// Flip a frame left-right in place.
pub fn mirror_horizontal(frame: &mut Frame) {
    let bpp = frame.bytes_per_pixel();
    let row_len = frame.width as usize * bpp;
    if row_len == 0 {
        return;
    }

    for row in frame.data.chunks_exact_mut(row_len) {
        let (mut left, mut right) = (0, row_len - bpp);
        while left < right {
            for i in 0..bpp {
                row.swap(left + i, right + i);
            }
            left += bpp;
            right -= bpp;
        }
    }
}

/// Copy of the pixels with red and blue swapped, the layout OpenCV draws in.
pub fn rgb_to_bgr(frame: &Frame) -> Vec<u8> {
    let mut out = frame.data.clone();
    for pixel in out.chunks_exact_mut(frame.bytes_per_pixel()) {
        pixel.swap(0, 2);
    }
    out
}
