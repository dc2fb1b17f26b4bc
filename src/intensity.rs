//! Light-intensity diagnostic.
//!
//! Averages the summed RGB channels over a centered crop covering 60% of
//! each axis of the preview frame, then normalizes onto a 0-255 scale as
//! `(sum / 765) * 255`.

use crate::hal::{Frame, RGB_BYTES_PER_PIXEL};

/// Average normalized brightness of the frame's central region.
///
/// Returns 0.0 for degenerate frames (empty crop or invalid buffer).
pub fn average_intensity(frame: &Frame) -> f64 {
    if !frame.is_valid() {
        return 0.0;
    }

    let width = frame.width() as usize;
    let height = frame.height() as usize;

    let start_x = width / 5;
    let start_y = height / 5;
    let end_x = width - start_x;
    let end_y = height - start_y;

    if start_x >= end_x || start_y >= end_y {
        return 0.0;
    }

    let pixels = frame.pixels();
    let mut total: u64 = 0;
    let mut count: u64 = 0;

    for y in start_y..end_y {
        for x in start_x..end_x {
            let offset = (y * width + x) * RGB_BYTES_PER_PIXEL;
            let r = u64::from(pixels[offset]);
            let g = u64::from(pixels[offset + 1]);
            let b = u64::from(pixels[offset + 2]);
            total += r + g + b;
            count += 1;
        }
    }

    let average = total as f64 / count as f64;
    (average / 765.0) * 255.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_frame(width: u32, height: u32, shade: u8) -> Frame {
        let count = (width * height) as usize;
        Frame::new(vec![shade; count * 3], width, height)
    }

    #[test]
    fn test_black_frame_is_zero() {
        let frame = uniform_frame(100, 100, 0);
        assert_eq!(average_intensity(&frame), 0.0);
    }

    #[test]
    fn test_white_frame_is_full_scale() {
        let frame = uniform_frame(100, 100, 255);
        let intensity = average_intensity(&frame);
        assert!((intensity - 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_uniform_gray_maps_linearly() {
        // All channels at 51: sum 153, 153/765*255 = 51.
        let frame = uniform_frame(50, 50, 51);
        let intensity = average_intensity(&frame);
        assert!((intensity - 51.0).abs() < 1e-9);
    }

    #[test]
    fn test_border_is_excluded() {
        // Bright 60% center, black border: intensity reflects the center only.
        let width = 100usize;
        let height = 100usize;
        let mut pixels = vec![0u8; width * height * 3];
        for y in 20..80 {
            for x in 20..80 {
                let offset = (y * width + x) * 3;
                pixels[offset] = 255;
                pixels[offset + 1] = 255;
                pixels[offset + 2] = 255;
            }
        }
        let frame = Frame::new(pixels, width as u32, height as u32);
        let intensity = average_intensity(&frame);
        assert!((intensity - 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_frame_is_zero() {
        let frame = Frame::new(vec![255; 5], 100, 100);
        assert_eq!(average_intensity(&frame), 0.0);
    }
}
