//! Frame data structures for captured screen content

use image::RgbaImage;
use std::time::Instant;

use crate::capture::Bounds;

/// A captured frame from the shared screen
#[derive(Debug)]
pub struct CapturedFrame {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Timestamp when frame was captured
    pub timestamp: Instant,
}

impl CapturedFrame {
    /// Create a new captured frame
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp: Instant::now(),
        }
    }

    /// Create a frame filled with a single RGBA color
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let len = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        let data = rgba.iter().copied().cycle().take(len).collect();
        Self::new(data, width, height)
    }

    /// Get frame dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Copy the pixels under source-space `bounds` into a standalone image
    ///
    /// Bounds are snapped outwards to whole pixels and clipped to the frame.
    /// Returns `None` if nothing of the rectangle lies inside the frame or the
    /// pixel buffer does not match the frame dimensions.
    pub fn crop(&self, bounds: Bounds) -> Option<RgbaImage> {
        let left = bounds.x.floor().max(0.0) as u32;
        let top = bounds.y.floor().max(0.0) as u32;
        let right = (bounds.right().ceil().max(0.0) as u32).min(self.width);
        let bottom = (bounds.bottom().ceil().max(0.0) as u32).min(self.height);

        if left >= right || top >= bottom {
            return None;
        }

        let width = right - left;
        let row_len = (width as usize).checked_mul(4)?;
        let mut pixels = Vec::with_capacity(row_len.checked_mul((bottom - top) as usize)?);
        for row in top..bottom {
            let start = (row as usize)
                .checked_mul(self.width as usize)?
                .checked_add(left as usize)?
                .checked_mul(4)?;
            let end = start.checked_add(row_len)?;
            pixels.extend_from_slice(self.data.get(start..end)?);
        }

        RgbaImage::from_raw(width, bottom - top, pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_frame(width: u32, height: u32) -> CapturedFrame {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[x as u8, y as u8, 0, 255]);
            }
        }
        CapturedFrame::new(data, width, height)
    }

    #[test]
    fn test_solid_frame() {
        let frame = CapturedFrame::solid(4, 3, [1, 2, 3, 4]);
        assert_eq!(frame.dimensions(), (4, 3));
        assert_eq!(frame.data.len(), 4 * 3 * 4);
        assert_eq!(&frame.data[4..8], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_crop_inside_frame() {
        let frame = gradient_frame(20, 10);
        let image = frame.crop(Bounds::new(5.0, 2.0, 4.0, 3.0)).unwrap();
        assert_eq!(image.dimensions(), (4, 3));
        assert_eq!(image.get_pixel(0, 0).0, [5, 2, 0, 255]);
        assert_eq!(image.get_pixel(3, 2).0, [8, 4, 0, 255]);
    }

    #[test]
    fn test_crop_snaps_fractional_bounds_outwards() {
        let frame = gradient_frame(20, 10);
        let image = frame.crop(Bounds::new(5.5, 2.5, 2.0, 1.0)).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(0, 0).0, [5, 2, 0, 255]);
    }

    #[test]
    fn test_crop_clips_to_frame() {
        let frame = gradient_frame(20, 10);
        let image = frame.crop(Bounds::new(15.0, 8.0, 50.0, 50.0)).unwrap();
        assert_eq!(image.dimensions(), (5, 2));
    }

    #[test]
    fn test_crop_outside_frame() {
        let frame = gradient_frame(20, 10);
        assert!(frame.crop(Bounds::new(25.0, 0.0, 5.0, 5.0)).is_none());
        assert!(frame.crop(Bounds::new(2.0, 2.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_crop_huge_frame_with_short_buffer() {
        let frame = CapturedFrame::new(vec![0; 16], u32::MAX, 2);
        assert!(frame.crop(Bounds::new(0.0, 1.0, 1.0, 1.0)).is_none());
    }

    #[test]
    fn test_crop_truncated_buffer() {
        let frame = CapturedFrame::new(vec![0; 8], 20, 10);
        assert!(frame.crop(Bounds::new(0.0, 0.0, 5.0, 5.0)).is_none());
    }
}
