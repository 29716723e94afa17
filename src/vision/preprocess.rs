//! Image preprocessing filters for OCR optimization
//!
//! Optional enhancements applied to a cropped region before recognition,
//! mostly useful for small or low-contrast numbers on screen.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use tracing::{debug, warn};

use crate::config::OcrPreprocessing;

/// Regions smaller than this on either axis are upscaled before recognition
const MIN_OCR_DIMENSION: u32 = 80;

/// Upscaling is skipped when it would push either side past this
const MAX_SCALED_DIMENSION: u32 = 8192;

/// Upscale factor for small regions, between 2x and 4x
pub fn auto_scale(width: u32, height: u32) -> u32 {
    if width == 0 || height == 0 {
        return 1;
    }
    if width >= MIN_OCR_DIMENSION && height >= MIN_OCR_DIMENSION {
        return 1;
    }
    let height_scale = MIN_OCR_DIMENSION.div_ceil(height);
    let width_scale = MIN_OCR_DIMENSION.div_ceil(width);
    height_scale.max(width_scale).clamp(2, 4)
}

/// Target size for a `scale`x upscale, if it stays within bounds
fn scaled_dimensions(width: u32, height: u32, scale: u32) -> Option<(u32, u32)> {
    let scaled_width = width.checked_mul(scale)?;
    let scaled_height = height.checked_mul(scale)?;
    (scaled_width <= MAX_SCALED_DIMENSION && scaled_height <= MAX_SCALED_DIMENSION)
        .then_some((scaled_width, scaled_height))
}

/// Apply preprocessing filters to a region image based on settings
pub fn apply_preprocessing(image: RgbaImage, settings: &OcrPreprocessing) -> RgbaImage {
    if !settings.enabled {
        return image;
    }

    let (width, height) = image.dimensions();
    let scale = settings.scale.max(auto_scale(width, height));

    debug!(
        "OCR preprocessing: grayscale={}, invert={}, contrast={}, scale={} ({}x{})",
        settings.grayscale, settings.invert, settings.contrast, scale, width, height
    );

    // Upscale first so the other filters work on the final resolution
    let mut result = match scaled_dimensions(width, height, scale) {
        Some((w, h)) if scale > 1 => imageops::resize(&image, w, h, FilterType::Triangle),
        Some(_) => image,
        None => {
            warn!("Skipping {}x upscale of {}x{} region image", scale, width, height);
            image
        }
    };

    if (settings.contrast - 1.0).abs() > 0.01 {
        // imageops::contrast takes a percentage change
        result = imageops::contrast(&result, (settings.contrast - 1.0) * 100.0);
    }

    if settings.grayscale {
        result = DynamicImage::ImageLuma8(imageops::grayscale(&result)).to_rgba8();
    }

    if settings.invert {
        imageops::invert(&mut result);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn settings() -> OcrPreprocessing {
        OcrPreprocessing {
            enabled: true,
            grayscale: false,
            invert: false,
            contrast: 1.0,
            scale: 1,
        }
    }

    #[test]
    fn test_preprocessing_disabled() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([100, 150, 200, 255]));
        let settings = OcrPreprocessing {
            enabled: false,
            ..settings()
        };
        let result = apply_preprocessing(image.clone(), &settings);
        assert_eq!(result, image);
    }

    #[test]
    fn test_auto_scale() {
        assert_eq!(auto_scale(200, 200), 1);
        assert_eq!(auto_scale(200, 40), 2);
        assert_eq!(auto_scale(200, 10), 4);
        assert_eq!(auto_scale(0, 10), 1);
    }

    #[test]
    fn test_small_region_is_upscaled() {
        let image = RgbaImage::from_pixel(100, 20, Rgba([0, 0, 0, 255]));
        let result = apply_preprocessing(image, &settings());
        assert_eq!(result.dimensions(), (400, 80));
    }

    #[test]
    fn test_user_scale_wins_when_larger() {
        let image = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255]));
        let settings = OcrPreprocessing {
            scale: 3,
            ..settings()
        };
        assert_eq!(apply_preprocessing(image, &settings).dimensions(), (300, 300));
    }

    #[test]
    fn test_grayscale_and_invert() {
        let image = RgbaImage::from_pixel(100, 100, Rgba([255, 0, 0, 255]));
        let settings = OcrPreprocessing {
            grayscale: true,
            invert: true,
            ..settings()
        };
        let result = apply_preprocessing(image, &settings);
        let pixel = result.get_pixel(0, 0).0;
        assert_eq!(pixel[0], pixel[1]);
        assert_eq!(pixel[1], pixel[2]);
        assert!(pixel[0] > 128, "inverted dark red should be light");
        assert_eq!(pixel[3], 255);
    }

    #[test]
    fn test_oversized_scale_skips_resize() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]));
        let result = apply_preprocessing(
            image,
            &OcrPreprocessing {
                scale: u32::MAX,
                ..settings()
            },
        );
        assert_eq!(result.dimensions(), (2, 2));

        assert_eq!(scaled_dimensions(100, 50, 3), Some((300, 150)));
        assert_eq!(scaled_dimensions(4000, 10, 4), None);
        assert_eq!(scaled_dimensions(2, 2, u32::MAX), None);
    }
}
