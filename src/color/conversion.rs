//! Pixel color conversions
//!
//! Provides the two conversions the pipeline needs:
//! - RGB to single-channel intensity (BT.601 luma) for binarization
//! - RGB to 8-bit HSV for spot color features
//!
//! HSV uses the common 8-bit packing: hue in half-degrees (0..=179),
//! saturation and value in 0..=255.

use image::{GrayImage, Luma, RgbImage};
use palette::{FromColor, Hsv, Srgb};
use serde::{Deserialize, Serialize};

use crate::constants::{hsv, luma};

/// Color sampled at a single pixel, in both RGB and HSV form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSample {
    /// Source pixel as `[red, green, blue]`
    pub rgb: [u8; 3],
    /// 8-bit HSV as `[hue, saturation, value]`
    pub hsv: [u8; 3],
}

impl ColorSample {
    /// Sample the pixel at `(x, y)`, or `None` when outside the image
    pub fn at(image: &RgbImage, x: i64, y: i64) -> Option<Self> {
        if x < 0 || y < 0 || x >= i64::from(image.width()) || y >= i64::from(image.height()) {
            return None;
        }
        let rgb = image.get_pixel(x as u32, y as u32).0;
        Some(Self {
            rgb,
            hsv: rgb_to_hsv(rgb),
        })
    }

    pub fn hue(&self) -> u8 {
        self.hsv[0]
    }

    pub fn saturation(&self) -> u8 {
        self.hsv[1]
    }

    pub fn value(&self) -> u8 {
        self.hsv[2]
    }
}

/// Convert an RGB pixel to 8-bit HSV
///
/// # Arguments
///
/// * `rgb` - `[red, green, blue]` in 0..=255
///
/// # Returns
///
/// `[hue, saturation, value]` with hue in half-degrees
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let srgb = Srgb::new(rgb[0], rgb[1], rgb[2]).into_format::<f32>();
    let color: Hsv = Hsv::from_color(srgb);

    let degrees = color.hue.into_positive_degrees();
    let hue = ((degrees / hsv::HUE_DEGREES_PER_UNIT).round() as u16 % 180) as u8;
    let saturation = (color.saturation * 255.0).round().clamp(0.0, 255.0) as u8;
    let value = (color.value * hsv::VALUE_MAX).round().clamp(0.0, 255.0) as u8;

    [hue.min(hsv::HUE_MAX), saturation, value]
}

/// Intensity of one RGB pixel
pub fn pixel_intensity(rgb: [u8; 3]) -> u8 {
    let y = luma::RED * f32::from(rgb[0])
        + luma::GREEN * f32::from(rgb[1])
        + luma::BLUE * f32::from(rgb[2]);
    y.round().clamp(0.0, 255.0) as u8
}

/// Convert an RGB image to single-channel intensity
pub fn intensity(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([pixel_intensity(image.get_pixel(x, y).0)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_primary_hues() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), [0, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 255, 0]), [60, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 255]), [120, 255, 255]);
    }

    #[test]
    fn test_grays_have_zero_saturation() {
        assert_eq!(rgb_to_hsv([0, 0, 0]), [0, 0, 0]);
        assert_eq!(rgb_to_hsv([255, 255, 255]), [0, 0, 255]);
        assert_eq!(rgb_to_hsv([128, 128, 128]), [0, 0, 128]);
    }

    #[test]
    fn test_partial_saturation() {
        // (255 - 55) / 255 of full scale
        let [_, s, v] = rgb_to_hsv([255, 55, 55]);
        assert_eq!(s, 200);
        assert_eq!(v, 255);
    }

    #[test]
    fn test_hue_wraps_below_180() {
        // 359 degrees would round to 180 half-degrees
        let [h, _, _] = rgb_to_hsv([255, 0, 4]);
        assert!(h <= hsv::HUE_MAX);
    }

    #[test]
    fn test_intensity_weights() {
        assert_eq!(pixel_intensity([255, 255, 255]), 255);
        assert_eq!(pixel_intensity([0, 0, 0]), 0);
        assert_eq!(pixel_intensity([255, 0, 0]), 76);
        assert_eq!(pixel_intensity([0, 255, 0]), 150);
        assert_eq!(pixel_intensity([0, 0, 255]), 29);
    }

    #[test]
    fn test_intensity_image_dimensions() {
        let img = RgbImage::from_pixel(7, 3, Rgb([255, 55, 55]));
        let gray = intensity(&img);
        assert_eq!(gray.dimensions(), (7, 3));
        assert_eq!(gray.get_pixel(6, 2)[0], pixel_intensity([255, 55, 55]));
    }

    #[test]
    fn test_sample_out_of_bounds() {
        let img = RgbImage::from_pixel(5, 5, Rgb([1, 2, 3]));
        assert!(ColorSample::at(&img, -1, 0).is_none());
        assert!(ColorSample::at(&img, 5, 0).is_none());
        assert!(ColorSample::at(&img, 0, 5).is_none());
        let sample = ColorSample::at(&img, 4, 4).unwrap();
        assert_eq!(sample.rgb, [1, 2, 3]);
    }
}
