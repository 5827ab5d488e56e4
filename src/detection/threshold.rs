//! Binarization and polarity handling
//!
//! Prepares the single-channel image the blob detector runs on. Blob
//! candidates are always the dark pixels of the prepared image; `invert`
//! complements the image so that bright spots on a dark plate become the
//! dark class instead.

use image::{GrayImage, Luma};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::map::map_colors;

use crate::config::{DetectionParameters, ThresholdMode};

/// Binarize an intensity image
///
/// In [`ThresholdMode::Single`] pixels strictly above `low` become 255 and
/// everything else 0; `high` is not consulted. In [`ThresholdMode::Band`]
/// only pixels within `[low, high]` become 255.
pub fn binarize(gray: &GrayImage, low: u8, high: u8, mode: ThresholdMode) -> GrayImage {
    match mode {
        ThresholdMode::Single => threshold(gray, low, ThresholdType::Binary),
        ThresholdMode::Band => map_colors(gray, |p: Luma<u8>| {
            Luma([if (low..=high).contains(&p[0]) { 255 } else { 0 }])
        }),
    }
}

/// Produce the image blob detection runs on
///
/// Binarization is skipped when `threshold_low >= threshold_high`, leaving
/// the intensity values untouched.
pub fn prepare(gray: &GrayImage, params: &DetectionParameters) -> GrayImage {
    let mut prepared = if params.thresholding_enabled() {
        binarize(
            gray,
            params.threshold_low,
            params.threshold_high,
            params.threshold_mode,
        )
    } else {
        gray.clone()
    };

    if params.invert {
        image::imageops::invert(&mut prepared);
    }
    prepared
}
