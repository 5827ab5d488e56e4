//! Spot feature extraction
//!
//! Runs blob detection on a plate image and turns every accepted region
//! into a [`Spot`] record: center, characteristic size, derived area, and the
//! color sampled at the rounded center pixel.
//!
//! Detection is a pure function of the image and the parameters; nothing is
//! carried over between calls.

use image::RgbImage;
use log::{debug, info, warn};
use std::f64::consts::PI;

use crate::color::{intensity, ColorSample};
use crate::config::DetectionParameters;
use crate::detection::{threshold, BlobDetector, BlobRegion};
use crate::error::Result;
use crate::image_loader::ensure_non_empty;
use crate::table::{ResultTable, Spot};

/// Feature extractor producing a fresh result table per detection pass
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    params: DetectionParameters,
}

impl FeatureExtractor {
    /// Create an extractor, validating the parameters
    pub fn new(params: DetectionParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &DetectionParameters {
        &self.params
    }

    /// Detect spots in a plate image
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidImage` if the image has no pixels.
    /// An image with no qualifying spots yields an empty table, not an error.
    pub fn detect(&self, image: &RgbImage) -> Result<ResultTable> {
        ensure_non_empty(image)?;
        let (width, height) = image.dimensions();

        let gray = intensity(image);
        let prepared = threshold::prepare(&gray, &self.params);
        if !self.params.thresholding_enabled() {
            debug!(
                "Threshold bounds {} >= {}, binarization skipped",
                self.params.threshold_low, self.params.threshold_high
            );
        }

        let regions = BlobDetector::new(&self.params).detect(&prepared);

        let mut table = ResultTable::new(width, height);
        let mut dropped = 0usize;
        for region in &regions {
            match spot_from_region(image, region) {
                Some(spot) => {
                    table.push(spot);
                }
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!("Dropped {} spot(s) whose center could not be sampled", dropped);
        }
        info!(
            "Detected {} spot(s) in {}x{} image",
            table.len(),
            width,
            height
        );
        Ok(table)
    }
}

/// Detect spots with the given parameters
pub fn detect(image: &RgbImage, params: &DetectionParameters) -> Result<ResultTable> {
    FeatureExtractor::new(params.clone())?.detect(image)
}

/// Build a spot record, or `None` when the center cannot be sampled
fn spot_from_region(image: &RgbImage, region: &BlobRegion) -> Option<Spot> {
    let (width, height) = image.dimensions();
    let in_bounds = region.x >= 0.0
        && region.y >= 0.0
        && region.x < f64::from(width)
        && region.y < f64::from(height);
    if !in_bounds {
        return None;
    }

    let color = ColorSample::at(image, region.x.round() as i64, region.y.round() as i64)?;
    let radius = region.diameter / 2.0;

    Some(Spot {
        number: 0,
        x: region.x,
        y: region.y,
        size: region.diameter,
        area: PI * radius * radius,
        pixel_area: region.pixel_area,
        circularity: region.circularity,
        color,
        lane: None,
        rf: None,
        rel_conc: None,
    })
}
