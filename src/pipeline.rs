//! Plate analysis pipeline
//!
//! Runs detection, lane assignment and quantification in order and keeps
//! the resulting table between parameter changes. Changing detection
//! parameters replaces the whole batch; changing the lane count or the
//! height interpretation only re-derives the post-processing fields.
//!
//! Every mutating call works on a copy and swaps it in on success, so a
//! failed call leaves the previous table in place.

use image::RgbImage;
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;

use crate::annotate::annotate;
use crate::config::{AnalysisConfig, DetectionParameters};
use crate::detection::FeatureExtractor;
use crate::error::{AnalysisError, Result};
use crate::export::{export_with_layout, ExportLayout};
use crate::image_loader::{load_image, preprocess};
use crate::lanes::{lane_width, LaneAssigner};
use crate::quantify::quantify;
use crate::table::ResultTable;

/// Lane hints further than this from the computed width are logged
const LANE_HINT_TOLERANCE: f64 = 0.5;

/// Detect, assign lanes and quantify in one pass
///
/// # Errors
///
/// Returns `ParameterOutOfRange` for invalid parameters and `InvalidImage`
/// for an image without pixels.
pub fn analyze(image: &RgbImage, params: &DetectionParameters) -> Result<ResultTable> {
    let (width, height) = image.dimensions();
    let mut table = FeatureExtractor::new(params.clone())?.detect(image)?;

    if let Some(hint) = params.lane_width_hint {
        let actual = lane_width(width, params.lane_count);
        if (hint - actual).abs() > LANE_HINT_TOLERANCE {
            debug!(
                "Lane width hint {:.2}px ignored, using {:.2}px",
                hint, actual
            );
        }
    }

    LaneAssigner::new(params.lane_count)?.assign(&mut table, width)?;
    quantify(&mut table, height)?;
    Ok(table)
}

/// Stateful analysis of one plate image
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: AnalysisConfig,
    image: Option<Arc<RgbImage>>,
    table: Option<ResultTable>,
}

impl Pipeline {
    /// Create a pipeline with a validated configuration
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            image: None,
            table: None,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn params(&self) -> &DetectionParameters {
        &self.config.detection
    }

    /// The preprocessed image the current table was derived from
    pub fn image(&self) -> Option<&Arc<RgbImage>> {
        self.image.as_ref()
    }

    /// Current result table, `None` until an image has been analyzed
    pub fn table(&self) -> Option<&ResultTable> {
        self.table.as_ref()
    }

    /// Load an image file and analyze it
    pub fn load(&mut self, path: &Path) -> Result<&ResultTable> {
        info!("Analyzing plate image {}", path.display());
        let image = load_image(path)?;
        self.set_image(image)
    }

    /// Replace the source image and analyze it with the current parameters
    pub fn set_image(&mut self, image: RgbImage) -> Result<&ResultTable> {
        let image = preprocess(image, &self.config.preprocessing)?;
        let table = analyze(&image, &self.config.detection)?;
        self.image = Some(Arc::new(image));
        Ok(self.table.insert(table))
    }

    /// Replace the detection parameters, re-detecting if an image is loaded
    ///
    /// The whole spot batch is replaced. On error both the parameters and
    /// the table keep their previous values.
    pub fn set_parameters(&mut self, params: DetectionParameters) -> Result<()> {
        params.validate()?;
        if let Some(image) = &self.image {
            let table = analyze(image, &params)?;
            debug!("Re-detected {} spot(s)", table.len());
            self.table = Some(table);
        }
        self.config.detection = params;
        Ok(())
    }

    /// Reassign lanes without re-detecting
    pub fn set_lane_count(&mut self, lane_count: usize) -> Result<()> {
        let assigner = LaneAssigner::new(lane_count)?;
        if let Some(current) = &self.table {
            let mut table = current.clone();
            let (width, _) = table.image_dimensions();
            assigner.assign(&mut table, width)?;
            self.table = Some(table);
        }
        self.config.detection.lane_count = lane_count;
        Ok(())
    }

    /// Re-derive Rf and relative concentration against another height
    pub fn requantify(&mut self, image_height: u32) -> Result<()> {
        let mut table = self.require_table()?.clone();
        quantify(&mut table, image_height)?;
        self.table = Some(table);
        Ok(())
    }

    /// Overlay of the current table on the current image
    pub fn annotated(&self) -> Option<RgbImage> {
        let image = self.image.as_ref()?;
        let table = self.table.as_ref()?;
        Some(annotate(image, table, &self.config.annotation))
    }

    /// Export the current table with the summary columns
    pub fn export(&self, path: &Path) -> Result<()> {
        self.export_with_layout(path, ExportLayout::Summary)
    }

    pub fn export_with_layout(&self, path: &Path, layout: ExportLayout) -> Result<()> {
        export_with_layout(self.require_table()?, path, layout)
    }

    fn require_table(&self) -> Result<&ResultTable> {
        self.table
            .as_ref()
            .ok_or_else(|| AnalysisError::invalid_image_msg("no plate image has been analyzed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PreprocessingConfig;
    use approx::assert_relative_eq;
    use image::Rgb;

    fn plate() -> RgbImage {
        let mut img = RgbImage::from_pixel(300, 200, Rgb([255, 255, 255]));
        for &(cx, cy) in &[(50i64, 40i64), (250, 150)] {
            for y in cy - 10..=cy + 10 {
                for x in cx - 10..=cx + 10 {
                    if (x - cx).pow(2) + (y - cy).pow(2) <= 100 {
                        img.put_pixel(x as u32, y as u32, Rgb([255, 55, 55]));
                    }
                }
            }
        }
        img
    }

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            detection: DetectionParameters {
                min_area: 50.0,
                max_area: 1000.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_analyze_fills_every_field() {
        let table = analyze(&plate(), &config().detection).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lane_count(), Some(1));
        for spot in &table {
            assert_eq!(spot.lane, Some(1));
            assert!(spot.rf.is_some() && spot.rel_conc.is_some());
        }
        assert_relative_eq!(table.get(1).unwrap().rf.unwrap(), 0.8, epsilon = 1e-9);
    }

    #[test]
    fn test_table_unset_before_image() {
        let pipeline = Pipeline::new(config()).unwrap();
        assert!(pipeline.table().is_none());
        assert!(pipeline.annotated().is_none());
    }

    #[test]
    fn test_invalid_image_keeps_previous_table() {
        let mut pipeline = Pipeline::new(config()).unwrap();
        pipeline.set_image(plate()).unwrap();
        let before = pipeline.table().cloned();

        let err = pipeline.set_image(RgbImage::new(0, 0)).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidImage { .. }));
        assert_eq!(pipeline.table().cloned(), before);
    }

    #[test]
    fn test_set_parameters_redetects() {
        let mut pipeline = Pipeline::new(config()).unwrap();
        pipeline.set_image(plate()).unwrap();
        assert_eq!(pipeline.table().unwrap().len(), 2);

        let strict = DetectionParameters {
            min_area: 500.0,
            ..config().detection
        };
        pipeline.set_parameters(strict).unwrap();
        assert!(pipeline.table().unwrap().is_empty());
        assert_eq!(pipeline.params().min_area, 500.0);
    }

    #[test]
    fn test_rejected_parameters_leave_state() {
        let mut pipeline = Pipeline::new(config()).unwrap();
        pipeline.set_image(plate()).unwrap();
        let before = pipeline.table().cloned();

        let bad = DetectionParameters {
            min_area: 2000.0,
            ..config().detection
        };
        assert!(pipeline.set_parameters(bad).is_err());
        assert_eq!(pipeline.table().cloned(), before);
        assert_eq!(pipeline.params().min_area, 50.0);
    }

    #[test]
    fn test_set_lane_count_relanes_only() {
        let mut pipeline = Pipeline::new(config()).unwrap();
        pipeline.set_image(plate()).unwrap();
        let before = pipeline.table().cloned().unwrap();

        pipeline.set_lane_count(3).unwrap();
        let after = pipeline.table().unwrap();
        let lanes: Vec<Option<usize>> = after.iter().map(|s| s.lane).collect();
        assert_eq!(lanes, vec![Some(1), Some(3)]);
        for (a, b) in after.iter().zip(before.iter()) {
            assert_eq!(a.number, b.number);
            assert_eq!(a.rf, b.rf);
            assert_eq!(a.area, b.area);
        }

        assert!(pipeline.set_lane_count(0).is_err());
        assert_eq!(pipeline.table().unwrap().lane_count(), Some(3));
    }

    #[test]
    fn test_requantify() {
        let mut pipeline = Pipeline::new(config()).unwrap();
        assert!(pipeline.requantify(100).is_err());

        pipeline.set_image(plate()).unwrap();
        pipeline.requantify(400).unwrap();
        assert_relative_eq!(
            pipeline.table().unwrap().get(1).unwrap().rf.unwrap(),
            0.9,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_preprocessing_resize() {
        let mut cfg = config();
        cfg.preprocessing = PreprocessingConfig {
            resize: Some([600, 400]),
        };
        let mut pipeline = Pipeline::new(cfg).unwrap();
        let table = pipeline.set_image(plate()).unwrap();
        assert_eq!(table.image_dimensions(), (600, 400));
    }
}
