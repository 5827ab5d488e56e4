//! Configuration structures for the plate analysis pipeline.
//!
//! This module defines all tunable parameters for spot detection, lane
//! assignment and annotation. Every filter threshold is configurable; nothing
//! in the detector is hard-coded beyond the defaults in
//! [`crate::constants`].
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use tlc_scan::AnalysisConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = AnalysisConfig::from_json_file(Path::new("plate.json"))?;
//!
//! // Or use defaults
//! let config = AnalysisConfig::default();
//! # Ok::<(), tlc_scan::AnalysisError>(())
//! ```
//!
//! # Configuration Sections
//!
//! - [`PreprocessingConfig`]: optional resize before detection
//! - [`DetectionParameters`]: binarization, blob filters and lane count
//! - [`AnnotationConfig`]: overlay drawing options

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{annotation, detection};
use crate::error::{AnalysisError, Result};

/// Complete configuration for one plate analysis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Preprocessing applied to the decoded image
    pub preprocessing: PreprocessingConfig,

    /// Spot detection and lane parameters
    pub detection: DetectionParameters,

    /// Overlay drawing options
    pub annotation: AnnotationConfig,
}

/// Preprocessing parameters applied before detection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Resize the image to exactly `[width, height]` before detection
    pub resize: Option<[u32; 2]>,
}

/// How the two threshold bounds are applied to the intensity image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    /// Single binary threshold: intensities above the low bound become
    /// foreground. The high bound only gates whether binarization runs.
    #[default]
    Single,
    /// Two-sided band: only intensities inside `[low, high]` become
    /// foreground.
    Band,
}

/// Spot detection parameters.
///
/// Area bounds are in pixels. Circularity is `4π·Area / Perimeter²` and is
/// 1.0 for a perfect circle. `threshold_low >= threshold_high` is accepted
/// and means binarization is skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParameters {
    /// Minimum candidate region area
    pub min_area: f64,

    /// Maximum candidate region area
    pub max_area: f64,

    /// Reject regions outside `[min_area, max_area]`
    pub filter_by_area: bool,

    /// Minimum circularity, in (0, 1]
    pub min_circularity: f64,

    /// Reject regions less circular than `min_circularity`
    pub filter_by_circularity: bool,

    /// Binarization low bound
    pub threshold_low: u8,

    /// Binarization high bound
    pub threshold_high: u8,

    /// How the threshold bounds are applied
    pub threshold_mode: ThresholdMode,

    /// Detect bright spots on a dark plate
    pub invert: bool,

    /// Later blobs closer than this to an accepted blob are dropped
    pub min_dist_between_blobs: f64,

    /// Number of lanes across the plate width
    pub lane_count: usize,

    /// Advisory lane width in pixels; lane geometry always uses
    /// `image_width / lane_count`
    pub lane_width_hint: Option<f64>,
}

impl Default for DetectionParameters {
    fn default() -> Self {
        Self {
            min_area: detection::MIN_AREA,
            max_area: detection::MAX_AREA,
            filter_by_area: true,
            min_circularity: detection::MIN_CIRCULARITY,
            filter_by_circularity: true,
            threshold_low: detection::THRESHOLD_LOW,
            threshold_high: detection::THRESHOLD_HIGH,
            threshold_mode: ThresholdMode::default(),
            invert: false,
            min_dist_between_blobs: detection::MIN_DIST_BETWEEN_BLOBS,
            lane_count: detection::LANE_COUNT,
            lane_width_hint: None,
        }
    }
}

impl DetectionParameters {
    /// Check every parameter against its accepted range
    pub fn validate(&self) -> Result<()> {
        if self.lane_count < 1 {
            return Err(AnalysisError::parameter("lane_count", self.lane_count, ">= 1"));
        }
        if !(self.min_area >= 0.0) {
            return Err(AnalysisError::parameter("min_area", self.min_area, ">= 0"));
        }
        if !(self.max_area >= self.min_area) {
            return Err(AnalysisError::parameter(
                "max_area",
                self.max_area,
                format!(">= min_area ({})", self.min_area),
            ));
        }
        if !(self.min_circularity > 0.0 && self.min_circularity <= 1.0) {
            return Err(AnalysisError::parameter(
                "min_circularity",
                self.min_circularity,
                "in (0, 1]",
            ));
        }
        if !(self.min_dist_between_blobs >= 0.0) {
            return Err(AnalysisError::parameter(
                "min_dist_between_blobs",
                self.min_dist_between_blobs,
                ">= 0",
            ));
        }
        if let Some(hint) = self.lane_width_hint {
            if !(hint > 0.0) {
                return Err(AnalysisError::parameter("lane_width_hint", hint, "> 0"));
            }
        }
        Ok(())
    }

    /// Whether the intensity image is binarized before blob detection
    pub fn thresholding_enabled(&self) -> bool {
        self.threshold_low < self.threshold_high
    }
}

/// Overlay drawing options for the annotated image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// Draw the spot number above each spot
    pub draw_labels: bool,

    /// Draw vertical lane separators
    pub draw_lanes: bool,

    /// Outline thickness in pixels
    pub circle_thickness: u32,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            draw_labels: true,
            draw_lanes: true,
            circle_thickness: annotation::CIRCLE_THICKNESS,
        }
    }
}

impl AnalysisConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        if let Some([w, h]) = self.preprocessing.resize {
            if w == 0 || h == 0 {
                return Err(AnalysisError::parameter(
                    "preprocessing.resize",
                    format!("{}x{}", w, h),
                    "non-zero width and height",
                ));
            }
        }
        self.detection.validate()
    }

    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            AnalysisError::config(format!("Failed to parse {}", path.display()), e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AnalysisError::config("Failed to serialize configuration", e))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(AnalysisConfig::default().validate().is_ok());
        let params = DetectionParameters::default();
        assert!(params.thresholding_enabled());
        assert_eq!(params.threshold_mode, ThresholdMode::Single);
    }

    #[test]
    fn test_lane_count_zero_rejected() {
        let params = DetectionParameters {
            lane_count: 0,
            ..Default::default()
        };
        match params.validate() {
            Err(AnalysisError::ParameterOutOfRange { parameter, .. }) => {
                assert_eq!(parameter, "lane_count")
            }
            other => panic!("expected ParameterOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_inverted_area_bounds_rejected() {
        let params = DetectionParameters {
            min_area: 500.0,
            max_area: 100.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_circularity_range() {
        for bad in [0.0, -0.5, 1.5, f64::NAN] {
            let params = DetectionParameters {
                min_circularity: bad,
                ..Default::default()
            };
            assert!(params.validate().is_err(), "{} should be rejected", bad);
        }
        let params = DetectionParameters {
            min_circularity: 1.0,
            ..Default::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_equal_thresholds_skip_binarization() {
        let params = DetectionParameters {
            threshold_low: 200,
            threshold_high: 200,
            ..Default::default()
        };
        assert!(params.validate().is_ok());
        assert!(!params.thresholding_enabled());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "detection": { "min_area": 50.0, "lane_count": 3, "invert": true } }"#;
        let config: AnalysisConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.detection.min_area, 50.0);
        assert_eq!(config.detection.lane_count, 3);
        assert!(config.detection.invert);
        assert_eq!(config.detection.max_area, detection::MAX_AREA);
        assert_eq!(config.annotation, AnnotationConfig::default());
        assert!(config.preprocessing.resize.is_none());
    }

    #[test]
    fn test_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AnalysisConfig::default();
        config.preprocessing.resize = Some([500, 500]);
        config.detection.threshold_mode = ThresholdMode::Band;
        config.to_json_file(&path).unwrap();

        let loaded = AnalysisConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_zero_resize_rejected() {
        let mut config = AnalysisConfig::default();
        config.preprocessing.resize = Some([0, 500]);
        assert!(config.validate().is_err());
    }
}
