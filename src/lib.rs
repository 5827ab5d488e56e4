//! # TLC Scan
//!
//! A Rust crate for extracting quantitative data from photographs of
//! thin-layer chromatography plates.
//!
//! This library turns a plate image into a table of spots by:
//! - Detecting round spots through thresholding and connected-region analysis
//! - Sampling each spot's color at its center in RGB and HSV
//! - Assigning spots to equal-width lanes across the plate
//! - Deriving a retention factor (Rf) and a saturation-based concentration proxy
//!
//! Results can be exported as CSV, TSV, JSON or XLSX and drawn back onto the
//! image as an overlay.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tlc_scan::{analyze_plate, export, AnalysisConfig};
//! use std::path::Path;
//!
//! let mut config = AnalysisConfig::default();
//! config.detection.lane_count = 3;
//!
//! let table = analyze_plate(Path::new("plate.jpg"), &config)?;
//! for spot in &table {
//!     println!("spot {} lane {:?} Rf {:?}", spot.number, spot.lane, spot.rf);
//! }
//! export(&table, Path::new("plate.csv"))?;
//! # Ok::<(), tlc_scan::AnalysisError>(())
//! ```

use std::path::Path;

pub mod annotate;
pub mod color;
pub mod config;
pub mod constants;
pub mod detection;
pub mod error;
pub mod export;
pub mod image_loader;
pub mod lanes;
pub mod pipeline;
pub mod quantify;
pub mod table;
pub mod worker;

pub use annotate::annotate;
pub use config::{AnalysisConfig, AnnotationConfig, DetectionParameters, ThresholdMode};
pub use detection::{detect, FeatureExtractor};
pub use error::{AnalysisError, Result};
pub use export::{export, export_with_layout, ExportFormat, ExportLayout};
pub use image_loader::load_image;
pub use lanes::{assign_lanes, LaneAssigner};
pub use pipeline::{analyze, Pipeline};
pub use quantify::quantify;
pub use table::{LaneGroup, ResultTable, Spot};
pub use worker::{spawn_analysis, AnalysisSession, PendingAnalysis, SessionStatus};

/// Analyze a plate photograph from an image file
///
/// This is the main entry point. It decodes the image, applies the
/// configured preprocessing, detects spots, assigns lanes and quantifies
/// every spot.
///
/// # Errors
///
/// Returns `AnalysisError` if:
/// - The configuration is out of range
/// - The image cannot be loaded or has no pixels
///
/// A plate without qualifying spots yields an empty table.
pub fn analyze_plate(image_path: &Path, config: &AnalysisConfig) -> Result<ResultTable> {
    let mut pipeline = Pipeline::new(config.clone())?;
    let table = pipeline.load(image_path)?.clone();
    Ok(table)
}
