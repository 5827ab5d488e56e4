//! Spot detection module
//!
//! This module turns a plate photograph into candidate spots: intensity
//! conversion and binarization, connected-region blob detection with
//! area/circularity filters, and per-spot feature extraction.

pub mod blob;
pub mod extractor;
pub mod threshold;

pub use blob::{BlobDetector, BlobRegion};
pub use extractor::{detect, FeatureExtractor};
