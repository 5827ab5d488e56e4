//! Color sampling and conversion module
//!
//! This module converts RGB pixels to single-channel intensity for
//! detection and to 8-bit HSV for the per-spot color features.

pub mod conversion;

pub use conversion::{intensity, rgb_to_hsv, ColorSample};
