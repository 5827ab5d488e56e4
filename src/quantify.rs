//! Retention factor and relative concentration
//!
//! The plate origin sits at the bottom of the photograph, so a spot's travel
//! is read from the bottom edge: `Rf = 1 - y / image_height`. Values outside
//! `[0, 1]` are reported as-is.
//!
//! Relative concentration is the sampled HSV saturation normalized to its
//! full scale. It is a proxy only; no calibration against standards is made.

use log::debug;

use crate::constants::hsv::SATURATION_MAX;
use crate::error::{AnalysisError, Result};
use crate::table::ResultTable;

/// Retention factor for a spot center
pub fn retention_factor(y: f64, image_height: u32) -> f64 {
    1.0 - y / f64::from(image_height)
}

/// Relative concentration proxy from an 8-bit saturation
pub fn relative_concentration(saturation: u8) -> f64 {
    f64::from(saturation) / SATURATION_MAX
}

/// Fill in `rf` and `rel_conc` for every spot
///
/// Spot order, numbering and lanes are left untouched.
pub fn quantify(table: &mut ResultTable, image_height: u32) -> Result<()> {
    if image_height == 0 {
        return Err(AnalysisError::parameter("image_height", image_height, "> 0"));
    }
    for spot in table.spots_mut() {
        spot.rf = Some(retention_factor(spot.y, image_height));
        spot.rel_conc = Some(relative_concentration(spot.saturation()));
    }
    debug!(
        "Quantified {} spot(s) against height {}",
        table.len(),
        image_height
    );
    Ok(())
}
