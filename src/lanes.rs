//! Lane assignment
//!
//! Splits the plate width into `lane_count` equal lanes and tags every spot
//! with the 1-based lane its center falls in. Lane boundaries depend on both
//! the image width and the lane count, so a changed count always means a
//! full reassignment.

use log::debug;

use crate::error::{AnalysisError, Result};
use crate::table::{LaneGroup, ResultTable};

/// Width of one lane in pixels
pub fn lane_width(image_width: u32, lane_count: usize) -> f64 {
    f64::from(image_width) / lane_count as f64
}

/// Lane index for a center x coordinate, clamped to `1..=lane_count`
pub fn lane_for(x: f64, lane_width: f64, lane_count: usize) -> usize {
    let raw = (x / lane_width).floor();
    if raw.is_nan() || raw < 0.0 {
        return 1;
    }
    (raw as usize).saturating_add(1).clamp(1, lane_count)
}

/// x positions of the separators between adjacent lanes
pub fn lane_boundaries(image_width: u32, lane_count: usize) -> Vec<f64> {
    let width = lane_width(image_width, lane_count);
    (1..lane_count).map(|k| k as f64 * width).collect()
}

/// Assigns lane indices over a fixed lane count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneAssigner {
    lane_count: usize,
}

impl LaneAssigner {
    /// Create an assigner
    ///
    /// # Errors
    ///
    /// Returns `ParameterOutOfRange` when `lane_count` is zero.
    pub fn new(lane_count: usize) -> Result<Self> {
        if lane_count < 1 {
            return Err(AnalysisError::parameter("lane_count", lane_count, ">= 1"));
        }
        Ok(Self { lane_count })
    }

    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    /// Rewrite the lane of every spot in the table
    pub fn assign(&self, table: &mut ResultTable, image_width: u32) -> Result<()> {
        if image_width == 0 {
            return Err(AnalysisError::parameter("image_width", image_width, "> 0"));
        }
        let width = lane_width(image_width, self.lane_count);
        for spot in table.spots_mut() {
            spot.lane = Some(lane_for(spot.x, width, self.lane_count));
        }
        table.set_lane_count(self.lane_count);
        debug!(
            "Assigned {} spot(s) to {} lane(s) of width {:.2}px",
            table.len(),
            self.lane_count,
            width
        );
        Ok(())
    }
}

/// Assign lanes and return the spots grouped by lane `1..=lane_count`
pub fn assign_lanes(
    table: &mut ResultTable,
    image_width: u32,
    lane_count: usize,
) -> Result<Vec<LaneGroup<'_>>> {
    LaneAssigner::new(lane_count)?.assign(table, image_width)?;
    let table: &ResultTable = table;
    Ok(table.lane_groups())
}
