//! Connected-region blob detection
//!
//! Labels 8-connected regions of dark pixels (below
//! [`BLOB_INTENSITY_CUTOFF`]) and measures each one:
//! - pixel area and centroid from the region's pixels
//! - characteristic diameter as twice the median centroid-to-contour distance
//! - circularity `4π·A/P²` from the region's outer contour
//!
//! Only the outer contour enters the shape measure, so holes inside a spot
//! (glare, a pale core) do not change its circularity.
//!
//! Regions are then filtered by area, circularity and minimum center
//! distance. Output order is the order in which each region's first pixel is
//! met in a top-to-bottom, left-to-right scan, so it is stable for identical
//! input.

use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::geometry::{arc_length, contour_area};
use imageproc::map::map_colors;
use imageproc::point::Point;
use imageproc::region_labelling::{connected_components, Connectivity};
use log::debug;
use std::f64::consts::PI;

use crate::config::DetectionParameters;
use crate::constants::detection::BLOB_INTENSITY_CUTOFF;

/// One connected region with its measured shape features
#[derive(Debug, Clone, PartialEq)]
pub struct BlobRegion {
    /// Centroid x in pixel coordinates
    pub x: f64,
    /// Centroid y in pixel coordinates
    pub y: f64,
    /// Number of pixels in the region
    pub pixel_area: usize,
    /// Characteristic diameter in pixels
    pub diameter: f64,
    /// Outer contour length in pixels
    pub perimeter: f64,
    /// `4π·A/P²`, capped at 1.0
    pub circularity: f64,
}

/// Blob detector applying the configured shape filters
#[derive(Debug, Clone)]
pub struct BlobDetector {
    area_bounds: Option<(f64, f64)>,
    min_circularity: Option<f64>,
    min_distance: f64,
}

impl Default for BlobDetector {
    fn default() -> Self {
        Self::new(&DetectionParameters::default())
    }
}

impl BlobDetector {
    /// Create a detector from detection parameters
    pub fn new(params: &DetectionParameters) -> Self {
        Self {
            area_bounds: params
                .filter_by_area
                .then_some((params.min_area, params.max_area)),
            min_circularity: params
                .filter_by_circularity
                .then_some(params.min_circularity),
            min_distance: params.min_dist_between_blobs,
        }
    }

    /// Detect and filter blobs in a prepared intensity image
    pub fn detect(&self, prepared: &GrayImage) -> Vec<BlobRegion> {
        let regions = find_regions(prepared);
        let candidates = regions.len();

        let mut accepted: Vec<BlobRegion> = Vec::new();
        let mut rejected_area = 0usize;
        let mut rejected_shape = 0usize;
        let mut rejected_distance = 0usize;

        for region in regions {
            if !self.passes_area(region.pixel_area as f64) {
                rejected_area += 1;
                continue;
            }
            if !self.passes_circularity(region.circularity) {
                rejected_shape += 1;
                continue;
            }
            if self.too_close(&region, &accepted) {
                rejected_distance += 1;
                continue;
            }
            accepted.push(region);
        }

        debug!(
            "Blob detection: {} candidates, {} accepted ({} area, {} circularity, {} distance rejections)",
            candidates,
            accepted.len(),
            rejected_area,
            rejected_shape,
            rejected_distance
        );
        accepted
    }

    fn passes_area(&self, area: f64) -> bool {
        match self.area_bounds {
            Some((min, max)) => area >= min && area <= max,
            None => true,
        }
    }

    fn passes_circularity(&self, circularity: f64) -> bool {
        match self.min_circularity {
            Some(min) => circularity >= min,
            None => true,
        }
    }

    fn too_close(&self, region: &BlobRegion, accepted: &[BlobRegion]) -> bool {
        if self.min_distance <= 0.0 {
            return false;
        }
        accepted
            .iter()
            .any(|other| (other.x - region.x).hypot(other.y - region.y) < self.min_distance)
    }
}

/// Label all dark 8-connected regions and measure them, unfiltered
pub fn find_regions(prepared: &GrayImage) -> Vec<BlobRegion> {
    let mask: GrayImage = map_colors(prepared, |p: Luma<u8>| {
        Luma([if p[0] < BLOB_INTENSITY_CUTOFF { 255 } else { 0 }])
    });
    let labels = connected_components(&mask, Connectivity::Eight, Luma([0u8]));
    let label_count = labels.pixels().map(|p| p[0]).max().unwrap_or(0) as usize;

    let mut moments = vec![PixelMoments::default(); label_count + 1];
    let mut order = Vec::new();
    for (x, y, label) in labels.enumerate_pixels() {
        let label = label[0] as usize;
        if label == 0 {
            continue;
        }
        let m = &mut moments[label];
        if m.count == 0 {
            order.push(label);
        }
        m.count += 1;
        m.sum_x += f64::from(x);
        m.sum_y += f64::from(y);
    }

    let mut outer: Vec<Option<Vec<Point<i32>>>> = vec![None; label_count + 1];
    for contour in find_contours::<i32>(&mask) {
        if !matches!(contour.border_type, BorderType::Outer) {
            continue;
        }
        if let Some(first) = contour.points.first() {
            let label = labels.get_pixel(first.x as u32, first.y as u32)[0] as usize;
            outer[label] = Some(contour.points);
        }
    }

    order
        .into_iter()
        .map(|label| measure(&moments[label], outer[label].as_deref().unwrap_or(&[])))
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
struct PixelMoments {
    count: usize,
    sum_x: f64,
    sum_y: f64,
}

fn measure(moments: &PixelMoments, contour: &[Point<i32>]) -> BlobRegion {
    let n = moments.count as f64;
    let (cx, cy) = (moments.sum_x / n, moments.sum_y / n);

    let mut distances: Vec<f64> = contour
        .iter()
        .map(|p| (f64::from(p.x) - cx).hypot(f64::from(p.y) - cy))
        .collect();
    distances.sort_by(f64::total_cmp);
    let radius = match distances.len() {
        0 => 0.0,
        len => (distances[(len - 1) / 2] + distances[len / 2]) / 2.0,
    };

    let perimeter = arc_length(contour, true);
    let circularity = if perimeter > 0.0 {
        (4.0 * PI * contour_area(contour) / (perimeter * perimeter)).min(1.0)
    } else {
        0.0
    };

    BlobRegion {
        x: cx,
        y: cy,
        pixel_area: moments.count,
        diameter: 2.0 * radius,
        perimeter,
        circularity,
    }
}
