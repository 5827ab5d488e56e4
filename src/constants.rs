//! Default parameters and fixed reference values for plate analysis
//!
//! Detection defaults follow the classic simple blob detector settings the
//! plate tool was tuned with; every one of them is overridable through
//! [`crate::config::DetectionParameters`].

/// Detection parameter defaults
pub mod detection {
    /// Minimum candidate region area in pixels
    pub const MIN_AREA: f64 = 100.0;

    /// Maximum candidate region area in pixels
    pub const MAX_AREA: f64 = 1_000_000.0;

    /// Minimum circularity (4π·A/P²) when circularity filtering is on
    pub const MIN_CIRCULARITY: f64 = 0.7;

    /// Binarization threshold (low bound)
    pub const THRESHOLD_LOW: u8 = 127;

    /// Upper bound of the binarization band
    pub const THRESHOLD_HIGH: u8 = 255;

    /// Minimum distance between accepted blob centers in pixels
    pub const MIN_DIST_BETWEEN_BLOBS: f64 = 10.0;

    /// Intensities below this cutoff form blob candidates
    pub const BLOB_INTENSITY_CUTOFF: u8 = 128;

    /// Default number of lanes on a plate
    pub const LANE_COUNT: usize = 1;
}

/// Intensity conversion weights (ITU-R BT.601 luma)
pub mod luma {
    pub const RED: f32 = 0.299;
    pub const GREEN: f32 = 0.587;
    pub const BLUE: f32 = 0.114;
}

/// 8-bit HSV channel scaling
///
/// Hue is stored in half-degrees so it fits a byte (0..=179); saturation and
/// value span the full byte range.
pub mod hsv {
    /// Divisor from degrees to stored hue
    pub const HUE_DEGREES_PER_UNIT: f32 = 2.0;

    /// Largest stored hue value
    pub const HUE_MAX: u8 = 179;

    /// Full-scale saturation, used to normalize the concentration proxy
    pub const SATURATION_MAX: f64 = 255.0;

    /// Full-scale value
    pub const VALUE_MAX: f32 = 255.0;
}

/// Annotation overlay colors and geometry (RGB)
pub mod annotation {
    /// Spot outline color
    pub const SPOT_COLOR: [u8; 3] = [0, 255, 0];

    /// Spot number label color
    pub const LABEL_COLOR: [u8; 3] = [255, 255, 0];

    /// Lane separator color
    pub const LANE_COLOR: [u8; 3] = [255, 0, 255];

    /// Spot outline thickness in pixels
    pub const CIRCLE_THICKNESS: u32 = 2;

    /// Vertical gap between a spot center and the bottom of its label
    pub const LABEL_OFFSET: i64 = 10;

    /// Pixel scale of the bitmap digit font
    pub const LABEL_SCALE: u32 = 2;
}
