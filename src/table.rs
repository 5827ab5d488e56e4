//! Per-spot records and the result table
//!
//! A [`ResultTable`] holds one detection batch in detection order. Spot
//! numbers are 1-based and stable for the lifetime of the batch. The table
//! is append-only while a batch is being built and is replaced wholesale on
//! re-detection; afterwards only the post-processing fields (`lane`, `rf`,
//! `rel_conc`) are ever rewritten.

use serde::{Deserialize, Serialize};

use crate::color::ColorSample;
use crate::error::{AnalysisError, Result};

/// One detected spot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spot {
    /// 1-based spot number in detection order
    pub number: usize,
    /// Center x in pixel coordinates
    pub x: f64,
    /// Center y in pixel coordinates
    pub y: f64,
    /// Characteristic diameter in pixels
    pub size: f64,
    /// Area derived from the diameter, `π·(size/2)²`
    pub area: f64,
    /// Number of pixels in the detected region
    pub pixel_area: usize,
    /// Measured circularity of the region
    pub circularity: f64,
    /// Color sampled at the rounded center
    pub color: ColorSample,
    /// 1-based lane index, set by lane assignment
    pub lane: Option<usize>,
    /// Retention factor, set by quantification
    pub rf: Option<f64>,
    /// Relative concentration proxy, set by quantification
    pub rel_conc: Option<f64>,
}

impl Spot {
    pub fn hue(&self) -> u8 {
        self.color.hue()
    }

    pub fn saturation(&self) -> u8 {
        self.color.saturation()
    }

    pub fn value(&self) -> u8 {
        self.color.value()
    }
}

/// Ordered spots from one detection pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    spots: Vec<Spot>,
    image_width: u32,
    image_height: u32,
    lane_count: Option<usize>,
}

/// All spots in one lane, in detection order
#[derive(Debug, Clone, PartialEq)]
pub struct LaneGroup<'a> {
    /// 1-based lane index
    pub lane: usize,
    pub spots: Vec<&'a Spot>,
}

impl<'a> LaneGroup<'a> {
    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }
}

impl ResultTable {
    /// Start an empty batch for an image of the given size
    pub(crate) fn new(image_width: u32, image_height: u32) -> Self {
        Self {
            spots: Vec::new(),
            image_width,
            image_height,
            lane_count: None,
        }
    }

    /// Append a spot, numbering it after the last one
    pub(crate) fn push(&mut self, mut spot: Spot) -> usize {
        spot.number = self.spots.len() + 1;
        self.spots.push(spot);
        self.spots.len()
    }

    /// Mutable access to the records for post-processing passes
    pub(crate) fn spots_mut(&mut self) -> &mut [Spot] {
        &mut self.spots
    }

    pub(crate) fn set_lane_count(&mut self, lane_count: usize) {
        self.lane_count = Some(lane_count);
    }

    pub fn spots(&self) -> &[Spot] {
        &self.spots
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Spot> {
        self.spots.iter()
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    /// Look up a spot by its 1-based number
    pub fn get(&self, number: usize) -> Option<&Spot> {
        number.checked_sub(1).and_then(|i| self.spots.get(i))
    }

    /// Width and height of the image the batch was detected in
    pub fn image_dimensions(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    /// Lane count used by the last lane assignment
    pub fn lane_count(&self) -> Option<usize> {
        self.lane_count
    }

    /// Return the table, or `EmptyResult` when no spot passed the filters
    pub fn require_spots(&self) -> Result<&Self> {
        if self.spots.is_empty() {
            Err(AnalysisError::EmptyResult)
        } else {
            Ok(self)
        }
    }

    /// Spots in one lane, in detection order
    pub fn lane_group(&self, lane: usize) -> LaneGroup<'_> {
        LaneGroup {
            lane,
            spots: self
                .spots
                .iter()
                .filter(|s| s.lane == Some(lane))
                .collect(),
        }
    }

    /// One group per lane `1..=lane_count`, empty lanes included
    ///
    /// Returns no groups before lanes have been assigned.
    pub fn lane_groups(&self) -> Vec<LaneGroup<'_>> {
        match self.lane_count {
            Some(count) => (1..=count).map(|lane| self.lane_group(lane)).collect(),
            None => Vec::new(),
        }
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = &'a Spot;
    type IntoIter = std::slice::Iter<'a, Spot>;

    fn into_iter(self) -> Self::IntoIter {
        self.spots.iter()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_numbering_follows_insertion() {
        let table = table_with(100, 100, &[(10.0, 10.0), (50.0, 50.0), (90.0, 90.0)]);
        let numbers: Vec<usize> = table.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(table.get(2).unwrap().x, 50.0);
        assert!(table.get(0).is_none());
        assert!(table.get(4).is_none());
    }

    #[test]
    fn test_empty_table_state() {
        let table = ResultTable::new(10, 10);
        assert!(table.is_empty());
        assert!(matches!(
            table.require_spots(),
            Err(AnalysisError::EmptyResult)
        ));
        assert!(table.lane_groups().is_empty());
    }

    #[test]
    fn test_lane_groups_include_empty_lanes() {
        let mut table = table_with(90, 90, &[(5.0, 5.0), (80.0, 5.0), (10.0, 40.0)]);
        for (spot, lane) in table.spots_mut().iter_mut().zip([1, 3, 1]) {
            spot.lane = Some(lane);
        }
        table.set_lane_count(3);

        let groups = table.lane_groups();
        assert_eq!(groups.len(), 3);
        let numbers: Vec<Vec<usize>> = groups
            .iter()
            .map(|g| g.spots.iter().map(|s| s.number).collect())
            .collect();
        assert_eq!(numbers, vec![vec![1, 3], vec![], vec![2]]);
        assert!(groups[1].is_empty());
    }

    #[test]
    fn test_serializes_to_json() {
        let table = table_with(20, 20, &[(1.0, 2.0)]);
        let json = serde_json::to_string(&table).unwrap();
        let back: ResultTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
