//! Annotated plate overlay
//!
//! Draws detection results onto a copy of the source image: an outline
//! circle of diameter `size` at each spot, the spot number above it, and a
//! vertical separator between adjacent lanes at `k·(width / lane_count)`.
//! The source image is never modified.
//!
//! Spot numbers are drawn as seven-segment digits so no font file has to be
//! shipped with the crate.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};

use crate::config::AnnotationConfig;
use crate::constants::annotation::{
    LABEL_COLOR, LABEL_OFFSET, LABEL_SCALE, LANE_COLOR, SPOT_COLOR,
};
use crate::lanes::lane_boundaries;
use crate::table::{ResultTable, Spot};

/// Segment endpoints in glyph units, in `abcdefg` order
const SEGMENTS: [((f32, f32), (f32, f32)); 7] = [
    ((0.0, 0.0), (1.0, 0.0)),
    ((1.0, 0.0), (1.0, 1.0)),
    ((1.0, 1.0), (1.0, 2.0)),
    ((0.0, 2.0), (1.0, 2.0)),
    ((0.0, 1.0), (0.0, 2.0)),
    ((0.0, 0.0), (0.0, 1.0)),
    ((0.0, 1.0), (1.0, 1.0)),
];

/// Lit segments per digit, bit 6 = a .. bit 0 = g
const DIGITS: [u8; 10] = [
    0b111_1110, 0b011_0000, 0b110_1101, 0b111_1001, 0b011_0011,
    0b101_1011, 0b101_1111, 0b111_0000, 0b111_1111, 0b111_1011,
];

/// Glyph cell size in pixels before scaling
const GLYPH_WIDTH: f32 = 3.0;
const GLYPH_HALF_HEIGHT: f32 = 3.0;

/// Render the detection overlay onto a copy of `image`
pub fn annotate(image: &RgbImage, table: &ResultTable, config: &AnnotationConfig) -> RgbImage {
    let mut canvas = image.clone();
    let height = canvas.height() as f32;

    if config.draw_lanes {
        if let Some(lane_count) = table.lane_count() {
            for x in lane_boundaries(canvas.width(), lane_count) {
                let x = x.round() as f32;
                draw_line_segment_mut(&mut canvas, (x, -1.0), (x, height), Rgb(LANE_COLOR));
            }
        }
    }

    for spot in table {
        draw_outline(&mut canvas, spot, config.circle_thickness);
        if config.draw_labels {
            let (cx, cy) = (spot.x.round() as f32, spot.y.round() as f32);
            draw_number(&mut canvas, spot.number, cx, cy - LABEL_OFFSET as f32);
        }
    }
    canvas
}

/// Concentric outlines `thickness` pixels wide, the innermost at the spot radius
fn draw_outline(canvas: &mut RgbImage, spot: &Spot, thickness: u32) {
    let center = (spot.x.round() as i32, spot.y.round() as i32);
    let radius = (spot.size / 2.0).round() as i32;
    for ring in 0..thickness.max(1) as i32 {
        draw_hollow_circle_mut(canvas, center, radius + ring, Rgb(SPOT_COLOR));
    }
}

/// Draw `number` centered on `cx` with its bottom edge at `bottom`
fn draw_number(canvas: &mut RgbImage, number: usize, cx: f32, bottom: f32) {
    let scale = LABEL_SCALE as f32;
    let (width, half) = (GLYPH_WIDTH * scale, GLYPH_HALF_HEIGHT * scale);
    let advance = width + 2.0 * scale;

    let digits: Vec<usize> = number
        .to_string()
        .bytes()
        .map(|b| usize::from(b - b'0'))
        .collect();
    let text_width = digits.len() as f32 * advance - 2.0 * scale;
    let left = (cx - text_width / 2.0).round();
    let top = bottom - 2.0 * half;

    for (i, &digit) in digits.iter().enumerate() {
        let origin_x = left + i as f32 * advance;
        for (bit, ((x0, y0), (x1, y1))) in SEGMENTS.iter().enumerate() {
            if DIGITS[digit] & (1 << (6 - bit)) == 0 {
                continue;
            }
            draw_line_segment_mut(
                canvas,
                (origin_x + x0 * width, top + y0 * half),
                (origin_x + x1 * width, top + y1 * half),
                Rgb(LABEL_COLOR),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lanes::assign_lanes;
    use crate::table::test_support::table_with;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    #[test]
    fn test_source_is_untouched() {
        let image = RgbImage::from_pixel(100, 100, WHITE);
        let table = table_with(100, 100, &[(50.0, 50.0)]);
        let annotated = annotate(&image, &table, &AnnotationConfig::default());
        assert!(image.pixels().all(|p| *p == WHITE));
        assert_ne!(annotated, image);
    }

    #[test]
    fn test_circle_drawn_at_radius() {
        let image = RgbImage::from_pixel(100, 100, WHITE);
        let table = table_with(100, 100, &[(50.0, 50.0)]);
        let config = AnnotationConfig {
            draw_labels: false,
            ..Default::default()
        };
        let annotated = annotate(&image, &table, &config);
        // test spots have size 20
        assert_eq!(*annotated.get_pixel(60, 50), Rgb(SPOT_COLOR));
        assert_eq!(*annotated.get_pixel(50, 40), Rgb(SPOT_COLOR));
        assert_eq!(*annotated.get_pixel(50, 50), WHITE);
    }

    #[test]
    fn test_lane_separators() {
        let image = RgbImage::from_pixel(300, 50, WHITE);
        let mut table = table_with(300, 50, &[]);
        assign_lanes(&mut table, 300, 3).unwrap();
        let annotated = annotate(&image, &table, &AnnotationConfig::default());
        for y in 0..50 {
            assert_eq!(*annotated.get_pixel(100, y), Rgb(LANE_COLOR));
            assert_eq!(*annotated.get_pixel(200, y), Rgb(LANE_COLOR));
        }
        assert_eq!(*annotated.get_pixel(150, 25), WHITE);
    }

    #[test]
    fn test_no_separators_before_lane_assignment() {
        let image = RgbImage::from_pixel(300, 50, WHITE);
        let table = table_with(300, 50, &[]);
        let annotated = annotate(&image, &table, &AnnotationConfig::default());
        assert_eq!(annotated, image);
    }

    #[test]
    fn test_label_drawn_above_spot() {
        let image = RgbImage::from_pixel(100, 100, WHITE);
        let table = table_with(100, 100, &[(50.0, 80.0)]);
        let config = AnnotationConfig {
            draw_lanes: false,
            circle_thickness: 1,
            ..Default::default()
        };
        let annotated = annotate(&image, &table, &config);
        let label_pixels = annotated
            .enumerate_pixels()
            .filter(|(_, y, p)| *y < 70 && **p == Rgb(LABEL_COLOR))
            .count();
        assert!(label_pixels > 0);
    }

    #[test]
    fn test_overlay_near_edges_is_clipped() {
        let image = RgbImage::from_pixel(20, 20, WHITE);
        let table = table_with(20, 20, &[(0.0, 0.0), (19.0, 19.0)]);
        let annotated = annotate(&image, &table, &AnnotationConfig::default());
        assert_eq!(annotated.dimensions(), (20, 20));
    }
}
