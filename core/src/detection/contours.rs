use image::{imageops, GrayImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::geometry;
use imageproc::point::Point;

use crate::types::{BinaryMask, Detection};

/// Finds the outer borders of top-level foreground regions
///
/// Holes, and regions nested inside holes, are dropped so each blob is
/// reported once. Order is the raster-scan discovery order of the tracer.
/// Points are in mask coordinates, regions touching the image edge included.
pub fn external_contours(mask: &BinaryMask) -> Vec<Contour<i32>> {
    let (width, height) = (mask.width(), mask.height());
    if width == 0 || height == 0 {
        return Vec::new();
    }

    // The tracer needs a background frame to start borders on the first row
    // or column.
    let mut framed = GrayImage::new(width + 2, height + 2);
    imageops::replace(&mut framed, mask.as_image(), 1, 1);

    find_contours::<i32>(&framed)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|mut contour| {
            for p in &mut contour.points {
                p.x -= 1;
                p.y -= 1;
            }
            contour
        })
        .collect()
}

/// Area enclosed by a traced contour, in pixels
///
/// Shoelace area over the pixel-center polygon plus the boundary band
/// (Pick's theorem), so a solid k×k square measures exactly k².
/// Retraced one-pixel-wide spurs count once per pixel.
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    match points.len() {
        0 => 0.0,
        1 => 1.0,
        n => geometry::contour_area(points) + n as f64 / 2.0 + 1.0,
    }
}

/// Axis-aligned bounding rectangle `(x, y, width, height)` of a contour
pub fn bounding_rect(points: &[Point<i32>]) -> Option<(u32, u32, u32, u32)> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in points.iter().skip(1) {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    Some((
        min_x.max(0) as u32,
        min_y.max(0) as u32,
        (max_x - min_x + 1) as u32,
        (max_y - min_y + 1) as u32,
    ))
}

/// Converts a binary mask into detections
///
/// Regions whose area is not strictly greater than `min_area` are dropped;
/// survivors are numbered from 1 in discovery order. A blank or zero-sized
/// mask yields no detections.
pub fn extract_detections(mask: &BinaryMask, min_area: f64) -> Vec<Detection> {
    if mask.is_blank() {
        return Vec::new();
    }

    external_contours(mask)
        .iter()
        .filter_map(|contour| {
            let area = contour_area(&contour.points);
            if area <= min_area {
                return None;
            }
            let (x, y, width, height) = bounding_rect(&contour.points)?;
            Some((x, y, width, height, area))
        })
        .zip(1u32..)
        .map(|((x, y, width, height, area), id)| Detection {
            id,
            x,
            y,
            width,
            height,
            area,
        })
        .collect()
}

/// Counts regions with area strictly greater than `min_area`
pub fn count_regions_above(mask: &BinaryMask, min_area: f64) -> usize {
    if mask.is_blank() {
        return 0;
    }

    external_contours(mask)
        .iter()
        .filter(|c| contour_area(&c.points) > min_area)
        .count()
}
