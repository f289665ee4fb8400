//
// roi.rs
// EOTRH-Score-rs
//
// Polygon ROI boundary types validated at construction, plus the mask-based pixel
// extractor that gathers the intensity samples enclosed by one polygon.
//

use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_polygon_mut;
use imageproc::morphology::dilate;
use imageproc::point::Point;
use tracing::debug;

use crate::error::RoiInputError;

/// A user-drawn polygon in image coordinates, guaranteed to carry at least 3
/// vertices. Vertices may lie outside the image; extraction clips them away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoiPolygon {
    vertices: Vec<(i32, i32)>,
}

impl RoiPolygon {
    pub fn new(vertices: Vec<(i32, i32)>) -> Result<Self, RoiInputError> {
        Self::new_at(0, vertices)
    }

    fn new_at(index: usize, vertices: Vec<(i32, i32)>) -> Result<Self, RoiInputError> {
        if vertices.len() < 3 {
            return Err(RoiInputError::TooFewVertices {
                index,
                count: vertices.len(),
            });
        }
        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[(i32, i32)] {
        &self.vertices
    }
}

/// Ordered collection of validated ROI polygons for one radiograph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoiSet(Vec<RoiPolygon>);

impl RoiSet {
    /// Parses the frontend's `[[[x, y], ...], ...]` payload, rejecting malformed
    /// JSON and polygons with fewer than 3 vertices before any pipeline work.
    pub fn from_json(raw: &str) -> Result<Self, RoiInputError> {
        let polygons: Vec<Vec<(i32, i32)>> = serde_json::from_str(raw)?;
        Self::from_vertices(polygons)
    }

    pub fn from_vertices(polygons: Vec<Vec<(i32, i32)>>) -> Result<Self, RoiInputError> {
        let validated = polygons
            .into_iter()
            .enumerate()
            .map(|(index, vertices)| RoiPolygon::new_at(index, vertices))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(validated))
    }

    pub fn polygons(&self) -> &[RoiPolygon] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Rasterizes the polygon into a binary mask, dilates it by one pixel (3x3
/// structuring element) to recover boundary pixels lost to rasterization
/// rounding, and gathers the covered intensity samples. An empty result signals
/// an empty/degenerate ROI, not a hard error.
pub fn extract_pixels(image: &GrayImage, roi: &RoiPolygon) -> Vec<u8> {
    let mut points: Vec<Point<i32>> = roi
        .vertices()
        .iter()
        .map(|&(x, y)| Point::new(x, y))
        .collect();

    // draw_polygon_mut rejects a closed path; drop an explicit closing vertex.
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() < 3 {
        return Vec::new();
    }

    let mut mask = GrayImage::new(image.width(), image.height());
    draw_polygon_mut(&mut mask, &points, Luma([255u8]));
    let mask = dilate(&mask, Norm::LInf, 1);

    let samples: Vec<u8> = image
        .pixels()
        .zip(mask.pixels())
        .filter(|(_, m)| m[0] > 0)
        .map(|(p, _)| p[0])
        .collect();
    debug!(pixels = samples.len(), "ROI pixels extracted");
    samples
}
