//! Point-in-region hit-testing.

use serde::Serialize;

use crate::dataset::{AnnotationBoundary, AnnotationPoint};
use crate::region::{region_id, region_label};

/// A boundary that contains the query point.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionHit<'a> {
    pub id: String,
    pub label: String,
    pub index: usize,
    pub boundary: &'a AnnotationBoundary,
}

/// Client-facing summary of a hit; carries no vertex data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    pub id: String,
    pub label: String,
    pub score: f64,
    pub iou: f64,
}

impl RegionHit<'_> {
    pub fn summary(&self) -> RegionSummary {
        RegionSummary {
            id: self.id.clone(),
            label: self.label.clone(),
            score: self.boundary.score,
            iou: self.boundary.iou,
        }
    }
}

/// Ray-casting containment test.
///
/// Casts a ray from `(x, y)` towards +x and counts edge crossings. Edges with
/// equal y-coordinates never count. Points on a left or bottom edge are
/// inside, points on a right or top edge are outside. Polygons with fewer
/// than three vertices contain nothing.
pub fn point_in_polygon(vertices: &[AnnotationPoint], x: f64, y: f64) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let vi = vertices[i];
        let vj = vertices[j];
        if vi.y != vj.y && (vi.y > y) != (vj.y > y) {
            let x_cross = (vj.x - vi.x) * (y - vi.y) / (vj.y - vi.y) + vi.x;
            if x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Find the first boundary, in dataset order, that contains `(x, y)`.
///
/// When `skip` returns `true` for a containing boundary the search moves on
/// to later boundaries instead of stopping.
pub fn find_region_containing_point<'a, F>(
    boundaries: &'a [AnnotationBoundary],
    x: f64,
    y: f64,
    mut skip: F,
) -> Option<RegionHit<'a>>
where
    F: FnMut(&str, &AnnotationBoundary) -> bool,
{
    boundaries
        .iter()
        .enumerate()
        .filter(|(_, boundary)| point_in_polygon(boundary.vertices(), x, y))
        .map(|(index, boundary)| (index, region_id(index), boundary))
        .find(|(_, id, boundary)| !skip(id.as_str(), boundary))
        .map(|(index, id, boundary)| RegionHit {
            id,
            label: region_label(index),
            index,
            boundary,
        })
}
