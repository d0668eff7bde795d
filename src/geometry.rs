//! Geometry kernel: pure polygon math over `DVec2` vertex slices.
//!
//! Every function here is total: malformed input (fewer than 3 vertices,
//! zero-length rings) degrades to a zero or empty result instead of
//! panicking. Callers are expected to check for degenerate outputs.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Signed shoelace area: positive for counter-clockwise winding.
pub fn signed_area(vertices: &[DVec2]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[(i + 1) % vertices.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

/// Unsigned polygon area (shoelace). Degenerate input returns 0.
pub fn polygon_area(vertices: &[DVec2]) -> f64 {
    signed_area(vertices).abs()
}

/// Sum of consecutive edge lengths, closing the loop back to the first vertex.
pub fn polygon_perimeter(vertices: &[DVec2]) -> f64 {
    if vertices.len() < 2 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[(i + 1) % vertices.len()];
        sum += a.distance(b);
    }
    sum
}

/// Vertex mean. Empty input returns the origin.
pub fn centroid(vertices: &[DVec2]) -> DVec2 {
    if vertices.is_empty() {
        return DVec2::ZERO;
    }
    vertices.iter().copied().sum::<DVec2>() / vertices.len() as f64
}

/// Ray-casting point-in-polygon test.
///
/// A point exactly on an edge is implementation-defined (it may test inside
/// or outside depending on edge orientation); callers should not rely on
/// boundary behavior.
pub fn point_in_polygon(point: DVec2, vertices: &[DVec2]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let vi = vertices[i];
        let vj = vertices[j];
        if (vi.y > point.y) != (vj.y > point.y) {
            let x_cross = (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Axis-aligned bounding box of a vertex set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Width over height; height of zero yields infinity.
    pub fn aspect_ratio(&self) -> f64 {
        self.width() / self.height()
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// Bounding box, or `None` for an empty vertex set.
pub fn bounding_box(vertices: &[DVec2]) -> Option<BoundingBox> {
    let first = *vertices.first()?;
    let mut bb = BoundingBox {
        min_x: first.x,
        max_x: first.x,
        min_y: first.y,
        max_y: first.y,
    };
    for v in &vertices[1..] {
        bb.min_x = bb.min_x.min(v.x);
        bb.max_x = bb.max_x.max(v.x);
        bb.min_y = bb.min_y.min(v.y);
        bb.max_y = bb.max_y.max(v.y);
    }
    Some(bb)
}

/// Shrink a polygon toward its centroid by approximately `distance` feet.
///
/// This scales every vertex by a ratio derived from the mean
/// centroid-to-vertex distance, an approximation of a parallel inward
/// offset, not the real thing. It is exact enough for near-convex parcels
/// and degrades on concave or highly irregular rings; a straight-skeleton
/// offset would be the precise replacement. Returns an empty vec for
/// degenerate input or when the inset consumes the polygon.
pub fn inset_polygon(vertices: &[DVec2], distance: f64) -> Vec<DVec2> {
    if vertices.len() < 3 {
        return Vec::new();
    }
    if distance <= 0.0 {
        return vertices.to_vec();
    }
    let center = centroid(vertices);
    let avg_radius = vertices.iter().map(|v| v.distance(center)).sum::<f64>()
        / vertices.len() as f64;
    if avg_radius <= distance {
        // Inset swallows the whole polygon.
        return Vec::new();
    }
    let scale = (avg_radius - distance) / avg_radius;
    vertices
        .iter()
        .map(|&v| center + (v - center) * scale)
        .collect()
}

/// One interior grid sample carrying the cell area it represents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSample {
    pub point: DVec2,
    /// spacing squared, for piecewise-constant integration.
    pub cell_area: f64,
}

/// Regular grid sample of a polygon's interior.
///
/// Samples are cell centers on a `spacing`-pitch grid over the bounding box,
/// kept only when inside the polygon. Empty for degenerate polygons or
/// non-positive spacing.
pub fn sample_grid(vertices: &[DVec2], spacing: f64) -> Vec<GridSample> {
    if vertices.len() < 3 || spacing <= 0.0 {
        return Vec::new();
    }
    let Some(bb) = bounding_box(vertices) else {
        return Vec::new();
    };
    let cell_area = spacing * spacing;
    let mut samples = Vec::new();
    let mut y = bb.min_y + spacing / 2.0;
    while y < bb.max_y {
        let mut x = bb.min_x + spacing / 2.0;
        while x < bb.max_x {
            let p = DVec2::new(x, y);
            if point_in_polygon(p, vertices) {
                samples.push(GridSample {
                    point: p,
                    cell_area,
                });
            }
            x += spacing;
        }
        y += spacing;
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    fn square_200() -> Vec<DVec2> {
        vec![
            dvec2(0.0, 0.0),
            dvec2(200.0, 0.0),
            dvec2(200.0, 200.0),
            dvec2(0.0, 200.0),
        ]
    }

    #[test]
    fn area_of_square() {
        assert_eq!(polygon_area(&square_200()), 40_000.0);
    }

    #[test]
    fn area_is_winding_independent() {
        let mut reversed = square_200();
        reversed.reverse();
        assert_eq!(polygon_area(&reversed), 40_000.0);
        assert!(signed_area(&square_200()) > 0.0);
        assert!(signed_area(&reversed) < 0.0);
    }

    #[test]
    fn degenerate_area_is_zero() {
        assert_eq!(polygon_area(&[]), 0.0);
        assert_eq!(polygon_area(&[dvec2(0.0, 0.0), dvec2(1.0, 1.0)]), 0.0);
    }

    #[test]
    fn area_of_triangle() {
        let tri = vec![dvec2(0.0, 0.0), dvec2(10.0, 0.0), dvec2(0.0, 10.0)];
        assert_eq!(polygon_area(&tri), 50.0);
    }

    #[test]
    fn perimeter_of_square() {
        assert_eq!(polygon_perimeter(&square_200()), 800.0);
    }

    #[test]
    fn centroid_of_square() {
        assert_eq!(centroid(&square_200()), dvec2(100.0, 100.0));
    }

    #[test]
    fn point_in_polygon_interior_and_exterior() {
        let sq = square_200();
        assert!(point_in_polygon(dvec2(100.0, 100.0), &sq));
        assert!(point_in_polygon(dvec2(1.0, 1.0), &sq));
        assert!(!point_in_polygon(dvec2(-1.0, 100.0), &sq));
        assert!(!point_in_polygon(dvec2(201.0, 100.0), &sq));
        assert!(!point_in_polygon(dvec2(100.0, 250.0), &sq));
    }

    #[test]
    fn point_in_concave_polygon() {
        // L-shape with the notch at top-right.
        let ell = vec![
            dvec2(0.0, 0.0),
            dvec2(100.0, 0.0),
            dvec2(100.0, 50.0),
            dvec2(50.0, 50.0),
            dvec2(50.0, 100.0),
            dvec2(0.0, 100.0),
        ];
        assert!(point_in_polygon(dvec2(25.0, 75.0), &ell));
        assert!(!point_in_polygon(dvec2(75.0, 75.0), &ell));
    }

    #[test]
    fn bounding_box_of_square() {
        let bb = bounding_box(&square_200()).unwrap();
        assert_eq!(bb.width(), 200.0);
        assert_eq!(bb.height(), 200.0);
        assert_eq!(bb.aspect_ratio(), 1.0);
        assert_eq!(bb.center(), dvec2(100.0, 100.0));
        assert!(bounding_box(&[]).is_none());
    }

    #[test]
    fn inset_shrinks_area() {
        let inset = inset_polygon(&square_200(), 20.0);
        assert_eq!(inset.len(), 4);
        let inner = polygon_area(&inset);
        assert!(inner > 0.0);
        assert!(inner < 40_000.0);
        // Every inset vertex stays inside the original ring.
        for v in &inset {
            assert!(point_in_polygon(*v, &square_200()));
        }
    }

    #[test]
    fn inset_consuming_polygon_is_empty() {
        let inset = inset_polygon(&square_200(), 500.0);
        assert!(inset.is_empty());
    }

    #[test]
    fn inset_zero_is_identity() {
        assert_eq!(inset_polygon(&square_200(), 0.0), square_200());
    }

    #[test]
    fn sample_grid_integrates_close_to_area() {
        let samples = sample_grid(&square_200(), 10.0);
        assert!(!samples.is_empty());
        let integrated: f64 = samples.iter().map(|s| s.cell_area).sum();
        // Cell-center sampling of an axis-aligned square is exact.
        assert!((integrated - 40_000.0).abs() < 1.0);
        for s in &samples {
            assert!(point_in_polygon(s.point, &square_200()));
        }
    }

    #[test]
    fn sample_grid_degenerate_is_empty() {
        assert!(sample_grid(&[], 10.0).is_empty());
        assert!(sample_grid(&square_200(), 0.0).is_empty());
    }
}
