//! Buildable envelope derivation: parcel polygon minus setbacks.
//!
//! Two paths, chosen by whether the external road classifier supplied an
//! [`EdgeClassification`]:
//!
//! - classified: each edge is offset inward by its class-specific setback
//!   and consecutive offset lines are re-intersected (exact for convex
//!   parcels);
//! - unclassified: a single blended setback distance drives the centroid
//!   inset approximation from the geometry kernel (lower fidelity on
//!   irregular parcels).
//!
//! A collapsed envelope is an explicit [`EnvelopeError::NoBuildableArea`],
//! never a degenerate polygon handed downstream.

use glam::DVec2;

use crate::errors::EnvelopeError;
use crate::geometry::{inset_polygon, polygon_area, signed_area};
use crate::log::debug;
use crate::types::{BuildableEnvelope, EdgeClassification, Polygon, Setbacks};

/// Edge classes a parcel edge can take. Unclassified edges are sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeClass {
    Front,
    Side,
    Rear,
}

fn classify_edge(index: usize, classification: &EdgeClassification) -> EdgeClass {
    if classification.front_edges.contains(&index) {
        EdgeClass::Front
    } else if classification.rear_edges.contains(&index) {
        EdgeClass::Rear
    } else {
        EdgeClass::Side
    }
}

fn setback_for(class: EdgeClass, setbacks: Setbacks) -> f64 {
    match class {
        EdgeClass::Front => setbacks.front,
        EdgeClass::Side => setbacks.side,
        EdgeClass::Rear => setbacks.rear,
    }
}

/// Derive the legally buildable region of a parcel.
///
/// The returned envelope's area never exceeds the parcel's. Setbacks that
/// consume the parcel produce [`EnvelopeError::NoBuildableArea`].
pub fn derive_envelope(
    parcel_polygon: &Polygon,
    setbacks: Setbacks,
    classification: Option<&EdgeClassification>,
) -> Result<BuildableEnvelope, EnvelopeError> {
    let vertices = &parcel_polygon.vertices;
    if vertices.len() < 3 {
        return Err(EnvelopeError::DegenerateParcel {
            vertices: vertices.len(),
        });
    }
    let parcel_area = polygon_area(vertices);
    if parcel_area <= 0.0 {
        return Err(EnvelopeError::DegenerateParcel {
            vertices: vertices.len(),
        });
    }

    let inset = match classification {
        Some(classes) => per_edge_offset(vertices, setbacks, classes),
        None => {
            debug!("no edge classification; falling back to blended inset");
            inset_polygon(vertices, setbacks.blended())
        }
    };

    let area = polygon_area(&inset);
    if inset.len() < 3 || area <= 0.0 {
        return Err(EnvelopeError::NoBuildableArea);
    }

    Ok(BuildableEnvelope {
        polygon: Polygon::new(inset),
        // Clamp preserves the envelope <= parcel invariant even if the
        // offset intersection overshoots on a concave ring.
        area_sq_ft: area.min(parcel_area),
        setbacks_applied: setbacks,
    })
}

/// Offset every edge inward by its class setback, then rebuild vertices as
/// intersections of consecutive offset lines. Exact for convex parcels; a
/// concave ring can self-intersect, which the caller's area check catches.
fn per_edge_offset(
    vertices: &[DVec2],
    setbacks: Setbacks,
    classification: &EdgeClassification,
) -> Vec<DVec2> {
    let n = vertices.len();
    // Interior is to the left of each directed edge when winding is CCW.
    let ccw = signed_area(vertices) >= 0.0;

    // Offset anchor + direction per edge.
    let mut lines = Vec::with_capacity(n);
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let d = b - a;
        let len = d.length();
        if len <= f64::EPSILON {
            // Coincident consecutive points; carry a zero-length edge through
            // and let the intersection step skip it.
            lines.push((a, d));
            continue;
        }
        let dir = d / len;
        let inward = if ccw {
            DVec2::new(-dir.y, dir.x)
        } else {
            DVec2::new(dir.y, -dir.x)
        };
        let class = classify_edge(i, classification);
        let offset = setback_for(class, setbacks);
        lines.push((a + inward * offset, dir));
    }

    // New vertex i sits where the offsets of edge i-1 and edge i meet.
    let mut result = Vec::with_capacity(n);
    for i in 0..n {
        let prev = lines[(i + n - 1) % n];
        let curr = lines[i];
        match line_intersection(prev.0, prev.1, curr.0, curr.1) {
            Some(p) => result.push(p),
            // Parallel or zero-length neighbor: fall back to the current
            // edge's offset anchor.
            None => result.push(curr.0),
        }
    }
    result
}

/// Intersection of two infinite lines given as (point, direction).
fn line_intersection(p1: DVec2, d1: DVec2, p2: DVec2, d2: DVec2) -> Option<DVec2> {
    let denom = d1.perp_dot(d2);
    if denom.abs() < 1e-9 {
        return None;
    }
    let t = (p2 - p1).perp_dot(d2) / denom;
    Some(p1 + d1 * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point_in_polygon;
    use crate::types::Point;

    fn square_parcel() -> Polygon {
        Polygon::rect(Point::new(0.0, 0.0), 200.0, 200.0)
    }

    fn setbacks() -> Setbacks {
        Setbacks {
            front: 25.0,
            side: 15.0,
            rear: 20.0,
        }
    }

    // Square parcel, edge 0 on the south (front), edge 2 on the north (rear).
    fn classification() -> EdgeClassification {
        EdgeClassification {
            front_edges: vec![0],
            rear_edges: vec![2],
            method: "road-proximity".into(),
            source_name: "test".into(),
        }
    }

    #[test]
    fn fallback_inset_shrinks_but_keeps_area() {
        let env = derive_envelope(&square_parcel(), setbacks(), None).unwrap();
        assert!(env.area_sq_ft > 0.0);
        assert!(env.area_sq_ft < 40_000.0);
        for v in &env.polygon.vertices {
            assert!(point_in_polygon(*v, &square_parcel().vertices));
        }
    }

    #[test]
    fn classified_offset_is_exact_for_square() {
        let env =
            derive_envelope(&square_parcel(), setbacks(), Some(&classification())).unwrap();
        // 200 wide minus two 15 ft sides; 200 deep minus front 25 + rear 20.
        let expected = (200.0 - 30.0) * (200.0 - 45.0);
        assert!((env.area_sq_ft - expected).abs() < 1e-6);
        let bb = env.polygon.bounding_box().unwrap();
        assert!((bb.min_y - 25.0).abs() < 1e-9);
        assert!((bb.max_y - 180.0).abs() < 1e-9);
        assert!((bb.min_x - 15.0).abs() < 1e-9);
        assert!((bb.max_x - 185.0).abs() < 1e-9);
    }

    #[test]
    fn classified_offset_respects_winding() {
        let mut cw = square_parcel();
        cw.vertices.reverse();
        // After reversal the old edge 0 (south) is edge 2, and vice versa.
        let classes = EdgeClassification {
            front_edges: vec![2],
            rear_edges: vec![0],
            ..EdgeClassification::default()
        };
        let env = derive_envelope(&cw, setbacks(), Some(&classes)).unwrap();
        assert!(env.area_sq_ft > 0.0);
        assert!(env.area_sq_ft < 40_000.0);
    }

    #[test]
    fn consuming_setbacks_report_no_buildable_area() {
        let huge = Setbacks {
            front: 120.0,
            side: 120.0,
            rear: 120.0,
        };
        assert_eq!(
            derive_envelope(&square_parcel(), huge, None),
            Err(EnvelopeError::NoBuildableArea)
        );
        assert_eq!(
            derive_envelope(&square_parcel(), huge, Some(&classification())),
            Err(EnvelopeError::NoBuildableArea)
        );
    }

    #[test]
    fn degenerate_parcel_is_rejected() {
        let line = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        assert_eq!(
            derive_envelope(&line, setbacks(), None),
            Err(EnvelopeError::DegenerateParcel { vertices: 2 })
        );
    }

    #[test]
    fn envelope_never_exceeds_parcel_area() {
        let irregular = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(180.0, 20.0),
            Point::new(220.0, 160.0),
            Point::new(40.0, 210.0),
            Point::new(-10.0, 90.0),
        ]);
        let parcel_area = irregular.area();
        let env = derive_envelope(&irregular, setbacks(), None).unwrap();
        assert!(env.area_sq_ft <= parcel_area);
    }
}
