//! Footprint position search inside a buildable envelope.
//!
//! Placement is validate-then-commit: a candidate position is accepted only
//! when every footprint corner tests inside the envelope polygon AND the
//! footprint keeps a clearance buffer from everything already placed.
//! When the preferred position fails, a progressively finer step grid
//! (50 -> 25 -> 12 -> 6 ft) is scanned; exhausting the search means the
//! caller omits the element and records a warning.

use glam::DVec2;

use crate::geometry::{bounding_box, point_in_polygon, BoundingBox};
use crate::types::{BuildableEnvelope, Element, Point, Polygon};

/// Grid pitches tried in order, coarse to fine, in feet.
pub const SEARCH_STEPS: [f64; 4] = [50.0, 25.0, 12.0, 6.0];

/// Hard cap on candidate positions tested per element.
const MAX_ATTEMPTS: usize = 4_000;

/// Clearance kept between placed elements, in feet.
pub const CLEARANCE_FT: f64 = 10.0;

/// Axis-aligned rectangle footprint rotated about its center.
pub fn footprint_rect(center: Point, width: f64, depth: f64, rotation_deg: f64) -> Polygon {
    let hw = width / 2.0;
    let hd = depth / 2.0;
    let corners = [
        DVec2::new(-hw, -hd),
        DVec2::new(hw, -hd),
        DVec2::new(hw, hd),
        DVec2::new(-hw, hd),
    ];
    let theta = rotation_deg.to_radians();
    let (sin, cos) = theta.sin_cos();
    Polygon::new(
        corners
            .iter()
            .map(|c| {
                Point::new(
                    center.x + c.x * cos - c.y * sin,
                    center.y + c.x * sin + c.y * cos,
                )
            })
            .collect(),
    )
}

/// True when every corner of `footprint` lies inside the envelope ring.
pub fn corners_inside(envelope: &Polygon, footprint: &Polygon) -> bool {
    footprint
        .vertices
        .iter()
        .all(|&corner| point_in_polygon(corner, &envelope.vertices))
}

fn inflated(bb: BoundingBox, by: f64) -> BoundingBox {
    BoundingBox {
        min_x: bb.min_x - by,
        max_x: bb.max_x + by,
        min_y: bb.min_y - by,
        max_y: bb.max_y + by,
    }
}

fn boxes_overlap(a: &BoundingBox, b: &BoundingBox) -> bool {
    a.min_x < b.max_x && a.max_x > b.min_x && a.min_y < b.max_y && a.max_y > b.min_y
}

/// Conservative overlap test: bounding boxes inflated by `buffer`.
/// Rotated footprints over-reject slightly, never under-reject.
pub fn overlaps_existing(footprint: &Polygon, existing: &[&Element], buffer: f64) -> bool {
    let Some(fp_box) = bounding_box(&footprint.vertices) else {
        return false;
    };
    let fp_box = inflated(fp_box, buffer);
    existing.iter().any(|e| {
        bounding_box(&e.vertices.vertices)
            .is_some_and(|eb| boxes_overlap(&fp_box, &eb))
    })
}

fn is_valid(
    envelope: &Polygon,
    center: Point,
    width: f64,
    depth: f64,
    rotation_deg: f64,
    existing: &[&Element],
    buffer: f64,
) -> bool {
    let footprint = footprint_rect(center, width, depth, rotation_deg);
    corners_inside(envelope, &footprint) && !overlaps_existing(&footprint, existing, buffer)
}

/// Find a fully-contained, non-overlapping center for a `width` x `depth`
/// footprint. Tries `preferred` first, then scans the envelope's bounding
/// box at each step pitch. Returns `None` when the bounded search exhausts;
/// the caller must omit the element, never place it anyway.
pub fn find_position(
    envelope: &BuildableEnvelope,
    width: f64,
    depth: f64,
    rotation_deg: f64,
    preferred: Point,
    existing: &[&Element],
    buffer: f64,
) -> Option<Point> {
    let ring = &envelope.polygon;
    if is_valid(ring, preferred, width, depth, rotation_deg, existing, buffer) {
        return Some(preferred);
    }

    let bb = ring.bounding_box()?;
    let half_w = width / 2.0;
    let half_d = depth / 2.0;
    let mut attempts = 0usize;

    for step in SEARCH_STEPS {
        let mut y = bb.min_y + half_d;
        while y <= bb.max_y - half_d {
            let mut x = bb.min_x + half_w;
            while x <= bb.max_x - half_w {
                attempts += 1;
                if attempts > MAX_ATTEMPTS {
                    return None;
                }
                let candidate = Point::new(x, y);
                if is_valid(ring, candidate, width, depth, rotation_deg, existing, buffer) {
                    return Some(candidate);
                }
                x += step;
            }
            y += step;
        }
    }
    None
}
