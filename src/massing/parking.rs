//! Parking lot partitioning and sizing.
//!
//! Required spaces are split into lots of at most [`MAX_LOT_SPACES`]. A
//! handful of legible lots reads better on a plan than one giant slab, and
//! gives the position search smaller pieces to fit. Lot sizing uses one
//! gross constant per space (stall plus its share of aisles and
//! circulation); the 9x18 ft net stall (162 sqft) is folded into that
//! constant rather than modeled separately.

use crate::types::{BuildableEnvelope, Point};

/// Gross square feet per parking space, circulation included.
pub const PARKING_SQFT_PER_SPACE: f64 = 350.0;

/// Largest single lot, in spaces.
pub const MAX_LOT_SPACES: u32 = 50;

/// Lot width over depth.
pub const LOT_ASPECT: f64 = 2.5;

/// Split a space count into lot-sized chunks, largest lots first.
pub fn plan_lots(total_spaces: u32) -> Vec<u32> {
    if total_spaces == 0 {
        return Vec::new();
    }
    let mut lots = Vec::new();
    let mut remaining = total_spaces;
    while remaining > 0 {
        let lot = remaining.min(MAX_LOT_SPACES);
        lots.push(lot);
        remaining -= lot;
    }
    lots
}

/// Width and depth of a lot holding `spaces`.
pub fn lot_dimensions(spaces: u32) -> (f64, f64) {
    let area = f64::from(spaces) * PARKING_SQFT_PER_SPACE;
    let width = (area * LOT_ASPECT).sqrt();
    (width, area / width)
}

/// Preferred lot centers, in search order: the four envelope corners
/// (tier 1), then center-offset positions (tier 2). The full grid scan in
/// `placement::find_position` is the third tier.
pub fn candidate_centers(envelope: &BuildableEnvelope, width: f64, depth: f64) -> Vec<Point> {
    let Some(bb) = envelope.polygon.bounding_box() else {
        return Vec::new();
    };
    let hw = width / 2.0;
    let hd = depth / 2.0;
    let margin = 5.0;
    let center = bb.center();
    vec![
        // Tier 1: corners.
        Point::new(bb.min_x + hw + margin, bb.min_y + hd + margin),
        Point::new(bb.max_x - hw - margin, bb.min_y + hd + margin),
        Point::new(bb.min_x + hw + margin, bb.max_y - hd - margin),
        Point::new(bb.max_x - hw - margin, bb.max_y - hd - margin),
        // Tier 2: offsets from center toward each edge.
        Point::new(center.x, bb.min_y + hd + margin),
        Point::new(center.x, bb.max_y - hd - margin),
        Point::new(bb.min_x + hw + margin, center.y),
        Point::new(bb.max_x - hw - margin, center.y),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lots_partition_exactly() {
        assert_eq!(plan_lots(0), Vec::<u32>::new());
        assert_eq!(plan_lots(30), vec![30]);
        assert_eq!(plan_lots(50), vec![50]);
        assert_eq!(plan_lots(120), vec![50, 50, 20]);
        for total in [1u32, 49, 51, 99, 137, 250] {
            let lots = plan_lots(total);
            assert_eq!(lots.iter().sum::<u32>(), total);
            assert!(lots.iter().all(|&l| l > 0 && l <= MAX_LOT_SPACES));
        }
    }

    #[test]
    fn lot_dimensions_carry_gross_area_and_aspect() {
        let (w, d) = lot_dimensions(50);
        assert!((w * d - 50.0 * PARKING_SQFT_PER_SPACE).abs() < 1e-6);
        assert!((w / d - LOT_ASPECT).abs() < 1e-9);
    }
}
