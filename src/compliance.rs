//! Zoning compliance checks over a generated (or hand-edited) layout.
//!
//! Four independent rules (FAR, coverage, parking ratio, setbacks), each
//! binary pass/fail worth 25 points. The aggregate is deliberately an
//! unweighted step score, not a continuous penalty: a layout is either
//! clean on a rule or it is not. Pure function of (layout, parcel);
//! callers that mutate elements re-invoke it themselves.

use serde::{Deserialize, Serialize};

use crate::types::{Layout, Parcel};

/// Outcome of one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCheck {
    pub compliant: bool,
    /// The measured value, in the rule's own unit.
    pub actual: f64,
    /// The zoning limit the measurement is held against.
    pub required: f64,
    pub message: String,
}

/// All four rule outcomes plus the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceResult {
    pub far: RuleCheck,
    pub coverage: RuleCheck,
    pub parking: RuleCheck,
    pub setbacks: RuleCheck,
    pub overall_compliant: bool,
    /// 25 points per passing rule: one of {0, 25, 50, 75, 100}.
    pub score: u32,
}

/// Evaluate a layout against its parcel's zoning.
pub fn check_compliance(layout: &Layout, parcel: &Parcel) -> ComplianceResult {
    let zoning = &parcel.zoning;
    let parcel_area = parcel.area_sq_ft;
    let floor_area = layout.building_floor_sq_ft();
    let footprint = layout.footprint_sq_ft();

    let far_actual = if parcel_area > 0.0 { floor_area / parcel_area } else { 0.0 };
    let far = RuleCheck {
        compliant: far_actual <= zoning.max_far,
        actual: far_actual,
        required: zoning.max_far,
        message: format!(
            "FAR {:.2} against a maximum of {:.2}",
            far_actual, zoning.max_far
        ),
    };

    let coverage_actual = if parcel_area > 0.0 { footprint / parcel_area } else { 0.0 };
    let coverage_limit = zoning.max_coverage_pct / 100.0;
    let coverage = RuleCheck {
        compliant: coverage_actual <= coverage_limit,
        actual: coverage_actual,
        required: coverage_limit,
        message: format!(
            "coverage {:.1}% against a maximum of {:.1}%",
            coverage_actual * 100.0,
            zoning.max_coverage_pct
        ),
    };

    let parking_actual = if floor_area > 0.0 {
        layout.parking_sq_ft() / floor_area
    } else {
        0.0
    };
    let parking = RuleCheck {
        compliant: parking_actual >= zoning.min_parking_ratio,
        actual: parking_actual,
        required: zoning.min_parking_ratio,
        message: format!(
            "parking ratio {:.2} against a minimum of {:.2}",
            parking_actual, zoning.min_parking_ratio
        ),
    };

    let setbacks = check_setbacks(layout, parcel);

    let score = 25 * [&far, &coverage, &parking, &setbacks]
        .iter()
        .filter(|c| c.compliant)
        .count() as u32;

    ComplianceResult {
        far,
        coverage,
        parking,
        setbacks,
        overall_compliant: score == 100,
        score,
    }
}

/// Per-building bounding-box distances to the parcel's bounding-box edges.
///
/// Convention: front is the parcel's south (minimum-y) edge, rear the north
/// edge, sides east and west. Each class is checked independently against
/// its own setback; the rule passes only when every building clears all
/// three classes. The reported numbers are the worst margin found and the
/// setback it was held against.
fn check_setbacks(layout: &Layout, parcel: &Parcel) -> RuleCheck {
    let zoning = &parcel.zoning;
    let Some(pb) = parcel.polygon.bounding_box() else {
        return RuleCheck {
            compliant: false,
            actual: 0.0,
            required: zoning.front_setback_ft,
            message: "parcel has no extent".into(),
        };
    };

    if layout.buildings.is_empty() {
        return RuleCheck {
            compliant: true,
            actual: f64::INFINITY,
            required: zoning.front_setback_ft,
            message: "no buildings to check".into(),
        };
    }

    // Track the worst (distance - required) margin across all buildings.
    let mut worst_margin = f64::INFINITY;
    let mut worst = (f64::INFINITY, zoning.front_setback_ft, String::new());

    for building in &layout.buildings {
        let Some(bbox) = building.vertices.bounding_box() else {
            continue;
        };
        let checks = [
            (bbox.min_y - pb.min_y, zoning.front_setback_ft, "front"),
            (pb.max_y - bbox.max_y, zoning.rear_setback_ft, "rear"),
            (bbox.min_x - pb.min_x, zoning.side_setback_ft, "west side"),
            (pb.max_x - bbox.max_x, zoning.side_setback_ft, "east side"),
        ];
        for (distance, required, edge) in checks {
            let margin = distance - required;
            if margin < worst_margin {
                worst_margin = margin;
                worst = (
                    distance,
                    required,
                    format!(
                        "{} is {:.1} ft from the {edge} lot line ({required:.0} ft required)",
                        building.label, distance
                    ),
                );
            }
        }
    }

    RuleCheck {
        compliant: worst_margin >= 0.0,
        actual: worst.0,
        required: worst.1,
        message: worst.2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::massing::placement::footprint_rect;
    use crate::types::{
        Element, ElementKind, Point, Polygon, SiteMetrics, ZoningRules,
    };

    fn zoning() -> ZoningRules {
        ZoningRules {
            max_far: 0.6,
            max_height_ft: 35.0,
            max_coverage_pct: 40.0,
            max_density_du_per_acre: None,
            front_setback_ft: 25.0,
            side_setback_ft: 15.0,
            rear_setback_ft: 20.0,
            min_parking_ratio: 0.2,
        }
    }

    fn parcel() -> Parcel {
        Parcel::new(Polygon::rect(Point::new(0.0, 0.0), 200.0, 200.0), zoning())
    }

    fn building(center: Point, width: f64, depth: f64, floors: u32) -> Element {
        Element {
            id: 1,
            kind: ElementKind::Building,
            label: "Building A".into(),
            vertices: footprint_rect(center, width, depth, 0.0),
            rotation_deg: 0.0,
            area_sq_ft: width * depth,
            floors: Some(floors),
        }
    }

    fn parking(center: Point, area: f64) -> Element {
        let side = area.sqrt();
        Element {
            id: 2,
            kind: ElementKind::Parking,
            label: "Parking".into(),
            vertices: footprint_rect(center, side, side, 0.0),
            rotation_deg: 0.0,
            area_sq_ft: area,
            floors: None,
        }
    }

    fn compliant_layout() -> Layout {
        Layout {
            buildings: vec![building(Point::new(100.0, 100.0), 60.0, 40.0, 1)],
            parking: vec![parking(Point::new(40.0, 160.0), 700.0)],
            amenities: vec![],
            warnings: vec![],
            metrics: SiteMetrics::default(),
        }
    }

    #[test]
    fn clean_layout_scores_100() {
        let result = check_compliance(&compliant_layout(), &parcel());
        assert!(result.far.compliant);
        assert!(result.coverage.compliant);
        assert!(result.parking.compliant);
        assert!(result.setbacks.compliant);
        assert_eq!(result.score, 100);
        assert!(result.overall_compliant);
    }

    #[test]
    fn far_violation_costs_25_points() {
        let mut layout = compliant_layout();
        // 60x40 x 11 storeys: FAR 0.66 over the 0.6 cap; coverage unchanged.
        layout.buildings[0].floors = Some(11);
        // Keep parking ratio passing against the larger floor area.
        layout.parking[0].area_sq_ft = 6_000.0;
        let result = check_compliance(&layout, &parcel());
        assert!(!result.far.compliant);
        assert!(result.coverage.compliant);
        assert!(result.parking.compliant);
        assert!(result.setbacks.compliant);
        assert_eq!(result.score, 75);
        assert!(!result.overall_compliant);
    }

    #[test]
    fn setback_violation_is_reported_not_fixed() {
        let mut layout = compliant_layout();
        // 10 ft off the front lot line, inside the 25 ft front setback.
        layout.buildings[0] = building(Point::new(100.0, 30.0), 60.0, 40.0, 1);
        let result = check_compliance(&layout, &parcel());
        assert!(!result.setbacks.compliant);
        assert!((result.setbacks.actual - 10.0).abs() < 1e-9);
        assert_eq!(result.setbacks.required, 25.0);
        assert!(result.setbacks.message.contains("front"));
        assert_eq!(result.score, 75);
    }

    #[test]
    fn empty_layout_passes_setbacks_fails_parking() {
        let layout = Layout::default();
        let result = check_compliance(&layout, &parcel());
        assert!(result.setbacks.compliant);
        assert!(result.far.compliant);
        assert!(result.coverage.compliant);
        // No building area and min ratio 0.2: 0.0 >= 0.2 fails.
        assert!(!result.parking.compliant);
        assert_eq!(result.score, 75);
    }

    #[test]
    fn compliance_is_idempotent() {
        let layout = compliant_layout();
        let p = parcel();
        let a = check_compliance(&layout, &p);
        let b = check_compliance(&layout, &p);
        assert_eq!(a, b);
    }

    #[test]
    fn score_stays_on_quarter_steps() {
        for layout in [Layout::default(), compliant_layout()] {
            let result = check_compliance(&layout, &parcel());
            assert!(matches!(result.score, 0 | 25 | 50 | 75 | 100));
        }
    }
}
