//! Domain model: parcels, zoning rules, envelopes, and generated layouts.
//!
//! All geometry lives in one planar coordinate system where 1 unit = 1 foot.
//! Conversion to display or geographic coordinates happens outside the core,
//! parameterized by [`UnitScale`]. Every boundary type derives serde so the
//! surrounding application can treat layouts and results as opaque JSON.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::geometry;

/// A point in plan coordinates (feet).
pub type Point = DVec2;

/// An ordered ring of vertices, implicitly closed (last connects to first).
///
/// Winding is not required to be consistent; signed area determines it when
/// an algorithm needs one. Fewer than 3 vertices is degenerate and every
/// geometry function degrades to a zero/empty result on it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: Vec<Point>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point>) -> Polygon {
        Polygon { vertices }
    }

    /// Axis-aligned rectangle with `origin` at its minimum corner.
    pub fn rect(origin: Point, width: f64, height: f64) -> Polygon {
        Polygon {
            vertices: vec![
                origin,
                Point::new(origin.x + width, origin.y),
                Point::new(origin.x + width, origin.y + height),
                Point::new(origin.x, origin.y + height),
            ],
        }
    }

    /// True when the ring cannot bound any area (<3 vertices).
    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 3
    }

    /// Unsigned area in square feet (0 for degenerate rings).
    pub fn area(&self) -> f64 {
        geometry::polygon_area(&self.vertices)
    }

    pub fn perimeter(&self) -> f64 {
        geometry::polygon_perimeter(&self.vertices)
    }

    pub fn centroid(&self) -> Point {
        geometry::centroid(&self.vertices)
    }

    pub fn contains(&self, point: Point) -> bool {
        geometry::point_in_polygon(point, &self.vertices)
    }

    pub fn bounding_box(&self) -> Option<geometry::BoundingBox> {
        geometry::bounding_box(&self.vertices)
    }
}

/// Per-parcel zoning constraint set. Read-only once loaded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoningRules {
    /// Maximum floor-area ratio (total floor area / parcel area).
    pub max_far: f64,
    pub max_height_ft: f64,
    /// Maximum lot coverage as a percentage (0-100).
    pub max_coverage_pct: f64,
    /// Dwelling-units-per-acre cap; `None` means the district has no cap.
    #[serde(default)]
    pub max_density_du_per_acre: Option<f64>,
    pub front_setback_ft: f64,
    pub side_setback_ft: f64,
    pub rear_setback_ft: f64,
    /// Minimum parking area per building area (sqft/sqft).
    pub min_parking_ratio: f64,
}

impl ZoningRules {
    /// Unify an assemblage of parcels into one constraint set: the most
    /// restrictive value wins across the set (min for upper bounds, max for
    /// setbacks). Returns `None` for an empty slice.
    pub fn most_restrictive(rules: &[ZoningRules]) -> Option<ZoningRules> {
        let mut iter = rules.iter().copied();
        let first = iter.next()?;
        Some(iter.fold(first, |acc, r| ZoningRules {
            max_far: acc.max_far.min(r.max_far),
            max_height_ft: acc.max_height_ft.min(r.max_height_ft),
            max_coverage_pct: acc.max_coverage_pct.min(r.max_coverage_pct),
            max_density_du_per_acre: match (acc.max_density_du_per_acre, r.max_density_du_per_acre)
            {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            },
            front_setback_ft: acc.front_setback_ft.max(r.front_setback_ft),
            side_setback_ft: acc.side_setback_ft.max(r.side_setback_ft),
            rear_setback_ft: acc.rear_setback_ft.max(r.rear_setback_ft),
            min_parking_ratio: acc.min_parking_ratio.max(r.min_parking_ratio),
        }))
    }

    pub fn setbacks(&self) -> Setbacks {
        Setbacks {
            front: self.front_setback_ft,
            side: self.side_setback_ft,
            rear: self.rear_setback_ft,
        }
    }
}

/// Setback distances in feet, keyed by edge class.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Setbacks {
    pub front: f64,
    pub side: f64,
    pub rear: f64,
}

impl Setbacks {
    /// Area-weighted single-distance blend used when no edge classification
    /// is available: a typical parcel has one front, one rear, two sides.
    pub fn blended(&self) -> f64 {
        (self.front + self.rear + 2.0 * self.side) / 4.0
    }
}

/// Which parcel edges face a road, as supplied by the external
/// road-proximity classifier. Edge `i` runs from vertex `i` to `i+1`;
/// edges listed in neither set are sides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeClassification {
    pub front_edges: Vec<usize>,
    #[serde(default)]
    pub rear_edges: Vec<usize>,
    /// How the classification was produced (e.g. "road-proximity").
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub source_name: String,
}

/// Immutable input parcel. Owned by the external data layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    pub polygon: Polygon,
    pub area_sq_ft: f64,
    pub zoning: ZoningRules,
}

impl Parcel {
    pub fn new(polygon: Polygon, zoning: ZoningRules) -> Parcel {
        let area_sq_ft = polygon.area();
        Parcel {
            polygon,
            area_sq_ft,
            zoning,
        }
    }

    pub fn acres(&self) -> f64 {
        self.area_sq_ft / SQFT_PER_ACRE
    }
}

pub const SQFT_PER_ACRE: f64 = 43_560.0;

/// The legally buildable region after setbacks. Derived; recomputed whenever
/// the parcel or setbacks change. Its area never exceeds the parcel's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildableEnvelope {
    pub polygon: Polygon,
    pub area_sq_ft: f64,
    pub setbacks_applied: Setbacks,
}

/// What kind of thing an [`Element`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Building,
    Parking,
    Greenspace,
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementKind::Building => write!(f, "building"),
            ElementKind::Parking => write!(f, "parking"),
            ElementKind::Greenspace => write!(f, "greenspace"),
        }
    }
}

/// A placed object on site. Owned exclusively by its [`Layout`]; carries no
/// back-reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: u32,
    pub kind: ElementKind,
    /// Human-readable name surfaced in warnings ("Building C", "Lot 2").
    pub label: String,
    pub vertices: Polygon,
    pub rotation_deg: f64,
    /// Footprint area in square feet.
    pub area_sq_ft: f64,
    /// Storey count for buildings; `None` for flatwork.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floors: Option<u32>,
}

impl Element {
    /// Total floor area: footprint times storeys (footprint for flatwork).
    pub fn floor_area_sq_ft(&self) -> f64 {
        self.area_sq_ft * f64::from(self.floors.unwrap_or(1))
    }

    /// Footprint vertices converted to display coordinates. Rendering
    /// callers own the scale; the core never bakes one in.
    pub fn display_vertices(&self, scale: UnitScale) -> Vec<Point> {
        self.vertices
            .vertices
            .iter()
            .map(|v| Point::new(scale.to_display(v.x), scale.to_display(v.y)))
            .collect()
    }
}

/// A recoverable per-element generation failure attached to the layout.
/// The element it describes was omitted, never placed out of bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementWarning {
    pub kind: ElementKind,
    pub label: String,
    pub message: String,
}

/// Derived per-layout quantities handed to the underwriting collaborator.
/// Purely a function of the element set plus market assumptions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SiteMetrics {
    pub total_units: u32,
    /// Total floor area across all buildings (footprint x storeys).
    pub total_sq_ft: f64,
    pub parking_spaces: u32,
    /// Dwelling units per acre of parcel.
    pub density: f64,
    /// Building footprint as a percentage of parcel area (0-100).
    pub coverage_pct: f64,
    pub estimated_revenue: f64,
    pub estimated_cost: f64,
}

/// One massing-generator invocation's output. Immutable once returned;
/// callers that edit elements own that mutation and must re-run compliance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Layout {
    pub buildings: Vec<Element>,
    pub parking: Vec<Element>,
    pub amenities: Vec<Element>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<PlacementWarning>,
    pub metrics: SiteMetrics,
}

impl Layout {
    pub fn all_elements(&self) -> impl Iterator<Item = &Element> {
        self.buildings
            .iter()
            .chain(self.parking.iter())
            .chain(self.amenities.iter())
    }

    /// Combined ground footprint of all buildings.
    pub fn footprint_sq_ft(&self) -> f64 {
        self.buildings.iter().map(|b| b.area_sq_ft).sum()
    }

    /// Combined floor area of all buildings.
    pub fn building_floor_sq_ft(&self) -> f64 {
        self.buildings.iter().map(|b| b.floor_area_sq_ft()).sum()
    }

    pub fn parking_sq_ft(&self) -> f64 {
        self.parking.iter().map(|p| p.area_sq_ft).sum()
    }
}

/// Per-market numeric assumptions supplied by the external market-data
/// collaborator. The core never fetches these itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    /// Monthly asking rent per rentable square foot.
    pub avg_rent_per_sq_ft: f64,
    pub construction_cost_per_sq_ft: f64,
    /// Typical for-sale home size in square feet.
    pub avg_home_size: f64,
    /// Typical for-sale home price, used for single-family and duplex revenue.
    pub avg_home_price: f64,
}

/// Generation knobs that are not zoning law. All have workable defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    /// Cap the unit program below what zoning allows; `None` = zoning-bound.
    #[serde(default)]
    pub target_units: Option<u32>,
    /// Minimum open courtyard area for the courtyard strategy.
    pub min_court_sq_ft: f64,
    /// Unit count above which shared amenities are generated.
    pub amenity_threshold_units: u32,
    /// Residential parking demand in spaces per unit.
    pub spaces_per_unit: f64,
}

impl Default for Constraints {
    fn default() -> Constraints {
        Constraints {
            target_units: None,
            min_court_sq_ft: 2_000.0,
            amenity_threshold_units: 20,
            spaces_per_unit: 1.5,
        }
    }
}

/// Feet-to-display conversion factor. The core computes in feet and never
/// hard-codes a pixels-per-foot constant; rendering callers pass their own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitScale(pub f64);

impl UnitScale {
    pub const IDENTITY: UnitScale = UnitScale(1.0);

    pub fn to_display(&self, feet: f64) -> f64 {
        feet * self.0
    }

    pub fn to_feet(&self, display: f64) -> f64 {
        display / self.0
    }
}

impl Default for UnitScale {
    fn default() -> UnitScale {
        UnitScale::IDENTITY
    }
}

/// Everything a typology generator reads. Shared immutably across the
/// optimizer's parallel sweep; each generator owns its output alone.
#[derive(Debug, Clone, Copy)]
pub struct GenerateInput<'a> {
    pub envelope: &'a BuildableEnvelope,
    pub parcel: &'a Parcel,
    pub market: &'a MarketData,
    pub constraints: &'a Constraints,
    pub unit_scale: UnitScale,
}

/// Building typologies the massing generator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Typology {
    SingleFamily,
    Duplex,
    ApartmentComplex,
    Office,
    Retail,
    Hospitality,
}

impl Typology {
    pub const ALL: [Typology; 6] = [
        Typology::SingleFamily,
        Typology::Duplex,
        Typology::ApartmentComplex,
        Typology::Office,
        Typology::Retail,
        Typology::Hospitality,
    ];
}

impl std::fmt::Display for Typology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Typology::SingleFamily => write!(f, "single-family"),
            Typology::Duplex => write!(f, "duplex"),
            Typology::ApartmentComplex => write!(f, "apartment-complex"),
            Typology::Office => write!(f, "office"),
            Typology::Retail => write!(f, "retail"),
            Typology::Hospitality => write!(f, "hospitality"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_restrictive_takes_tightest_of_each() {
        let a = ZoningRules {
            max_far: 0.6,
            max_height_ft: 45.0,
            max_coverage_pct: 40.0,
            max_density_du_per_acre: Some(24.0),
            front_setback_ft: 25.0,
            side_setback_ft: 10.0,
            rear_setback_ft: 20.0,
            min_parking_ratio: 0.3,
        };
        let b = ZoningRules {
            max_far: 0.8,
            max_height_ft: 35.0,
            max_coverage_pct: 50.0,
            max_density_du_per_acre: None,
            front_setback_ft: 20.0,
            side_setback_ft: 15.0,
            rear_setback_ft: 15.0,
            min_parking_ratio: 0.4,
        };
        let merged = ZoningRules::most_restrictive(&[a, b]).unwrap();
        assert_eq!(merged.max_far, 0.6);
        assert_eq!(merged.max_height_ft, 35.0);
        assert_eq!(merged.max_coverage_pct, 40.0);
        assert_eq!(merged.max_density_du_per_acre, Some(24.0));
        assert_eq!(merged.front_setback_ft, 25.0);
        assert_eq!(merged.side_setback_ft, 15.0);
        assert_eq!(merged.rear_setback_ft, 20.0);
        assert_eq!(merged.min_parking_ratio, 0.4);
    }

    #[test]
    fn most_restrictive_empty_is_none() {
        assert!(ZoningRules::most_restrictive(&[]).is_none());
    }

    #[test]
    fn blended_setback_weights_sides_twice() {
        let s = Setbacks {
            front: 25.0,
            side: 15.0,
            rear: 20.0,
        };
        assert!((s.blended() - 18.75).abs() < 1e-9);
    }

    #[test]
    fn floor_area_multiplies_storeys() {
        let e = Element {
            id: 1,
            kind: ElementKind::Building,
            label: "Building A".into(),
            vertices: Polygon::rect(Point::new(0.0, 0.0), 50.0, 40.0),
            rotation_deg: 0.0,
            area_sq_ft: 2_000.0,
            floors: Some(3),
        };
        assert_eq!(e.floor_area_sq_ft(), 6_000.0);
    }

    #[test]
    fn unit_scale_round_trips() {
        let scale = UnitScale(0.5);
        let d = scale.to_display(120.0);
        assert_eq!(scale.to_feet(d), 120.0);
    }

    #[test]
    fn display_vertices_apply_the_scale() {
        let e = Element {
            id: 1,
            kind: ElementKind::Parking,
            label: "Lot 1".into(),
            vertices: Polygon::rect(Point::new(10.0, 10.0), 20.0, 20.0),
            rotation_deg: 0.0,
            area_sq_ft: 400.0,
            floors: None,
        };
        let display = e.display_vertices(UnitScale(2.0));
        assert_eq!(display[0], Point::new(20.0, 20.0));
        assert_eq!(display.len(), 4);
    }
}
