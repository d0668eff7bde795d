//! Massing and layout generation.
//!
//! One [`LayoutStrategy`] implementation per building typology, dispatched
//! through [`TypologyGenerator`] so the optimizer's sweep is a plain
//! iteration over registered generators. Submodules:
//! - `program`: unit-count ceilings (density / FAR / coverage)
//! - `placement`: footprint position search and overlap checks
//! - `parking`: lot partitioning and sizing
//! - `amenities`: shared amenity planning
//! - `residential` / `apartment` / `commercial`: the typology generators

pub mod amenities;
pub mod apartment;
pub mod commercial;
pub mod parking;
pub mod placement;
pub mod program;
pub mod residential;

use enum_dispatch::enum_dispatch;

use crate::errors::LayoutError;
use crate::log::{debug, warn};
use crate::types::{
    Element, ElementKind, GenerateInput, Layout, PlacementWarning, Point, Polygon, SiteMetrics,
    Typology,
};

pub use apartment::ApartmentGenerator;
pub use commercial::{HospitalityGenerator, OfficeGenerator, RetailGenerator};
pub use residential::{DuplexGenerator, SingleFamilyGenerator};

/// Storey height assumed for residential product, in feet.
pub const FLOOR_HEIGHT_FT: f64 = 12.0;

/// A typology-specific layout generator.
#[enum_dispatch]
pub trait LayoutStrategy {
    fn typology(&self) -> Typology;

    /// Generate one candidate layout. Per-element placement failures become
    /// warnings on the layout; failing to place any required building is
    /// [`LayoutError::Infeasible`].
    fn generate(&self, input: &GenerateInput<'_>) -> Result<Layout, LayoutError>;
}

/// All generators behind one dispatchable type.
#[enum_dispatch(LayoutStrategy)]
#[derive(Debug, Clone)]
pub enum TypologyGenerator {
    SingleFamily(SingleFamilyGenerator),
    Duplex(DuplexGenerator),
    ApartmentComplex(ApartmentGenerator),
    Office(OfficeGenerator),
    Retail(RetailGenerator),
    Hospitality(HospitalityGenerator),
}

/// Every generator, in fixed registration order. The optimizer's
/// determinism (including tie-breaks) depends on this order being stable.
pub fn registered_generators() -> Vec<TypologyGenerator> {
    vec![
        TypologyGenerator::SingleFamily(SingleFamilyGenerator),
        TypologyGenerator::Duplex(DuplexGenerator),
        TypologyGenerator::ApartmentComplex(ApartmentGenerator),
        TypologyGenerator::Office(OfficeGenerator),
        TypologyGenerator::Retail(RetailGenerator),
        TypologyGenerator::Hospitality(HospitalityGenerator),
    ]
}

/// Generate a layout for one named typology.
pub fn generate_layout(
    input: &GenerateInput<'_>,
    typology: Typology,
) -> Result<Layout, LayoutError> {
    let generator = registered_generators()
        .into_iter()
        .find(|g| g.typology() == typology)
        .expect("every typology has a registered generator");
    generator.generate(input)
}

/// How the envelope's proportions read, from its bounding-box aspect ratio.
/// A heuristic tie-break for strategy selection, not an optimality claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteOrientation {
    /// Aspect > 1.5: wide frontage, favors linear bars.
    Wide,
    /// Aspect < 0.67: deep lot, favors clustering around the centroid.
    Deep,
    /// Near-square, favors a courtyard.
    Square,
}

pub fn site_orientation(input: &GenerateInput<'_>) -> SiteOrientation {
    let Some(bb) = input.envelope.polygon.bounding_box() else {
        return SiteOrientation::Square;
    };
    if bb.height() <= 0.0 {
        return SiteOrientation::Square;
    }
    let aspect = bb.aspect_ratio();
    if aspect > 1.5 {
        SiteOrientation::Wide
    } else if aspect < 0.67 {
        SiteOrientation::Deep
    } else {
        SiteOrientation::Square
    }
}

/// How a typology turns floor area into money.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevenueBasis {
    /// For-sale product: units times typical home price.
    Sale,
    /// Income product: annualized rent on total floor area.
    Rent,
}

/// Accumulates placed elements, allocates ids and labels, and enforces
/// warn-and-omit: an element that fails its position search is recorded as
/// a warning and never pushed.
pub(crate) struct SiteBuilder<'a> {
    input: &'a GenerateInput<'a>,
    next_id: u32,
    buildings: Vec<Element>,
    parking: Vec<Element>,
    amenities: Vec<Element>,
    warnings: Vec<PlacementWarning>,
}

impl<'a> SiteBuilder<'a> {
    pub fn new(input: &'a GenerateInput<'a>) -> SiteBuilder<'a> {
        SiteBuilder {
            input,
            next_id: 1,
            buildings: Vec::new(),
            parking: Vec::new(),
            amenities: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn buildings_placed(&self) -> usize {
        self.buildings.len()
    }

    fn existing(&self) -> Vec<&Element> {
        self.buildings
            .iter()
            .chain(self.parking.iter())
            .chain(self.amenities.iter())
            .collect()
    }

    fn place(
        &mut self,
        kind: ElementKind,
        label: String,
        width: f64,
        depth: f64,
        rotation_deg: f64,
        preferred: Point,
        floors: Option<u32>,
    ) -> bool {
        let existing = self.existing();
        let found = placement::find_position(
            self.input.envelope,
            width,
            depth,
            rotation_deg,
            preferred,
            &existing,
            placement::CLEARANCE_FT,
        );
        match found {
            Some(center) => {
                let vertices = placement::footprint_rect(center, width, depth, rotation_deg);
                debug!(%label, ?center, "placed {kind}");
                let element = Element {
                    id: self.next_id,
                    kind,
                    label,
                    vertices,
                    rotation_deg,
                    area_sq_ft: width * depth,
                    floors,
                };
                self.next_id += 1;
                match kind {
                    ElementKind::Building => self.buildings.push(element),
                    ElementKind::Parking => self.parking.push(element),
                    ElementKind::Greenspace => self.amenities.push(element),
                }
                true
            }
            None => {
                warn!(%label, "could not place {kind} within buildable area");
                self.warnings.push(PlacementWarning {
                    kind,
                    label: label.clone(),
                    message: format!("could not place {label} within buildable area"),
                });
                false
            }
        }
    }

    pub fn place_building(
        &mut self,
        label: String,
        width: f64,
        depth: f64,
        rotation_deg: f64,
        preferred: Point,
        floors: u32,
    ) -> bool {
        self.place(
            ElementKind::Building,
            label,
            width,
            depth,
            rotation_deg,
            preferred,
            Some(floors),
        )
    }

    /// Place lots for `total_spaces` using the three-tier search (corners,
    /// center offsets, then the grid scan). Returns spaces actually placed;
    /// a shortfall is observable in the metrics and as warnings.
    pub fn place_parking(&mut self, total_spaces: u32, label_prefix: &str) -> u32 {
        let mut placed_spaces = 0;
        for (i, lot_spaces) in parking::plan_lots(total_spaces).into_iter().enumerate() {
            let (width, depth) = parking::lot_dimensions(lot_spaces);
            let label = if total_spaces <= parking::MAX_LOT_SPACES {
                label_prefix.to_string()
            } else {
                format!("{label_prefix} {}", i + 1)
            };
            let mut done = false;
            for candidate in parking::candidate_centers(self.input.envelope, width, depth) {
                let existing = self.existing();
                let footprint = placement::footprint_rect(candidate, width, depth, 0.0);
                if placement::corners_inside(&self.input.envelope.polygon, &footprint)
                    && !placement::overlaps_existing(
                        &footprint,
                        &existing,
                        placement::CLEARANCE_FT,
                    )
                {
                    let element = Element {
                        id: self.next_id,
                        kind: ElementKind::Parking,
                        label: label.clone(),
                        vertices: footprint,
                        rotation_deg: 0.0,
                        area_sq_ft: width * depth,
                        floors: None,
                    };
                    self.next_id += 1;
                    self.parking.push(element);
                    placed_spaces += lot_spaces;
                    done = true;
                    break;
                }
            }
            if !done {
                // Tier 3: the full grid scan.
                if self.place(
                    ElementKind::Parking,
                    label,
                    width,
                    depth,
                    0.0,
                    self.input.envelope.polygon.centroid(),
                    None,
                ) {
                    placed_spaces += lot_spaces;
                }
            }
        }
        placed_spaces
    }

    pub fn place_amenities(&mut self, plans: &[amenities::AmenityPlan]) {
        let centroid = self.input.envelope.polygon.centroid();
        for plan in plans {
            self.place(
                ElementKind::Greenspace,
                plan.label.to_string(),
                plan.width,
                plan.depth,
                0.0,
                centroid,
                None,
            );
        }
    }

    /// Assemble the final layout and its derived metrics.
    pub fn finish(self, total_units: u32, parking_spaces: u32, basis: RevenueBasis) -> Layout {
        let market = self.input.market;
        let parcel = self.input.parcel;

        let footprint: f64 = self.buildings.iter().map(|b| b.area_sq_ft).sum();
        let total_sq_ft: f64 = self.buildings.iter().map(|b| b.floor_area_sq_ft()).sum();

        let estimated_cost = total_sq_ft * market.construction_cost_per_sq_ft;
        let estimated_revenue = match basis {
            RevenueBasis::Sale => f64::from(total_units) * market.avg_home_price,
            RevenueBasis::Rent => total_sq_ft * market.avg_rent_per_sq_ft * 12.0,
        };

        let metrics = SiteMetrics {
            total_units,
            total_sq_ft,
            parking_spaces,
            density: f64::from(total_units) / parcel.acres(),
            coverage_pct: footprint / parcel.area_sq_ft * 100.0,
            estimated_revenue,
            estimated_cost,
        };

        Layout {
            buildings: self.buildings,
            parking: self.parking,
            amenities: self.amenities,
            warnings: self.warnings,
            metrics,
        }
    }
}

/// Label for the `i`th building: A, B, ... Z, AA, AB, ...
pub(crate) fn building_label(i: usize) -> String {
    let mut n = i;
    let mut letters = String::new();
    loop {
        letters.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    format!("Building {letters}")
}

/// Reject a degenerate envelope before any generator runs.
pub(crate) fn require_envelope(input: &GenerateInput<'_>) -> Result<(), LayoutError> {
    if input.envelope.polygon.is_degenerate() || input.envelope.area_sq_ft <= 0.0 {
        return Err(LayoutError::EmptyEnvelope);
    }
    Ok(())
}

/// Check that a [`Polygon`] respects the containment invariant: every placed
/// element's corner inside the envelope, or a warning recorded instead.
/// Exposed for tests and external validation after manual edits.
pub fn validate_containment(layout: &Layout, envelope_polygon: &Polygon) -> bool {
    layout
        .all_elements()
        .all(|e| placement::corners_inside(envelope_polygon, &e.vertices))
}
