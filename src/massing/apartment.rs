//! Apartment-complex layout generation.
//!
//! The one typology with real sub-strategies: bars along the dominant axis
//! (linear), masses arranged radially around the centroid (cluster), or
//! three masses framing a central court (courtyard). The envelope's
//! proportions pick the strategy; every mass goes through the shared
//! position search and is dropped with a warning when nothing fits.

use crate::errors::LayoutError;
use crate::types::{GenerateInput, Layout, Point, Typology};

use super::amenities::residential_amenities;
use super::program::max_program;
use super::{
    building_label, require_envelope, site_orientation, LayoutStrategy, RevenueBasis,
    SiteBuilder, SiteOrientation, FLOOR_HEIGHT_FT,
};

/// Net rentable area per unit, square feet.
const UNIT_SQFT: f64 = 900.0;
/// Gross-up for corridors, stairs, and service space.
const GROSS_FACTOR: f64 = 1.15;
/// Units one mass can reasonably carry.
const UNITS_PER_BUILDING: u32 = 24;
/// Tallest product this generator masses, in storeys.
const MAX_FLOORS: u32 = 4;
/// Bar footprint width over depth.
const BAR_ASPECT: f64 = 2.2;
/// Cluster masses stay closer to square.
const CLUSTER_ASPECT: f64 = 1.2;
/// Fewest units that justify apartment product at all.
const MIN_PROJECT_UNITS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Linear,
    Cluster,
    Courtyard,
}

/// One planned mass, before placement.
struct MassPlan {
    units: u32,
    width: f64,
    depth: f64,
    rotation_deg: f64,
    preferred: Point,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ApartmentGenerator;

impl LayoutStrategy for ApartmentGenerator {
    fn typology(&self) -> Typology {
        Typology::ApartmentComplex
    }

    fn generate(&self, input: &GenerateInput<'_>) -> Result<Layout, LayoutError> {
        require_envelope(input)?;
        let zoning = &input.parcel.zoning;

        let floors = ((zoning.max_height_ft / FLOOR_HEIGHT_FT).floor() as u32)
            .clamp(1, MAX_FLOORS);
        let gross_unit = UNIT_SQFT * GROSS_FACTOR;
        let unit_footprint = gross_unit / f64::from(floors);

        let program = max_program(input, gross_unit, unit_footprint);
        if program.max_units < MIN_PROJECT_UNITS {
            return Err(LayoutError::Infeasible {
                typology: self.typology(),
                reason: format!(
                    "zoning allows {} unit(s), below the {MIN_PROJECT_UNITS}-unit \
                     minimum for apartment product ({:?} binds)",
                    program.max_units, program.binding
                ),
            });
        }
        let units = program.max_units;

        let strategy = match site_orientation(input) {
            SiteOrientation::Wide => Strategy::Linear,
            SiteOrientation::Deep => Strategy::Cluster,
            SiteOrientation::Square => {
                // A courtyard needs enough program to frame three sides.
                if units >= 12 {
                    Strategy::Courtyard
                } else {
                    Strategy::Cluster
                }
            }
        };

        let masses = plan_masses(input, strategy, units, unit_footprint);

        let mut builder = SiteBuilder::new(input);
        let mut placed_units = 0u32;
        for (i, mass) in masses.iter().enumerate() {
            if builder.place_building(
                building_label(i),
                mass.width,
                mass.depth,
                mass.rotation_deg,
                mass.preferred,
                floors,
            ) {
                placed_units += mass.units;
            }
        }

        if builder.buildings_placed() == 0 {
            return Err(LayoutError::Infeasible {
                typology: self.typology(),
                reason: "no apartment mass fits within the buildable area".into(),
            });
        }

        let required = (f64::from(placed_units) * input.constraints.spaces_per_unit).ceil() as u32;
        let spaces = builder.place_parking(required, "Parking Lot");

        builder.place_amenities(&residential_amenities(
            placed_units,
            input.constraints.amenity_threshold_units,
        ));

        Ok(builder.finish(placed_units, spaces, RevenueBasis::Rent))
    }
}

/// Split `units` across masses and lay out preferred centers per strategy.
fn plan_masses(
    input: &GenerateInput<'_>,
    strategy: Strategy,
    units: u32,
    unit_footprint: f64,
) -> Vec<MassPlan> {
    let bb = input
        .envelope
        .polygon
        .bounding_box()
        .expect("envelope validated non-degenerate");
    let centroid = input.envelope.polygon.centroid();

    let count = match strategy {
        Strategy::Courtyard => 3,
        _ => units.div_ceil(UNITS_PER_BUILDING).max(1),
    };
    let per_mass = split_units(units, count);

    let mut masses = Vec::with_capacity(count as usize);
    match strategy {
        Strategy::Linear => {
            let horizontal = bb.width() >= bb.height();
            for (i, &mass_units) in per_mass.iter().enumerate() {
                let (width, depth) =
                    bar_dims(mass_units, unit_footprint, BAR_ASPECT, horizontal);
                let t = (i as f64 + 0.5) / count as f64;
                let preferred = if horizontal {
                    Point::new(bb.min_x + t * bb.width(), centroid.y)
                } else {
                    Point::new(centroid.x, bb.min_y + t * bb.height())
                };
                masses.push(MassPlan {
                    units: mass_units,
                    width,
                    depth,
                    rotation_deg: 0.0,
                    preferred,
                });
            }
        }
        Strategy::Cluster => {
            let radius = bb.width().min(bb.height()) / 4.0;
            for (i, &mass_units) in per_mass.iter().enumerate() {
                let (width, depth) =
                    bar_dims(mass_units, unit_footprint, CLUSTER_ASPECT, true);
                let preferred = if count == 1 {
                    centroid
                } else {
                    let theta = i as f64 / count as f64 * std::f64::consts::TAU;
                    centroid + Point::new(theta.cos(), theta.sin()) * radius
                };
                masses.push(MassPlan {
                    units: mass_units,
                    width,
                    depth,
                    rotation_deg: 0.0,
                    preferred,
                });
            }
        }
        Strategy::Courtyard => {
            // Two north-south flanks bound the court left and right; one
            // east-west bar closes the frame above. The court width is sized
            // against the flank depth so the open area meets min_court.
            let gap = super::placement::CLEARANCE_FT + 2.0;
            let north = bar_dims(per_mass[0], unit_footprint, BAR_ASPECT, true);
            let west = bar_dims(per_mass[1], unit_footprint, BAR_ASPECT, false);
            let east = bar_dims(*per_mass.get(2).unwrap_or(&per_mass[1]), unit_footprint, BAR_ASPECT, false);
            let court_h = west.1.min(east.1);
            let court_w = (input.constraints.min_court_sq_ft / court_h).max(40.0);
            let half_w = court_w / 2.0;
            let flank_reach = west.1.max(east.1) / 2.0;

            let dims = [north, west, east];
            let centers = [
                Point::new(centroid.x, centroid.y + flank_reach + north.1 / 2.0 + gap),
                Point::new(centroid.x - half_w - west.0 / 2.0 - gap, centroid.y),
                Point::new(centroid.x + half_w + east.0 / 2.0 + gap, centroid.y),
            ];
            for (i, &mass_units) in per_mass.iter().enumerate() {
                let (width, depth) = dims[i.min(2)];
                masses.push(MassPlan {
                    units: mass_units,
                    width,
                    depth,
                    rotation_deg: 0.0,
                    preferred: centers[i.min(2)],
                });
            }
        }
    }
    masses
}

/// Distribute `units` across `count` masses as evenly as possible.
fn split_units(units: u32, count: u32) -> Vec<u32> {
    let base = units / count;
    let extra = units % count;
    (0..count)
        .map(|i| base + u32::from(i < extra))
        .filter(|&u| u > 0)
        .collect()
}

/// Bar footprint for `units` at `unit_footprint` each, long side oriented
/// along the dominant axis when `horizontal`.
fn bar_dims(units: u32, unit_footprint: f64, aspect: f64, horizontal: bool) -> (f64, f64) {
    let area = f64::from(units) * unit_footprint;
    let long = (area * aspect).sqrt();
    let short = area / long;
    if horizontal {
        (long, short)
    } else {
        (short, long)
    }
}
