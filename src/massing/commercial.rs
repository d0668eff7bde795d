//! Office, retail, and hospitality layout generators.
//!
//! Commercial "units" are leasable suites, retail bays, or hotel keys; the
//! same three-ceiling program arithmetic applies, with district density
//! caps simply absent for most commercial zoning.

use crate::errors::LayoutError;
use crate::types::{GenerateInput, Layout, Point, Typology};

use super::amenities::hospitality_amenities;
use super::program::max_commercial_program;
use super::{building_label, require_envelope, LayoutStrategy, RevenueBasis, SiteBuilder};

/// Leasable office suite, square feet.
const SUITE_SQFT: f64 = 1_000.0;
const OFFICE_FLOOR_HEIGHT_FT: f64 = 14.0;
const OFFICE_MAX_FLOORS: u32 = 6;
/// Office parking demand, spaces per 1,000 sqft.
const OFFICE_SPACES_PER_KSF: f64 = 3.0;
/// Footprint above which the program splits into two masses.
const OFFICE_SPLIT_SQFT: f64 = 24_000.0;
const OFFICE_ASPECT: f64 = 1.6;

/// Retail bay, square feet.
const BAY_SQFT: f64 = 1_500.0;
/// Strip retail runs long and shallow.
const RETAIL_ASPECT: f64 = 3.5;
/// Retail parking demand, spaces per 1,000 sqft.
const RETAIL_SPACES_PER_KSF: f64 = 4.0;

/// Gross area per hotel key, corridors and back-of-house included.
const ROOM_SQFT: f64 = 550.0;
const HOTEL_FLOOR_HEIGHT_FT: f64 = 11.0;
const HOTEL_MAX_FLOORS: u32 = 8;
/// Fewest keys that support hotel operations.
const MIN_KEYS: u32 = 20;
const HOTEL_ASPECT: f64 = 2.4;
/// Hotel parking demand, spaces per key.
const HOTEL_SPACES_PER_KEY: f64 = 1.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct OfficeGenerator;

impl LayoutStrategy for OfficeGenerator {
    fn typology(&self) -> Typology {
        Typology::Office
    }

    fn generate(&self, input: &GenerateInput<'_>) -> Result<Layout, LayoutError> {
        require_envelope(input)?;
        let zoning = &input.parcel.zoning;

        let floors = ((zoning.max_height_ft / OFFICE_FLOOR_HEIGHT_FT).floor() as u32)
            .clamp(1, OFFICE_MAX_FLOORS);
        let suite_footprint = SUITE_SQFT / f64::from(floors);
        let program = max_commercial_program(input, SUITE_SQFT, suite_footprint);
        if program.max_units == 0 {
            return Err(LayoutError::Infeasible {
                typology: self.typology(),
                reason: format!("zoning allows no office area ({:?} binds)", program.binding),
            });
        }

        let floor_area = f64::from(program.max_units) * SUITE_SQFT;
        let total_footprint = floor_area / f64::from(floors);
        let mass_count: u32 = if total_footprint > OFFICE_SPLIT_SQFT { 2 } else { 1 };
        let per_mass = total_footprint / f64::from(mass_count);
        let width = (per_mass * OFFICE_ASPECT).sqrt();
        let depth = per_mass / width;

        let mut builder = SiteBuilder::new(input);
        let centroid = input.envelope.polygon.centroid();
        let mut placed_footprint = 0.0;
        for i in 0..mass_count {
            // Second mass steps east of the first; the search relocates it
            // when that spills out of the envelope.
            let preferred = Point::new(
                centroid.x + f64::from(i) * (width + 30.0) - f64::from(mass_count - 1) * (width + 30.0) / 2.0,
                centroid.y,
            );
            if builder.place_building(building_label(i as usize), width, depth, 0.0, preferred, floors)
            {
                placed_footprint += width * depth;
            }
        }
        if builder.buildings_placed() == 0 {
            return Err(LayoutError::Infeasible {
                typology: self.typology(),
                reason: "no office mass fits within the buildable area".into(),
            });
        }

        let placed_floor_area = placed_footprint * f64::from(floors);
        let suites = (placed_floor_area / SUITE_SQFT).floor() as u32;
        let required = (placed_floor_area / 1_000.0 * OFFICE_SPACES_PER_KSF).ceil() as u32;
        let spaces = builder.place_parking(required, "Parking Lot");

        Ok(builder.finish(suites, spaces, RevenueBasis::Rent))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RetailGenerator;

impl LayoutStrategy for RetailGenerator {
    fn typology(&self) -> Typology {
        Typology::Retail
    }

    fn generate(&self, input: &GenerateInput<'_>) -> Result<Layout, LayoutError> {
        require_envelope(input)?;

        // Single-storey strip: footprint and floor area are the same number.
        let program = max_commercial_program(input, BAY_SQFT, BAY_SQFT);
        if program.max_units == 0 {
            return Err(LayoutError::Infeasible {
                typology: self.typology(),
                reason: format!("zoning allows no retail area ({:?} binds)", program.binding),
            });
        }

        let bb = input
            .envelope
            .polygon
            .bounding_box()
            .ok_or(LayoutError::EmptyEnvelope)?;
        let horizontal = bb.width() >= bb.height();
        let dominant = if horizontal { bb.width() } else { bb.height() };
        let area = f64::from(program.max_units) * BAY_SQFT;
        // Frontage caps the strip before the program does on small sites;
        // bays are recounted from the footprint actually massed.
        let long = (area * RETAIL_ASPECT).sqrt().min(dominant * 0.8);
        let short = long / RETAIL_ASPECT;
        let (width, depth) = if horizontal { (long, short) } else { (short, long) };

        // Strip sits toward the rear so customer parking fronts it.
        let preferred = if horizontal {
            Point::new(bb.center().x, bb.max_y - depth / 2.0 - 10.0)
        } else {
            Point::new(bb.max_x - width / 2.0 - 10.0, bb.center().y)
        };

        let mut builder = SiteBuilder::new(input);
        if !builder.place_building(building_label(0), width, depth, 0.0, preferred, 1) {
            return Err(LayoutError::Infeasible {
                typology: self.typology(),
                reason: "no retail strip fits within the buildable area".into(),
            });
        }

        let bays = (width * depth / BAY_SQFT).floor() as u32;
        let required = (width * depth / 1_000.0 * RETAIL_SPACES_PER_KSF).ceil() as u32;
        let spaces = builder.place_parking(required, "Parking Lot");

        Ok(builder.finish(bays, spaces, RevenueBasis::Rent))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HospitalityGenerator;

impl LayoutStrategy for HospitalityGenerator {
    fn typology(&self) -> Typology {
        Typology::Hospitality
    }

    fn generate(&self, input: &GenerateInput<'_>) -> Result<Layout, LayoutError> {
        require_envelope(input)?;
        let zoning = &input.parcel.zoning;

        let floors = ((zoning.max_height_ft / HOTEL_FLOOR_HEIGHT_FT).floor() as u32)
            .clamp(1, HOTEL_MAX_FLOORS);
        let room_footprint = ROOM_SQFT / f64::from(floors);
        let program = max_commercial_program(input, ROOM_SQFT, room_footprint);
        if program.max_units < MIN_KEYS {
            return Err(LayoutError::Infeasible {
                typology: self.typology(),
                reason: format!(
                    "zoning allows {} key(s), below the {MIN_KEYS}-key minimum \
                     ({:?} binds)",
                    program.max_units, program.binding
                ),
            });
        }
        let keys = program.max_units;

        let footprint = f64::from(keys) * room_footprint;
        let width = (footprint * HOTEL_ASPECT).sqrt();
        let depth = footprint / width;

        let mut builder = SiteBuilder::new(input);
        let centroid = input.envelope.polygon.centroid();
        if !builder.place_building(building_label(0), width, depth, 0.0, centroid, floors) {
            return Err(LayoutError::Infeasible {
                typology: self.typology(),
                reason: "no hotel mass fits within the buildable area".into(),
            });
        }

        let required = (f64::from(keys) * HOTEL_SPACES_PER_KEY).ceil() as u32;
        let spaces = builder.place_parking(required, "Parking Lot");

        builder.place_amenities(&hospitality_amenities(
            keys,
            input.constraints.amenity_threshold_units,
        ));

        Ok(builder.finish(keys, spaces, RevenueBasis::Rent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::derive_envelope;
    use crate::types::{
        Constraints, MarketData, Parcel, Polygon, Setbacks, UnitScale, ZoningRules,
    };

    fn zoning() -> ZoningRules {
        ZoningRules {
            max_far: 1.5,
            max_height_ft: 56.0,
            max_coverage_pct: 50.0,
            max_density_du_per_acre: None,
            front_setback_ft: 25.0,
            side_setback_ft: 15.0,
            rear_setback_ft: 20.0,
            min_parking_ratio: 0.3,
        }
    }

    fn market() -> MarketData {
        MarketData {
            avg_rent_per_sq_ft: 2.8,
            construction_cost_per_sq_ft: 240.0,
            avg_home_size: 2_400.0,
            avg_home_price: 500_000.0,
        }
    }

    fn run<G: LayoutStrategy>(generator: G, side: f64) -> Result<Layout, LayoutError> {
        let parcel = Parcel::new(
            Polygon::rect(Point::new(0.0, 0.0), side, side),
            zoning(),
        );
        let setbacks = Setbacks {
            front: 25.0,
            side: 15.0,
            rear: 20.0,
        };
        let envelope = derive_envelope(&parcel.polygon, setbacks, None).unwrap();
        let market = market();
        let constraints = Constraints::default();
        let input = GenerateInput {
            envelope: &envelope,
            parcel: &parcel,
            market: &market,
            constraints: &constraints,
            unit_scale: UnitScale::IDENTITY,
        };
        generator.generate(&input)
    }

    #[test]
    fn office_masses_and_parks_by_floor_area() {
        let layout = run(OfficeGenerator, 400.0).unwrap();
        assert!(!layout.buildings.is_empty());
        assert!(layout.metrics.total_units > 0);
        let floor_area = layout.building_floor_sq_ft();
        assert!(floor_area > 0.0);
        // 3 spaces per 1,000 sqft, modulo placement shortfall.
        let demanded = (floor_area / 1_000.0 * OFFICE_SPACES_PER_KSF).ceil() as u32;
        assert!(layout.metrics.parking_spaces <= demanded);
        assert_eq!(layout.buildings[0].floors, Some(4));
    }

    #[test]
    fn retail_strip_is_single_storey_and_long() {
        let layout = run(RetailGenerator, 300.0).unwrap();
        assert_eq!(layout.buildings.len(), 1);
        let strip = &layout.buildings[0];
        assert_eq!(strip.floors, Some(1));
        let bb = strip.vertices.bounding_box().unwrap();
        assert!(bb.aspect_ratio() > 2.0);
        assert!(layout.metrics.parking_spaces > 0);
    }

    #[test]
    fn hotel_needs_twenty_keys() {
        let err = run(HospitalityGenerator, 100.0).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::Infeasible {
                typology: Typology::Hospitality,
                ..
            }
        ));

        let layout = run(HospitalityGenerator, 400.0).unwrap();
        assert!(layout.metrics.total_units >= MIN_KEYS);
        assert_eq!(layout.buildings.len(), 1);
        // Well past the amenity threshold at this scale.
        assert!(!layout.amenities.is_empty());
    }
}
