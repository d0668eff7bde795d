//! Single-family and duplex layout generators.

use crate::errors::LayoutError;
use crate::types::{GenerateInput, Layout, Typology};

use super::program::max_program;
use super::{
    building_label, require_envelope, LayoutStrategy, RevenueBasis, SiteBuilder, FLOOR_HEIGHT_FT,
};

/// Smallest marketable detached house, square feet.
const MIN_HOUSE_SQFT: f64 = 1_800.0;
/// Largest house the generator will mass, square feet.
const MAX_HOUSE_SQFT: f64 = 4_500.0;
/// House footprint width over depth.
const HOUSE_ASPECT: f64 = 1.4;
/// Driveway parking for a detached house.
const DRIVEWAY_SPACES: u32 = 2;

/// Floor area per duplex unit, square feet.
const DUPLEX_UNIT_SQFT: f64 = 1_200.0;
const DUPLEX_ASPECT: f64 = 1.8;

/// One detached house with a driveway. Massed as a single storey so the
/// footprint carries the whole clamped home size.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleFamilyGenerator;

impl LayoutStrategy for SingleFamilyGenerator {
    fn typology(&self) -> Typology {
        Typology::SingleFamily
    }

    fn generate(&self, input: &GenerateInput<'_>) -> Result<Layout, LayoutError> {
        require_envelope(input)?;
        let zoning = &input.parcel.zoning;

        let coverage_cap_sqft =
            input.envelope.area_sq_ft * (zoning.max_coverage_pct / 100.0);
        if coverage_cap_sqft < MIN_HOUSE_SQFT {
            return Err(LayoutError::Infeasible {
                typology: self.typology(),
                reason: format!(
                    "coverage allows {coverage_cap_sqft:.0} sqft, below the \
                     {MIN_HOUSE_SQFT:.0} sqft minimum house"
                ),
            });
        }

        let house_sqft = input
            .market
            .avg_home_size
            .clamp(MIN_HOUSE_SQFT, MAX_HOUSE_SQFT)
            .min(coverage_cap_sqft);
        let width = (house_sqft * HOUSE_ASPECT).sqrt();
        let depth = house_sqft / width;

        let mut builder = SiteBuilder::new(input);
        let centroid = input.envelope.polygon.centroid();
        if !builder.place_building(building_label(0), width, depth, 0.0, centroid, 1) {
            return Err(LayoutError::Infeasible {
                typology: self.typology(),
                reason: "no position fits the house within the buildable area".into(),
            });
        }

        let spaces = builder.place_parking(DRIVEWAY_SPACES, "Driveway");

        Ok(builder.finish(1, spaces, RevenueBasis::Sale))
    }
}

/// Two attached units in one mass, stacked when height allows.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplexGenerator;

impl LayoutStrategy for DuplexGenerator {
    fn typology(&self) -> Typology {
        Typology::Duplex
    }

    fn generate(&self, input: &GenerateInput<'_>) -> Result<Layout, LayoutError> {
        require_envelope(input)?;
        let zoning = &input.parcel.zoning;

        let floors: u32 = if zoning.max_height_ft >= 2.0 * FLOOR_HEIGHT_FT {
            2
        } else {
            1
        };
        let unit_footprint = DUPLEX_UNIT_SQFT / f64::from(floors);

        let program = max_program(input, DUPLEX_UNIT_SQFT, unit_footprint);
        if program.max_units < 2 {
            return Err(LayoutError::Infeasible {
                typology: self.typology(),
                reason: format!(
                    "zoning allows {} unit(s); a duplex needs 2 ({:?} binds)",
                    program.max_units, program.binding
                ),
            });
        }

        let footprint_sqft = 2.0 * unit_footprint;
        let width = (footprint_sqft * DUPLEX_ASPECT).sqrt();
        let depth = footprint_sqft / width;

        let mut builder = SiteBuilder::new(input);
        let centroid = input.envelope.polygon.centroid();
        if !builder.place_building(building_label(0), width, depth, 0.0, centroid, floors) {
            return Err(LayoutError::Infeasible {
                typology: self.typology(),
                reason: "no position fits the duplex within the buildable area".into(),
            });
        }

        let required = (2.0 * input.constraints.spaces_per_unit).ceil() as u32;
        let spaces = builder.place_parking(required, "Parking");

        Ok(builder.finish(2, spaces, RevenueBasis::Sale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::derive_envelope;
    use crate::types::{
        Constraints, ElementKind, MarketData, Parcel, Point, Polygon, UnitScale, ZoningRules,
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
            min_parking_ratio: 0.3,
        }
    }

    fn market() -> MarketData {
        MarketData {
            avg_rent_per_sq_ft: 2.0,
            construction_cost_per_sq_ft: 200.0,
            avg_home_size: 2_400.0,
            avg_home_price: 500_000.0,
        }
    }

    fn run<G: LayoutStrategy>(generator: G) -> Result<Layout, LayoutError> {
        let parcel = Parcel::new(
            Polygon::rect(Point::new(0.0, 0.0), 200.0, 200.0),
            zoning(),
        );
        let envelope =
            derive_envelope(&parcel.polygon, zoning().setbacks(), None).unwrap();
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
    fn single_family_places_one_house_and_driveway() {
        let layout = run(SingleFamilyGenerator).unwrap();
        assert_eq!(layout.buildings.len(), 1);
        let house = &layout.buildings[0];
        assert!(house.area_sq_ft >= MIN_HOUSE_SQFT && house.area_sq_ft <= MAX_HOUSE_SQFT);
        assert_eq!(layout.parking.len(), 1);
        assert_eq!(layout.parking[0].kind, ElementKind::Parking);
        assert_eq!(layout.parking[0].label, "Driveway");
        assert_eq!(layout.metrics.total_units, 1);
        assert_eq!(layout.metrics.parking_spaces, DRIVEWAY_SPACES);
        assert!(layout.warnings.is_empty());
    }

    #[test]
    fn single_family_revenue_is_sale_priced() {
        let layout = run(SingleFamilyGenerator).unwrap();
        assert_eq!(layout.metrics.estimated_revenue, 500_000.0);
    }

    #[test]
    fn duplex_places_two_units_in_one_mass() {
        let layout = run(DuplexGenerator).unwrap();
        assert_eq!(layout.buildings.len(), 1);
        assert_eq!(layout.metrics.total_units, 2);
        assert_eq!(layout.buildings[0].floors, Some(2));
        assert_eq!(layout.metrics.parking_spaces, 3);
    }

    #[test]
    fn tight_coverage_is_infeasible_for_single_family() {
        let mut z = zoning();
        z.max_coverage_pct = 2.0;
        let parcel = Parcel::new(
            Polygon::rect(Point::new(0.0, 0.0), 200.0, 200.0),
            z,
        );
        let envelope = derive_envelope(&parcel.polygon, z.setbacks(), None).unwrap();
        let market = market();
        let constraints = Constraints::default();
        let input = GenerateInput {
            envelope: &envelope,
            parcel: &parcel,
            market: &market,
            constraints: &constraints,
            unit_scale: UnitScale::IDENTITY,
        };
        let err = SingleFamilyGenerator.generate(&input).unwrap_err();
        assert!(matches!(err, LayoutError::Infeasible { .. }));
    }

    #[test]
    fn density_cap_of_one_rejects_duplex() {
        let mut z = zoning();
        z.max_density_du_per_acre = Some(1.0);
        // 200x200 ft is under an acre, so the cap rounds down to 0 units.
        let parcel = Parcel::new(
            Polygon::rect(Point::new(0.0, 0.0), 200.0, 200.0),
            z,
        );
        let envelope = derive_envelope(&parcel.polygon, z.setbacks(), None).unwrap();
        let market = market();
        let constraints = Constraints::default();
        let input = GenerateInput {
            envelope: &envelope,
            parcel: &parcel,
            market: &market,
            constraints: &constraints,
            unit_scale: UnitScale::IDENTITY,
        };
        let err = DuplexGenerator.generate(&input).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::Infeasible {
                typology: Typology::Duplex,
                ..
            }
        ));
    }
}
