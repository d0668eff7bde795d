//! Building program sizing: how many units zoning allows.
//!
//! Three independent ceilings (density, floor area, lot coverage) each cap
//! the unit count on their own; the binding constraint is the
//! minimum of the three. The caller supplies the typology's per-unit sizes
//! so the same arithmetic serves houses, suites, and hotel rooms alike.

use crate::types::GenerateInput;

/// Which ceiling produced the final unit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingConstraint {
    Density,
    FloorArea,
    Coverage,
    /// The caller's own target was below every zoning ceiling.
    Target,
}

/// The maximum allowed program for one typology on one envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Program {
    pub max_units: u32,
    pub binding: BindingConstraint,
}

/// Compute the binding unit count for dwelling product.
///
/// `unit_floor_sq_ft` is gross floor area per unit; `unit_footprint_sq_ft`
/// is ground coverage per unit (floor area divided by storeys for stacked
/// product). A district without a density cap leaves that ceiling unbounded.
pub fn max_program(
    input: &GenerateInput<'_>,
    unit_floor_sq_ft: f64,
    unit_footprint_sq_ft: f64,
) -> Program {
    program_impl(input, unit_floor_sq_ft, unit_footprint_sq_ft, true)
}

/// Commercial variant: suites, bays, and hotel keys are not dwelling units,
/// so the DU/acre ceiling does not apply.
pub fn max_commercial_program(
    input: &GenerateInput<'_>,
    unit_floor_sq_ft: f64,
    unit_footprint_sq_ft: f64,
) -> Program {
    program_impl(input, unit_floor_sq_ft, unit_footprint_sq_ft, false)
}

fn program_impl(
    input: &GenerateInput<'_>,
    unit_floor_sq_ft: f64,
    unit_footprint_sq_ft: f64,
    density_applies: bool,
) -> Program {
    let zoning = &input.parcel.zoning;
    let envelope_area = input.envelope.area_sq_ft;

    let density_cap = if density_applies {
        zoning
            .max_density_du_per_acre
            .map(|max| input.parcel.acres() * max)
            .unwrap_or(f64::INFINITY)
    } else {
        f64::INFINITY
    };
    let far_cap = envelope_area * zoning.max_far / unit_floor_sq_ft;
    let coverage_cap =
        envelope_area * (zoning.max_coverage_pct / 100.0) / unit_footprint_sq_ft;

    let (mut units, mut binding) = (density_cap, BindingConstraint::Density);
    if far_cap < units {
        units = far_cap;
        binding = BindingConstraint::FloorArea;
    }
    if coverage_cap < units {
        units = coverage_cap;
        binding = BindingConstraint::Coverage;
    }

    let mut max_units = if units.is_finite() { units.floor().max(0.0) as u32 } else { u32::MAX };

    if let Some(target) = input.constraints.target_units {
        if target < max_units {
            max_units = target;
            binding = BindingConstraint::Target;
        }
    }

    Program { max_units, binding }
}
