//! siteforge: site-plan generation and zoning-compliance engine.
//!
//! Given a parcel polygon and its zoning rules, this crate derives the
//! buildable envelope, procedurally masses buildings, parking, and
//! amenities inside it, checks the result against FAR / coverage /
//! parking / setback rules, and sweeps every building typology to pick the
//! best-scoring candidate. The output [`SiteMetrics`] feed an external
//! underwriting model; everything here is synchronous, deterministic,
//! CPU-bound pure computation over plain data.
//!
//! Module map:
//! - `geometry`: polygon kernel (area, containment, inset, grid sampling)
//! - `envelope`: setback application and buildable-envelope derivation
//! - `grading`: cut/fill earthwork estimation over a sampled DEM
//! - `massing`: typology layout generators and the placement search
//! - `compliance`: rule checks and the 0-100 compliance score
//! - `optimizer`: parallel typology sweep and ROI-weighted selection
//!
//! ```
//! use siteforge::{feasibility, Constraints, MarketData, Parcel, Point, Polygon, ZoningRules};
//!
//! let zoning = ZoningRules {
//!     max_far: 0.6,
//!     max_height_ft: 35.0,
//!     max_coverage_pct: 40.0,
//!     max_density_du_per_acre: None,
//!     front_setback_ft: 25.0,
//!     side_setback_ft: 15.0,
//!     rear_setback_ft: 20.0,
//!     min_parking_ratio: 0.2,
//! };
//! let parcel = Parcel::new(Polygon::rect(Point::new(0.0, 0.0), 200.0, 200.0), zoning);
//! let market = MarketData {
//!     avg_rent_per_sq_ft: 2.2,
//!     construction_cost_per_sq_ft: 210.0,
//!     avg_home_size: 2_400.0,
//!     avg_home_price: 520_000.0,
//! };
//! let report = feasibility(&parcel, None, &market, &Constraints::default()).unwrap();
//! assert!(report.envelope.area_sq_ft < parcel.area_sq_ft);
//! ```

pub mod compliance;
pub mod envelope;
pub mod errors;
pub mod geometry;
pub mod grading;
pub mod log;
pub mod massing;
pub mod optimizer;
pub mod types;

use serde::{Deserialize, Serialize};

pub use compliance::{check_compliance, ComplianceResult, RuleCheck};
pub use envelope::derive_envelope;
pub use errors::{EnvelopeError, LayoutError, OptimizeError};
pub use geometry::{
    bounding_box, inset_polygon, point_in_polygon, polygon_area, polygon_perimeter, sample_grid,
    BoundingBox, GridSample,
};
pub use grading::{grade_cost, jitter_pad_seeds, suggest_pad_elevation, GradingParams, GradingResult};
pub use massing::{generate_layout, LayoutStrategy, TypologyGenerator};
pub use optimizer::{optimize, CandidateScore, Optimized, ScoreBreakdown};
pub use types::{
    BuildableEnvelope, Constraints, EdgeClassification, Element, ElementKind, GenerateInput,
    Layout, MarketData, Parcel, PlacementWarning, Point, Polygon, Setbacks, SiteMetrics,
    Typology, UnitScale, ZoningRules,
};

/// The whole pipeline's output: envelope, winning candidate, compliance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityReport {
    pub envelope: BuildableEnvelope,
    pub best: Optimized,
    pub compliance: ComplianceResult,
}

/// Run the full pipeline: derive the envelope, sweep every typology, and
/// check the winner's compliance.
///
/// Convenience wrapper over [`derive_envelope`], [`optimize`], and
/// [`check_compliance`] for callers that want one call per parcel.
pub fn feasibility(
    parcel: &Parcel,
    classification: Option<&EdgeClassification>,
    market: &MarketData,
    constraints: &Constraints,
) -> Result<FeasibilityReport, miette::Report> {
    let envelope = derive_envelope(&parcel.polygon, parcel.zoning.setbacks(), classification)
        .map_err(miette::Report::new)?;

    let input = GenerateInput {
        envelope: &envelope,
        parcel,
        market,
        constraints,
        unit_scale: UnitScale::IDENTITY,
    };
    let best = optimize(&input).map_err(miette::Report::new)?;
    let compliance = check_compliance(&best.layout, parcel);

    Ok(FeasibilityReport {
        envelope,
        best,
        compliance,
    })
}
