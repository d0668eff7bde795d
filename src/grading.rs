//! Grading and earthwork estimation.
//!
//! Samples an external elevation function on a regular grid inside the
//! buildable polygon and integrates cut/fill volumes against a target pad
//! elevation. Entirely independent of the massing generator: it consumes a
//! polygon and an opaque `(x, y) -> feet` sampler, which makes it trivially
//! testable with synthetic terrain.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::geometry::sample_grid;
use crate::types::Polygon;

const CUBIC_FT_PER_CY: f64 = 27.0;

/// Earthwork cost model inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradingParams {
    /// Target finished pad elevation in feet.
    pub pad_elevation_ft: f64,
    /// Grid pitch for DEM sampling, in feet.
    pub sample_spacing_ft: f64,
    /// Excavation cost per cubic yard.
    pub cut_rate: f64,
    /// Placed-fill cost per cubic yard.
    pub fill_rate: f64,
    /// Import haul cost per cubic yard per mile.
    pub haul_rate: f64,
    /// One-way haul distance in miles for imported fill.
    pub haul_distance_mi: f64,
}

impl Default for GradingParams {
    fn default() -> GradingParams {
        GradingParams {
            pad_elevation_ft: 0.0,
            sample_spacing_ft: 10.0,
            cut_rate: 8.0,
            fill_rate: 6.0,
            haul_rate: 0.5,
            haul_distance_mi: 10.0,
        }
    }
}

/// Cut/fill volumes and cost for one pad elevation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GradingResult {
    pub cut_cy: f64,
    pub fill_cy: f64,
    /// fill minus cut; positive means imported material is needed.
    pub net_cy: f64,
    /// fill/cut; defined as 1.0 (balanced) when there is no cut. This is a
    /// reporting convention, not a real ratio at zero cut.
    pub balance_ratio: f64,
    pub cut_cost: f64,
    pub fill_cost: f64,
    pub haul_cost: f64,
    pub total_cost: f64,
    /// Number of DEM samples the estimate integrated over.
    pub samples: usize,
}

/// Estimate earthwork volumes and cost for grading `polygon` to a pad.
///
/// `elevation` is an opaque sampler supplied by the external DEM service;
/// the core never caches or refetches it. A degenerate polygon yields an
/// all-zero result (no samples).
pub fn grade_cost<F>(polygon: &Polygon, elevation: F, params: &GradingParams) -> GradingResult
where
    F: Fn(f64, f64) -> f64,
{
    let samples = sample_grid(&polygon.vertices, params.sample_spacing_ft);
    let mut cut_cf = 0.0;
    let mut fill_cf = 0.0;
    for s in &samples {
        let ground = elevation(s.point.x, s.point.y);
        let cut_depth = (ground - params.pad_elevation_ft).max(0.0);
        let fill_depth = (params.pad_elevation_ft - ground).max(0.0);
        cut_cf += cut_depth * s.cell_area;
        fill_cf += fill_depth * s.cell_area;
    }

    let cut_cy = cut_cf / CUBIC_FT_PER_CY;
    let fill_cy = fill_cf / CUBIC_FT_PER_CY;
    let net_cy = fill_cy - cut_cy;
    let balance_ratio = if cut_cy == 0.0 { 1.0 } else { fill_cy / cut_cy };

    let cut_cost = cut_cy * params.cut_rate;
    let fill_cost = fill_cy * params.fill_rate;
    let haul_cost = net_cy.max(0.0) * params.haul_rate * params.haul_distance_mi;

    GradingResult {
        cut_cy,
        fill_cy,
        net_cy,
        balance_ratio,
        cut_cost,
        fill_cost,
        haul_cost,
        total_cost: cut_cost + fill_cost + haul_cost,
        samples: samples.len(),
    }
}

/// Mean sampled elevation over the polygon interior: the natural starting
/// pad for a balanced site. Returns `None` when sampling yields nothing.
pub fn suggest_pad_elevation<F>(polygon: &Polygon, elevation: F, spacing_ft: f64) -> Option<f64>
where
    F: Fn(f64, f64) -> f64,
{
    let samples = sample_grid(&polygon.vertices, spacing_ft);
    if samples.is_empty() {
        return None;
    }
    let sum: f64 = samples.iter().map(|s| elevation(s.point.x, s.point.y)).sum();
    Some(sum / samples.len() as f64)
}

/// Seeded candidate pads around a center elevation.
///
/// This is the one explicitly non-deterministic utility in the crate: it is
/// randomized by design (to seed a pad-elevation search) and deterministic
/// only per seed. The rest of the core never consumes randomness.
pub fn jitter_pad_seeds(center_ft: f64, spread_ft: f64, count: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| center_ft + rng.gen_range(-spread_ft..=spread_ft))
        .collect()
}
