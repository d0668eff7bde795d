//! Typology sweep and best-candidate selection.
//!
//! Every registered generator runs against the same immutable inputs; the
//! sweep is embarrassingly parallel and runs on rayon. A typology that
//! fails to generate is logged and excluded; it never aborts its siblings.
//! Scoring is a deliberately simple ROI-weighted heuristic, not a packing
//! optimum: tests should expect feasibility and directional correctness,
//! not global optimality.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::OptimizeError;
use crate::log::{debug, warn};
use crate::massing::{registered_generators, LayoutStrategy};
use crate::types::{GenerateInput, Layout, Typology};

/// Points available per scoring dimension.
const DENSITY_POINTS: f64 = 20.0;
const ROI_POINTS: f64 = 30.0;
const UTILIZATION_POINTS: f64 = 25.0;
const REVENUE_POINTS: f64 = 25.0;

/// ROI at or above this earns full ROI points.
const ROI_CAP_PCT: f64 = 15.0;
/// Revenue at or above this earns full revenue points.
const REVENUE_CAP: f64 = 5_000_000.0;
/// Share of revenue left after operating expenses.
const NOI_FACTOR: f64 = 0.6;

/// Score breakdown for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub density: f64,
    pub roi: f64,
    pub utilization: f64,
    pub revenue: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.density + self.roi + self.utilization + self.revenue
    }
}

/// One scored typology candidate from the sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub typology: Typology,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// The sweep's winner plus the full scoreboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Optimized {
    pub typology: Typology,
    pub layout: Layout,
    pub score: f64,
    /// Every successful candidate, in registration order.
    pub candidates: Vec<CandidateScore>,
}

/// Score one layout with the ROI-weighted heuristic.
pub fn score_candidate(layout: &Layout, input: &GenerateInput<'_>) -> ScoreBreakdown {
    let zoning = &input.parcel.zoning;
    let metrics = &layout.metrics;

    let density = match zoning.max_density_du_per_acre {
        Some(max) if max > 0.0 => (metrics.density / max).min(1.0) * DENSITY_POINTS,
        // No density cap to measure against: credit scales with unit count.
        _ => (f64::from(metrics.total_units) / 50.0).min(1.0) * DENSITY_POINTS,
    };

    let roi_pct = if metrics.estimated_cost > 0.0 {
        metrics.estimated_revenue * NOI_FACTOR / metrics.estimated_cost * 100.0
    } else {
        0.0
    };
    let roi = (roi_pct.min(ROI_CAP_PCT) / ROI_CAP_PCT).max(0.0) * ROI_POINTS;

    let utilization = if zoning.max_coverage_pct > 0.0 {
        (metrics.coverage_pct / zoning.max_coverage_pct).min(1.0) * UTILIZATION_POINTS
    } else {
        0.0
    };

    let revenue = (metrics.estimated_revenue.min(REVENUE_CAP) / REVENUE_CAP) * REVENUE_POINTS;

    ScoreBreakdown {
        density,
        roi,
        utilization,
        revenue,
    }
}

/// Run every typology, score the survivors, pick the best.
///
/// Deterministic for fixed inputs: generators are pure, candidates keep
/// registration order, and ties go to the earliest-registered typology.
pub fn optimize(input: &GenerateInput<'_>) -> Result<Optimized, OptimizeError> {
    let generators = registered_generators();
    let attempted = generators.len();

    // Parallel sweep; rayon's collect preserves input order.
    let results: Vec<_> = generators
        .par_iter()
        .map(|generator| (generator.typology(), generator.generate(input)))
        .collect();

    let mut candidates = Vec::new();
    let mut best: Option<(usize, Layout)> = None;
    for (typology, result) in results {
        match result {
            Ok(layout) => {
                let breakdown = score_candidate(&layout, input);
                let score = breakdown.total();
                debug!(%typology, score, "candidate scored");
                candidates.push(CandidateScore {
                    typology,
                    score,
                    breakdown,
                });
                let index = candidates.len() - 1;
                let is_better = match &best {
                    Some((best_index, _)) => score > candidates[*best_index].score,
                    None => true,
                };
                if is_better {
                    best = Some((index, layout));
                }
            }
            Err(error) => {
                warn!(%typology, %error, "typology excluded from sweep");
            }
        }
    }

    match best {
        Some((index, layout)) => Ok(Optimized {
            typology: candidates[index].typology,
            score: candidates[index].score,
            layout,
            candidates,
        }),
        None => Err(OptimizeError::NoFeasibleLayout { attempted }),
    }
}
