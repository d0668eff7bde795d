//! Error types with diagnostics using miette.
//!
//! Infeasibility is a first-class result here, never a panic: every error
//! names what the caller can change. Per-element placement failures are NOT
//! errors; they are warnings attached to the layout (generation continues
//! with the element omitted).

use miette::Diagnostic;
use thiserror::Error;

use crate::types::Typology;

/// Errors from deriving a buildable envelope.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum EnvelopeError {
    #[error("parcel polygon is degenerate ({vertices} vertices)")]
    #[diagnostic(
        code(siteforge::envelope::degenerate_parcel),
        help("a parcel needs at least 3 non-coincident vertices")
    )]
    DegenerateParcel { vertices: usize },

    #[error("setbacks leave no buildable area")]
    #[diagnostic(
        code(siteforge::envelope::no_buildable_area),
        help("reduce setbacks or assemble adjacent parcels; the requested \
              setbacks consume the entire parcel")
    )]
    NoBuildableArea,
}

/// Errors from a single typology's layout generation.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("buildable envelope is empty")]
    #[diagnostic(code(siteforge::layout::empty_envelope))]
    EmptyEnvelope,

    #[error("{typology} layout is infeasible: {reason}")]
    #[diagnostic(
        code(siteforge::layout::infeasible),
        help("no required building could be placed; try a smaller typology \
              or relax the constraints")
    )]
    Infeasible { typology: Typology, reason: String },
}

/// Errors from the whole-site optimization sweep.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum OptimizeError {
    #[error("no feasible layout across {attempted} typologies")]
    #[diagnostic(
        code(siteforge::optimize::no_feasible_layout),
        help("every typology failed to produce a candidate; the site may be \
              too constrained to develop as zoned")
    )]
    NoFeasibleLayout { attempted: usize },
}
