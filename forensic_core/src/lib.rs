//! `forensic_core` — Numeric post-processing for forensic video analysis.
//!
//! # Module layout
//! - [`types`]       — Perception inputs (objects, events) and engine outputs
//! - [`kinematics`]  — Sparse→dense interpolation, acceleration, energy, closing/TTC
//! - [`uncertainty`] — Per-object uncertainty, confidence budget, blind spots
//! - [`metrics`]     — Collision summaries and the pairwise TTC matrix
//! - [`analysis`]    — Whole-case orchestration over both engines
//! - [`error`]       — Precondition errors of the analysis layer

pub mod analysis;
pub mod error;
pub mod kinematics;
pub mod metrics;
pub mod types;
pub mod uncertainty;

pub use analysis::{AnalysisConfig, CaseAnalysis, CaseReport};
pub use error::AnalysisError;
pub use kinematics::{closing_metrics, differentiate, interpolate, kinetic_energy_proxy};
pub use types::{
    BlindSpot, ConfidenceBudgetRow, DenseSample, EventKind, MotionState, ObjectId, SparsePoint,
    TimelineEvent, TrackedObject, UncertaintyAnalysis, UncertaintyNode,
};
