//! Case analysis: runs both engines over every object and object pair of a
//! case and assembles the report the dashboard renders.
//!
//! # Steps per case
//! 1. Validate the time grid (step, duration)
//! 2. Densify each object's speed profile (parallel over objects)
//! 3. Derive acceleration, energy and peaks per object
//! 4. Closing metrics + collision summary for every object pair (parallel)
//! 5. Pairwise minimum-TTC matrix
//! 6. Uncertainty propagation (nodes, budget, blind spots)

use crate::{
    error::{AnalysisError, Result},
    kinematics::{grid_len, DenseProfile, DEFAULT_STEP},
    metrics::{pairwise_ttc_matrix, CollisionSummary},
    types::{
        ClosingSample, DenseSample, ObjectId, SeriesPoint, TimelineEvent, TrackedObject,
        UncertaintyAnalysis,
    },
    uncertainty,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Configuration for a case analysis run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Interpolation grid step (s). Shared by every profile so that closing
    /// metrics always compare aligned series.
    pub step: f64,
    /// Maximum number of object pairs to evaluate (None = all pairs).
    pub pair_limit: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            step: DEFAULT_STEP,
            pair_limit: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Dense kinematics for one object.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectKinematics {
    pub object_id: ObjectId,
    pub label: String,
    /// Index of the object in the case's object list
    pub index: usize,
    pub speed: Vec<DenseSample>,
    pub acceleration: Vec<SeriesPoint>,
    pub energy: Vec<SeriesPoint>,
    pub peak_speed: f64,
    /// Most negative acceleration (0 when the object never slows down)
    pub peak_deceleration: f64,
}

/// Closing metrics between two objects.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PairKinematics {
    pub object_a: ObjectId,
    pub object_b: ObjectId,
    pub closing: Vec<ClosingSample>,
    pub summary: CollisionSummary,
}

/// Everything computed for one case.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaseReport {
    pub duration: f64,
    pub step: f64,
    /// Objects with a usable speed profile, in input order
    pub objects: Vec<ObjectKinematics>,
    pub pairs: Vec<PairKinematics>,
    pub uncertainty: UncertaintyAnalysis,
    /// Row-major `n × n` minimum-TTC matrix over all input objects. `None`
    /// on the diagonal and for pairs that were not evaluated.
    pub ttc_matrix: Vec<Vec<Option<f64>>>,
    /// Wall-clock processing time
    pub elapsed_us: u64,
}

impl CaseReport {
    /// The pair with the smallest minimum TTC, if any pair was evaluated.
    pub fn riskiest_pair(&self) -> Option<&PairKinematics> {
        self.pairs
            .iter()
            .min_by(|a, b| a.summary.min_ttc.total_cmp(&b.summary.min_ttc))
    }

    pub fn kinematics_for(&self, id: &ObjectId) -> Option<&ObjectKinematics> {
        self.objects.iter().find(|o| &o.object_id == id)
    }
}

// ---------------------------------------------------------------------------
// CaseAnalysis
// ---------------------------------------------------------------------------

pub struct CaseAnalysis {
    pub config: AnalysisConfig,
}

impl CaseAnalysis {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Analyze one case. `duration` is the length of the footage in seconds.
    pub fn run(
        &self,
        objects: &[TrackedObject],
        events: &[TimelineEvent],
        duration: f64,
    ) -> Result<CaseReport> {
        let start = Instant::now();
        let step = self.config.step;
        if !(step > 0.0) || !step.is_finite() {
            return Err(AnalysisError::InvalidStep(step));
        }
        if !(duration >= 0.0) || !duration.is_finite() {
            return Err(AnalysisError::InvalidDuration(duration));
        }
        if grid_len(duration, step) == 0 {
            return Err(AnalysisError::GridTooLong { duration, step });
        }

        // ----------------------------------------------------------------
        // Step 2-3: per-object dense kinematics
        // ----------------------------------------------------------------
        let profiles: Vec<Option<DenseProfile>> = objects
            .par_iter()
            .map(|obj| {
                let points = obj.profile();
                if points.iter().any(|p| p.value < 0.0) {
                    warn!(object = %obj.id, "negative speed observations, clamping to 0");
                }
                let profile = DenseProfile::build(points, duration, step);
                if profile.is_empty() {
                    debug!(
                        object = %obj.id,
                        points = points.len(),
                        "no dense profile (fewer than two observations)"
                    );
                    None
                } else {
                    Some(profile)
                }
            })
            .collect();

        let kinematics: Vec<ObjectKinematics> = objects
            .iter()
            .zip(&profiles)
            .enumerate()
            .filter_map(|(index, (obj, profile))| {
                let profile = profile.as_ref()?;
                let acceleration = profile.acceleration();
                let peak_deceleration = acceleration
                    .iter()
                    .map(|a| a.value)
                    .fold(0.0, f64::min);
                Some(ObjectKinematics {
                    object_id: obj.id.clone(),
                    label: obj.label.clone(),
                    index,
                    peak_speed: profile.peak(),
                    peak_deceleration,
                    energy: profile.energy(),
                    speed: profile.samples.clone(),
                    acceleration,
                })
            })
            .collect();

        // ----------------------------------------------------------------
        // Step 4: pairwise closing metrics
        // ----------------------------------------------------------------
        let live: Vec<(usize, &DenseProfile)> = profiles
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().map(|p| (i, p)))
            .collect();
        let mut candidates: Vec<((usize, &DenseProfile), (usize, &DenseProfile))> = Vec::new();
        for (k, &a) in live.iter().enumerate() {
            for &b in &live[k + 1..] {
                candidates.push((a, b));
            }
        }
        if let Some(limit) = self.config.pair_limit {
            if candidates.len() > limit {
                debug!(total = candidates.len(), limit, "truncating pair list");
                candidates.truncate(limit);
            }
        }

        let pairs: Vec<PairKinematics> = candidates
            .par_iter()
            .map(|&((a, pa), (b, pb))| {
                if !pa.is_aligned_with(pb) {
                    return Err(AnalysisError::MisalignedProfiles {
                        a: objects[a].id.clone(),
                        b: objects[b].id.clone(),
                    });
                }
                let closing = pa.closing_with(pb);
                Ok(PairKinematics {
                    object_a: objects[a].id.clone(),
                    object_b: objects[b].id.clone(),
                    summary: CollisionSummary::from_closing(&closing),
                    closing,
                })
            })
            .collect::<Result<_>>()?;

        // ----------------------------------------------------------------
        // Step 5: TTC matrix
        // ----------------------------------------------------------------
        let entries: Vec<(usize, usize, f64)> = candidates
            .iter()
            .zip(&pairs)
            .map(|(&((a, _), (b, _)), p)| (a, b, p.summary.min_ttc))
            .collect();
        let matrix = pairwise_ttc_matrix(objects.len(), &entries);
        let ttc_matrix: Vec<Vec<Option<f64>>> = matrix
            .row_iter()
            .map(|row| row.iter().copied().collect::<Vec<Option<f64>>>())
            .collect();

        // ----------------------------------------------------------------
        // Step 6: uncertainty
        // ----------------------------------------------------------------
        let uncertainty = uncertainty::analyze(objects, events);

        debug!(
            objects = objects.len(),
            profiled = kinematics.len(),
            pairs = pairs.len(),
            events = events.len(),
            "case analysis complete"
        );

        Ok(CaseReport {
            duration,
            step,
            objects: kinematics,
            pairs,
            uncertainty,
            ttc_matrix,
            elapsed_us: start.elapsed().as_micros() as u64,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
