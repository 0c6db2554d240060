//! Kinematics engine: sparse speed observations → dense series → derived
//! dynamics.
//!
//! # Interpolation
//! Sparse points are sorted by time and sampled on a uniform grid
//! `t = i·step` for `i = 0..=floor(duration/step)`. Between two anchors the
//! value is linear; past the last anchor it is held flat ("tracking lost,
//! assume unchanged"). Interpolated speeds are clamped to ≥ 0.
//!
//! # Closing metrics
//! A 1-D proxy for approach risk between two objects:
//! ```text
//! closing  = |vA − vB|
//! distance = max(distance − closing·step, 0)      distance₀ = 50
//! ttc      = distance / closing   if closing > 1, else 10
//! risk     = ttc < 2.5 && distance < 20
//! ```
//! This is not a 2-D trajectory model; upstream data only carries speed.

use crate::types::{ClosingSample, DenseSample, SeriesPoint, SparsePoint};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default grid spacing (s). Closing metrics assume the same step.
pub const DEFAULT_STEP: f64 = 0.1;

/// Assumed separation between two objects at t = 0 (distance units).
pub const INITIAL_SEPARATION: f64 = 50.0;

/// TTC reported when there is no meaningful closing motion (s).
pub const TTC_CAP: f64 = 10.0;

/// Closing speeds at or below this are treated as "not closing".
pub const MIN_CLOSING_SPEED: f64 = 1.0;

/// Near-collision thresholds.
pub const RISK_TTC: f64 = 2.5;
pub const RISK_DISTANCE: f64 = 20.0;

/// Absorbs float error in `duration / step` so that e.g. 10.0 / 0.1 yields
/// 100 intervals, not 99.
const GRID_EPS: f64 = 1e-9;

/// Upper bound on dense samples per series (about 11.5 days at the default
/// step). Longer grids are treated as degenerate.
pub const MAX_GRID_SAMPLES: usize = 10_000_000;

fn round_tenth(t: f64) -> f64 {
    (t * 10.0).round() / 10.0
}

/// Number of grid samples for `duration` at `step`, or 0 when degenerate
/// or longer than [`MAX_GRID_SAMPLES`].
pub fn grid_len(duration: f64, step: f64) -> usize {
    if !(step > 0.0) || !step.is_finite() || !(duration >= 0.0) || !duration.is_finite() {
        return 0;
    }
    let intervals = (duration / step + GRID_EPS).floor();
    if !intervals.is_finite() || intervals >= MAX_GRID_SAMPLES as f64 {
        warn!(duration, step, max = MAX_GRID_SAMPLES, "time grid too long, skipping");
        return 0;
    }
    (intervals as usize).checked_add(1).unwrap_or(0)
}

/// Resample sparse observations onto a uniform grid from 0 to `duration`
/// inclusive.
///
/// Returns an empty series when fewer than two anchors are supplied or the
/// grid parameters are degenerate.
pub fn interpolate(points: &[SparsePoint], duration: f64, step: f64) -> Vec<DenseSample> {
    if points.len() < 2 {
        return Vec::new();
    }
    let n = grid_len(duration, step);
    if n == 0 {
        return Vec::new();
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.time.total_cmp(&b.time));

    let mut out = Vec::with_capacity(n);
    let mut cursor = 0usize;

    for i in 0..n {
        let t = i as f64 * step;

        // Monotonic scan: t only grows, so the cursor never moves back.
        while cursor + 1 < sorted.len() && sorted[cursor + 1].time < t {
            cursor += 1;
        }

        let value = match (sorted.get(cursor), sorted.get(cursor + 1)) {
            (Some(p1), Some(p2)) => {
                let span = p2.time - p1.time;
                if span > 0.0 {
                    let ratio = (t - p1.time) / span;
                    p1.value + (p2.value - p1.value) * ratio
                } else {
                    p2.value
                }
            }
            // Past the last anchor: hold flat
            (Some(p1), None) => p1.value,
            _ => 0.0,
        };

        out.push(DenseSample {
            time: round_tenth(t),
            value: if value > 0.0 { value } else { 0.0 },
        });
    }

    out
}

/// First-order backward difference. The first sample's derivative is 0, as
/// is any sample whose time delta is not positive.
pub fn differentiate(series: &[DenseSample]) -> Vec<SeriesPoint> {
    let mut out = Vec::with_capacity(series.len());
    for (i, s) in series.iter().enumerate() {
        let value = match i.checked_sub(1).map(|j| &series[j]) {
            Some(prev) => {
                let dt = s.time - prev.time;
                if dt > 0.0 {
                    (s.value - prev.value) / dt
                } else {
                    0.0
                }
            }
            None => 0.0,
        };
        out.push(SeriesPoint {
            time: s.time,
            value,
        });
    }
    out
}

/// Kinetic energy per unit mass, `0.5·v²`.
pub fn kinetic_energy_proxy(series: &[DenseSample]) -> Vec<SeriesPoint> {
    series
        .iter()
        .map(|s| SeriesPoint {
            time: s.time,
            value: 0.5 * s.value * s.value,
        })
        .collect()
}

/// Closing distance, TTC and risk between two dense speed series.
///
/// Both series must come from [`interpolate`] with the same `step` and
/// duration; `step` here must be that step. Inputs of unequal length are
/// truncated to the shorter one. The separation starts at
/// [`INITIAL_SEPARATION`] and shrinks by the speed difference; this is a
/// scalar stand-in for positional tracking, not a trajectory model.
pub fn closing_metrics(
    series_a: &[DenseSample],
    series_b: &[DenseSample],
    step: f64,
) -> Vec<ClosingSample> {
    let mut distance = INITIAL_SEPARATION;
    series_a
        .iter()
        .zip(series_b)
        .map(|(a, b)| {
            let closing = (a.value - b.value).abs();
            distance = (distance - closing * step).max(0.0);
            let ttc = if closing > MIN_CLOSING_SPEED {
                distance / closing
            } else {
                TTC_CAP
            };
            ClosingSample {
                time: a.time,
                distance,
                ttc,
                risk: ttc < RISK_TTC && distance < RISK_DISTANCE,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// DenseProfile
// ---------------------------------------------------------------------------

/// A dense speed series tagged with the grid it was sampled on.
///
/// Two profiles can be fed to [`closing_metrics`] only when they share a
/// grid; [`DenseProfile::is_aligned_with`] is that check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseProfile {
    pub step: f64,
    pub duration: f64,
    pub samples: Vec<DenseSample>,
}

impl DenseProfile {
    pub fn build(points: &[SparsePoint], duration: f64, step: f64) -> Self {
        Self {
            step,
            duration,
            samples: interpolate(points, duration, step),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_aligned_with(&self, other: &DenseProfile) -> bool {
        self.step == other.step
            && self.duration == other.duration
            && self.samples.len() == other.samples.len()
    }

    pub fn acceleration(&self) -> Vec<SeriesPoint> {
        differentiate(&self.samples)
    }

    pub fn energy(&self) -> Vec<SeriesPoint> {
        kinetic_energy_proxy(&self.samples)
    }

    pub fn closing_with(&self, other: &DenseProfile) -> Vec<ClosingSample> {
        closing_metrics(&self.samples, &other.samples, self.step)
    }

    /// Highest sampled speed (0 for an empty profile).
    pub fn peak(&self) -> f64 {
        self.samples.iter().map(|s| s.value).fold(0.0, f64::max)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
