//! Synthetic road users and their speed histories.
//!
//! Each actor has a `MotionSpec` describing its true speed over time. The
//! simulator samples that speed at irregular instants with noise, the way a
//! frame-by-frame perception service reports it.

use forensic_core::types::{MotionState, SparsePoint};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// True speed model of an actor (km/h).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum MotionSpec {
    /// Parked / standing still.
    Stationary,
    /// Constant speed.
    Cruise { speed: f64 },
    /// Cruise at `speed`, then slow down at `decel` (km/h per s) from `at`
    /// until stopped.
    Brake { speed: f64, at: f64, decel: f64 },
    /// Cruise at `speed`, then speed up at `accel` (km/h per s) from `at`
    /// until `max` is reached.
    Accelerate {
        speed: f64,
        at: f64,
        accel: f64,
        max: f64,
    },
    /// Oscillates around `base` by ±`swing` with the given `period` (s).
    Erratic { base: f64, swing: f64, period: f64 },
}

impl MotionSpec {
    /// True speed at time `t`.
    pub fn speed_at(&self, t: f64) -> f64 {
        match *self {
            MotionSpec::Stationary => 0.0,
            MotionSpec::Cruise { speed } => speed,
            MotionSpec::Brake { speed, at, decel } => {
                if t < at {
                    speed
                } else {
                    (speed - decel * (t - at)).max(0.0)
                }
            }
            MotionSpec::Accelerate {
                speed,
                at,
                accel,
                max,
            } => {
                if t < at {
                    speed
                } else {
                    (speed + accel * (t - at)).min(max)
                }
            }
            MotionSpec::Erratic {
                base,
                swing,
                period,
            } => {
                let phase = std::f64::consts::TAU * t / period.max(1e-3);
                (base + swing * phase.sin()).max(0.0)
            }
        }
    }

    /// Motion tag the perception service would attach.
    pub fn motion_state(&self) -> MotionState {
        match self {
            MotionSpec::Stationary => MotionState::Stationary,
            MotionSpec::Erratic { .. } => MotionState::Erratic,
            _ => MotionState::Moving,
        }
    }
}

/// A simulated road user.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub label: String,
    pub motion: MotionSpec,
    /// Mean detection confidence the service reports for this actor
    pub confidence: f64,
    pub direction: String,
    /// Optional: actor enters the frame at this time
    pub appear_at: Option<f64>,
    /// Optional: actor leaves the frame at this time
    pub disappear_at: Option<f64>,
}

impl Actor {
    /// Visible interval clipped to `[0, duration]`.
    pub fn visible_span(&self, duration: f64) -> (f64, f64) {
        let start = self.appear_at.unwrap_or(0.0).clamp(0.0, duration);
        let end = self.disappear_at.unwrap_or(duration).clamp(start, duration);
        (start, end)
    }
}

/// Parameters for turning a true speed curve into sparse observations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Mean time between observations (s)
    pub interval: f64,
    /// Timestamp jitter as a fraction of `interval` (0..0.5)
    pub jitter: f64,
    /// Relative speed noise (e.g. 0.05 = ±5%)
    pub noise: f64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            interval: 0.8,
            jitter: 0.3,
            noise: 0.05,
        }
    }
}

/// Sample an actor's speed at irregular instants within its visible span.
///
/// Observations are returned shuffled; consumers must not rely on order.
pub fn sample_profile<R: Rng>(
    actor: &Actor,
    duration: f64,
    params: &SamplingParams,
    rng: &mut R,
) -> Vec<SparsePoint> {
    let (start, end) = actor.visible_span(duration);
    let interval = params.interval.max(1e-2);
    let jitter = params.jitter.clamp(0.0, 0.5) * interval;

    let mut points = Vec::new();
    let mut t = start;
    while t <= end {
        let ts = (t + (rng.gen::<f64>() * 2.0 - 1.0) * jitter).clamp(start, end);
        let truth = actor.motion.speed_at(ts);
        let noisy = truth * (1.0 + (rng.gen::<f64>() * 2.0 - 1.0) * params.noise);
        // Round like the service does (0.01 s, 0.1 km/h)
        points.push(SparsePoint::new(
            (ts * 100.0).round() / 100.0,
            (noisy * 10.0).round() / 10.0,
        ));
        t += interval;
    }

    points.shuffle(rng);
    points
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
