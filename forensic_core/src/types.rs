//! Fundamental types shared by the kinematics and uncertainty engines.
//!
//! Inputs ([`TrackedObject`], [`TimelineEvent`]) arrive from the upstream
//! perception service as JSON and are treated as untrusted plain data.
//! Everything else is produced fresh by the engines on each call.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identifier types
// ---------------------------------------------------------------------------

/// Identifier of a tracked object, as assigned by the perception service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Time series samples
// ---------------------------------------------------------------------------

/// One observed sample of a continuously varying quantity (speed).
///
/// Serialized as a `[time, value]` pair, which is how the upstream service
/// emits speed profiles.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct SparsePoint {
    pub time: f64,
    pub value: f64,
}

impl SparsePoint {
    pub fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

impl From<(f64, f64)> for SparsePoint {
    fn from((time, value): (f64, f64)) -> Self {
        Self { time, value }
    }
}

impl From<SparsePoint> for (f64, f64) {
    fn from(p: SparsePoint) -> Self {
        (p.time, p.value)
    }
}

/// A sample on the uniform interpolation grid. `value` is never negative.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseSample {
    /// Grid time, rounded to one decimal place
    pub time: f64,
    pub value: f64,
}

/// Generic `(time, value)` point for derived series (acceleration, energy).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub time: f64,
    pub value: f64,
}

/// One step of the closing-distance / TTC proxy between two objects.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClosingSample {
    pub time: f64,
    /// Remaining separation (distance units, ≥ 0)
    pub distance: f64,
    /// Time to collision in seconds, capped when there is no closing motion
    pub ttc: f64,
    /// Near-collision flag
    pub risk: bool,
}

// ---------------------------------------------------------------------------
// Perception inputs
// ---------------------------------------------------------------------------

/// Coarse motion classification attached to a tracked object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionState {
    Stationary,
    #[default]
    Moving,
    Erratic,
}

/// An object tracked across the footage by the perception service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedObject {
    pub id: ObjectId,
    pub label: String,
    /// First timestamp (s) the object was seen
    pub first_seen: f64,
    /// Last timestamp (s) the object was seen
    pub last_seen: f64,
    /// Peak speed reported upstream (km/h)
    pub max_speed: f64,
    /// Mean detection confidence over the track (0..1)
    pub avg_confidence: f64,
    #[serde(default)]
    pub motion_state: MotionState,
    #[serde(default)]
    pub direction: String,
    /// Sparse speed observations, unsorted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_profile: Option<Vec<SparsePoint>>,
}

impl TrackedObject {
    /// Speed observations, or an empty slice when the service sent none.
    pub fn profile(&self) -> &[SparsePoint] {
        self.speed_profile.as_deref().unwrap_or(&[])
    }
}

/// What happened at a timeline event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Detection,
    Occlusion,
    Braking,
    Impact,
    #[serde(other)]
    Other,
}

/// Qualitative confidence the service attached to an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTag {
    High,
    #[default]
    Medium,
    Low,
}

/// A timestamped event on the incident timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: String,
    pub label: String,
    pub timestamp: f64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub confidence: ConfidenceTag,
}

// ---------------------------------------------------------------------------
// Uncertainty outputs
// ---------------------------------------------------------------------------

/// Per-object uncertainty estimates, each in [0, 1].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyNode {
    pub object_id: ObjectId,
    pub label: String,
    pub pos_uncertainty: f64,
    pub vel_uncertainty: f64,
    /// Always ≥ `vel_uncertainty`
    pub accel_uncertainty: f64,
    pub persistence_risk: f64,
}

/// One stage of the sequential confidence budget.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBudgetRow {
    pub stage: String,
    pub input_conf: f64,
    pub loss: f64,
    pub output_conf: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BlindSpotKind {
    Spatial,
    Temporal,
    Analytical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A disclosed gap in observability or analytical coverage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlindSpot {
    pub kind: BlindSpotKind,
    pub description: String,
    pub severity: Severity,
}

/// Aggregate output of the uncertainty engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyAnalysis {
    /// One node per input object, in input order
    pub nodes: Vec<UncertaintyNode>,
    /// Exactly four rows in fixed stage order
    pub budget: Vec<ConfidenceBudgetRow>,
    /// At least one entry (the spatial disclosure)
    pub blind_spots: Vec<BlindSpot>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
