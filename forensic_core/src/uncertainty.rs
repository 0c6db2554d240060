//! Uncertainty propagation: per-object error estimates, the four-stage
//! confidence budget, and blind-spot disclosures.
//!
//! # Node model
//! ```text
//! pos   = 1 − avg_confidence
//! vel   = min(1, 1.2·pos + 0.2·[max_speed > 80])
//! accel = min(1, 1.5·vel)
//! persistence = min(1, pos + 0.3·[erratic])
//! ```
//!
//! # Confidence budget
//! | stage                 | loss                               |
//! |-----------------------|------------------------------------|
//! | Raw Detection         | (1 − mean confidence) · 0.15       |
//! | Multi-Object Tracking | 0.05 + 0.02 · occlusions           |
//! | Motion Estimation     | 1.5 · tracking loss                |
//! | Dynamics Modeling     | 0.05                               |
//!
//! Each stage starts from the previous stage's output. A stage never removes
//! more confidence than it received, so the chain bottoms out at 0.

use crate::types::{
    BlindSpot, BlindSpotKind, ConfidenceBudgetRow, EventKind, MotionState, Severity,
    TimelineEvent, TrackedObject, UncertaintyAnalysis, UncertaintyNode,
};
use tracing::warn;

pub const VELOCITY_AMPLIFICATION: f64 = 1.2;
/// km/h above which motion blur degrades velocity estimates
pub const HIGH_SPEED_THRESHOLD: f64 = 80.0;
pub const HIGH_SPEED_PENALTY: f64 = 0.2;
pub const ACCEL_AMPLIFICATION: f64 = 1.5;
pub const ERRATIC_PENALTY: f64 = 0.3;

pub const DETECTION_LOSS_WEIGHT: f64 = 0.15;
pub const TRACKING_BASE_LOSS: f64 = 0.05;
pub const OCCLUSION_LOSS: f64 = 0.02;
pub const MOTION_AMPLIFICATION: f64 = 1.5;
pub const MODEL_ERROR_LOSS: f64 = 0.05;

pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.6;

pub const STAGE_DETECTION: &str = "Raw Detection";
pub const STAGE_TRACKING: &str = "Multi-Object Tracking";
pub const STAGE_MOTION: &str = "Motion Estimation";
pub const STAGE_DYNAMICS: &str = "Dynamics Modeling";

const SPATIAL_DISCLOSURE: &str = "Lens distortion and perspective compression near the frame \
perimeter degrade distance and speed estimates for objects at the edges of the field of view.";

fn unit(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Detection confidence as a usable probability. Non-finite values count as
/// no confidence at all.
fn sanitized_confidence(obj: &TrackedObject) -> f64 {
    let c = obj.avg_confidence;
    if !c.is_finite() {
        warn!(object = %obj.id, "non-finite detection confidence, treating as 0");
        return 0.0;
    }
    if !(0.0..=1.0).contains(&c) {
        warn!(object = %obj.id, confidence = c, "detection confidence outside [0, 1]");
    }
    unit(c)
}

fn occlusion_count(events: &[TimelineEvent]) -> usize {
    events
        .iter()
        .filter(|e| e.kind == EventKind::Occlusion)
        .count()
}

/// Per-object position, velocity, acceleration and persistence uncertainty.
/// Output order follows `objects`.
pub fn compute_node_uncertainty(objects: &[TrackedObject]) -> Vec<UncertaintyNode> {
    objects
        .iter()
        .map(|obj| {
            let pos = unit(1.0 - sanitized_confidence(obj));
            let blur = if obj.max_speed > HIGH_SPEED_THRESHOLD {
                HIGH_SPEED_PENALTY
            } else {
                0.0
            };
            let vel = unit(pos * VELOCITY_AMPLIFICATION + blur);
            let accel = unit(vel * ACCEL_AMPLIFICATION);
            let erratic = if obj.motion_state == MotionState::Erratic {
                ERRATIC_PENALTY
            } else {
                0.0
            };
            UncertaintyNode {
                object_id: obj.id.clone(),
                label: obj.label.clone(),
                pos_uncertainty: pos,
                vel_uncertainty: vel,
                accel_uncertainty: accel,
                persistence_risk: unit(pos + erratic),
            }
        })
        .collect()
}

/// Sequential confidence erosion through the four processing stages.
pub fn compute_confidence_budget(
    objects: &[TrackedObject],
    events: &[TimelineEvent],
) -> Vec<ConfidenceBudgetRow> {
    let mean_conf = if objects.is_empty() {
        0.0
    } else {
        objects.iter().map(sanitized_confidence).sum::<f64>() / objects.len() as f64
    };
    let occlusions = occlusion_count(events);

    let detection_loss = (1.0 - mean_conf) * DETECTION_LOSS_WEIGHT;
    let tracking_loss = TRACKING_BASE_LOSS + OCCLUSION_LOSS * occlusions as f64;
    let stages = [
        (STAGE_DETECTION, detection_loss),
        (STAGE_TRACKING, tracking_loss),
        (STAGE_MOTION, tracking_loss * MOTION_AMPLIFICATION),
        (STAGE_DYNAMICS, MODEL_ERROR_LOSS),
    ];

    let mut conf = 1.0;
    stages
        .iter()
        .map(|&(stage, nominal)| {
            let loss = nominal.min(conf);
            if loss < nominal {
                warn!(stage, nominal, applied = loss, "confidence exhausted, loss capped");
            }
            let row = ConfidenceBudgetRow {
                stage: stage.to_string(),
                input_conf: conf,
                loss,
                output_conf: conf - loss,
            };
            conf = row.output_conf;
            row
        })
        .collect()
}

/// Qualitative observability gaps, in ANALYTICAL → TEMPORAL → SPATIAL order.
/// The spatial disclosure is always present.
pub fn detect_blind_spots(objects: &[TrackedObject], events: &[TimelineEvent]) -> Vec<BlindSpot> {
    let mut spots = Vec::with_capacity(3);

    let weak: Vec<&str> = objects
        .iter()
        .filter(|o| sanitized_confidence(o) < LOW_CONFIDENCE_THRESHOLD)
        .map(|o| o.id.as_str())
        .collect();
    if !weak.is_empty() {
        spots.push(BlindSpot {
            kind: BlindSpotKind::Analytical,
            description: format!(
                "Detection confidence below {:.0}% for {}; classifications and speeds for \
                 these objects are unreliable.",
                LOW_CONFIDENCE_THRESHOLD * 100.0,
                weak.join(", ")
            ),
            severity: Severity::High,
        });
    }

    let occlusions = occlusion_count(events);
    if occlusions > 0 {
        spots.push(BlindSpot {
            kind: BlindSpotKind::Temporal,
            description: format!(
                "{occlusions} occlusion event(s) interrupt continuous tracking; motion during \
                 these gaps is inferred, not observed."
            ),
            severity: Severity::Medium,
        });
    }

    spots.push(BlindSpot {
        kind: BlindSpotKind::Spatial,
        description: SPATIAL_DISCLOSURE.to_string(),
        severity: Severity::Low,
    });

    spots
}

/// Run all three uncertainty computations over one case.
pub fn analyze(objects: &[TrackedObject], events: &[TimelineEvent]) -> UncertaintyAnalysis {
    UncertaintyAnalysis {
        nodes: compute_node_uncertainty(objects),
        budget: compute_confidence_budget(objects, events),
        blind_spots: detect_blind_spots(objects, events),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConfidenceTag, ObjectId};
    use approx::assert_abs_diff_eq;

    fn object(id: &str, conf: f64, max_speed: f64, state: MotionState) -> TrackedObject {
        TrackedObject {
            id: ObjectId::new(id),
            label: format!("{id} label"),
            first_seen: 0.0,
            last_seen: 10.0,
            max_speed,
            avg_confidence: conf,
            motion_state: state,
            direction: "east".into(),
            speed_profile: None,
        }
    }

    fn event(kind: EventKind) -> TimelineEvent {
        TimelineEvent {
            id: "e".into(),
            label: "event".into(),
            timestamp: 1.0,
            kind,
            confidence: ConfidenceTag::Medium,
        }
    }

    fn assert_chained(rows: &[ConfidenceBudgetRow]) {
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].input_conf, 1.0);
        for w in rows.windows(2) {
            assert_eq!(w[0].output_conf, w[1].input_conf);
        }
        for r in rows {
            assert_abs_diff_eq!(r.output_conf, r.input_conf - r.loss, epsilon = 1e-12);
            assert!(r.output_conf >= 0.0 && r.output_conf <= r.input_conf);
        }
    }

    #[test]
    fn node_values_for_confident_moving_object() {
        let nodes = compute_node_uncertainty(&[object("a", 0.9, 40.0, MotionState::Moving)]);
        let n = &nodes[0];
        assert_abs_diff_eq!(n.pos_uncertainty, 0.1, epsilon = 1e-9);
        assert_abs_diff_eq!(n.vel_uncertainty, 0.12, epsilon = 1e-9);
        assert_abs_diff_eq!(n.accel_uncertainty, 0.18, epsilon = 1e-9);
        assert_abs_diff_eq!(n.persistence_risk, 0.1, epsilon = 1e-9);
    }

    #[test]
    fn high_speed_and_erratic_penalties() {
        let nodes = compute_node_uncertainty(&[object("a", 0.8, 95.0, MotionState::Erratic)]);
        let n = &nodes[0];
        assert_abs_diff_eq!(n.vel_uncertainty, 0.2 * 1.2 + 0.2, epsilon = 1e-9);
        assert_abs_diff_eq!(n.accel_uncertainty, (0.2 * 1.2 + 0.2) * 1.5, epsilon = 1e-9);
        assert_abs_diff_eq!(n.persistence_risk, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn node_values_are_clamped() {
        let objs = vec![
            object("low", 0.05, 120.0, MotionState::Erratic),
            object("neg", -0.5, 10.0, MotionState::Moving),
            object("over", 1.7, 10.0, MotionState::Stationary),
            object("nan", f64::NAN, 200.0, MotionState::Erratic),
        ];
        let nodes = compute_node_uncertainty(&objs);
        assert_eq!(nodes.len(), objs.len());
        for (n, o) in nodes.iter().zip(&objs) {
            assert_eq!(n.object_id, o.id);
            for v in [
                n.pos_uncertainty,
                n.vel_uncertainty,
                n.accel_uncertainty,
                n.persistence_risk,
            ] {
                assert!((0.0..=1.0).contains(&v), "{} out of range: {v}", n.object_id);
            }
            assert!(n.accel_uncertainty >= n.vel_uncertainty);
        }
        assert_eq!(nodes[3].pos_uncertainty, 1.0);
    }

    #[test]
    fn tracking_loss_counts_occlusions() {
        let events = vec![
            event(EventKind::Occlusion),
            event(EventKind::Braking),
            event(EventKind::Occlusion),
            event(EventKind::Occlusion),
        ];
        let rows = compute_confidence_budget(&[object("a", 0.9, 30.0, MotionState::Moving)], &events);
        assert_chained(&rows);
        assert_eq!(rows[1].stage, STAGE_TRACKING);
        assert_abs_diff_eq!(rows[1].loss, 0.11, epsilon = 1e-9);
        assert_abs_diff_eq!(rows[2].loss, 0.165, epsilon = 1e-9);
        assert_abs_diff_eq!(rows[0].loss, 0.015, epsilon = 1e-9);
        assert_abs_diff_eq!(rows[3].loss, MODEL_ERROR_LOSS, epsilon = 1e-12);
    }

    #[test]
    fn empty_case_budget() {
        let rows = compute_confidence_budget(&[], &[]);
        assert_chained(&rows);
        assert_abs_diff_eq!(rows[0].loss, 0.15, epsilon = 1e-12);
        let stages: Vec<_> = rows.iter().map(|r| r.stage.as_str()).collect();
        assert_eq!(
            stages,
            [STAGE_DETECTION, STAGE_TRACKING, STAGE_MOTION, STAGE_DYNAMICS]
        );
    }

    #[test]
    fn heavy_occlusion_bottoms_out_at_zero() {
        let events = vec![event(EventKind::Occlusion); 60];
        let rows = compute_confidence_budget(&[object("a", 0.5, 30.0, MotionState::Moving)], &events);
        assert_chained(&rows);
        assert_eq!(rows[3].output_conf, 0.0);
    }

    #[test]
    fn blind_spots_always_disclose_spatial() {
        let spots = detect_blind_spots(&[], &[]);
        assert_eq!(spots.len(), 1);
        assert_eq!(spots[0].kind, BlindSpotKind::Spatial);
        assert_eq!(spots[0].severity, Severity::Low);
    }

    #[test]
    fn blind_spot_ordering() {
        let objs = vec![
            object("car_1", 0.5, 30.0, MotionState::Moving),
            object("car_2", 0.95, 30.0, MotionState::Moving),
            object("ped_1", 0.3, 4.0, MotionState::Moving),
        ];
        let events = vec![event(EventKind::Occlusion), event(EventKind::Occlusion)];
        let spots = detect_blind_spots(&objs, &events);
        let kinds: Vec<_> = spots.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            [BlindSpotKind::Analytical, BlindSpotKind::Temporal, BlindSpotKind::Spatial]
        );
        assert_eq!(spots[0].severity, Severity::High);
        assert!(spots[0].description.contains("car_1, ped_1"));
        assert!(!spots[0].description.contains("car_2"));
        assert!(spots[1].description.starts_with("2 occlusion"));
    }

    #[test]
    fn single_low_confidence_object_leads_with_analytical() {
        let spots = detect_blind_spots(&[object("x", 0.5, 10.0, MotionState::Moving)], &[]);
        assert_eq!(spots[0].kind, BlindSpotKind::Analytical);
    }

    #[test]
    fn analyze_bundles_everything() {
        let objs = vec![object("a", 0.9, 40.0, MotionState::Moving)];
        let out = analyze(&objs, &[]);
        assert_eq!(out.nodes.len(), 1);
        assert_eq!(out.budget.len(), 4);
        assert_eq!(out.blind_spots.len(), 1);
    }
}
