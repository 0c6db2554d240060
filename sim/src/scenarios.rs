//! Scenario definitions.
//!
//! Each scenario is a named configuration of actors and timeline events.
//! All scenarios are deterministic given the same seed.

use crate::{
    actor::{sample_profile, Actor, MotionSpec, SamplingParams},
    case_file::CaseFile,
};
use forensic_core::types::{ConfidenceTag, EventKind, ObjectId, TimelineEvent, TrackedObject};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Which pre-defined scenario to load.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum ScenarioKind {
    /// Lead car brakes hard, follower keeps its speed
    RearEnd,
    /// Crossing traffic, a turning car and a pedestrian
    Intersection,
    /// Fast motorcycle repeatedly hidden behind a truck
    Occluded,
    /// Parking lot, nothing moves
    Parked,
}

/// A fully configured synthetic case.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub seed: u64,
    pub duration: f64, // seconds of footage
    pub sampling: SamplingParams,
    pub actors: Vec<Actor>,
    pub events: Vec<TimelineEvent>,
}

impl Scenario {
    /// Build the named scenario. Uses `seed` for repeatability.
    pub fn build(kind: ScenarioKind, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut scenario = match kind {
            ScenarioKind::RearEnd => Self::rear_end(seed),
            ScenarioKind::Intersection => Self::intersection(seed),
            ScenarioKind::Occluded => Self::occluded(seed),
            ScenarioKind::Parked => Self::parked(seed),
        };
        // Per-seed variation in how sure the detector is about each actor.
        for actor in &mut scenario.actors {
            let wobble = (rng.gen::<f64>() * 2.0 - 1.0) * 0.03;
            actor.confidence = (actor.confidence + wobble).clamp(0.0, 1.0);
        }
        scenario
    }

    /// Sample every actor into the case file the perception stage would emit.
    pub fn case_file(&self) -> CaseFile {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(1));
        let objects = self
            .actors
            .iter()
            .map(|actor| self.observe(actor, &mut rng))
            .collect();
        CaseFile {
            name: self.name.clone(),
            duration: self.duration,
            objects,
            events: self.events.clone(),
        }
    }

    fn observe(&self, actor: &Actor, rng: &mut ChaCha8Rng) -> TrackedObject {
        let profile = sample_profile(actor, self.duration, &self.sampling, rng);
        let (first_seen, last_seen) = actor.visible_span(self.duration);
        let max_speed = profile.iter().map(|p| p.value).fold(0.0, f64::max);
        TrackedObject {
            id: ObjectId::new(actor.id.clone()),
            label: actor.label.clone(),
            first_seen,
            last_seen,
            max_speed,
            avg_confidence: actor.confidence,
            motion_state: actor.motion.motion_state(),
            direction: actor.direction.clone(),
            speed_profile: Some(profile),
        }
    }

    // -----------------------------------------------------------------------
    // Scenario 1: Rear-end
    // -----------------------------------------------------------------------
    fn rear_end(seed: u64) -> Self {
        let actors = vec![
            actor(
                "veh_1",
                "Silver hatchback",
                MotionSpec::Brake {
                    speed: 50.0,
                    at: 4.0,
                    decel: 18.0,
                },
                0.92,
                "eastbound",
            ),
            actor(
                "veh_2",
                "Black SUV",
                MotionSpec::Cruise { speed: 55.0 },
                0.88,
                "eastbound",
            ),
            actor(
                "veh_3",
                "Parked van",
                MotionSpec::Stationary,
                0.75,
                "curbside",
            ),
        ];
        let events = vec![
            event("ev_1", "Both vehicles in lane", 0.5, EventKind::Detection, ConfidenceTag::High),
            event("ev_2", "Brake lights on hatchback", 4.1, EventKind::Braking, ConfidenceTag::High),
            event("ev_3", "SUV contacts hatchback", 6.3, EventKind::Impact, ConfidenceTag::Medium),
        ];
        Scenario {
            name: "rear_end".into(),
            seed,
            duration: 10.0,
            sampling: SamplingParams::default(),
            actors,
            events,
        }
    }

    // -----------------------------------------------------------------------
    // Scenario 2: Intersection
    // -----------------------------------------------------------------------
    fn intersection(seed: u64) -> Self {
        let mut turning = actor(
            "veh_2",
            "White sedan (turning)",
            MotionSpec::Accelerate {
                speed: 0.0,
                at: 2.0,
                accel: 6.0,
                max: 30.0,
            },
            0.81,
            "left turn",
        );
        turning.appear_at = Some(1.0);
        let mut pedestrian = actor(
            "ped_1",
            "Pedestrian",
            MotionSpec::Erratic {
                base: 5.0,
                swing: 3.0,
                period: 2.5,
            },
            0.55,
            "crossing south",
        );
        pedestrian.disappear_at = Some(9.0);

        let actors = vec![
            actor(
                "veh_1",
                "Red pickup",
                MotionSpec::Cruise { speed: 70.0 },
                0.9,
                "northbound",
            ),
            turning,
            pedestrian,
        ];
        let events = vec![
            event("ev_1", "Pickup enters intersection", 1.2, EventKind::Detection, ConfidenceTag::High),
            event("ev_2", "Bus shelter hides pedestrian", 5.4, EventKind::Occlusion, ConfidenceTag::Medium),
            event("ev_3", "Near miss at crosswalk", 7.8, EventKind::Other, ConfidenceTag::Low),
        ];
        Scenario {
            name: "intersection".into(),
            seed,
            duration: 12.0,
            sampling: SamplingParams::default(),
            actors,
            events,
        }
    }

    // -----------------------------------------------------------------------
    // Scenario 3: Occluded
    // -----------------------------------------------------------------------
    fn occluded(seed: u64) -> Self {
        let actors = vec![
            actor(
                "veh_1",
                "Box truck",
                MotionSpec::Cruise { speed: 60.0 },
                0.93,
                "westbound",
            ),
            actor(
                "moto_1",
                "Motorcycle",
                MotionSpec::Erratic {
                    base: 90.0,
                    swing: 15.0,
                    period: 3.0,
                },
                0.58,
                "westbound",
            ),
        ];
        let events = vec![
            event("ev_1", "Motorcycle detected", 0.3, EventKind::Detection, ConfidenceTag::Medium),
            event("ev_2", "Motorcycle behind truck", 2.5, EventKind::Occlusion, ConfidenceTag::Low),
            event("ev_3", "Motorcycle behind truck", 5.0, EventKind::Occlusion, ConfidenceTag::Low),
            event("ev_4", "Motorcycle behind truck", 7.6, EventKind::Occlusion, ConfidenceTag::Low),
            event("ev_5", "Truck brakes", 9.0, EventKind::Braking, ConfidenceTag::Medium),
        ];
        Scenario {
            name: "occluded".into(),
            seed,
            duration: 12.0,
            sampling: SamplingParams {
                interval: 1.2,
                ..SamplingParams::default()
            },
            actors,
            events,
        }
    }

    // -----------------------------------------------------------------------
    // Scenario 4: Parked
    // -----------------------------------------------------------------------
    fn parked(seed: u64) -> Self {
        let actors = (0..4)
            .map(|i| {
                actor(
                    &format!("veh_{}", i + 1),
                    "Parked car",
                    MotionSpec::Stationary,
                    0.85 - 0.05 * i as f64,
                    "parked",
                )
            })
            .collect();
        let events = vec![event(
            "ev_1",
            "Lot under surveillance",
            0.0,
            EventKind::Detection,
            ConfidenceTag::High,
        )];
        Scenario {
            name: "parked".into(),
            seed,
            duration: 6.0,
            sampling: SamplingParams::default(),
            actors,
            events,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn actor(id: &str, label: &str, motion: MotionSpec, confidence: f64, direction: &str) -> Actor {
    Actor {
        id: id.into(),
        label: label.into(),
        motion,
        confidence,
        direction: direction.into(),
        appear_at: None,
        disappear_at: None,
    }
}

fn event(
    id: &str,
    label: &str,
    timestamp: f64,
    kind: EventKind,
    confidence: ConfidenceTag,
) -> TimelineEvent {
    TimelineEvent {
        id: id.into(),
        label: label.into(),
        timestamp,
        kind,
        confidence,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
