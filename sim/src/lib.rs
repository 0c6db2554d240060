//! `sim` — Synthetic case generator: actors, sampled speed profiles, scenarios,
//! and case-file load/save.

pub mod actor;
pub mod case_file;
pub mod scenarios;

pub use actor::{sample_profile, Actor, MotionSpec, SamplingParams};
pub use case_file::{load_case, save_case, CaseFile};
pub use scenarios::{Scenario, ScenarioKind};
