use criterion::{black_box, criterion_group, criterion_main, Criterion};
use forensic_core::analysis::{AnalysisConfig, CaseAnalysis};
use forensic_core::kinematics::{interpolate, DEFAULT_STEP};
use forensic_core::types::{MotionState, ObjectId, SparsePoint, TrackedObject};

fn make_profile(n: usize, duration: f64, phase: f64) -> Vec<SparsePoint> {
    // Deliberately reversed so every call pays for the sort.
    (0..n)
        .rev()
        .map(|i| {
            let t = duration * i as f64 / n as f64;
            SparsePoint::new(t, 40.0 + 20.0 * (t * 0.7 + phase).sin())
        })
        .collect()
}

fn make_objects(n: usize, duration: f64) -> Vec<TrackedObject> {
    (0..n)
        .map(|i| TrackedObject {
            id: ObjectId(format!("obj_{i}")),
            label: "vehicle".into(),
            first_seen: 0.0,
            last_seen: duration,
            max_speed: 60.0,
            avg_confidence: 0.8,
            motion_state: MotionState::Moving,
            direction: String::new(),
            speed_profile: Some(make_profile(24, duration, i as f64)),
        })
        .collect()
}

fn bench_interpolate(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolate");
    for duration in [10.0, 60.0, 600.0] {
        let points = make_profile(50, duration, 0.0);
        group.bench_function(format!("{duration}s"), |b| {
            b.iter(|| black_box(interpolate(&points, duration, DEFAULT_STEP)));
        });
    }
    group.finish();
}

fn bench_case(c: &mut Criterion) {
    let mut group = c.benchmark_group("case_analysis");
    for n in [2, 10, 40] {
        let objects = make_objects(n, 30.0);
        let analysis = CaseAnalysis::new(AnalysisConfig::default());
        group.bench_function(format!("{n}_objects"), |b| {
            b.iter(|| black_box(analysis.run(&objects, &[], 30.0)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_interpolate, bench_case);
criterion_main!(benches);
