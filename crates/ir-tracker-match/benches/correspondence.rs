use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ir_tracker_match::{find_correspondences, CorrespondenceParams};
use nalgebra::{Point3, UnitQuaternion, Vector3};

fn tool_geometry() -> Vec<Point3<f64>> {
    vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.05, 0.0, 0.0),
        Point3::new(0.05, 0.08, 0.0),
        Point3::new(-0.04, 0.12, 0.03),
    ]
}

/// The tool seen under a fixed pose plus `distractors` unrelated points.
fn observed_scene(distractors: usize) -> Vec<Point3<f64>> {
    let rot = UnitQuaternion::from_euler_angles(0.2, -0.4, 1.1);
    let t = Vector3::new(0.1, -0.05, 0.6);
    let mut pts: Vec<Point3<f64>> = tool_geometry()
        .iter()
        .map(|p| rot * p + t)
        .collect();
    for k in 0..distractors {
        let a = k as f64 * 0.7;
        pts.push(Point3::new(
            0.3 * a.cos(),
            0.3 * a.sin(),
            0.5 + 0.013 * k as f64,
        ));
    }
    pts.rotate_left(distractors / 2);
    pts
}

fn bench_find_correspondences(c: &mut Criterion) {
    let geometry = tool_geometry();
    let params = CorrespondenceParams::default();
    let mut group = c.benchmark_group("find_correspondences");
    for distractors in [0usize, 4, 8, 16] {
        let observed = observed_scene(distractors);
        group.bench_with_input(
            BenchmarkId::from_parameter(observed.len()),
            &observed,
            |b, observed| {
                b.iter(|| find_correspondences(black_box(&geometry), black_box(observed), &params))
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_find_correspondences);
criterion_main!(benches);
