use ir_tracker_match::{find_correspondences, CorrespondenceError, CorrespondenceParams};
use nalgebra::{Point3, UnitQuaternion, Vector3};

fn probe() -> Vec<Point3<f64>> {
    vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.05, 0.0, 0.0),
        Point3::new(0.05, 0.08, 0.0),
        Point3::new(-0.04, 0.12, 0.03),
    ]
}

fn pointer() -> Vec<Point3<f64>> {
    vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.03, 0.0, 0.0),
        Point3::new(0.0, 0.11, 0.0),
    ]
}

fn place(points: &[Point3<f64>], q: UnitQuaternion<f64>, t: Vector3<f64>) -> Vec<Point3<f64>> {
    points.iter().map(|p| q * p + t).collect()
}

#[test]
fn rigid_motion_preserves_the_match() {
    let q = UnitQuaternion::from_euler_angles(0.9, 0.1, -2.3);
    let seen = place(&probe(), q, Vector3::new(0.2, 0.1, 0.7));
    let observed = vec![seen[3], seen[1], seen[0], seen[2]];

    let set = find_correspondences(&probe(), &observed, &CorrespondenceParams::default())
        .expect("match");
    assert_eq!(set.accepted(), &[2, 1, 3, 0]);
}

#[test]
fn two_tools_in_one_pool() {
    let a = place(
        &probe(),
        UnitQuaternion::from_euler_angles(0.0, 0.3, 0.0),
        Vector3::new(0.0, 0.0, 0.5),
    );
    let b = place(
        &pointer(),
        UnitQuaternion::from_euler_angles(0.4, 0.0, 0.2),
        Vector3::new(0.3, 0.0, 0.6),
    );
    let mut pool = b.clone();
    pool.extend_from_slice(&a);

    let params = CorrespondenceParams::default();
    let probe_match = find_correspondences(&probe(), &pool, &params).expect("probe");
    assert_eq!(probe_match.accepted(), &[3, 4, 5, 6]);

    let pointer_match = find_correspondences(&pointer(), &pool, &params).expect("pointer");
    assert_eq!(pointer_match.accepted(), &[0, 1, 2]);
}

#[test]
fn missing_marker_fails() {
    let seen = place(&probe(), UnitQuaternion::identity(), Vector3::new(0.0, 0.0, 1.0));
    let err = find_correspondences(&probe(), &seen[..3], &CorrespondenceParams::default())
        .unwrap_err();
    assert_eq!(err, CorrespondenceError::NoCandidates { reference_index: 3 });
}
