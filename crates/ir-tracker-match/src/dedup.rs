use nalgebra::Point3;

/// Indices of the points that survive duplicate removal, in input order.
///
/// A point is dropped when it lies strictly closer than `tolerance` to an
/// earlier surviving point, so the first of each cluster is kept.
pub fn dedup_indices(points: &[Point3<f64>], tolerance: f64) -> Vec<usize> {
    let mut kept: Vec<usize> = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        let duplicate = kept
            .iter()
            .any(|&k| nalgebra::distance(&points[k], p) < tolerance);
        if !duplicate {
            kept.push(i);
        }
    }
    kept
}
