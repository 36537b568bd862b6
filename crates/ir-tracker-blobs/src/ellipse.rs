//! Direct least-squares ellipse fit (Fitzgibbon, Pilu & Fisher 1999).
//!
//! Only the centre is needed downstream, so the conic is never converted to
//! geometric parameters: the centre is the stationary point of the fitted
//! quadratic, solved in normalized coordinates and mapped back.

use nalgebra::{Matrix3, Point2, SMatrix, Vector3};

/// Fit an ellipse to `points` and return its centre.
///
/// Returns `None` for fewer than 6 points, a degenerate scatter or when no
/// elliptic solution exists.
pub fn fit_ellipse_center(points: &[Point2<f64>]) -> Option<Point2<f64>> {
    if points.len() < 6 {
        return None;
    }

    // Hartley-style normalization keeps the scatter matrix well conditioned.
    let n = points.len() as f64;
    let (mx, my) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    let (mx, my) = (mx / n, my / n);
    let mean_dist = points
        .iter()
        .map(|p| ((p.x - mx).powi(2) + (p.y - my).powi(2)).sqrt())
        .sum::<f64>()
        / n;
    if mean_dist < 1e-12 {
        return None;
    }
    let s = std::f64::consts::SQRT_2 / mean_dist;

    // Scatter blocks for [x², xy, y²] and [x, y, 1].
    let mut scatter = SMatrix::<f64, 6, 6>::zeros();
    for p in points {
        let x = (p.x - mx) * s;
        let y = (p.y - my) * s;
        let row = SMatrix::<f64, 6, 1>::from_column_slice(&[x * x, x * y, y * y, x, y, 1.0]);
        scatter += row * row.transpose();
    }
    let s11: Matrix3<f64> = scatter.fixed_view::<3, 3>(0, 0).into_owned();
    let s12: Matrix3<f64> = scatter.fixed_view::<3, 3>(0, 3).into_owned();
    let s22: Matrix3<f64> = scatter.fixed_view::<3, 3>(3, 3).into_owned();

    let s22_inv = s22.try_inverse()?;
    let reduce = -s22_inv * s12.transpose();
    let m = s11 + s12 * reduce;

    // C1⁻¹ for the 4ac - b² = 1 constraint.
    let c1_inv = Matrix3::new(0.0, 0.0, 0.5, 0.0, -1.0, 0.0, 0.5, 0.0, 0.0);
    let system = c1_inv * m;

    let mut best: Option<Vector3<f64>> = None;
    for lambda in real_eigenvalues(&system) {
        let Some(a1) = null_vector(&(system - Matrix3::identity() * lambda)) else {
            continue;
        };
        if 4.0 * a1[0] * a1[2] - a1[1] * a1[1] > 0.0 {
            best = Some(a1);
            break;
        }
    }
    let a1 = best?;
    let a2 = reduce * a1;

    let (a, b, c) = (a1[0], a1[1], a1[2]);
    let (d, e) = (a2[0], a2[1]);
    let det = 4.0 * a * c - b * b;
    if det.abs() < 1e-15 {
        return None;
    }
    let cx = (b * e - 2.0 * c * d) / det;
    let cy = (b * d - 2.0 * a * e) / det;
    let center = Point2::new(cx / s + mx, cy / s + my);
    (center.x.is_finite() && center.y.is_finite()).then_some(center)
}

/// Real roots of the characteristic polynomial `λ³ - tr·λ² + c·λ - det`.
fn real_eigenvalues(m: &Matrix3<f64>) -> Vec<f64> {
    let tr = m.trace();
    let minors = m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)]
        + m[(0, 0)] * m[(2, 2)] - m[(0, 2)] * m[(2, 0)]
        + m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)];
    real_cubic_roots(-tr, minors, -m.determinant())
}

/// Real roots of `x³ + a2·x² + a1·x + a0`.
fn real_cubic_roots(a2: f64, a1: f64, a0: f64) -> Vec<f64> {
    let shift = a2 / 3.0;
    let p = a1 - a2 * a2 / 3.0;
    let q = 2.0 * a2 * a2 * a2 / 27.0 - a2 * a1 / 3.0 + a0;
    let disc = (q / 2.0).powi(2) + (p / 3.0).powi(3);

    if disc > 0.0 {
        let sq = disc.sqrt();
        let t = (-q / 2.0 + sq).cbrt() + (-q / 2.0 - sq).cbrt();
        return vec![t - shift];
    }
    if p.abs() < f64::EPSILON {
        return vec![-shift];
    }
    let r = (-p / 3.0).sqrt();
    let phi = (-q / (2.0 * r * r * r)).clamp(-1.0, 1.0).acos();
    (0..3)
        .map(|k| 2.0 * r * ((phi - std::f64::consts::TAU * k as f64) / 3.0).cos() - shift)
        .collect()
}

fn null_vector(m: &Matrix3<f64>) -> Option<Vector3<f64>> {
    let svd = m.svd(false, true);
    let v_t = svd.v_t?;
    let idx = svd.singular_values.imin();
    Some(v_t.row(idx).transpose())
}
