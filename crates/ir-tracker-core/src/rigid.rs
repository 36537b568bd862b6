use nalgebra::{Matrix3, Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// 4x4 homogeneous rigid transform (rotation + translation, no scale).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    pub m: Matrix4<f64>,
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl RigidTransform {
    pub fn new(m: Matrix4<f64>) -> Self {
        Self { m }
    }

    pub fn identity() -> Self {
        Self {
            m: Matrix4::identity(),
        }
    }

    /// Build from a rotation block and a translation vector.
    pub fn from_parts(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        let mut m = Matrix4::identity();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&rotation);
        m.fixed_view_mut::<3, 1>(0, 3).copy_from(&translation);
        Self { m }
    }

    /// Build from 16 values listed row by row (`m[0..4]` is the first row).
    pub fn from_row_major(values: &[f64; 16]) -> Self {
        Self::new(Matrix4::from_row_slice(values))
    }

    /// Build from 16 values listed column by column.
    pub fn from_column_major(values: &[f64; 16]) -> Self {
        Self::new(Matrix4::from_column_slice(values))
    }

    /// The 16 elements in column-major order (serialization order).
    pub fn to_column_major(&self) -> [f64; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(self.m.as_slice());
        out
    }

    pub fn rotation(&self) -> Matrix3<f64> {
        self.m.fixed_view::<3, 3>(0, 0).into_owned()
    }

    pub fn translation(&self) -> Vector3<f64> {
        self.m.fixed_view::<3, 1>(0, 3).into_owned()
    }

    /// Apply the full affine transform to a point.
    #[inline]
    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        let v = self.m * p.to_homogeneous();
        Point3::new(v[0], v[1], v[2])
    }

    /// Closed-form inverse `[Rᵗ | -Rᵗt]`; valid for proper rigid transforms.
    pub fn inverse(&self) -> Self {
        let r_t = self.rotation().transpose();
        let t = -(r_t * self.translation());
        Self::from_parts(r_t, t)
    }

    /// `self ∘ other`: apply `other` first.
    pub fn compose(&self, other: &RigidTransform) -> Self {
        Self::new(self.m * other.m)
    }
}

/// Best-fit rigid transform mapping `src` onto `dst` (Kabsch / SVD).
///
/// Points must be in corresponding order. Every pair is trusted equally; no
/// outlier rejection or refinement is performed. Mismatched lengths (and
/// empty input) yield the identity, so callers must track validity
/// separately.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(src, dst), fields(n = src.len()))
)]
pub fn estimate_rigid_transform(src: &[Point3<f64>], dst: &[Point3<f64>]) -> RigidTransform {
    if src.len() != dst.len() || src.is_empty() {
        return RigidTransform::identity();
    }

    let n = src.len() as f64;
    let mut c_src = Vector3::zeros();
    let mut c_dst = Vector3::zeros();
    for (s, d) in src.iter().zip(dst) {
        c_src += s.coords;
        c_dst += d.coords;
    }
    c_src /= n;
    c_dst /= n;

    // H = Dᵗ·S over the centred point rows.
    let mut h = Matrix3::zeros();
    for (s, d) in src.iter().zip(dst) {
        h += (d.coords - c_dst) * (s.coords - c_src).transpose();
    }

    let svd = h.svd(true, true);
    let (Some(u), Some(mut v_t)) = (svd.u, svd.v_t) else {
        return RigidTransform::identity();
    };

    let mut r = u * v_t;
    if r.determinant() < 0.0 {
        v_t.row_mut(2).neg_mut();
        r = u * v_t;
    }

    let t = c_dst - r * c_src;
    RigidTransform::from_parts(r, t)
}
