use ir_tracker_core::{interpolate_bilinear, Image16View, UnmapToUnitPlane};
use nalgebra::{Matrix4, Point2, Point3, Vector3};

use crate::params::DepthValidationParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A blob centre that survived depth validation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValidatedBlob {
    /// Centre in infrared image pixels.
    pub pixel: Point2<f32>,
    /// Metric point in the depth sensor frame.
    pub depth_point: Point3<f64>,
    /// `depth_point` mapped through the depth-to-world transform.
    pub world_point: Point3<f64>,
}

/// Why blobs were dropped during validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValidationStats {
    pub accepted: usize,
    pub invalid_depth: usize,
    pub unmap_failed: usize,
}

/// Lift blob centres to 3D using the depth image.
///
/// For each pixel the depth is sampled bilinearly; samples outside the
/// image, equal to zero or above `max_raw_depth` are dropped. The pixel is
/// then unmapped to the unit plane, the normalized ray is scaled by the
/// metric range and the result is mapped through `depth_to_world` as a full
/// homogeneous transform. Surviving blobs are appended to `out` in input
/// order (`out` is not cleared).
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(blobs = pixels.len()))
)]
pub fn validate_blobs_3d<U>(
    depth: &Image16View<'_>,
    depth_to_world: &Matrix4<f64>,
    pixels: &[Point2<f32>],
    unmap: &U,
    params: &DepthValidationParams,
    out: &mut Vec<ValidatedBlob>,
) -> ValidationStats
where
    U: UnmapToUnitPlane + ?Sized,
{
    let mut stats = ValidationStats::default();

    for &pixel in pixels {
        let Some(raw) = interpolate_bilinear(depth, pixel) else {
            stats.invalid_depth += 1;
            continue;
        };
        if raw == 0.0 || raw > params.max_raw_depth {
            stats.invalid_depth += 1;
            continue;
        }

        let Some(uv) = unmap.unmap(pixel) else {
            log::trace!("unmap failed at ({:.2}, {:.2})", pixel.x, pixel.y);
            stats.unmap_failed += 1;
            continue;
        };

        let ray = Vector3::new(uv.x as f64, uv.y as f64, 1.0).normalize();
        let range_m = raw as f64 / params.depth_units_per_meter;
        let depth_point = Point3::from(ray * range_m);
        let world = depth_to_world * depth_point.to_homogeneous();

        out.push(ValidatedBlob {
            pixel,
            depth_point,
            world_point: Point3::new(world.x, world.y, world.z),
        });
        stats.accepted += 1;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ir_tracker_core::PinholeUnmap;

    const W: usize = 8;
    const H: usize = 8;

    fn camera() -> PinholeUnmap {
        PinholeUnmap::new(4.0, 4.0, 4.0, 4.0, W, H)
    }

    #[test]
    fn principal_point_lifts_along_optical_axis() {
        let depth = vec![500u16; W * H];
        let view = Image16View::new(W, H, &depth).expect("view");
        let mut out = Vec::new();
        let stats = validate_blobs_3d(
            &view,
            &Matrix4::identity(),
            &[Point2::new(4.0, 4.0)],
            &camera(),
            &DepthValidationParams::default(),
            &mut out,
        );
        assert_eq!(stats.accepted, 1);
        assert_abs_diff_eq!(out[0].depth_point.z, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(out[0].depth_point.x, 0.0, epsilon = 1e-9);
        assert_eq!(out[0].world_point, out[0].depth_point);
    }

    #[test]
    fn depth_is_radial_range_and_world_transform_applies() {
        let depth = vec![1000u16; W * H];
        let view = Image16View::new(W, H, &depth).expect("view");
        let mut to_world = Matrix4::identity();
        to_world[(0, 3)] = 1.0;
        to_world[(2, 3)] = -2.0;

        let mut out = Vec::new();
        validate_blobs_3d(
            &view,
            &to_world,
            &[Point2::new(6.0, 4.0)],
            &camera(),
            &DepthValidationParams::default(),
            &mut out,
        );
        let p = out[0].depth_point;
        assert_abs_diff_eq!(p.coords.norm(), 1.0, epsilon = 1e-9);
        // Unit-plane x = 0.5, so the ray is (0.5, 0, 1) / |.|
        assert_abs_diff_eq!(p.x / p.z, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(out[0].world_point.x, p.x + 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out[0].world_point.z, p.z - 2.0, epsilon = 1e-9);
    }

    #[test]
    fn invalid_depth_and_unmap_failures_are_dropped() {
        let mut depth = vec![800u16; W * H];
        depth[W + 1] = 0;
        depth[2 * W + 2] = 4095;
        let view = Image16View::new(W, H, &depth).expect("view");
        let pixels = [
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
            Point2::new(5.0, 5.0),
            Point2::new(20.0, 1.0),
            Point2::new(6.0, 6.0),
        ];
        let unmap = |p: Point2<f32>| (p.x < 6.0).then(|| Point2::new(0.0f32, 0.0));

        let mut out = vec![];
        let stats = validate_blobs_3d(
            &view,
            &Matrix4::identity(),
            &pixels,
            &unmap,
            &DepthValidationParams::default(),
            &mut out,
        );
        assert_eq!(
            stats,
            ValidationStats {
                accepted: 1,
                invalid_depth: 3,
                unmap_failed: 1,
            }
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].pixel, Point2::new(5.0, 5.0));
    }
}
