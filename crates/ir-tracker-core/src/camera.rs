use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Maps a pixel to the camera's unit plane (`z = 1`).
///
/// Implementations wrap whatever calibrated camera model the host provides.
/// `None` means the pixel cannot be unmapped (outside the calibrated area,
/// bad input) and the blob is dropped.
pub trait UnmapToUnitPlane {
    fn unmap(&self, pixel: Point2<f32>) -> Option<Point2<f32>>;
}

impl<F> UnmapToUnitPlane for F
where
    F: Fn(Point2<f32>) -> Option<Point2<f32>>,
{
    #[inline]
    fn unmap(&self, pixel: Point2<f32>) -> Option<Point2<f32>> {
        self(pixel)
    }
}

/// Distortion-free pinhole model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PinholeUnmap {
    /// Focal length in pixels (x-axis).
    pub fx: f64,
    /// Focal length in pixels (y-axis).
    pub fy: f64,
    /// Principal point x (pixels).
    pub cx: f64,
    /// Principal point y (pixels).
    pub cy: f64,
    pub width: usize,
    pub height: usize,
}

impl PinholeUnmap {
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64, width: usize, height: usize) -> Self {
        Self {
            fx,
            fy,
            cx,
            cy,
            width,
            height,
        }
    }

    /// Inverse of [`UnmapToUnitPlane::unmap`], without bounds checks.
    pub fn project(&self, unit_plane: Point2<f64>) -> Point2<f64> {
        Point2::new(
            unit_plane.x * self.fx + self.cx,
            unit_plane.y * self.fy + self.cy,
        )
    }
}

impl UnmapToUnitPlane for PinholeUnmap {
    fn unmap(&self, pixel: Point2<f32>) -> Option<Point2<f32>> {
        if self.fx == 0.0 || self.fy == 0.0 {
            return None;
        }
        let (u, v) = (pixel.x as f64, pixel.y as f64);
        if !(u >= 0.0 && v >= 0.0 && u < self.width as f64 && v < self.height as f64) {
            return None;
        }
        Some(Point2::new(
            ((u - self.cx) / self.fx) as f32,
            ((v - self.cy) / self.fy) as f32,
        ))
    }
}
