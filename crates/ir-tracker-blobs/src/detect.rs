use image::imageops::{self, FilterType};
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::geometry::arc_length;
use imageproc::point::Point;
use nalgebra::Point2;

use crate::ellipse::fit_ellipse_center;
use crate::params::{BlobDetectionMethod, BlobDetectorParams};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Finds bright, roughly circular blobs in an 8-bit infrared image.
#[derive(Clone, Debug, Default)]
pub struct BlobDetector {
    pub params: BlobDetectorParams,
    pub method: BlobDetectionMethod,
}

impl BlobDetector {
    pub fn new(params: BlobDetectorParams) -> Self {
        Self {
            params,
            method: BlobDetectionMethod::Basic,
        }
    }

    pub fn with_method(mut self, method: BlobDetectionMethod) -> Self {
        self.method = method;
        self
    }

    /// Detect blob centres. The image is binarized in place.
    pub fn detect(&self, image: &mut GrayImage) -> Vec<Point2<f32>> {
        let mut out = Vec::new();
        self.detect_into(image, &mut out);
        out
    }

    /// Like [`detect`](Self::detect) but writes into a reusable buffer.
    ///
    /// `out` is cleared first. Centres are reported in contour discovery
    /// order (raster order of each blob's first boundary pixel).
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "debug",
            skip(self, image, out),
            fields(width = image.width(), height = image.height(), method = ?self.method)
        )
    )]
    pub fn detect_into(&self, image: &mut GrayImage, out: &mut Vec<Point2<f32>>) {
        out.clear();
        binarize_mut(image, self.params.threshold);

        let contours = find_contours::<i32>(image);
        for contour in contours.iter().filter(|c| is_external(c)) {
            let shape = ContourShape::measure(&contour.points);
            if !self.passes_coarse_gate(&shape) {
                continue;
            }

            let center = match self.method {
                BlobDetectionMethod::Basic => shape.centroid,
                BlobDetectionMethod::RefineByScaling => self.refine_center(image, &contour.points),
            };
            if let Some(c) = center {
                out.push(Point2::new(c.x as f32, c.y as f32));
            }
        }

        log::trace!("detected {} blobs ({} contours)", out.len(), contours.len());
    }

    /// Area bounds on the original-resolution contour. Circularity is checked
    /// here only for `Basic`; the refined path checks it after upsampling.
    fn passes_coarse_gate(&self, shape: &ContourShape) -> bool {
        if shape.area < self.params.min_area || shape.area > self.params.max_area {
            return false;
        }
        self.method != BlobDetectionMethod::Basic
            || shape.circularity() >= self.params.min_circularity
    }

    /// Upsample a crop around the blob, re-trace it and fit an ellipse.
    fn refine_center(&self, binary: &GrayImage, points: &[Point<i32>]) -> Option<Point2<f64>> {
        let (w, h) = (binary.width() as i64, binary.height() as i64);
        let r = self.params.refine_margin_px as i64;

        let xs = points.iter().map(|p| p.x as i64);
        let ys = points.iter().map(|p| p.y as i64);
        let (bx0, bx1) = (xs.clone().min()?, xs.max()? + 1);
        let (by0, by1) = (ys.clone().min()?, ys.max()? + 1);

        let x0 = if bx0 > r { bx0 - r } else { 0 };
        let y0 = if by0 > r { by0 - r } else { 0 };
        let x1 = if bx1 < w - r - 1 { bx1 + r } else { w - 1 };
        let y1 = if by1 < h - r - 1 { by1 + r } else { h - 1 };
        let (roi_w, roi_h) = (x1 - x0, y1 - y0);
        if roi_w <= 0 || roi_h <= 0 {
            return None;
        }

        let crop = imageops::crop_imm(binary, x0 as u32, y0 as u32, roi_w as u32, roi_h as u32)
            .to_image();
        let target = self.params.refine_target_px;
        let sf = (target / roi_w as f64).min(target / roi_h as f64);
        let new_w = ((roi_w as f64 * sf).round() as u32).max(1);
        let new_h = ((roi_h as f64 * sf).round() as u32).max(1);
        let mut scaled = imageops::resize(&crop, new_w, new_h, FilterType::Triangle);
        binarize_mut(&mut scaled, self.params.threshold);

        let contours = find_contours::<i32>(&scaled);
        let contour = contours.iter().find(|c| is_external(c))?;
        let shape = ContourShape::measure(&contour.points);
        if shape.circularity() < self.params.min_circularity {
            return None;
        }

        let pts: Vec<Point2<f64>> = contour
            .points
            .iter()
            .map(|p| Point2::new(p.x as f64, p.y as f64))
            .collect();
        let c = fit_ellipse_center(&pts).or(shape.centroid)?;

        // Resize maps pixel centres, so undo the half-pixel offset too.
        let sx = new_w as f64 / roi_w as f64;
        let sy = new_h as f64 / roi_h as f64;
        Some(Point2::new(
            (c.x + 0.5) / sx - 0.5 + x0 as f64,
            (c.y + 0.5) / sy - 0.5 + y0 as f64,
        ))
    }
}

/// Binarize in place: values strictly above `threshold` become 255, the rest 0.
pub fn binarize_mut(image: &mut GrayImage, threshold: u8) {
    for v in image.iter_mut() {
        *v = if *v > threshold { 255 } else { 0 };
    }
}

fn is_external(c: &Contour<i32>) -> bool {
    c.parent.is_none() && c.border_type == BorderType::Outer
}

/// Area, perimeter and centroid of a closed contour polygon.
struct ContourShape {
    area: f64,
    perimeter: f64,
    centroid: Option<Point2<f64>>,
}

impl ContourShape {
    fn measure(points: &[Point<i32>]) -> Self {
        let (m00, m10, m01) = polygon_moments(points);
        let centroid = (m00.abs() > f64::EPSILON).then(|| Point2::new(m10 / m00, m01 / m00));
        Self {
            area: m00.abs(),
            perimeter: arc_length(points, true),
            centroid,
        }
    }

    /// `4π·area / perimeter²`; 1 for a perfect disk.
    fn circularity(&self) -> f64 {
        if self.perimeter <= 0.0 {
            return 0.0;
        }
        4.0 * std::f64::consts::PI * self.area / (self.perimeter * self.perimeter)
    }
}

/// Signed polygon moments (m00, m10, m01) via Green's theorem.
fn polygon_moments(points: &[Point<i32>]) -> (f64, f64, f64) {
    let n = points.len();
    if n < 3 {
        return (0.0, 0.0, 0.0);
    }
    let (mut a, mut sx, mut sy) = (0.0, 0.0, 0.0);
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        let (xi, yi, xj, yj) = (p.x as f64, p.y as f64, q.x as f64, q.y as f64);
        let cross = xi * yj - xj * yi;
        a += cross;
        sx += (xi + xj) * cross;
        sy += (yi + yj) * cross;
    }
    (a / 2.0, sx / 6.0, sy / 6.0)
}
