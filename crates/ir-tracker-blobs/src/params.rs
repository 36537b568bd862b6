use serde::{Deserialize, Serialize};

/// How blob centres are estimated.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlobDetectionMethod {
    /// Threshold, external contours, area + circularity filter, moment centroid.
    #[default]
    Basic,
    /// As `Basic`, then upsample a crop around each blob and fit an ellipse
    /// for a sub-pixel centre. Noticeably slower.
    RefineByScaling,
}

/// Blob shape filter settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobDetectorParams {
    /// Binarization threshold on the brightened 8-bit image (strictly greater passes).
    pub threshold: u8,
    /// Minimum contour area in px².
    pub min_area: f64,
    /// Maximum contour area in px² (1/16 of a 512x512 frame by default).
    pub max_area: f64,
    /// Minimum `4π·area / perimeter²`.
    pub min_circularity: f64,
    /// Long-side size of the upsampled crop used by `RefineByScaling`.
    pub refine_target_px: f64,
    /// Margin added around each contour's bounding box before cropping.
    pub refine_margin_px: u32,
}

impl Default for BlobDetectorParams {
    fn default() -> Self {
        Self {
            threshold: 180,
            min_area: 5.0,
            max_area: 16384.0,
            min_circularity: 0.7,
            refine_target_px: 200.0,
            refine_margin_px: 1,
        }
    }
}

/// Depth gating and unit conversion for 3D validation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthValidationParams {
    /// Interpolated raw depth above this value is treated as invalid.
    pub max_raw_depth: f32,
    /// Raw depth units per meter.
    pub depth_units_per_meter: f64,
}

impl Default for DepthValidationParams {
    fn default() -> Self {
        Self {
            max_raw_depth: 4090.0,
            depth_units_per_meter: 1000.0,
        }
    }
}
