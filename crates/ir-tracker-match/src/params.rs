use serde::{Deserialize, Serialize};

/// Tolerances for the correspondence search (meters).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrespondenceParams {
    /// Max |observed - reference| for each consecutive pair distance.
    pub distance_tolerance: f64,
    /// Points closer than this are collapsed before matching.
    pub duplicate_tolerance: f64,
    /// Refuse to search when the deduplicated observed pool is larger.
    pub max_observed_points: Option<usize>,
}

impl Default for CorrespondenceParams {
    fn default() -> Self {
        Self {
            distance_tolerance: 0.0025,
            duplicate_tolerance: 0.001,
            max_observed_points: None,
        }
    }
}
