use ir_tracker_blobs::{
    BlobDetectionMethod, BlobDetectorParams, DepthValidationParams, DisplayParams,
};
use ir_tracker_match::CorrespondenceParams;
use serde::{Deserialize, Serialize};

/// All tracker tunables. Every field has a default, so partial JSON works.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerParams {
    /// Frame width shared by the infrared and depth images.
    pub width: usize,
    pub height: usize,
    pub blob: BlobDetectorParams,
    pub method: BlobDetectionMethod,
    pub depth: DepthValidationParams,
    pub correspondence: CorrespondenceParams,
    pub display: DisplayParams,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            blob: BlobDetectorParams::default(),
            method: BlobDetectionMethod::Basic,
            depth: DepthValidationParams::default(),
            correspondence: CorrespondenceParams::default(),
            display: DisplayParams::default(),
        }
    }
}
