//! Infrared blob detection and 3D validation.
//!
//! Pipeline per frame:
//! 1. Brighten the raw 16-bit infrared image into 8 bits ([`rebalance_to_8bit`]).
//! 2. Binarize and trace external contours; keep round, reasonably sized
//!    ones and report their centroids ([`BlobDetector`]).
//! 3. Lift each centroid to 3D using the depth image and an injected
//!    unmap capability, dropping invalid depth ([`validate_blobs_3d`]).
//!
//! The display helpers turn the raw frames into 8-bit textures and draw
//! cross markers over tracked marker centres.

mod detect;
mod display;
mod ellipse;
mod params;
mod validate;

pub use detect::{binarize_mut, BlobDetector};
pub use display::{
    depth_to_display, depth_to_display_into, draw_marker_cross, draw_marker_crosses,
    rebalance_into, rebalance_to_8bit, DisplayParams,
};
pub use ellipse::fit_ellipse_center;
pub use params::{BlobDetectionMethod, BlobDetectorParams, DepthValidationParams};
pub use validate::{validate_blobs_3d, ValidatedBlob, ValidationStats};
