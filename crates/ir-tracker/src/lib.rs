//! Infrared marker tracking for rigid tools.
//!
//! Each frame pairs a 16-bit infrared (active brightness) image with a
//! 16-bit depth image from the same sensor. Retro-reflective markers show up
//! as bright round blobs; their centres are lifted to 3D with the depth
//! image, matched against each tool's known marker layout by pairwise
//! distances, and the tool pose is solved with Kabsch.
//!
//! ## Quickstart
//!
//! ```no_run
//! use ir_tracker::{FrameInput, ToolTracker, TrackerConfig};
//! use ir_tracker::core::PinholeUnmap;
//! use nalgebra::Matrix4;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TrackerConfig::load_json("tools.json")?;
//! let mut tracker = ToolTracker::from_config(&config);
//! tracker.set_unmap(PinholeUnmap::new(365.0, 365.0, 256.0, 256.0, 512, 512));
//!
//! let (ab, depth) = (vec![0u16; 512 * 512], vec![0u16; 512 * 512]);
//! let summary = tracker.process_frame(&FrameInput {
//!     ab: &ab,
//!     depth: &depth,
//!     depth_to_world: Matrix4::identity(),
//! })?;
//! println!("{} tools tracked", summary.tracked_tools);
//! let records = tracker.serialized();
//! # let _ = records;
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `ir_tracker::core`: image views, unmap capability, rigid transforms, logger.
//! - `ir_tracker::blobs`: blob detection, 3D validation, display helpers.
//! - `ir_tracker::matching`: distance-constrained correspondence search.
//! - `ir_tracker::frames` (feature `frames`): loading recorded frames from PNG.

pub use ir_tracker_blobs as blobs;
pub use ir_tracker_core as core;
pub use ir_tracker_match as matching;

mod config;
mod dictionary;
mod error;
mod params;
mod tool;
mod tracker;

#[cfg(feature = "frames")]
pub mod frames;

pub use config::{ToolSpec, TrackerConfig};
pub use dictionary::ToolDictionary;
pub use error::{ConfigError, TrackerError};
pub use params::TrackerParams;
pub use tool::{ToolId, TrackedTool};
pub use tracker::{FrameInput, FrameSummary, ToolTracker};
