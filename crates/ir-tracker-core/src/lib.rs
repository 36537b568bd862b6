//! Core types and utilities for infrared marker tool tracking.
//!
//! This crate is intentionally small and purely geometric. It knows nothing
//! about contours, tools or correspondence search; those live in the
//! `ir-tracker-blobs`, `ir-tracker-match` and `ir-tracker` crates.

mod camera;
mod image;
mod logger;
mod rigid;

pub use camera::{PinholeUnmap, UnmapToUnitPlane};
pub use image::{interpolate_bilinear, Image16View, ImageError, ImageView, Image8View};
pub use rigid::{estimate_rigid_transform, RigidTransform};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
