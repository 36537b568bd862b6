//! Correspondence search between a known marker layout and observed points.
//!
//! Given the ordered geometry of a rigid tool and an unordered set of
//! observed 3D points, [`find_correspondences`] enumerates assignments of
//! observed points to geometry points and keeps only those whose
//! consecutive distances agree with the geometry.
//!
//! The search is exhaustive (permutations grown one reference point at a
//! time, pruned by distance) and returns every survivor in enumeration
//! order; callers conventionally accept the first.

mod correspondence;
mod dedup;
mod error;
mod params;

pub use correspondence::{find_correspondences, CorrespondenceSet};
pub use dedup::dedup_indices;
pub use error::CorrespondenceError;
pub use params::CorrespondenceParams;
