use nalgebra::{distance, Point3};

use crate::dedup::dedup_indices;
use crate::error::CorrespondenceError;
use crate::params::CorrespondenceParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Surviving assignments, each mapping reference points to observed indices.
///
/// `candidates()[k][i]` is the index into the caller's observed slice that
/// was assigned to the `i`-th deduplicated reference point. Candidates are in
/// enumeration order and there is always at least one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorrespondenceSet {
    candidates: Vec<Vec<usize>>,
}

impl CorrespondenceSet {
    /// The first survivor in enumeration order. No scoring is applied, so for
    /// near-symmetric layouts this is one of several consistent assignments.
    pub fn accepted(&self) -> &[usize] {
        self.candidates.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn candidates(&self) -> &[Vec<usize>] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn into_candidates(self) -> Vec<Vec<usize>> {
        self.candidates
    }
}

/// Match `reference` (ordered tool geometry) against `observed` points.
///
/// Both lists are deduplicated with `duplicate_tolerance` and must keep at
/// least 3 points. Starting from one single-index candidate per observed
/// point, each further reference point extends every candidate by every
/// unused observed index; an extension survives only when the distance
/// between its last two observed points is within `distance_tolerance` of
/// the distance between the current and previous reference points.
///
/// Extension and pruning happen in one pass. Survivors come out in the same
/// order a full expansion followed by filtering would produce.
///
/// The cost grows combinatorially with the observed pool; set
/// `max_observed_points` to bound it.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip_all,
        fields(reference = reference.len(), observed = observed.len())
    )
)]
pub fn find_correspondences(
    reference: &[Point3<f64>],
    observed: &[Point3<f64>],
    params: &CorrespondenceParams,
) -> Result<CorrespondenceSet, CorrespondenceError> {
    let ref_idx = dedup_indices(reference, params.duplicate_tolerance);
    if ref_idx.len() < 3 {
        return Err(CorrespondenceError::TooFewReferencePoints {
            count: ref_idx.len(),
        });
    }
    let obs_idx = dedup_indices(observed, params.duplicate_tolerance);
    if obs_idx.len() < 3 {
        return Err(CorrespondenceError::TooFewObservedPoints {
            count: obs_idx.len(),
        });
    }
    if let Some(limit) = params.max_observed_points {
        if obs_idx.len() > limit {
            return Err(CorrespondenceError::TooManyObservedPoints {
                count: obs_idx.len(),
                limit,
            });
        }
    }

    let refs: Vec<Point3<f64>> = ref_idx.iter().map(|&i| reference[i]).collect();
    let obs: Vec<Point3<f64>> = obs_idx.iter().map(|&i| observed[i]).collect();

    let mut candidates: Vec<Vec<usize>> = (0..obs.len()).map(|j| vec![j]).collect();
    let mut next: Vec<Vec<usize>> = Vec::new();

    for r in 1..refs.len() {
        let target = distance(&refs[r - 1], &refs[r]);
        next.clear();

        for cand in &candidates {
            let Some(&last) = cand.last() else {
                continue;
            };
            for (j, p) in obs.iter().enumerate() {
                if cand.contains(&j) {
                    continue;
                }
                if (distance(&obs[last], p) - target).abs() > params.distance_tolerance {
                    continue;
                }
                let mut grown = Vec::with_capacity(refs.len());
                grown.extend_from_slice(cand);
                grown.push(j);
                next.push(grown);
            }
        }

        if next.is_empty() {
            return Err(CorrespondenceError::NoCandidates {
                reference_index: ref_idx[r],
            });
        }
        std::mem::swap(&mut candidates, &mut next);
    }

    // Back to indices into the caller's slice.
    for cand in &mut candidates {
        for j in cand.iter_mut() {
            *j = obs_idx[*j];
        }
    }

    log::trace!(
        "{} correspondence candidates for {} reference / {} observed points",
        candidates.len(),
        refs.len(),
        obs.len()
    );
    Ok(CorrespondenceSet { candidates })
}
