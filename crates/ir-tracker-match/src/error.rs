#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrespondenceError {
    #[error("need at least 3 distinct reference points, got {count}")]
    TooFewReferencePoints { count: usize },

    #[error("need at least 3 distinct observed points, got {count}")]
    TooFewObservedPoints { count: usize },

    #[error("no candidate survived reference point {reference_index}")]
    NoCandidates { reference_index: usize },

    #[error("observed pool of {count} points exceeds the limit of {limit}")]
    TooManyObservedPoints { count: usize, limit: usize },
}
