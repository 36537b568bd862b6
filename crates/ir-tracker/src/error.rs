use ir_tracker_core::ImageError;

/// Errors from loading a tool configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("configuration has no `tools` array")]
    MissingTools,
}

/// Errors from [`ToolTracker::process_frame`](crate::ToolTracker::process_frame).
///
/// Only malformed input buffers are reported; bad measurements and failed
/// matches are absorbed into the frame summary.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerError {
    #[error("infrared frame: {0}")]
    InvalidAbFrame(#[source] ImageError),
    #[error("depth frame: {0}")]
    InvalidDepthFrame(#[source] ImageError),
}
