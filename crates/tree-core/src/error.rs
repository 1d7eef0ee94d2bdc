//! Error types shared by the core and both frontends.

use crate::photos::PhotoId;

/// Errors raised by the core.
///
/// Missing hands are not errors; a frame without a hand simply yields no
/// landmark sets.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// A landmark set did not carry the detector's fixed number of points.
    #[error("expected {expected} hand landmarks, got {got}")]
    LandmarkCount { expected: usize, got: usize },

    /// Camera or hand-pose backend could not be reached.
    #[error("hand detector unavailable: {0}")]
    DetectorUnavailable(String),

    /// An uploaded image could not be turned into a texture.
    #[error("failed to decode photo `{name}`: {reason}")]
    TextureDecode { name: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no photo with id {0}")]
    UnknownPhoto(PhotoId),
}

pub type TreeResult<T> = Result<T, TreeError>;
