//! Errors surfaced before rendering starts.

use thiserror::Error;

/// Fatal configuration problems.
///
/// Geometry never produces these; degenerate primitives just miss.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Cannot build a BVH from an empty primitive list")]
    EmptyScene,

    #[error("Image width must be greater than zero")]
    ZeroImageWidth,

    #[error("Image height must be greater than zero")]
    ZeroImageHeight,

    #[error("Samples per pixel must be greater than zero")]
    ZeroSamples,

    #[error("Bucket size must be greater than zero")]
    ZeroBucketSize,

    #[error("Invalid aspect ratio: {0}")]
    InvalidAspectRatio(f64),
}

pub type RenderResult<T> = Result<T, RenderError>;
