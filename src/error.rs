//! Error types for the latitude-estimation pipeline.
//!
//! Every failure here is a deterministic function of the input: nothing is
//! retried internally, and there is no partial-result mode. Each variant
//! carries the offending value so the caller can tell which stage rejected
//! what.

use thiserror::Error;

/// Errors surfaced by the pipeline stages.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input image could not be read or decoded.
    #[cfg(feature = "image")]
    #[error("could not load image {}", .path.display())]
    ImageLoad {
        path: std::path::PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The extractor found zero star candidates, so there is nothing to
    /// select. Retrying with the same image would fail identically.
    #[error("no star candidates detected (image height {image_height} px)")]
    NoCandidates { image_height: u32 },

    /// A geometry parameter was zero or negative.
    #[error("invalid geometry: {name} must be positive, got {value}")]
    InvalidGeometry { name: &'static str, value: f64 },

    /// Raw pixel buffer length does not match the stated dimensions.
    #[error("pixel buffer length {len} does not match {width}x{height}")]
    BufferSize { len: usize, width: u32, height: u32 },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;
