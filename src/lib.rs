//! # polestar
//!
//! Estimate a ground observer's **geographic latitude from a photograph of
//! the night sky**, by locating Polaris in the frame and converting its pixel
//! offset from the image center into an elevation angle — which, for the pole
//! star, approximately equals the observer's latitude.
//!
//! ## Features
//!
//! - **Star extraction** — blur, threshold, morphological opening, and
//!   connected-component labeling turn a raw grayscale buffer into point
//!   candidates with position and brightness
//! - **Polaris selection** — a weighted multi-factor heuristic (vertical
//!   position, brightness, isolation) ranks candidates and returns the best
//!   pick with a full score trace
//! - **Latitude solve** — pixel offset → degrees through the camera's
//!   vertical FOV, with uncertainty bounds propagated from FOV and
//!   calibration error
//! - **Deterministic** — the pipeline is pure and sequential; identical
//!   inputs always yield bit-identical outputs
//!
//! The `image` cargo feature (default) enables loading image files; the core
//! pipeline itself only ever reads a caller-owned raw buffer.
//!
//! ## Example
//!
//! ```no_run
//! use polestar::pipeline::{run, PipelineConfig};
//!
//! let config = PipelineConfig {
//!     vertical_fov_deg: 60.0,
//!     ..Default::default()
//! };
//!
//! let (selection, estimate) = run("sky.jpg", &config).unwrap();
//! println!(
//!     "Polaris at ({:.1}, {:.1}); latitude {:.2}° ± {:.2}°",
//!     selection.chosen.x(),
//!     selection.chosen.y(),
//!     estimate.latitude_deg,
//!     estimate.error_margin_deg,
//! );
//! ```
//!
//! ## Algorithm overview
//!
//! 1. **Extraction** — Gaussian-smooth the frame, binarize at a fixed
//!    brightness threshold, open with a 3×3 element, label connected regions,
//!    and keep those within the star-like area band
//! 2. **Selection** — score the top-k brightest candidates on vertical
//!    position (weight 0.4), brightness (0.3), and neighborhood isolation
//!    (0.3); the strictly greatest total wins
//! 3. **Solve** — convert the winner's vertical offset from frame center to
//!    degrees via the vertical FOV, and bound the result by re-solving with
//!    the FOV perturbed by its uncertainty plus a fixed calibration term in
//!    quadrature
//!
//! This is deliberately a hand-tuned heuristic, not astrometry: there is no
//! plate solving, catalog matching, or lens-distortion correction.

mod candidate;
mod error;

pub mod cities;
pub mod compass;
pub mod extraction;
pub mod latitude;
pub mod pipeline;
pub mod selector;
pub mod synth;

pub use candidate::StarCandidate;
pub use error::{PipelineError, Result};
#[cfg(feature = "image")]
pub use extraction::{extract_stars, extract_stars_from_image};
pub use extraction::{extract_stars_from_raw, ExtractionConfig, ExtractionResult};
pub use latitude::{solve_latitude, LatitudeConfig, LatitudeEstimate};
pub use pipeline::{run_from_raw, PipelineConfig};
pub use selector::{select_polaris, ScoreBreakdown, SelectionConfig, SelectionResult};

// Commonly used types
// Note: 32-bit floats are sufficient for pixel-space math; the latitude
// solver switches to 64-bit for the degree conversions and rounding.
pub type PixelVec = nalgebra::Vector2<f32>;
