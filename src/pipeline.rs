//! End-to-end latitude estimation pipeline.
//!
//! Sequences the three stages: star extraction, Polaris selection, and the
//! latitude solve. Data flows strictly one way (image → candidates → chosen
//! candidate → estimate); each stage's output is consumed exactly once by the
//! next. Every call is pure with respect to its inputs, and every failure is
//! deterministic, so nothing is retried and no partial result is returned.

use tracing::{debug, info};

use crate::error::Result;
use crate::extraction::{extract_stars_from_raw, ExtractionConfig};
use crate::latitude::{solve_latitude, LatitudeConfig, LatitudeEstimate};
use crate::selector::{select_polaris, SelectionConfig, SelectionResult};

/// Combined configuration for all pipeline stages.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Star extractor parameters.
    pub extraction: ExtractionConfig,
    /// Polaris selector parameters.
    pub selection: SelectionConfig,
    /// Latitude solver parameters.
    pub latitude: LatitudeConfig,
    /// Vertical field of view of the camera, in degrees.
    /// Default: 60.0
    pub vertical_fov_deg: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig::default(),
            selection: SelectionConfig::default(),
            latitude: LatitudeConfig::default(),
            vertical_fov_deg: 60.0,
        }
    }
}

/// Run the full pipeline on an image file.
///
/// Fails with [`crate::PipelineError::ImageLoad`] if the file cannot be read
/// or decoded.
#[cfg(feature = "image")]
pub fn run(
    path: impl AsRef<std::path::Path>,
    config: &PipelineConfig,
) -> Result<(SelectionResult, LatitudeEstimate)> {
    let path = path.as_ref();
    info!("loading sky image from {}", path.display());
    let img = image::open(path).map_err(|source| crate::PipelineError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    run_from_image(&img, config)
}

/// Run the full pipeline on an already-decoded [`image::DynamicImage`].
#[cfg(feature = "image")]
pub fn run_from_image(
    img: &image::DynamicImage,
    config: &PipelineConfig,
) -> Result<(SelectionResult, LatitudeEstimate)> {
    let gray = img.to_luma8();
    let (width, height) = gray.dimensions();
    run_from_raw(gray.as_raw(), width, height, config)
}

/// Run the full pipeline on a raw row-major grayscale buffer.
///
/// Returns the selection result (with its full score trace) together with the
/// latitude estimate.
pub fn run_from_raw(
    pixels: &[u8],
    width: u32,
    height: u32,
    config: &PipelineConfig,
) -> Result<(SelectionResult, LatitudeEstimate)> {
    let extraction = extract_stars_from_raw(pixels, width, height, &config.extraction)?;
    info!(
        "detected {} star candidates in a {}x{} frame",
        extraction.candidates.len(),
        width,
        height
    );

    let selection = select_polaris(&extraction.candidates, height, &config.selection)?;
    debug!(
        "Polaris pick: ({:.1}, {:.1}), brightness {:.1}, score {:.3}",
        selection.chosen.x(),
        selection.chosen.y(),
        selection.chosen.brightness,
        selection.score
    );

    let estimate = solve_latitude(
        selection.chosen.y() as f64,
        height as f64,
        config.vertical_fov_deg,
        &config.latitude,
    )?;
    info!(
        "estimated latitude {:.2} deg (+/- {:.2})",
        estimate.latitude_deg, estimate.error_margin_deg
    );

    Ok((selection, estimate))
}
