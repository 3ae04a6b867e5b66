//! Convert the pixel position of Polaris into a latitude estimate.
//!
//! The elevation of the celestial pole above the horizon equals the
//! observer's latitude, and Polaris sits close enough to the pole that its
//! elevation is used directly. With the camera held level and the frame
//! center on the horizon-relative boresight, the vertical pixel offset of
//! Polaris from the frame center converts to degrees through the camera's
//! vertical field of view.
//!
//! Uncertainty comes from two sources combined in quadrature: the FOV is
//! re-perturbed by its measurement uncertainty and the worse of the two
//! deviations is taken, then a fixed calibration term is added
//! root-sum-of-squares.

use crate::error::{PipelineError, Result};

/// Error-propagation parameters for the latitude solve.
#[derive(Debug, Clone)]
pub struct LatitudeConfig {
    /// Measurement uncertainty of the vertical FOV, in degrees.
    /// Default: 2.0
    pub fov_uncertainty_deg: f64,

    /// Fixed calibration error term, in degrees. Covers mounting and lens
    /// effects that don't scale with the FOV.
    /// Default: 1.0
    pub calibration_error_deg: f64,
}

impl Default for LatitudeConfig {
    fn default() -> Self {
        Self {
            fov_uncertainty_deg: 2.0,
            calibration_error_deg: 1.0,
        }
    }
}

/// Latitude estimate with propagated uncertainty bounds.
///
/// All fields are in degrees and rounded to two decimal places.
/// `latitude_deg` and `altitude_deg` are numerically identical by design
/// (polar-star elevation equals observer latitude), and the bounds satisfy
/// `lower = latitude - error_margin`, `upper = latitude + error_margin`.
#[derive(Debug, Clone, PartialEq)]
pub struct LatitudeEstimate {
    /// Estimated observer latitude.
    pub latitude_deg: f64,
    /// Elevation of Polaris above the horizon.
    pub altitude_deg: f64,
    /// Lower bound of the estimate.
    pub lower_bound_deg: f64,
    /// Upper bound of the estimate.
    pub upper_bound_deg: f64,
    /// Half-width of the bound interval, always non-negative.
    pub error_margin_deg: f64,
}

/// Convert a vertical pixel offset to degrees through the vertical FOV.
pub fn pixel_to_degrees(pixel_offset: f64, image_height: f64, vertical_fov_deg: f64) -> f64 {
    let degrees_per_pixel = vertical_fov_deg / image_height;
    pixel_offset * degrees_per_pixel
}

/// Estimate latitude from Polaris's vertical pixel position.
///
/// `polaris_y` is the row coordinate of Polaris (0 = top of frame),
/// `image_height` the frame height in pixels, and `vertical_fov_deg` the
/// camera's vertical field of view in degrees.
///
/// Fails with [`PipelineError::InvalidGeometry`] if `image_height` or
/// `vertical_fov_deg` is not positive.
pub fn solve_latitude(
    polaris_y: f64,
    image_height: f64,
    vertical_fov_deg: f64,
    config: &LatitudeConfig,
) -> Result<LatitudeEstimate> {
    if image_height <= 0.0 {
        return Err(PipelineError::InvalidGeometry {
            name: "image_height",
            value: image_height,
        });
    }
    if vertical_fov_deg <= 0.0 {
        return Err(PipelineError::InvalidGeometry {
            name: "vertical_fov_deg",
            value: vertical_fov_deg,
        });
    }

    let pixel_offset = image_height / 2.0 - polaris_y;
    let altitude = pixel_to_degrees(pixel_offset, image_height, vertical_fov_deg);
    let latitude = altitude;

    // Re-solve with the FOV perturbed both ways and keep the worse deviation
    let lat_low_fov = pixel_to_degrees(
        pixel_offset,
        image_height,
        vertical_fov_deg - config.fov_uncertainty_deg,
    );
    let lat_high_fov = pixel_to_degrees(
        pixel_offset,
        image_height,
        vertical_fov_deg + config.fov_uncertainty_deg,
    );
    let fov_error = (lat_low_fov - latitude)
        .abs()
        .max((lat_high_fov - latitude).abs());
    let total_error = (fov_error * fov_error
        + config.calibration_error_deg * config.calibration_error_deg)
        .sqrt();

    // Bounds derive from the rounded latitude and margin so that
    // upper - latitude == latitude - lower == error_margin holds exactly
    let latitude = round2(latitude);
    let error_margin = round2(total_error);

    Ok(LatitudeEstimate {
        latitude_deg: latitude,
        altitude_deg: round2(altitude),
        lower_bound_deg: round2(latitude - error_margin),
        upper_bound_deg: round2(latitude + error_margin),
        error_margin_deg: error_margin,
    })
}

/// Round to two decimal places.
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
