//! Extract star candidates from a sky image.
//!
//! This module detects point-light sources in a grayscale image by:
//! 1. Gaussian smoothing to suppress single-pixel sensor noise
//! 2. Binarizing with a fixed brightness threshold
//! 3. Morphological opening (erosion then dilation) to drop isolated noise pixels
//! 4. Labeling connected foreground regions
//! 5. Filtering regions by pixel area, rejecting both speckle noise and large
//!    saturated patches (clipped highlights, moon glare)
//! 6. Reporting each surviving region as its bounding-box center, with the mean
//!    raw (pre-blur) intensity over the bounding box as brightness
//!
//! The raw-buffer entry point is always available; the path and
//! [`image::DynamicImage`] entry points require the `image` feature.
//!
//! # Example
//!
//! ```no_run
//! use polestar::{extract_stars, ExtractionConfig};
//!
//! let config = ExtractionConfig::default();
//! let result = extract_stars("my_sky_image.png", &config).unwrap();
//! println!("Found {} stars", result.candidates.len());
//! ```

use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::StarCandidate;

/// Configuration for star extraction from an image.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Side length of the square Gaussian smoothing kernel, in pixels.
    /// Must be odd; 1 disables smoothing.
    /// Default: 5
    pub blur_kernel_size: usize,

    /// Fixed binarization threshold. Blurred pixels at or above this value
    /// become foreground.
    /// Default: 180
    pub brightness_threshold: u8,

    /// Side length of the square structuring element used for the
    /// morphological opening.
    /// Default: 3
    pub morph_kernel_size: usize,

    /// Number of opening iterations (erosions, then the same number of
    /// dilations). 0 disables the opening.
    /// Default: 1
    pub morph_iterations: usize,

    /// Minimum region pixel area, exclusive: regions must have
    /// `area > min_area` to survive. Rejects residual speckle noise.
    /// Default: 3
    pub min_area: usize,

    /// Maximum region pixel area, exclusive: regions must have
    /// `area < max_area` to survive. Rejects clipped highlights and glare.
    /// Default: 200
    pub max_area: usize,

    /// Whether to use 8-connectivity (true) or 4-connectivity (false) for
    /// connected component labeling.
    /// Default: true (8-connectivity)
    pub use_8_connectivity: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            blur_kernel_size: 5,
            brightness_threshold: 180,
            morph_kernel_size: 3,
            morph_iterations: 1,
            min_area: 3,
            max_area: 200,
            use_8_connectivity: true,
        }
    }
}

/// Result of star extraction, containing the candidates and diagnostic info.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted candidates, in the order their regions were discovered
    /// (raster order of each region's first pixel). Not sorted by brightness.
    pub candidates: Vec<StarCandidate>,

    /// Image width in pixels.
    pub image_width: u32,

    /// Image height in pixels.
    pub image_height: u32,

    /// Number of connected regions found before area filtering.
    pub num_blobs_raw: usize,
}

/// Extract star candidates from an image file.
///
/// Loads the image from `path`, converts it to 8-bit grayscale, and runs the
/// detection pipeline. Fails with [`PipelineError::ImageLoad`] if the file
/// cannot be read or decoded.
#[cfg(feature = "image")]
pub fn extract_stars(
    path: impl AsRef<std::path::Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionResult> {
    let img = image::open(path.as_ref()).map_err(|source| PipelineError::ImageLoad {
        path: path.as_ref().to_path_buf(),
        source,
    })?;
    extract_stars_from_image(&img, config)
}

/// Extract star candidates from an already-loaded [`image::DynamicImage`].
///
/// Same algorithm as [`extract_stars`] but operates on an in-memory image.
/// Color and high-bit-depth images are converted to 8-bit grayscale first.
#[cfg(feature = "image")]
pub fn extract_stars_from_image(
    img: &image::DynamicImage,
    config: &ExtractionConfig,
) -> Result<ExtractionResult> {
    let gray = img.to_luma8();
    let (width, height) = gray.dimensions();
    extract_stars_from_raw(gray.as_raw(), width, height, config)
}

/// Extract star candidates from raw grayscale pixel data.
///
/// `pixels` is row-major, one byte per pixel, and its length must equal
/// `width * height`. This is the core entry point; it performs no I/O.
pub fn extract_stars_from_raw(
    pixels: &[u8],
    width: u32,
    height: u32,
    config: &ExtractionConfig,
) -> Result<ExtractionResult> {
    let w = width as usize;
    let h = height as usize;
    if pixels.len() != w * h {
        return Err(PipelineError::BufferSize {
            len: pixels.len(),
            width,
            height,
        });
    }

    // ── Step 1: Gaussian smoothing ──
    let blurred = gaussian_blur(pixels, w, h, config.blur_kernel_size);

    // ── Step 2: threshold ──
    let threshold = config.brightness_threshold as f32;
    let mut mask: Vec<bool> = blurred.iter().map(|&v| v >= threshold).collect();

    // ── Step 3: morphological opening ──
    for _ in 0..config.morph_iterations {
        mask = erode(&mask, w, h, config.morph_kernel_size);
    }
    for _ in 0..config.morph_iterations {
        mask = dilate(&mask, w, h, config.morph_kernel_size);
    }

    // ── Step 4: label connected regions ──
    let labels = label_connected_components(&mask, w, h, config.use_8_connectivity);
    let regions = collect_regions(&labels, w, h);
    let num_blobs_raw = regions.len();

    // ── Step 5 & 6: area filter, bounding-box center, mean raw brightness ──
    let candidates: Vec<StarCandidate> = regions
        .into_iter()
        .filter(|r| r.pixel_count > config.min_area && r.pixel_count < config.max_area)
        .map(|r| {
            let bw = r.max_col - r.min_col + 1;
            let bh = r.max_row - r.min_row + 1;
            let cx = r.min_col as f32 + bw as f32 / 2.0;
            let cy = r.min_row as f32 + bh as f32 / 2.0;

            // Brightness comes from the raw image, not the blurred working copy
            let mut sum = 0u64;
            for row in r.min_row..=r.max_row {
                for col in r.min_col..=r.max_col {
                    sum += pixels[row * w + col] as u64;
                }
            }
            let brightness = sum as f32 / (bw * bh) as f32;

            StarCandidate::new(cx, cy, brightness)
        })
        .collect();

    debug!(
        "extracted {} candidates from {} raw regions ({}x{} frame)",
        candidates.len(),
        num_blobs_raw,
        width,
        height
    );

    Ok(ExtractionResult {
        candidates,
        image_width: width,
        image_height: height,
        num_blobs_raw,
    })
}

// ─── Internal helpers ──────────────────────────────────────────────────────

/// 1-D Gaussian kernel of the given odd size, normalized to sum 1.
///
/// Sigma is derived from the kernel size with the same formula OpenCV uses
/// when none is given: `0.3 * ((ksize - 1) * 0.5 - 1) + 0.8`.
fn gaussian_kernel(ksize: usize) -> Vec<f32> {
    let sigma = 0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let half = (ksize / 2) as isize;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Separable Gaussian blur with clamp-to-edge borders.
fn gaussian_blur(pixels: &[u8], w: usize, h: usize, ksize: usize) -> Vec<f32> {
    if ksize <= 1 || w == 0 || h == 0 {
        return pixels.iter().map(|&v| v as f32).collect();
    }
    let kernel = gaussian_kernel(ksize);
    let half = (ksize / 2) as isize;

    // Horizontal pass
    let mut tmp = vec![0.0f32; w * h];
    for row in 0..h {
        for col in 0..w {
            let mut acc = 0.0f32;
            for (ki, &kv) in kernel.iter().enumerate() {
                let c = (col as isize + ki as isize - half).clamp(0, w as isize - 1) as usize;
                acc += pixels[row * w + c] as f32 * kv;
            }
            tmp[row * w + col] = acc;
        }
    }

    // Vertical pass
    let mut out = vec![0.0f32; w * h];
    for row in 0..h {
        for col in 0..w {
            let mut acc = 0.0f32;
            for (ki, &kv) in kernel.iter().enumerate() {
                let r = (row as isize + ki as isize - half).clamp(0, h as isize - 1) as usize;
                acc += tmp[r * w + col] * kv;
            }
            out[row * w + col] = acc;
        }
    }
    out
}

/// Morphological erosion: a pixel survives only if every pixel under the
/// k×k structuring element is foreground. Out-of-image counts as background.
fn erode(mask: &[bool], w: usize, h: usize, ksize: usize) -> Vec<bool> {
    morph(mask, w, h, ksize, true)
}

/// Morphological dilation: a pixel becomes foreground if any pixel under the
/// k×k structuring element is foreground.
fn dilate(mask: &[bool], w: usize, h: usize, ksize: usize) -> Vec<bool> {
    morph(mask, w, h, ksize, false)
}

fn morph(mask: &[bool], w: usize, h: usize, ksize: usize, require_all: bool) -> Vec<bool> {
    if ksize <= 1 {
        return mask.to_vec();
    }
    let half = (ksize / 2) as isize;
    let mut out = vec![false; w * h];
    for row in 0..h {
        for col in 0..w {
            let mut all = true;
            let mut any = false;
            for dr in -half..=half {
                for dc in -half..=half {
                    let r = row as isize + dr;
                    let c = col as isize + dc;
                    let v = if r >= 0 && r < h as isize && c >= 0 && c < w as isize {
                        mask[r as usize * w + c as usize]
                    } else {
                        false
                    };
                    all &= v;
                    any |= v;
                }
            }
            out[row * w + col] = if require_all { all } else { any };
        }
    }
    out
}

/// Label connected foreground regions using two-pass union-find.
///
/// Labels are renumbered sequentially (1, 2, ...) in raster order of each
/// region's first pixel, so label order is the region discovery order.
fn label_connected_components(mask: &[bool], w: usize, h: usize, use_8: bool) -> Vec<u32> {
    let mut labels = vec![0u32; w * h];
    // parent[l] is the union-find parent of provisional label l; index 0 is background
    let mut parent: Vec<u32> = vec![0];

    fn find(parent: &mut [u32], mut x: u32) -> u32 {
        while parent[x as usize] != x {
            parent[x as usize] = parent[parent[x as usize] as usize];
            x = parent[x as usize];
        }
        x
    }

    // First pass: provisional labels from already-visited neighbors
    for row in 0..h {
        for col in 0..w {
            let idx = row * w + col;
            if !mask[idx] {
                continue;
            }

            let mut neighbors = [0u32; 4];
            let mut n = 0;
            if col > 0 && labels[idx - 1] > 0 {
                neighbors[n] = labels[idx - 1];
                n += 1;
            }
            if row > 0 && labels[idx - w] > 0 {
                neighbors[n] = labels[idx - w];
                n += 1;
            }
            if use_8 && row > 0 {
                if col > 0 && labels[idx - w - 1] > 0 {
                    neighbors[n] = labels[idx - w - 1];
                    n += 1;
                }
                if col + 1 < w && labels[idx - w + 1] > 0 {
                    neighbors[n] = labels[idx - w + 1];
                    n += 1;
                }
            }

            if n == 0 {
                let fresh = parent.len() as u32;
                parent.push(fresh);
                labels[idx] = fresh;
            } else {
                let min_label = *neighbors[..n].iter().min().unwrap();
                labels[idx] = min_label;
                for &nl in &neighbors[..n] {
                    let ra = find(&mut parent, min_label);
                    let rb = find(&mut parent, nl);
                    if ra != rb {
                        // Merge the higher root into the lower to keep labels stable
                        let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
                        parent[hi as usize] = lo;
                    }
                }
            }
        }
    }

    // Second pass: flatten to sequential labels in raster order of first pixel
    let mut remap = vec![0u32; parent.len()];
    let mut next = 1u32;
    for label in labels.iter_mut() {
        if *label == 0 {
            continue;
        }
        let root = find(&mut parent, *label);
        if remap[root as usize] == 0 {
            remap[root as usize] = next;
            next += 1;
        }
        *label = remap[root as usize];
    }

    labels
}

/// Bounding box and pixel count of a labeled region.
struct Region {
    min_row: usize,
    max_row: usize,
    min_col: usize,
    max_col: usize,
    pixel_count: usize,
}

/// Accumulate per-label region statistics. Output index i holds label i+1.
fn collect_regions(labels: &[u32], w: usize, _h: usize) -> Vec<Region> {
    let num_labels = labels.iter().copied().max().unwrap_or(0) as usize;
    let mut regions: Vec<Region> = (0..num_labels)
        .map(|_| Region {
            min_row: usize::MAX,
            max_row: 0,
            min_col: usize::MAX,
            max_col: 0,
            pixel_count: 0,
        })
        .collect();

    for (idx, &label) in labels.iter().enumerate() {
        if label == 0 {
            continue;
        }
        let row = idx / w;
        let col = idx % w;
        let r = &mut regions[label as usize - 1];
        r.min_row = r.min_row.min(row);
        r.max_row = r.max_row.max(row);
        r.min_col = r.min_col.min(col);
        r.max_col = r.max_col.max(col);
        r.pixel_count += 1;
    }

    regions
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Uniform dark frame with a solid square of `value` stamped on it,
    /// centered at (cx, cy).
    fn frame_with_square(
        w: usize,
        h: usize,
        cx: usize,
        cy: usize,
        size: usize,
        value: u8,
    ) -> Vec<u8> {
        let mut pixels = vec![0u8; w * h];
        let half = size / 2;
        for row in cy.saturating_sub(half)..(cy + half + 1).min(h) {
            for col in cx.saturating_sub(half)..(cx + half + 1).min(w) {
                pixels[row * w + col] = value;
            }
        }
        pixels
    }

    #[test]
    fn test_gaussian_kernel_normalized() {
        for ksize in [3usize, 5, 7] {
            let k = gaussian_kernel(ksize);
            assert_eq!(k.len(), ksize);
            let sum: f32 = k.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5, "ksize {ksize}: sum {sum}");
            // Symmetric, peaked at center
            assert_eq!(k[0], k[ksize - 1]);
            assert!(k[ksize / 2] > k[0]);
        }
    }

    #[test]
    fn test_connected_components_4conn() {
        // 5x5 mask with two separate regions
        let mask = vec![
            false, true, true, false, false, // row 0
            false, true, false, false, false, // row 1
            false, false, false, false, false, // row 2
            false, false, false, true, true, // row 3
            false, false, false, true, false, // row 4
        ];
        let labels = label_connected_components(&mask, 5, 5, false);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[1], labels[6]);
        assert_eq!(labels[18], labels[19]);
        assert_eq!(labels[18], labels[23]);
        assert_ne!(labels[1], labels[18]);
        // First-discovered region gets label 1
        assert_eq!(labels[1], 1);
        assert_eq!(labels[18], 2);
    }

    #[test]
    fn test_connected_components_8conn_diagonal() {
        // Two pixels touching only diagonally
        let mask = vec![
            true, false, false, //
            false, true, false, //
            false, false, false,
        ];
        let labels4 = label_connected_components(&mask, 3, 3, false);
        assert_ne!(labels4[0], labels4[4]);
        let labels8 = label_connected_components(&mask, 3, 3, true);
        assert_eq!(labels8[0], labels8[4]);
    }

    #[test]
    fn test_single_bright_blob() {
        let pixels = frame_with_square(100, 100, 50, 40, 7, 255);
        let config = ExtractionConfig::default();
        let result = extract_stars_from_raw(&pixels, 100, 100, &config).unwrap();

        assert_eq!(result.candidates.len(), 1);
        let c = &result.candidates[0];
        assert!((c.x() - 50.0).abs() <= 1.0, "x = {}", c.x());
        assert!((c.y() - 40.0).abs() <= 1.0, "y = {}", c.y());
        // Bounding box shrinks inside the stamped square, so all raw pixels
        // under it are saturated
        assert!((c.brightness - 255.0).abs() < 1e-3);
    }

    #[test]
    fn test_tiny_blob_rejected() {
        // A 3x3 square loses its rim to the blur threshold and the rest to
        // the opening: nothing should survive
        let pixels = frame_with_square(64, 64, 30, 30, 3, 255);
        let config = ExtractionConfig::default();
        let result = extract_stars_from_raw(&pixels, 64, 64, &config).unwrap();
        assert!(result.candidates.is_empty());
    }

    #[test]
    fn test_large_saturated_region_rejected() {
        // Moon-glare sized patch: labeled but filtered by max_area
        let pixels = frame_with_square(128, 128, 64, 64, 41, 255);
        let config = ExtractionConfig::default();
        let result = extract_stars_from_raw(&pixels, 128, 128, &config).unwrap();
        assert_eq!(result.num_blobs_raw, 1);
        assert!(result.candidates.is_empty());
    }

    #[test]
    fn test_multiple_blobs_in_discovery_order() {
        let mut pixels = frame_with_square(200, 200, 40, 30, 7, 255);
        let second = frame_with_square(200, 200, 150, 120, 7, 230);
        for (dst, src) in pixels.iter_mut().zip(second.iter()) {
            *dst = (*dst).max(*src);
        }

        let config = ExtractionConfig::default();
        let result = extract_stars_from_raw(&pixels, 200, 200, &config).unwrap();
        assert_eq!(result.candidates.len(), 2);
        // Discovery order is raster order of first pixel: upper blob first
        assert!(result.candidates[0].y() < result.candidates[1].y());
    }

    #[test]
    fn test_candidate_invariants_hold() {
        let mut pixels = vec![20u8; 300 * 300];
        for &(cx, cy, size, value) in &[
            (50usize, 40usize, 7usize, 255u8),
            (120, 80, 9, 240),
            (200, 200, 7, 200),
            (260, 50, 11, 255),
        ] {
            let stamp = frame_with_square(300, 300, cx, cy, size, value);
            for (dst, src) in pixels.iter_mut().zip(stamp.iter()) {
                *dst = (*dst).max(*src);
            }
        }

        let config = ExtractionConfig::default();
        let result = extract_stars_from_raw(&pixels, 300, 300, &config).unwrap();
        assert!(!result.candidates.is_empty());
        for c in &result.candidates {
            assert!(c.brightness >= 0.0 && c.brightness <= 255.0);
            assert!(c.x() >= 0.0 && c.x() <= 300.0);
            assert!(c.y() >= 0.0 && c.y() <= 300.0);
        }
    }

    #[test]
    fn test_buffer_size_mismatch() {
        let pixels = vec![0u8; 10];
        let err = extract_stars_from_raw(&pixels, 10, 10, &ExtractionConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            crate::PipelineError::BufferSize { len: 10, width: 10, height: 10 }
        ));
    }

    #[test]
    fn test_dark_frame_yields_no_candidates() {
        let pixels = vec![15u8; 64 * 64];
        let result =
            extract_stars_from_raw(&pixels, 64, 64, &ExtractionConfig::default()).unwrap();
        assert!(result.candidates.is_empty());
        assert_eq!(result.num_blobs_raw, 0);
    }
}
