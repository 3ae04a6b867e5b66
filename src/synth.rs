//! Generate synthetic night-sky frames for tests and demos.
//!
//! Produces a raw grayscale buffer with a dark background, a scattering of
//! random field stars confined to the lower 70% of the frame, and a brighter,
//! isolated Polaris disk near the top. Generation is fully seeded, so a given
//! configuration always yields the identical buffer.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Where to place the synthetic Polaris.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolarisPlacement {
    /// Horizontal center, 20% down from the top.
    TopCenter,
    /// 30% across, 15% down.
    TopLeft,
    /// 70% across, 15% down.
    TopRight,
    /// Explicit pixel position.
    At { x: u32, y: u32 },
}

/// Configuration for synthetic sky generation.
#[derive(Debug, Clone)]
pub struct SyntheticSkyConfig {
    /// Frame width in pixels. Default: 1080
    pub width: u32,
    /// Frame height in pixels. Default: 1920 (portrait phone frame)
    pub height: u32,
    /// Number of random field stars. Default: 100
    pub star_count: usize,
    /// Uniform background level, 0-255. Default: 50
    pub background_level: u8,
    /// Polaris position. Default: top center
    pub polaris: PolarisPlacement,
    /// Radius of the Polaris disk in pixels. Default: 4
    pub polaris_radius: u32,
    /// RNG seed; identical seeds yield identical frames. Default: 0
    pub seed: u64,
}

impl Default for SyntheticSkyConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            star_count: 100,
            background_level: 50,
            polaris: PolarisPlacement::TopCenter,
            polaris_radius: 4,
            seed: 0,
        }
    }
}

/// A generated frame plus the true Polaris position for assertions.
#[derive(Debug, Clone)]
pub struct SyntheticSky {
    /// Row-major grayscale buffer, `width * height` bytes.
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Pixel position the Polaris disk was centered on.
    pub polaris_position: (u32, u32),
}

/// Generate a synthetic sky frame.
pub fn generate_sky(config: &SyntheticSkyConfig) -> SyntheticSky {
    let w = config.width as usize;
    let h = config.height as usize;
    let mut pixels = vec![config.background_level; w * h];
    let mut rng = StdRng::seed_from_u64(config.seed);

    // Field stars live in the lower 70% of the frame, keeping the top sparse
    let field_top = (config.height as f64 * 0.3) as u32;
    for _ in 0..config.star_count {
        let x = rng.random_range(0..config.width);
        let y = rng.random_range(field_top..config.height);
        let brightness = rng.random_range(200..=255u32) as u8;
        let radius = rng.random_range(1..=3u32);
        draw_disk(&mut pixels, w, h, x as i64, y as i64, radius, brightness);
    }

    let (px, py) = match config.polaris {
        PolarisPlacement::TopCenter => (config.width / 2, (config.height as f64 * 0.2) as u32),
        PolarisPlacement::TopLeft => (
            (config.width as f64 * 0.3) as u32,
            (config.height as f64 * 0.15) as u32,
        ),
        PolarisPlacement::TopRight => (
            (config.width as f64 * 0.7) as u32,
            (config.height as f64 * 0.15) as u32,
        ),
        PolarisPlacement::At { x, y } => (x, y),
    };
    draw_disk(
        &mut pixels,
        w,
        h,
        px as i64,
        py as i64,
        config.polaris_radius,
        255,
    );

    // A few dim companions near Polaris, keeping it isolated but not alone
    for _ in 0..3 {
        let x = px as i64 + rng.random_range(-50..=50i64);
        let y = py as i64 + rng.random_range(-50..=50i64);
        let brightness = rng.random_range(150..=200u32) as u8;
        draw_disk(&mut pixels, w, h, x, y, 2, brightness);
    }

    SyntheticSky {
        pixels,
        width: config.width,
        height: config.height,
        polaris_position: (px, py),
    }
}

/// Stamp a filled disk, keeping the brighter of disk and existing pixel.
/// Parts outside the frame are clipped.
fn draw_disk(pixels: &mut [u8], w: usize, h: usize, cx: i64, cy: i64, radius: u32, value: u8) {
    let r = radius as i64;
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy > r * r {
                continue;
            }
            let x = cx + dx;
            let y = cy + dy;
            if x >= 0 && (x as usize) < w && y >= 0 && (y as usize) < h {
                let idx = y as usize * w + x as usize;
                pixels[idx] = pixels[idx].max(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_frame() {
        let config = SyntheticSkyConfig {
            width: 320,
            height: 480,
            star_count: 40,
            seed: 42,
            ..Default::default()
        };
        let a = generate_sky(&config);
        let b = generate_sky(&config);
        assert_eq!(a.pixels, b.pixels);
        assert_eq!(a.polaris_position, b.polaris_position);
    }

    #[test]
    fn test_different_seeds_differ() {
        let base = SyntheticSkyConfig {
            width: 320,
            height: 480,
            ..Default::default()
        };
        let a = generate_sky(&base);
        let b = generate_sky(&SyntheticSkyConfig { seed: 1, ..base });
        assert_ne!(a.pixels, b.pixels);
    }

    #[test]
    fn test_polaris_disk_is_saturated() {
        let sky = generate_sky(&SyntheticSkyConfig {
            width: 320,
            height: 480,
            star_count: 0,
            ..Default::default()
        });
        let (px, py) = sky.polaris_position;
        assert_eq!(px, 160);
        assert_eq!(py, 96);
        let idx = py as usize * sky.width as usize + px as usize;
        assert_eq!(sky.pixels[idx], 255);
        // Far corner stays at the background level
        assert_eq!(sky.pixels[sky.pixels.len() - 1], 50);
    }

    #[test]
    fn test_field_stars_stay_below_top_band() {
        let sky = generate_sky(&SyntheticSkyConfig {
            width: 320,
            height: 1000,
            star_count: 50,
            polaris: PolarisPlacement::At { x: 160, y: 100 },
            seed: 3,
            ..Default::default()
        });
        // Rows between the Polaris neighborhood and the 30% line hold only
        // background
        let w = sky.width as usize;
        for row in 200..295 {
            for col in 0..w {
                assert_eq!(sky.pixels[row * w + col], 50, "row {row} col {col}");
            }
        }
    }
}
