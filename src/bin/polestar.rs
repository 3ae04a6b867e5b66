//! Command-line latitude estimator.
//!
//! Points the pipeline at a sky photograph (or a generated synthetic frame),
//! prints the estimate with its error band, the Polaris pick, the compass
//! readout, and the nearest reference city.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use polestar::cities::nearest_city;
use polestar::compass::{CompassSensor, NORTH_TOLERANCE_DEG};
use polestar::pipeline::{self, PipelineConfig};
use polestar::synth::{generate_sky, SyntheticSkyConfig};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Estimate latitude from a night-sky photo by locating Polaris"
)]
struct Args {
    /// Path to the sky photograph (any format the image crate decodes)
    image: Option<PathBuf>,

    /// Vertical field of view of the camera, in degrees
    #[arg(long, default_value_t = 60.0)]
    fov: f64,

    /// Compass azimuth reading in degrees (0 = north, 90 = east)
    #[arg(long, default_value_t = 0.0)]
    azimuth: f32,

    /// Disable the compass readout
    #[arg(long)]
    no_compass: bool,

    /// Print per-candidate score breakdowns for the top candidates
    #[arg(long)]
    debug: bool,

    /// Generate a synthetic test sky instead of loading an image
    #[arg(long)]
    synthetic: bool,

    /// RNG seed for --synthetic
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = PipelineConfig {
        vertical_fov_deg: args.fov,
        ..Default::default()
    };

    let (selection, estimate) = if args.synthetic {
        let sky = generate_sky(&SyntheticSkyConfig {
            seed: args.seed,
            ..Default::default()
        });
        println!(
            "Synthetic sky: {}x{}, Polaris placed at ({}, {})",
            sky.width, sky.height, sky.polaris_position.0, sky.polaris_position.1
        );
        pipeline::run_from_raw(&sky.pixels, sky.width, sky.height, &config)?
    } else {
        let path = args
            .image
            .context("an image path is required unless --synthetic is given")?;
        pipeline::run(&path, &config).with_context(|| format!("processing {}", path.display()))?
    };

    if !args.no_compass {
        let mut compass = CompassSensor::mock(args.azimuth);
        if !compass.is_facing_north(NORTH_TOLERANCE_DEG) {
            println!();
            println!("WARNING: the camera is not facing north");
            println!("  direction:  {}", compass.cardinal_direction());
            println!("  deviation:  {:+.1} deg", compass.deviation_from_north());
            println!("  correction: rotate {:+.1} deg", compass.correction_angle());
            println!("  The latitude estimate may be affected.");
        }
    }

    println!();
    println!("Results");
    println!("  estimated latitude: {:.2} deg", estimate.latitude_deg);
    println!("  error margin:       +/- {:.2} deg", estimate.error_margin_deg);
    println!(
        "  range:              {:.2} .. {:.2} deg",
        estimate.lower_bound_deg, estimate.upper_bound_deg
    );
    println!("  Polaris altitude:   {:.2} deg", estimate.altitude_deg);

    println!();
    println!("Polaris pick");
    println!(
        "  position:   ({:.1}, {:.1}) px",
        selection.chosen.x(),
        selection.chosen.y()
    );
    println!("  brightness: {:.1}", selection.chosen.brightness);
    println!("  score:      {:.3}", selection.score);
    println!("  candidates: {}", selection.candidate_count);

    if !args.no_compass {
        let mut compass = CompassSensor::mock(args.azimuth);
        println!();
        println!("Compass");
        println!("  azimuth:      {:.1} deg", compass.azimuth_deg());
        println!("  direction:    {}", compass.cardinal_direction());
        println!(
            "  facing north: {}",
            if compass.is_facing_north(NORTH_TOLERANCE_DEG) {
                "yes"
            } else {
                "no"
            }
        );
    }

    let nearest = nearest_city(estimate.latitude_deg, estimate.error_margin_deg);
    println!();
    if nearest.within_error_band {
        println!(
            "Nearest city: {} ({:.2} deg away, inside the error band)",
            nearest.city.name, nearest.latitude_distance_deg
        );
    } else {
        println!(
            "Nearest city: {} ({:.2} deg away)",
            nearest.city.name, nearest.latitude_distance_deg
        );
    }

    if args.debug {
        println!();
        println!("Top candidates");
        for (i, s) in selection.trace.iter().take(5).enumerate() {
            println!(
                "  {}. total {:.3} | height {:.2} | brightness {:.2} | isolation {:.2} at ({:.1}, {:.1})",
                i + 1,
                s.total_score,
                s.height_score,
                s.brightness_score,
                s.isolation_score,
                s.candidate.x(),
                s.candidate.y()
            );
        }
    }

    Ok(())
}
