//! Phone compass (magnetometer azimuth) model.
//!
//! The latitude estimate assumes the camera faces true north; the compass
//! readout is what the surrounding application uses to warn the user when it
//! doesn't. A real device would back this with the platform sensor API, so
//! the source is a tagged variant: a fixed mock azimuth for testing, or a
//! live sensor behind the [`AzimuthSensor`] trait.
//!
//! Azimuth convention: 0° = north, 90° = east, 180° = south, 270° = west.
//!
//! Measurement noise is an injectable dependency: the sensor holds an
//! optional Gaussian noise model and the caller supplies the RNG, so tests
//! stay deterministic and no process-wide random state is involved.

use std::fmt;

use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Deviation tolerance within which the phone counts as facing north.
pub const NORTH_TOLERANCE_DEG: f32 = 15.0;

/// A live azimuth source (platform magnetometer, external compass, ...).
pub trait AzimuthSensor {
    /// Current azimuth reading in degrees, 0 = north, increasing clockwise.
    fn read_azimuth_deg(&mut self) -> f32;
}

/// Where azimuth readings come from.
pub enum CompassSource {
    /// Fixed azimuth for simulation and tests.
    Mock { azimuth_deg: f32 },
    /// Real hardware behind the [`AzimuthSensor`] trait.
    Live(Box<dyn AzimuthSensor>),
}

impl fmt::Debug for CompassSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompassSource::Mock { azimuth_deg } => {
                f.debug_struct("Mock").field("azimuth_deg", azimuth_deg).finish()
            }
            CompassSource::Live(_) => f.write_str("Live(..)"),
        }
    }
}

/// Compass sensor with an optional injected noise model.
#[derive(Debug)]
pub struct CompassSensor {
    source: CompassSource,
    noise: Option<Normal<f32>>,
}

/// The eight principal compass directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardinalDirection {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl CardinalDirection {
    /// Classify an azimuth into one of eight 45° sectors centered on the
    /// principal directions.
    pub fn from_azimuth(azimuth_deg: f32) -> Self {
        use CardinalDirection::*;
        const DIRECTIONS: [CardinalDirection; 8] =
            [North, NorthEast, East, SouthEast, South, SouthWest, West, NorthWest];
        let az = azimuth_deg.rem_euclid(360.0);
        let index = ((az + 22.5) / 45.0) as usize % 8;
        DIRECTIONS[index]
    }
}

impl fmt::Display for CardinalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CardinalDirection::North => "north",
            CardinalDirection::NorthEast => "northeast",
            CardinalDirection::East => "east",
            CardinalDirection::SouthEast => "southeast",
            CardinalDirection::South => "south",
            CardinalDirection::SouthWest => "southwest",
            CardinalDirection::West => "west",
            CardinalDirection::NorthWest => "northwest",
        };
        f.write_str(name)
    }
}

impl CompassSensor {
    /// Mock sensor reporting a fixed azimuth (wrapped into [0, 360)).
    pub fn mock(azimuth_deg: f32) -> Self {
        Self {
            source: CompassSource::Mock {
                azimuth_deg: azimuth_deg.rem_euclid(360.0),
            },
            noise: None,
        }
    }

    /// Sensor backed by live hardware.
    pub fn live(sensor: Box<dyn AzimuthSensor>) -> Self {
        Self {
            source: CompassSource::Live(sensor),
            noise: None,
        }
    }

    /// Attach a zero-mean Gaussian noise model with the given standard
    /// deviation in degrees. A non-finite or negative sigma leaves the
    /// sensor noise-free.
    pub fn with_noise(mut self, sigma_deg: f32) -> Self {
        self.noise = Normal::new(0.0, sigma_deg).ok();
        self
    }

    /// Current azimuth in degrees, `[0, 360)`, without noise.
    pub fn azimuth_deg(&mut self) -> f32 {
        match &mut self.source {
            CompassSource::Mock { azimuth_deg } => *azimuth_deg,
            CompassSource::Live(sensor) => sensor.read_azimuth_deg().rem_euclid(360.0),
        }
    }

    /// Current azimuth with the configured noise model applied, `[0, 360)`.
    /// Without a noise model this equals [`Self::azimuth_deg`].
    pub fn azimuth_deg_noisy<R: Rng>(&mut self, rng: &mut R) -> f32 {
        let az = self.azimuth_deg();
        match self.noise {
            Some(normal) => (az + normal.sample(rng)).rem_euclid(360.0),
            None => az,
        }
    }

    /// Reposition a mock sensor (wrapped into [0, 360)). No effect on a live
    /// source.
    pub fn set_azimuth(&mut self, azimuth: f32) {
        if let CompassSource::Mock { azimuth_deg } = &mut self.source {
            *azimuth_deg = azimuth.rem_euclid(360.0);
        }
    }

    /// Principal direction the phone currently faces.
    pub fn cardinal_direction(&mut self) -> CardinalDirection {
        CardinalDirection::from_azimuth(self.azimuth_deg())
    }

    /// Signed deviation from north in degrees: positive east of north,
    /// negative west, in `(-180, 180]`.
    pub fn deviation_from_north(&mut self) -> f32 {
        let az = self.azimuth_deg();
        if az <= 180.0 {
            az
        } else {
            az - 360.0
        }
    }

    /// Whether the phone faces north within `tolerance_deg` either way.
    pub fn is_facing_north(&mut self, tolerance_deg: f32) -> bool {
        let az = self.azimuth_deg();
        az >= 360.0 - tolerance_deg || az <= tolerance_deg
    }

    /// Rotation that would put north at the frame center, in degrees.
    pub fn correction_angle(&mut self) -> f32 {
        -self.deviation_from_north()
    }
}

/// Averages repeated readings against a known azimuth to derive a fixed
/// offset correction.
#[derive(Debug, Default)]
pub struct CompassCalibrator {
    readings: Vec<f32>,
}

impl CompassCalibrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one azimuth reading.
    pub fn collect_reading(&mut self, azimuth_deg: f32) {
        self.readings.push(azimuth_deg);
    }

    /// Offset to add to raw readings so they average to `expected_azimuth_deg`.
    /// Consumes the collected readings; returns 0 when none were collected.
    pub fn calibrate(&mut self, expected_azimuth_deg: f32) -> f32 {
        if self.readings.is_empty() {
            return 0.0;
        }
        let average = self.readings.iter().sum::<f32>() / self.readings.len() as f32;
        self.readings.clear();
        expected_azimuth_deg - average
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_facing_north() {
        let mut compass = CompassSensor::mock(0.0);
        assert_eq!(compass.azimuth_deg(), 0.0);
        assert_eq!(compass.cardinal_direction(), CardinalDirection::North);
        assert!(compass.is_facing_north(NORTH_TOLERANCE_DEG));
        assert_eq!(compass.deviation_from_north(), 0.0);
    }

    #[test]
    fn test_facing_east() {
        let mut compass = CompassSensor::mock(90.0);
        assert_eq!(compass.cardinal_direction(), CardinalDirection::East);
        assert!(!compass.is_facing_north(NORTH_TOLERANCE_DEG));
        assert_eq!(compass.deviation_from_north(), 90.0);
        assert_eq!(compass.correction_angle(), -90.0);
    }

    #[test]
    fn test_facing_southwest() {
        let mut compass = CompassSensor::mock(225.0);
        assert_eq!(compass.cardinal_direction(), CardinalDirection::SouthWest);
        assert!(!compass.is_facing_north(NORTH_TOLERANCE_DEG));
        assert_eq!(compass.deviation_from_north(), -135.0);
    }

    #[test]
    fn test_north_wraparound() {
        let mut compass = CompassSensor::mock(350.0);
        assert_eq!(compass.cardinal_direction(), CardinalDirection::North);
        assert!(compass.is_facing_north(NORTH_TOLERANCE_DEG));
        assert_eq!(compass.deviation_from_north(), -10.0);
        assert_eq!(compass.correction_angle(), 10.0);
    }

    #[test]
    fn test_cardinal_sector_boundaries() {
        assert_eq!(
            CardinalDirection::from_azimuth(22.4),
            CardinalDirection::North
        );
        assert_eq!(
            CardinalDirection::from_azimuth(22.6),
            CardinalDirection::NorthEast
        );
        assert_eq!(
            CardinalDirection::from_azimuth(337.6),
            CardinalDirection::North
        );
        assert_eq!(
            CardinalDirection::from_azimuth(337.4),
            CardinalDirection::NorthWest
        );
    }

    #[test]
    fn test_set_azimuth_wraps() {
        let mut compass = CompassSensor::mock(0.0);
        compass.set_azimuth(370.0);
        assert!((compass.azimuth_deg() - 10.0).abs() < 1e-6);
        compass.set_azimuth(-90.0);
        assert!((compass.azimuth_deg() - 270.0).abs() < 1e-6);
    }

    #[test]
    fn test_live_source_through_trait() {
        struct FixedSensor(f32);
        impl AzimuthSensor for FixedSensor {
            fn read_azimuth_deg(&mut self) -> f32 {
                self.0
            }
        }
        let mut compass = CompassSensor::live(Box::new(FixedSensor(182.0)));
        assert_eq!(compass.cardinal_direction(), CardinalDirection::South);
        // set_azimuth is a mock-only control
        compass.set_azimuth(0.0);
        assert_eq!(compass.azimuth_deg(), 182.0);
    }

    #[test]
    fn test_noise_is_seed_deterministic() {
        let mut a = CompassSensor::mock(45.0).with_noise(2.0);
        let mut b = CompassSensor::mock(45.0).with_noise(2.0);
        let mut rng_a = StdRng::seed_from_u64(99);
        let mut rng_b = StdRng::seed_from_u64(99);
        for _ in 0..10 {
            let ra = a.azimuth_deg_noisy(&mut rng_a);
            let rb = b.azimuth_deg_noisy(&mut rng_b);
            assert_eq!(ra, rb);
            // 2-degree sigma: stay within a generous band of the true value
            assert!((ra - 45.0).abs() < 20.0);
        }
    }

    #[test]
    fn test_noiseless_read_is_exact() {
        let mut compass = CompassSensor::mock(45.0);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(compass.azimuth_deg_noisy(&mut rng), 45.0);
    }

    #[test]
    fn test_calibrator_offset() {
        let mut cal = CompassCalibrator::new();
        for reading in [10.0, 12.0, 14.0] {
            cal.collect_reading(reading);
        }
        assert!((cal.calibrate(0.0) - (-12.0)).abs() < 1e-6);
        // Readings were consumed
        assert_eq!(cal.calibrate(0.0), 0.0);
    }
}
