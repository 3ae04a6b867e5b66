//! Reference-city lookup for presenting a latitude estimate.
//!
//! A bare latitude number means little in the field, so the CLI anchors it to
//! the nearest reference city. The table covers major Turkish cities, the
//! original deployment area of this system (latitudes 36°N to 42°N).

/// A reference city with its coordinates in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct City {
    pub name: &'static str,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

/// Reference cities, north to south roughly.
pub const CITIES: &[City] = &[
    City { name: "Rize", latitude_deg: 41.20, longitude_deg: 40.51 },
    City { name: "Istanbul", latitude_deg: 41.00, longitude_deg: 28.97 },
    City { name: "Trabzon", latitude_deg: 40.98, longitude_deg: 39.72 },
    City { name: "Ankara", latitude_deg: 39.93, longitude_deg: 32.86 },
    City { name: "Van", latitude_deg: 38.63, longitude_deg: 43.38 },
    City { name: "Izmir", latitude_deg: 38.41, longitude_deg: 27.13 },
    City { name: "Diyarbakir", latitude_deg: 37.92, longitude_deg: 40.23 },
    City { name: "Gaziantep", latitude_deg: 37.07, longitude_deg: 37.38 },
    City { name: "Adana", latitude_deg: 36.99, longitude_deg: 35.31 },
    City { name: "Antalya", latitude_deg: 36.88, longitude_deg: 30.70 },
];

/// Nearest-city lookup result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestCity {
    pub city: City,
    /// Absolute latitude difference to the estimate, in degrees.
    pub latitude_distance_deg: f64,
    /// Whether the city's latitude falls inside the estimate's error band.
    pub within_error_band: bool,
}

/// Find the reference city closest in latitude to an estimate.
///
/// Only latitude is compared; a single-star sight yields no longitude.
pub fn nearest_city(latitude_deg: f64, error_margin_deg: f64) -> NearestCity {
    let mut best = CITIES[0];
    let mut best_dist = (best.latitude_deg - latitude_deg).abs();
    for &city in &CITIES[1..] {
        let dist = (city.latitude_deg - latitude_deg).abs();
        if dist < best_dist {
            best = city;
            best_dist = dist;
        }
    }
    NearestCity {
        city: best,
        latitude_distance_deg: best_dist,
        within_error_band: best_dist <= error_margin_deg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_to_ankara() {
        let result = nearest_city(39.9, 1.0);
        assert_eq!(result.city.name, "Ankara");
        assert!(result.within_error_band);
        assert!((result.latitude_distance_deg - 0.03).abs() < 1e-9);
    }

    #[test]
    fn test_far_latitude_outside_band() {
        let result = nearest_city(52.5, 1.41);
        assert_eq!(result.city.name, "Rize");
        assert!(!result.within_error_band);
    }

    #[test]
    fn test_exact_match() {
        let result = nearest_city(36.88, 0.5);
        assert_eq!(result.city.name, "Antalya");
        assert_eq!(result.latitude_distance_deg, 0.0);
        assert!(result.within_error_band);
    }
}
