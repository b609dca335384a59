//! Great-circle distance helpers.

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MI: f64 = 3_958.8;

/// Calculate distance between two points in statute miles (Haversine formula).
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MI * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Clamp a sub-score into `[0, 1]`, mapping NaN to 0.
pub fn clip_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        // ~69 miles per degree of latitude
        let dist = haversine_miles(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 69.09).abs() < 0.5);
    }

    #[test]
    fn test_haversine_same_point() {
        let dist = haversine_miles(40.6413, -73.7781, 40.6413, -73.7781);
        assert!(dist < 0.001);
    }

    #[test]
    fn jfk_to_lax_is_transcontinental() {
        let dist = haversine_miles(40.6413, -73.7781, 33.9416, -118.4085);
        assert!((dist - 2_470.0).abs() < 15.0, "got {dist}");
    }

    #[test]
    fn clip_unit_handles_nan_and_bounds() {
        assert_eq!(clip_unit(f64::NAN), 0.0);
        assert_eq!(clip_unit(-0.3), 0.0);
        assert_eq!(clip_unit(1.7), 1.0);
        assert_eq!(clip_unit(0.42), 0.42);
    }
}
