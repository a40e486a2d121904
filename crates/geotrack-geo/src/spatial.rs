use geo::{Destination, Haversine, Point};

/// Earth radius used for all great-circle distances, in meters
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance in meters between two latitude/longitude pairs
/// (degrees), using the haversine formula.
///
/// NaN inputs propagate to a NaN result.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Clamp guards asin against rounding just above 1 for antipodal points
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_METERS * c
}

/// Point reached by travelling `meters` from (`lat`, `lon`) along `bearing`
/// degrees clockwise from north. Returns `(latitude, longitude)`.
pub fn destination(lat: f64, lon: f64, bearing: f64, meters: f64) -> (f64, f64) {
    let origin = Point::new(lon, lat);
    let target = Haversine.destination(origin, bearing, meters);
    (target.y(), target.x())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Distance;
    use proptest::prelude::*;

    const NYC: (f64, f64) = (40.7128, -74.0060);

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(distance_meters(NYC.0, NYC.1, NYC.0, NYC.1), 0.0);
    }

    #[test]
    fn test_one_tenth_degree_of_latitude() {
        // 0.1 degrees of latitude is about 11.1 km on this sphere
        let d = distance_meters(40.7128, -74.0060, 40.8128, -74.0060);
        let expected = EARTH_RADIUS_METERS * 0.1f64.to_radians();
        assert!((d - expected).abs() < 1e-6, "got {}", d);
        assert!((d - 11_119.5).abs() < 1.0);
    }

    #[test]
    fn test_london_to_paris() {
        let d = distance_meters(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((d - 343_556.0).abs() < 500.0, "got {}", d);
    }

    #[test]
    fn test_antimeridian_is_short_way_round() {
        let d = distance_meters(0.0, 179.9, 0.0, -179.9);
        assert!(d < 25_000.0, "got {}", d);
    }

    #[test]
    fn test_antipodes_do_not_produce_nan() {
        let d = distance_meters(0.0, 0.0, 0.0, 180.0);
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_METERS).abs() < 1e-3);
    }

    #[test]
    fn test_nan_propagates() {
        assert!(distance_meters(f64::NAN, 0.0, 0.0, 0.0).is_nan());
    }

    #[test]
    fn test_agrees_with_geo_haversine() {
        // geo uses the IUGG mean radius (6371008.8 m); results differ only by the radius ratio
        let ours = distance_meters(NYC.0, NYC.1, 34.0522, -118.2437);
        let theirs = Haversine.distance(Point::new(NYC.1, NYC.0), Point::new(-118.2437, 34.0522));
        let scaled = theirs * EARTH_RADIUS_METERS / 6_371_008.8;
        assert!((ours - scaled).abs() < 1.0, "ours {} geo {}", ours, scaled);
    }

    #[test]
    fn test_destination_round_trip_distance() {
        let (lat, lon) = destination(NYC.0, NYC.1, 90.0, 1000.0);
        let d = distance_meters(NYC.0, NYC.1, lat, lon);
        assert!((d - 1000.0).abs() < 1.0, "got {}", d);
        assert!(lon > NYC.1);
    }

    proptest! {
        #[test]
        fn distance_to_self_is_zero(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            prop_assert_eq!(distance_meters(lat, lon, lat, lon), 0.0);
        }

        #[test]
        fn distance_is_symmetric(
            lat1 in -90.0f64..=90.0, lon1 in -180.0f64..=180.0,
            lat2 in -90.0f64..=90.0, lon2 in -180.0f64..=180.0,
        ) {
            let ab = distance_meters(lat1, lon1, lat2, lon2);
            let ba = distance_meters(lat2, lon2, lat1, lon1);
            prop_assert!((ab - ba).abs() <= 1e-6 * ab.max(1.0));
        }

        #[test]
        fn distance_is_bounded_by_half_circumference(
            lat1 in -90.0f64..=90.0, lon1 in -180.0f64..=180.0,
            lat2 in -90.0f64..=90.0, lon2 in -180.0f64..=180.0,
        ) {
            let d = distance_meters(lat1, lon1, lat2, lon2);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= std::f64::consts::PI * EARTH_RADIUS_METERS + 1e-6);
        }
    }
}
