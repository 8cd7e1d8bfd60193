use crate::models::trip::GeoPoint;

const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Distance below which a driver counts as having arrived at a location.
pub const PICKUP_GEOFENCE_KM: f64 = 0.1;

/// Movements shorter than this are treated as GPS jitter and not accumulated.
pub const GPS_NOISE_FLOOR_KM: f64 = 0.01;

pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

/// True when `position` is inside the arrival geofence around `target`.
pub fn within_geofence(position: &GeoPoint, target: &GeoPoint) -> bool {
    haversine_km(position, target) < PICKUP_GEOFENCE_KM
}

#[cfg(test)]
mod tests {
    use super::{haversine_km, within_geofence};
    use crate::models::trip::GeoPoint;

    #[test]
    fn zero_distance_for_same_point() {
        let p = GeoPoint {
            lat: 36.8065,
            lng: 10.1815,
        };
        let distance = haversine_km(&p, &p);
        assert!(distance < 1e-9);
    }

    #[test]
    fn tunis_to_sousse_is_around_116_km() {
        let tunis = GeoPoint {
            lat: 36.8065,
            lng: 10.1815,
        };
        let sousse = GeoPoint {
            lat: 35.8245,
            lng: 10.6065,
        };
        let distance = haversine_km(&tunis, &sousse);
        assert!((distance - 116.0).abs() < 10.0);
    }

    #[test]
    fn nearby_driver_is_inside_pickup_geofence() {
        let pickup = GeoPoint {
            lat: 36.8065,
            lng: 10.1815,
        };
        let driver = GeoPoint {
            lat: 36.8070,
            lng: 10.1818,
        };
        assert!(haversine_km(&driver, &pickup) < 0.1);
        assert!(within_geofence(&driver, &pickup));
    }

    #[test]
    fn distant_driver_is_outside_pickup_geofence() {
        let pickup = GeoPoint {
            lat: 36.8065,
            lng: 10.1815,
        };
        let driver = GeoPoint {
            lat: 36.8200,
            lng: 10.1815,
        };
        assert!(!within_geofence(&driver, &pickup));
    }

    #[test]
    fn nan_coordinates_propagate() {
        let pickup = GeoPoint {
            lat: 36.8065,
            lng: 10.1815,
        };
        let broken = GeoPoint {
            lat: f64::NAN,
            lng: 10.1815,
        };
        assert!(haversine_km(&broken, &pickup).is_nan());
    }
}
