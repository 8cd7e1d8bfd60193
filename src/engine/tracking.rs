use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::geo::{GPS_NOISE_FLOOR_KM, haversine_km, within_geofence};
use crate::models::event::{GpsFix, TripEvent};
use crate::models::trip::{GeoPoint, PickupStage, Trip, TripStatus};
use crate::state::AppState;

/// Ingests a driver location report for a trip. Malformed coordinates are
/// logged and dropped without failing the request; GPS noise is expected and
/// must never abort an active trip. Well-formed fixes are rebroadcast on the
/// GPS channel, which is lossy and never authoritative for transitions.
pub fn report_location(
    state: &AppState,
    trip_id: Uuid,
    lat: f64,
    lng: f64,
) -> Result<Trip, AppError> {
    let mut trip = state
        .trips
        .get_mut(&trip_id)
        .ok_or_else(|| AppError::NotFound(format!("trip {trip_id} not found")))?;

    let position = GeoPoint { lat, lng };
    if !position.is_valid() {
        warn!(trip_id = %trip_id, lat, lng, "discarding malformed location report");
        state
            .metrics
            .location_reports_total
            .with_label_values(&["discarded"])
            .inc();
        return Ok(trip.clone());
    }

    let _ = state.gps_tx.send(GpsFix {
        trip_id,
        driver_id: trip.driver_id,
        lat,
        lng,
        recorded_at: Utc::now(),
    });

    if let Some(driver_id) = trip.driver_id {
        if let Some(mut driver) = state.drivers.get_mut(&driver_id) {
            driver.location = position;
            driver.updated_at = Utc::now();
        }
    }

    match trip.status {
        TripStatus::Accepted => {
            check_pickup_arrival(state, &mut trip, &position);
            state
                .metrics
                .location_reports_total
                .with_label_values(&["recorded"])
                .inc();
        }
        TripStatus::Started => {
            let result = accumulate_distance(&mut trip, &position);
            check_destination_arrival(state, &mut trip, &position);
            state
                .metrics
                .location_reports_total
                .with_label_values(&[result])
                .inc();
        }
        _ => {
            // Late or early client reports carry no meaning for the lifecycle.
            debug!(trip_id = %trip_id, status = %trip.status, "ignoring location report");
            state
                .metrics
                .location_reports_total
                .with_label_values(&["discarded"])
                .inc();
        }
    }

    trip.updated_at = Utc::now();
    Ok(trip.clone())
}

/// Advances the handshake stage when the driver enters the pickup geofence.
/// Forward-only: leaving the geofence afterwards does not revert the stage,
/// and confirmation itself remains the rider's call.
fn check_pickup_arrival(state: &AppState, trip: &mut Trip, position: &GeoPoint) {
    if trip.pickup_stage != PickupStage::AwaitingArrival {
        return;
    }

    if within_geofence(position, &trip.pickup) {
        trip.pickup_stage = PickupStage::AwaitingConfirmation;
        let _ = state
            .trip_events_tx
            .send(TripEvent::DriverArrived { trip_id: trip.id });
        info!(trip_id = %trip.id, "driver arrived at pickup");
    }
}

fn check_destination_arrival(state: &AppState, trip: &mut Trip, position: &GeoPoint) {
    if trip.destination_reached {
        return;
    }

    if within_geofence(position, &trip.destination) {
        trip.destination_reached = true;
        let _ = state
            .trip_events_tx
            .send(TripEvent::DestinationReached { trip_id: trip.id });
        info!(trip_id = %trip.id, "driver arrived at destination");
    }
}

/// Adds the segment from the last recorded position when it clears the noise
/// floor. The first fix after starting only seeds the reference point; noise
/// fixes leave the reference untouched so slow movement still accumulates.
fn accumulate_distance(trip: &mut Trip, position: &GeoPoint) -> &'static str {
    let Some(last) = trip.last_position else {
        trip.last_position = Some(*position);
        return "recorded";
    };

    let segment_km = haversine_km(&last, position);
    if segment_km > GPS_NOISE_FLOOR_KM {
        trip.distance_traveled_km += segment_km;
        trip.last_position = Some(*position);
        "recorded"
    } else {
        "noise"
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::report_location;
    use crate::engine::lifecycle::{confirm_pickup, create_trip, request_transition};
    use crate::error::AppError;
    use crate::models::driver::{Driver, DriverAvailability};
    use crate::models::trip::{Actor, ActorRole, GeoPoint, PickupStage, TripStatus};
    use crate::state::AppState;

    const PICKUP: GeoPoint = GeoPoint {
        lat: 36.8065,
        lng: 10.1815,
    };
    const DESTINATION: GeoPoint = GeoPoint {
        lat: 35.8245,
        lng: 10.6065,
    };

    fn accepted_trip(state: &AppState) -> (Uuid, Uuid, Uuid) {
        let driver_id = Uuid::new_v4();
        state.drivers.insert(
            driver_id,
            Driver {
                id: driver_id,
                name: "Sami".to_string(),
                location: GeoPoint {
                    lat: 36.81,
                    lng: 10.18,
                },
                availability: DriverAvailability::Online,
                active_trip: None,
                updated_at: chrono::Utc::now(),
            },
        );

        let rider_id = Uuid::new_v4();
        let trip = create_trip(state, rider_id, PICKUP, DESTINATION).unwrap();
        request_transition(
            state,
            trip.id,
            Actor {
                role: ActorRole::Driver,
                id: driver_id,
            },
            TripStatus::Accepted,
            None,
        )
        .unwrap();

        (trip.id, rider_id, driver_id)
    }

    fn started_trip(state: &AppState) -> Uuid {
        let (trip_id, rider_id, driver_id) = accepted_trip(state);
        confirm_pickup(state, trip_id, rider_id).unwrap();
        request_transition(
            state,
            trip_id,
            Actor {
                role: ActorRole::Driver,
                id: driver_id,
            },
            TripStatus::Started,
            None,
        )
        .unwrap();
        trip_id
    }

    #[test]
    fn entering_pickup_geofence_advances_handshake() {
        let state = AppState::new(64, 64, 5);
        let (trip_id, _, _) = accepted_trip(&state);

        // ~60m from the pickup point, inside the 100m geofence.
        let trip = report_location(&state, trip_id, 36.8070, 10.1818).unwrap();
        assert_eq!(trip.pickup_stage, PickupStage::AwaitingConfirmation);
        assert!(!trip.rider_confirmed_pickup);
    }

    #[test]
    fn geofence_exit_does_not_revert_handshake() {
        let state = AppState::new(64, 64, 5);
        let (trip_id, _, _) = accepted_trip(&state);

        report_location(&state, trip_id, 36.8070, 10.1818).unwrap();
        let trip = report_location(&state, trip_id, 36.8200, 10.1815).unwrap();
        assert_eq!(trip.pickup_stage, PickupStage::AwaitingConfirmation);
    }

    #[test]
    fn first_report_seeds_without_adding_distance() {
        let state = AppState::new(64, 64, 5);
        let trip_id = started_trip(&state);

        let trip = report_location(&state, trip_id, 36.8070, 10.1818).unwrap();
        assert_eq!(trip.distance_traveled_km, 0.0);
        assert!(trip.last_position.is_some());
    }

    #[test]
    fn five_meter_jitter_is_discarded() {
        let state = AppState::new(64, 64, 5);
        let trip_id = started_trip(&state);

        report_location(&state, trip_id, 36.8070, 10.1818).unwrap();
        let trip = report_location(&state, trip_id, 36.807045, 10.1818).unwrap();
        assert_eq!(trip.distance_traveled_km, 0.0);
    }

    #[test]
    fn fifty_meter_movement_accumulates_exact_haversine() {
        let state = AppState::new(64, 64, 5);
        let trip_id = started_trip(&state);

        report_location(&state, trip_id, 36.8070, 10.1818).unwrap();
        let trip = report_location(&state, trip_id, 36.80745, 10.1818).unwrap();

        let expected = crate::geo::haversine_km(
            &GeoPoint {
                lat: 36.8070,
                lng: 10.1818,
            },
            &GeoPoint {
                lat: 36.80745,
                lng: 10.1818,
            },
        );
        assert!((trip.distance_traveled_km - expected).abs() < 1e-9);
        assert!((expected - 0.05).abs() < 0.005);
    }

    #[test]
    fn distance_is_monotonic_across_reports() {
        let state = AppState::new(64, 64, 5);
        let trip_id = started_trip(&state);

        report_location(&state, trip_id, 36.8070, 10.1818).unwrap();
        let mut previous = 0.0;
        for step in 1..=5 {
            let lat = 36.8070 + 0.0005 * step as f64;
            let trip = report_location(&state, trip_id, lat, 10.1818).unwrap();
            assert!(trip.distance_traveled_km >= previous);
            previous = trip.distance_traveled_km;
        }
        assert!(previous > 0.0);
    }

    #[test]
    fn malformed_report_is_dropped_without_error() {
        let state = AppState::new(64, 64, 5);
        let trip_id = started_trip(&state);

        report_location(&state, trip_id, 36.8070, 10.1818).unwrap();
        let trip = report_location(&state, trip_id, f64::NAN, 10.1818).unwrap();
        assert_eq!(trip.distance_traveled_km, 0.0);

        let trip = report_location(&state, trip_id, 123.0, 10.1818).unwrap();
        assert_eq!(trip.distance_traveled_km, 0.0);
    }

    #[test]
    fn report_on_unknown_trip_is_not_found() {
        let state = AppState::new(64, 64, 5);
        let err = report_location(&state, Uuid::new_v4(), 36.8, 10.18).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn reaching_destination_sets_advisory_flag_once() {
        let state = AppState::new(64, 64, 5);
        let trip_id = started_trip(&state);

        report_location(&state, trip_id, 36.8070, 10.1818).unwrap();
        let trip = report_location(&state, trip_id, 35.8246, 10.6065).unwrap();
        assert!(trip.destination_reached);
        assert_eq!(trip.status, TripStatus::Started);
    }
}
