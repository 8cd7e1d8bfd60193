use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::engine::guard::validate_transition;
use crate::error::AppError;
use crate::models::driver::DriverAvailability;
use crate::models::event::TripEvent;
use crate::models::trip::{Actor, ActorRole, GeoPoint, PickupStage, Trip, TripStatus};
use crate::state::AppState;

pub fn create_trip(
    state: &AppState,
    rider_id: Uuid,
    pickup: GeoPoint,
    destination: GeoPoint,
) -> Result<Trip, AppError> {
    if !pickup.is_valid() {
        return Err(AppError::BadRequest("invalid pickup coordinates".to_string()));
    }
    if !destination.is_valid() {
        return Err(AppError::BadRequest(
            "invalid destination coordinates".to_string(),
        ));
    }

    let trip = Trip::new(rider_id, pickup, destination);
    state.trips.insert(trip.id, trip.clone());
    state.metrics.active_trips.inc();
    let _ = state.trip_events_tx.send(TripEvent::TripRequested {
        trip_id: trip.id,
        rider_id,
    });

    info!(trip_id = %trip.id, rider_id = %rider_id, "trip requested");
    Ok(trip)
}

/// Applies a status transition on behalf of `actor`. The whole
/// validate-then-write sequence runs while the trip's map entry is held, so a
/// concurrent confirm-pickup and start-attempt serialize deterministically.
pub fn request_transition(
    state: &AppState,
    trip_id: Uuid,
    actor: Actor,
    target: TripStatus,
    reason: Option<String>,
) -> Result<Trip, AppError> {
    let result = apply_transition(state, trip_id, actor, target, reason);

    let outcome = if result.is_ok() { "applied" } else { "rejected" };
    state
        .metrics
        .transitions_total
        .with_label_values(&[&target.to_string(), outcome])
        .inc();

    result
}

fn apply_transition(
    state: &AppState,
    trip_id: Uuid,
    actor: Actor,
    target: TripStatus,
    reason: Option<String>,
) -> Result<Trip, AppError> {
    let mut trip = state
        .trips
        .get_mut(&trip_id)
        .ok_or_else(|| AppError::NotFound(format!("trip {trip_id} not found")))?;

    validate_transition(&trip, actor.role, target)?;
    authorize_identity(&trip, actor)?;

    match target {
        TripStatus::Accepted => {
            let mut driver = state
                .drivers
                .get_mut(&actor.id)
                .ok_or_else(|| AppError::NotFound(format!("driver {} not found", actor.id)))?;

            if driver.availability != DriverAvailability::Online {
                return Err(AppError::Conflict(format!(
                    "driver {} is not online",
                    actor.id
                )));
            }

            driver.availability = DriverAvailability::OnTrip;
            driver.active_trip = Some(trip.id);
            driver.updated_at = Utc::now();

            trip.driver_id = Some(actor.id);
            trip.status = TripStatus::Accepted;

            let _ = state.trip_events_tx.send(TripEvent::TripAccepted {
                trip_id: trip.id,
                driver_id: actor.id,
            });
        }
        TripStatus::Started => {
            trip.status = TripStatus::Started;
            let _ = state
                .trip_events_tx
                .send(TripEvent::TripStarted { trip_id: trip.id });
        }
        TripStatus::Completed => {
            trip.status = TripStatus::Completed;
            release_driver(state, trip.driver_id);
            state.metrics.active_trips.dec();
            state
                .metrics
                .trip_distance_km
                .observe(trip.distance_traveled_km);

            let _ = state.trip_events_tx.send(TripEvent::TripCompleted {
                trip_id: trip.id,
                distance_km: trip.distance_traveled_km,
            });
        }
        TripStatus::Cancelled => {
            trip.status = TripStatus::Cancelled;
            trip.cancelled_at = Some(Utc::now());
            trip.cancellation_reason = reason.clone();
            release_driver(state, trip.driver_id);
            state.metrics.active_trips.dec();

            let _ = state.trip_events_tx.send(TripEvent::TripCancelled {
                trip_id: trip.id,
                cancelled_by: actor.role,
                reason,
            });
        }
        TripStatus::Requested => {
            // Unreachable: the guard never admits a transition back to requested.
            return Err(AppError::InvalidTransition {
                from: trip.status,
                to: target,
            });
        }
    }

    trip.updated_at = Utc::now();

    info!(
        trip_id = %trip.id,
        actor_role = %actor.role,
        status = %trip.status,
        "trip transition applied"
    );

    Ok(trip.clone())
}

/// Rider commands must come from the trip's rider; driver commands on an
/// assigned trip must come from the assigned driver.
fn authorize_identity(trip: &Trip, actor: Actor) -> Result<(), AppError> {
    match actor.role {
        ActorRole::Rider => {
            if actor.id != trip.rider_id {
                return Err(AppError::unauthorized("rider", "act on another rider's trip"));
            }
        }
        ActorRole::Driver => {
            if let Some(driver_id) = trip.driver_id {
                if actor.id != driver_id {
                    return Err(AppError::unauthorized(
                        "driver",
                        "act on a trip assigned to another driver",
                    ));
                }
            }
        }
    }
    Ok(())
}

fn release_driver(state: &AppState, driver_id: Option<Uuid>) {
    let Some(driver_id) = driver_id else {
        return;
    };

    if let Some(mut driver) = state.drivers.get_mut(&driver_id) {
        if driver.availability == DriverAvailability::OnTrip {
            driver.availability = DriverAvailability::Online;
        }
        driver.active_trip = None;
        driver.updated_at = Utc::now();
    }
}

/// Rider acknowledgment that the driver is at the pickup point. Idempotent:
/// confirming an already-confirmed trip returns the unchanged record without
/// touching the timestamp.
pub fn confirm_pickup(state: &AppState, trip_id: Uuid, rider_id: Uuid) -> Result<Trip, AppError> {
    let mut trip = state
        .trips
        .get_mut(&trip_id)
        .ok_or_else(|| AppError::NotFound(format!("trip {trip_id} not found")))?;

    if rider_id != trip.rider_id {
        return Err(AppError::unauthorized("rider", "confirm another rider's pickup"));
    }

    if trip.rider_confirmed_pickup {
        return Ok(trip.clone());
    }

    if trip.status != TripStatus::Accepted {
        return Err(AppError::Conflict(format!(
            "pickup can only be confirmed on an accepted trip (current status: {})",
            trip.status
        )));
    }

    trip.rider_confirmed_pickup = true;
    trip.rider_confirmed_at = Some(Utc::now());
    trip.pickup_stage = PickupStage::Confirmed;
    trip.updated_at = Utc::now();

    let _ = state
        .trip_events_tx
        .send(TripEvent::PickupConfirmed { trip_id: trip.id });

    info!(trip_id = %trip.id, "rider confirmed pickup");
    Ok(trip.clone())
}

/// Rider acknowledgment of trip completion. Same idempotence contract as
/// pickup confirmation.
pub fn confirm_completion(
    state: &AppState,
    trip_id: Uuid,
    rider_id: Uuid,
) -> Result<Trip, AppError> {
    let mut trip = state
        .trips
        .get_mut(&trip_id)
        .ok_or_else(|| AppError::NotFound(format!("trip {trip_id} not found")))?;

    if rider_id != trip.rider_id {
        return Err(AppError::unauthorized(
            "rider",
            "confirm another rider's trip completion",
        ));
    }

    if trip.rider_confirmed_completion {
        return Ok(trip.clone());
    }

    if trip.status != TripStatus::Completed {
        return Err(AppError::Conflict(format!(
            "completion can only be confirmed on a completed trip (current status: {})",
            trip.status
        )));
    }

    trip.rider_confirmed_completion = true;
    trip.rider_confirmed_completion_at = Some(Utc::now());
    trip.updated_at = Utc::now();

    info!(trip_id = %trip.id, "rider confirmed completion");
    Ok(trip.clone())
}
