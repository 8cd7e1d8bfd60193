use crate::error::AppError;
use crate::models::trip::{ActorRole, Trip, TripStatus};

/// Checks whether `target` is reachable from the trip's current status, whether
/// the acting role may request it, and whether the pickup confirmation gate
/// holds for starting. Pure; callers apply the side effects while still holding
/// the trip's map entry so the confirmation flag cannot change underneath the
/// status write.
pub fn validate_transition(
    trip: &Trip,
    role: ActorRole,
    target: TripStatus,
) -> Result<(), AppError> {
    use TripStatus::{Accepted, Cancelled, Completed, Requested, Started};

    let allowed_role = match (trip.status, target) {
        (Requested, Accepted) => Some(ActorRole::Driver),
        (Accepted, Started) => Some(ActorRole::Driver),
        (Started, Completed) => Some(ActorRole::Driver),
        (Requested | Accepted | Started, Cancelled) => None,
        _ => {
            return Err(AppError::InvalidTransition {
                from: trip.status,
                to: target,
            });
        }
    };

    if let Some(required) = allowed_role {
        if role != required {
            return Err(AppError::unauthorized(
                role.to_string(),
                format!("mark trip {target}"),
            ));
        }
    }

    // Confirmation is the single source of truth for starting. Geofence state
    // is advisory and never consulted here.
    if trip.status == Accepted && target == Started && !trip.rider_confirmed_pickup {
        return Err(AppError::PickupNotConfirmed);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::validate_transition;
    use crate::error::AppError;
    use crate::models::trip::{ActorRole, GeoPoint, Trip, TripStatus};

    fn trip(status: TripStatus) -> Trip {
        let mut trip = Trip::new(
            Uuid::new_v4(),
            GeoPoint {
                lat: 36.8065,
                lng: 10.1815,
            },
            GeoPoint {
                lat: 35.8245,
                lng: 10.6065,
            },
        );
        trip.status = status;
        trip
    }

    #[test]
    fn driver_may_accept_requested_trip() {
        let t = trip(TripStatus::Requested);
        assert!(validate_transition(&t, ActorRole::Driver, TripStatus::Accepted).is_ok());
    }

    #[test]
    fn rider_may_not_accept() {
        let t = trip(TripStatus::Requested);
        let err = validate_transition(&t, ActorRole::Rider, TripStatus::Accepted).unwrap_err();
        assert!(matches!(err, AppError::UnauthorizedActor { .. }));
    }

    #[test]
    fn requested_to_started_skips_a_state() {
        let t = trip(TripStatus::Requested);
        let err = validate_transition(&t, ActorRole::Driver, TripStatus::Started).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    #[test]
    fn start_requires_pickup_confirmation() {
        let t = trip(TripStatus::Accepted);
        let err = validate_transition(&t, ActorRole::Driver, TripStatus::Started).unwrap_err();
        assert!(matches!(err, AppError::PickupNotConfirmed));
    }

    #[test]
    fn start_allowed_once_confirmed() {
        let mut t = trip(TripStatus::Accepted);
        t.rider_confirmed_pickup = true;
        assert!(validate_transition(&t, ActorRole::Driver, TripStatus::Started).is_ok());
    }

    #[test]
    fn rider_may_not_start_even_when_confirmed() {
        let mut t = trip(TripStatus::Accepted);
        t.rider_confirmed_pickup = true;
        let err = validate_transition(&t, ActorRole::Rider, TripStatus::Started).unwrap_err();
        assert!(matches!(err, AppError::UnauthorizedActor { .. }));
    }

    #[test]
    fn only_driver_completes() {
        let t = trip(TripStatus::Started);
        assert!(validate_transition(&t, ActorRole::Driver, TripStatus::Completed).is_ok());
        let err = validate_transition(&t, ActorRole::Rider, TripStatus::Completed).unwrap_err();
        assert!(matches!(err, AppError::UnauthorizedActor { .. }));
    }

    #[test]
    fn either_actor_may_cancel_active_trip() {
        for status in [
            TripStatus::Requested,
            TripStatus::Accepted,
            TripStatus::Started,
        ] {
            let t = trip(status);
            assert!(validate_transition(&t, ActorRole::Rider, TripStatus::Cancelled).is_ok());
            assert!(validate_transition(&t, ActorRole::Driver, TripStatus::Cancelled).is_ok());
        }
    }

    #[test]
    fn terminal_states_reject_everything() {
        for status in [TripStatus::Completed, TripStatus::Cancelled] {
            for target in [
                TripStatus::Accepted,
                TripStatus::Started,
                TripStatus::Completed,
                TripStatus::Cancelled,
            ] {
                let t = trip(status);
                let err = validate_transition(&t, ActorRole::Driver, target).unwrap_err();
                assert!(matches!(err, AppError::InvalidTransition { .. }));
            }
        }
    }

    #[test]
    fn backward_transitions_rejected() {
        let t = trip(TripStatus::Started);
        let err = validate_transition(&t, ActorRole::Driver, TripStatus::Accepted).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }
}
