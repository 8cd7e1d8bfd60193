use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::trip::ActorRole;

/// Domain events emitted by the trip lifecycle for external notifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TripEvent {
    TripRequested {
        trip_id: Uuid,
        rider_id: Uuid,
    },
    TripAccepted {
        trip_id: Uuid,
        driver_id: Uuid,
    },
    DriverArrived {
        trip_id: Uuid,
    },
    PickupConfirmed {
        trip_id: Uuid,
    },
    TripStarted {
        trip_id: Uuid,
    },
    DestinationReached {
        trip_id: Uuid,
    },
    TripCompleted {
        trip_id: Uuid,
        distance_km: f64,
    },
    TripCancelled {
        trip_id: Uuid,
        cancelled_by: ActorRole,
        reason: Option<String>,
    },
}

/// Raw GPS fix pushed to websocket subscribers. Carries no transactional
/// guarantees and is never authoritative for state transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpsFix {
    pub trip_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub lat: f64,
    pub lng: f64,
    pub recorded_at: DateTime<Utc>,
}
