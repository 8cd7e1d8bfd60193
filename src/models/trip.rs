use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TripStatus {
    Requested,
    Accepted,
    Started,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TripStatus::Completed | TripStatus::Cancelled)
    }
}

impl std::fmt::Display for TripStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TripStatus::Requested => "requested",
            TripStatus::Accepted => "accepted",
            TripStatus::Started => "started",
            TripStatus::Completed => "completed",
            TripStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// Informational sub-state of an accepted trip. Only `rider_confirmed_pickup`
/// gates starting; this stage exists so clients can render the handshake.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PickupStage {
    AwaitingArrival,
    AwaitingConfirmation,
    Confirmed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Rider,
    Driver,
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActorRole::Rider => f.write_str("rider"),
            ActorRole::Driver => f.write_str("driver"),
        }
    }
}

/// The authenticated principal acting on a trip, resolved once at the API
/// boundary and never re-interpreted downstream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Actor {
    pub role: ActorRole,
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub rider_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub status: TripStatus,
    pub pickup: GeoPoint,
    pub destination: GeoPoint,
    pub pickup_stage: PickupStage,
    pub rider_confirmed_pickup: bool,
    pub rider_confirmed_at: Option<DateTime<Utc>>,
    pub rider_confirmed_completion: bool,
    pub rider_confirmed_completion_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub distance_traveled_km: f64,
    pub last_position: Option<GeoPoint>,
    pub destination_reached: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    pub fn new(rider_id: Uuid, pickup: GeoPoint, destination: GeoPoint) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            rider_id,
            driver_id: None,
            status: TripStatus::Requested,
            pickup,
            destination,
            pickup_stage: PickupStage::AwaitingArrival,
            rider_confirmed_pickup: false,
            rider_confirmed_at: None,
            rider_confirmed_completion: false,
            rider_confirmed_completion_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            distance_traveled_km: 0.0,
            last_position: None,
            destination_reached: false,
            created_at: now,
            updated_at: now,
        }
    }
}
