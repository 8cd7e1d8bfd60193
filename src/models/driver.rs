use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::trip::GeoPoint;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DriverAvailability {
    Online,
    OnTrip,
    Offline,
}

/// Driver availability record. `availability = OnTrip` and `active_trip` are
/// owned by the trip lifecycle commands; the REST surface may only toggle
/// between Online and Offline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub location: GeoPoint,
    pub availability: DriverAvailability,
    pub active_trip: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}
