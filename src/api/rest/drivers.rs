use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{patch, post};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::driver::{Driver, DriverAvailability};
use crate::models::trip::GeoPoint;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drivers", post(register_driver).get(list_drivers))
        .route("/drivers/:id/availability", patch(update_availability))
}

#[derive(Deserialize)]
pub struct RegisterDriverRequest {
    pub name: String,
    pub location: GeoPoint,
}

#[derive(Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub availability: DriverAvailability,
}

async fn register_driver(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterDriverRequest>,
) -> Result<Json<Driver>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    if !payload.location.is_valid() {
        return Err(AppError::BadRequest("invalid coordinates".to_string()));
    }

    let driver = Driver {
        id: Uuid::new_v4(),
        name: payload.name,
        location: payload.location,
        availability: DriverAvailability::Online,
        active_trip: None,
        updated_at: Utc::now(),
    };

    state.drivers.insert(driver.id, driver.clone());
    Ok(Json(driver))
}

async fn list_drivers(State(state): State<Arc<AppState>>) -> Json<Vec<Driver>> {
    let drivers = state
        .drivers
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(drivers)
}

/// Drivers may toggle themselves between online and offline. OnTrip is owned
/// by the trip lifecycle and cannot be set or cleared here.
async fn update_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAvailabilityRequest>,
) -> Result<Json<Driver>, AppError> {
    if payload.availability == DriverAvailability::OnTrip {
        return Err(AppError::BadRequest(
            "availability OnTrip is assigned by the trip lifecycle".to_string(),
        ));
    }

    let mut driver = state
        .drivers
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("driver {id} not found")))?;

    if driver.availability == DriverAvailability::OnTrip {
        return Err(AppError::Conflict(format!(
            "driver {id} is on an active trip"
        )));
    }

    driver.availability = payload.availability;
    driver.updated_at = Utc::now();

    Ok(Json(driver.clone()))
}
