use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::lifecycle::{
    confirm_completion, confirm_pickup, create_trip, request_transition,
};
use crate::engine::tracking::report_location;
use crate::error::AppError;
use crate::models::trip::{Actor, GeoPoint, Trip, TripStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/trips", post(create).get(list))
        .route("/trips/:id", get(get_trip))
        .route("/trips/:id/transition", post(transition))
        .route("/trips/:id/confirm-pickup", post(confirm_pickup_handler))
        .route(
            "/trips/:id/confirm-completion",
            post(confirm_completion_handler),
        )
        .route("/trips/:id/location", post(location))
}

#[derive(Deserialize)]
pub struct CreateTripRequest {
    pub rider_id: Uuid,
    pub pickup: GeoPoint,
    pub destination: GeoPoint,
}

#[derive(Deserialize)]
pub struct TransitionRequest {
    pub actor: Actor,
    pub target: TripStatus,
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct RiderRequest {
    pub rider_id: Uuid,
}

#[derive(Deserialize)]
pub struct LocationReport {
    pub lat: f64,
    pub lng: f64,
}

async fn create(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateTripRequest>,
) -> Result<Json<Trip>, AppError> {
    let trip = create_trip(&state, payload.rider_id, payload.pickup, payload.destination)?;
    Ok(Json(trip))
}

async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<Trip>> {
    let trips = state
        .trips
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(trips)
}

async fn get_trip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Trip>, AppError> {
    let trip = state
        .trips
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("trip {id} not found")))?;

    Ok(Json(trip.value().clone()))
}

async fn transition(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionRequest>,
) -> Result<Json<Trip>, AppError> {
    let trip = request_transition(&state, id, payload.actor, payload.target, payload.reason)?;
    Ok(Json(trip))
}

async fn confirm_pickup_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RiderRequest>,
) -> Result<Json<Trip>, AppError> {
    let trip = confirm_pickup(&state, id, payload.rider_id)?;
    Ok(Json(trip))
}

async fn confirm_completion_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RiderRequest>,
) -> Result<Json<Trip>, AppError> {
    let trip = confirm_completion(&state, id, payload.rider_id)?;
    Ok(Json(trip))
}

async fn location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LocationReport>,
) -> Result<Json<Trip>, AppError> {
    let trip = report_location(&state, id, payload.lat, payload.lng)?;
    Ok(Json(trip))
}
