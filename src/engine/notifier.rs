use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::models::event::TripEvent;
use crate::state::AppState;

/// Consumes lifecycle events and hands them to the notification side of the
/// system. Delivery here is a structured log line per event; a push or toast
/// backend would subscribe the same way. Lagging behind the broadcast buffer
/// drops events rather than blocking the lifecycle.
pub async fn run_notifier(state: Arc<AppState>) {
    let mut rx = state.trip_events_tx.subscribe();
    info!("trip notifier started");

    loop {
        match rx.recv().await {
            Ok(event) => notify(&event),
            Err(RecvError::Lagged(missed)) => {
                warn!(missed, "notifier lagged behind trip events");
            }
            Err(RecvError::Closed) => break,
        }
    }

    warn!("trip notifier stopped: event channel closed");
}

fn notify(event: &TripEvent) {
    match event {
        TripEvent::TripRequested { trip_id, rider_id } => {
            info!(%trip_id, %rider_id, "notify: trip requested");
        }
        TripEvent::TripAccepted { trip_id, driver_id } => {
            info!(%trip_id, %driver_id, "notify: trip accepted");
        }
        TripEvent::DriverArrived { trip_id } => {
            info!(%trip_id, "notify: driver arrived at pickup");
        }
        TripEvent::PickupConfirmed { trip_id } => {
            info!(%trip_id, "notify: rider confirmed pickup");
        }
        TripEvent::TripStarted { trip_id } => {
            info!(%trip_id, "notify: trip started");
        }
        TripEvent::DestinationReached { trip_id } => {
            info!(%trip_id, "notify: destination reached");
        }
        TripEvent::TripCompleted {
            trip_id,
            distance_km,
        } => {
            info!(%trip_id, distance_km = *distance_km, "notify: trip completed");
        }
        TripEvent::TripCancelled {
            trip_id,
            cancelled_by,
            reason,
        } => {
            info!(%trip_id, %cancelled_by, reason = reason.as_deref(), "notify: trip cancelled");
        }
    }
}
