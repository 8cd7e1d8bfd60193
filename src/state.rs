use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::driver::Driver;
use crate::models::event::{GpsFix, TripEvent};
use crate::models::trip::Trip;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub trips: DashMap<Uuid, Trip>,
    pub drivers: DashMap<Uuid, Driver>,
    pub trip_events_tx: broadcast::Sender<TripEvent>,
    pub gps_tx: broadcast::Sender<GpsFix>,
    pub poll_interval_secs: u64,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(event_buffer_size: usize, gps_buffer_size: usize, poll_interval_secs: u64) -> Self {
        let (trip_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);
        let (gps_tx, _unused_gps_rx) = broadcast::channel(gps_buffer_size);

        Self {
            trips: DashMap::new(),
            drivers: DashMap::new(),
            trip_events_tx,
            gps_tx,
            poll_interval_secs,
            metrics: Metrics::new(),
        }
    }
}
