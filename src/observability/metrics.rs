use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub transitions_total: IntCounterVec,
    pub active_trips: IntGauge,
    pub location_reports_total: IntCounterVec,
    pub trip_distance_km: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let transitions_total = IntCounterVec::new(
            Opts::new("transitions_total", "Trip status transitions by outcome"),
            &["target", "outcome"],
        )
        .expect("valid transitions_total metric");

        let active_trips = IntGauge::new("active_trips", "Trips not yet completed or cancelled")
            .expect("valid active_trips metric");

        let location_reports_total = IntCounterVec::new(
            Opts::new(
                "location_reports_total",
                "Driver location reports by handling result",
            ),
            &["result"],
        )
        .expect("valid location_reports_total metric");

        let trip_distance_km = Histogram::with_opts(HistogramOpts::new(
            "trip_distance_km",
            "Accumulated distance of completed trips in kilometers",
        ))
        .expect("valid trip_distance_km metric");

        registry
            .register(Box::new(transitions_total.clone()))
            .expect("register transitions_total");
        registry
            .register(Box::new(active_trips.clone()))
            .expect("register active_trips");
        registry
            .register(Box::new(location_reports_total.clone()))
            .expect("register location_reports_total");
        registry
            .register(Box::new(trip_distance_km.clone()))
            .expect("register trip_distance_km");

        Self {
            registry,
            transitions_total,
            active_trips,
            location_reports_total,
            trip_distance_km,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
