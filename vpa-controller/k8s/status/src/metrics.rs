use prometheus_client::{metrics::counter::Counter, registry::Registry};

#[derive(Clone, Debug, Default)]
pub struct ControllerMetrics {
    pub(crate) written: Counter,
    pub(crate) unchanged: Counter,
    pub(crate) failed: Counter,
    pub(crate) timeouts: Counter,
}

impl ControllerMetrics {
    pub fn register(prom: &mut Registry) -> Self {
        let metrics = Self::default();
        prom.register(
            "writes",
            "Count of status updates written",
            metrics.written.clone(),
        );
        prom.register(
            "unchanged",
            "Count of reconciliations that found the status up to date",
            metrics.unchanged.clone(),
        );
        prom.register(
            "failures",
            "Count of status updates that failed",
            metrics.failed.clone(),
        );
        prom.register(
            "timeouts",
            "Count of status updates that timed out",
            metrics.timeouts.clone(),
        );
        metrics
    }
}
