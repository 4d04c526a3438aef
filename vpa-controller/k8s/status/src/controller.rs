use crate::{
    core::{update_vpa_status_if_needed, StatusUpdate, UpdateVpaStatus},
    index::{DesiredStatus, SharedIndex},
    metrics::ControllerMetrics,
    StatusClient, Synced,
};
use futures::prelude::*;
use kubert::lease::Claim;
use std::{fmt, sync::Arc};
use tokio::{
    sync::watch,
    time::{self, Duration, MissedTickBehavior},
};

/// Periodically reconciles the status of every indexed autoscaler.
///
/// No pass runs before every watch has delivered its initial list, so that
/// statuses are never computed from a partial index. Only the holder of the
/// write lease issues updates. Each pass snapshots the index and processes
/// autoscalers independently, so a slow or failed update does not hold back
/// the others.
pub struct Controller<C = StatusClient> {
    index: SharedIndex,
    pub(crate) client: C,
    claims: watch::Receiver<Arc<Claim>>,
    name: String,
    period: Duration,
    patch_timeout: Duration,
    concurrency: usize,
    pub(crate) metrics: ControllerMetrics,
}

// === impl Controller ===

impl<C> Controller<C>
where
    C: UpdateVpaStatus,
    C::Error: fmt::Display,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        index: SharedIndex,
        client: C,
        claims: watch::Receiver<Arc<Claim>>,
        name: impl Into<String>,
        period: Duration,
        patch_timeout: Duration,
        concurrency: usize,
        metrics: ControllerMetrics,
    ) -> Self {
        Self {
            index,
            client,
            claims,
            name: name.into(),
            period,
            patch_timeout,
            concurrency: concurrency.max(1),
            metrics,
        }
    }

    pub async fn run(self, mut synced: Synced) {
        synced.wait().await;
        tracing::debug!("Initial lists received");

        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            self.reconcile().await;
        }
    }

    /// Runs a single reconciliation pass if this controller holds the lease.
    pub async fn reconcile(&self) {
        let claim = self.claims.borrow().clone();
        if !claim.is_current_for(&self.name) {
            tracing::trace!(holder = %claim.holder, "Not the lease holder");
            return;
        }

        let statuses = self.index.read().desired_statuses();
        tracing::debug!(vpas = statuses.len(), "Reconciling statuses");
        futures::stream::iter(statuses)
            .for_each_concurrent(self.concurrency, |status| self.reconcile_one(status))
            .await;
    }

    async fn reconcile_one(&self, DesiredStatus { observed, desired }: DesiredStatus) {
        let id = &desired.id;
        let update = update_vpa_status_if_needed(&self.client, &desired, &observed);
        match time::timeout(self.patch_timeout, update).await {
            Ok(Ok(StatusUpdate::Unchanged(_))) => self.metrics.unchanged.inc(),
            Ok(Ok(StatusUpdate::Written(_))) => {
                tracing::info!(namespace = %id.namespace, name = %id.name, "Updated status");
                self.metrics.written.inc()
            }
            Ok(Err(error)) => {
                tracing::error!(namespace = %id.namespace, name = %id.name, %error, "Failed to update status");
                self.metrics.failed.inc()
            }
            Err(_) => {
                tracing::error!(
                    namespace = %id.namespace,
                    name = %id.name,
                    timeout = ?self.patch_timeout,
                    "Status update timed out",
                );
                self.metrics.timeouts.inc()
            }
        };
    }
}
