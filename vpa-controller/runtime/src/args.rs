use crate::{
    index::Index,
    k8s,
    lease,
    status::{Controller, ControllerMetrics, InitialSync, StatusClient},
};
use anyhow::{bail, Context, Result};
use clap::Parser;
use kube::runtime::watcher;
use prometheus_client::registry::Registry;
use tokio::time::Duration;
use tracing::{info, info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(name = "vpa", about = "A vertical pod autoscaler status controller")]
pub struct Args {
    #[clap(
        long,
        default_value = "vpa=info,warn",
        env = "VPA_CONTROLLER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    #[clap(long, default_value = "kube-system")]
    control_plane_namespace: String,

    /// Name of the deployment that owns the status write Lease.
    #[clap(long, default_value = "vpa-controller")]
    controller_deployment_name: String,

    #[clap(long, default_value = "5000")]
    patch_timeout_ms: u64,

    #[clap(long, default_value = "10")]
    reconcile_period_secs: u64,

    /// Maximum number of status updates in flight at once.
    #[clap(long, default_value = "8")]
    status_concurrency: usize,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            admin,
            client,
            log_level,
            log_format,
            control_plane_namespace,
            controller_deployment_name,
            patch_timeout_ms,
            reconcile_period_secs,
            status_concurrency,
        } = self;

        let index = Index::shared();

        let mut prom = <Registry>::default();
        let status_metrics =
            ControllerMetrics::register(prom.sub_registry_with_prefix("vpa_status"));

        let mut runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .build()
            .await?;

        let hostname =
            std::env::var("HOSTNAME").context("failed to read the HOSTNAME environment variable")?;

        let claims = lease::init(
            &runtime,
            &control_plane_namespace,
            &controller_deployment_name,
            &hostname,
        )
        .await?;

        // Spawn resource watches. The status controller waits until each has
        // delivered its initial list.
        let (initial_sync, synced) = InitialSync::new();

        let pods =
            initial_sync.track(runtime.watch_all::<k8s::Pod>(watcher::Config::default()));
        tokio::spawn(kubert::index::namespaced(index.clone(), pods).instrument(info_span!("pods")));

        let vpas = initial_sync.track(
            runtime.watch_all::<k8s::VerticalPodAutoscaler>(watcher::Config::default()),
        );
        tokio::spawn(
            kubert::index::namespaced(index.clone(), vpas)
                .instrument(info_span!("verticalpodautoscalers")),
        );

        let deployments = initial_sync.track(
            runtime.watch_all::<k8s::Deployment>(watcher::Config::default()),
        );
        tokio::spawn(
            kubert::index::namespaced(index.clone(), deployments)
                .instrument(info_span!("deployments")),
        );

        let statefulsets = initial_sync.track(
            runtime.watch_all::<k8s::StatefulSet>(watcher::Config::default()),
        );
        tokio::spawn(
            kubert::index::namespaced(index.clone(), statefulsets)
                .instrument(info_span!("statefulsets")),
        );

        let daemonsets =
            initial_sync.track(runtime.watch_all::<k8s::DaemonSet>(watcher::Config::default()));
        tokio::spawn(
            kubert::index::namespaced(index.clone(), daemonsets)
                .instrument(info_span!("daemonsets")),
        );

        let replicasets = initial_sync.track(
            runtime.watch_all::<k8s::ReplicaSet>(watcher::Config::default()),
        );
        tokio::spawn(
            kubert::index::namespaced(index.clone(), replicasets)
                .instrument(info_span!("replicasets")),
        );

        let controller = Controller::new(
            index,
            StatusClient::new(runtime.client()),
            claims,
            hostname,
            Duration::from_secs(reconcile_period_secs),
            Duration::from_millis(patch_timeout_ms),
            status_concurrency,
            status_metrics,
        );
        tokio::spawn(controller.run(synced).instrument(info_span!("status_controller")));

        // Runs until a shutdown signal is received.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        info!("Shutdown");
        Ok(())
    }
}
