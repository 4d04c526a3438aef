use crate::k8s::watcher;
use futures::prelude::*;
use std::sync::Arc;
use tokio::sync::watch;

/// Counts the watches that have not yet delivered their initial list.
#[derive(Clone, Debug)]
pub struct InitialSync {
    pending: Arc<watch::Sender<usize>>,
}

/// Resolves once every tracked watch has delivered its initial list.
#[derive(Clone, Debug)]
pub struct Synced(watch::Receiver<usize>);

// === impl InitialSync ===

impl InitialSync {
    pub fn new() -> (Self, Synced) {
        let (tx, rx) = watch::channel(0);
        (
            Self {
                pending: Arc::new(tx),
            },
            Synced(rx),
        )
    }

    /// Wraps a watch so that its first `Restarted` event, which carries the
    /// initial list, marks it synced.
    pub fn track<T, S>(&self, events: S) -> impl Stream<Item = watcher::Event<T>>
    where
        S: Stream<Item = watcher::Event<T>>,
    {
        self.pending.send_modify(|n| *n += 1);
        let pending = self.pending.clone();
        let mut listed = false;
        events.inspect(move |event| {
            if !listed && matches!(event, watcher::Event::Restarted(_)) {
                listed = true;
                pending.send_modify(|n| *n -= 1);
            }
        })
    }
}

// === impl Synced ===

impl Synced {
    pub fn is_synced(&self) -> bool {
        *self.0.borrow() == 0
    }

    pub async fn wait(&mut self) {
        if self.0.wait_for(|pending| *pending == 0).await.is_err() {
            tracing::warn!("Watches stopped before their initial lists were received");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::k8s;
    use tokio::sync::mpsc;
    use tokio_stream::wrappers::UnboundedReceiverStream;

    #[tokio::test(flavor = "current_thread")]
    async fn synced_after_every_initial_list() {
        let (sync, synced) = InitialSync::new();
        let (pods_tx, pods_rx) = mpsc::unbounded_channel::<watcher::Event<k8s::Pod>>();
        let (vpas_tx, vpas_rx) =
            mpsc::unbounded_channel::<watcher::Event<k8s::VerticalPodAutoscaler>>();
        let mut pods = Box::pin(sync.track(UnboundedReceiverStream::new(pods_rx)));
        let mut vpas = Box::pin(sync.track(UnboundedReceiverStream::new(vpas_rx)));
        assert!(!synced.is_synced());

        pods_tx.send(watcher::Event::Restarted(vec![])).unwrap();
        pods.next().await;
        assert!(!synced.is_synced());

        vpas_tx.send(watcher::Event::Restarted(vec![])).unwrap();
        vpas.next().await;
        assert!(synced.is_synced());

        // Later relists do not count twice.
        pods_tx.send(watcher::Event::Restarted(vec![])).unwrap();
        pods.next().await;
        assert!(synced.is_synced());
    }
}
