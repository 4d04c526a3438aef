use crate::{
    core::{controlling_vpa_for_pod, Vpa, VpaWithSelector},
    k8s::{self, ConditionType, ResourceExt, Selector, VerticalPodAutoscalerStatus},
    workload::{self, TargetError, Workload, WorkloadRef},
};
use ahash::AHashMap as HashMap;
use chrono::{offset::Utc, DateTime};
use parking_lot::RwLock;
use std::sync::Arc;

const CONFIG_UNSUPPORTED_REASON: &str = "Cannot read targetRef";

pub type SharedIndex = Arc<RwLock<Index>>;

/// Holds the pods, autoscalers and workload selectors of every namespace.
#[derive(Debug, Default)]
pub struct Index {
    namespaces: HashMap<String, Namespace>,
}

#[derive(Debug, Default)]
struct Namespace {
    pods: HashMap<String, Arc<k8s::Pod>>,
    vpas: HashMap<String, Arc<k8s::VerticalPodAutoscaler>>,
    workloads: HashMap<WorkloadRef, Result<Selector, TargetError>>,
}

/// An autoscaler's persisted status alongside the status it should have.
#[derive(Clone, Debug, PartialEq)]
pub struct DesiredStatus {
    pub observed: VerticalPodAutoscalerStatus,
    pub desired: Vpa,
}

// === impl Index ===

impl Index {
    pub fn shared() -> SharedIndex {
        Arc::new(RwLock::new(Self::default()))
    }

    pub fn desired_statuses(&self) -> Vec<DesiredStatus> {
        self.desired_statuses_at(Utc::now())
    }

    /// Computes the desired status of every indexed autoscaler, ordered by
    /// namespace and name.
    pub fn desired_statuses_at(&self, now: DateTime<Utc>) -> Vec<DesiredStatus> {
        let mut statuses = self
            .namespaces
            .values()
            .flat_map(|ns| ns.desired_statuses(now))
            .collect::<Vec<_>>();
        statuses.sort_by(|a, b| a.desired.id.cmp(&b.desired.id));
        statuses
    }

    fn namespace(&mut self, namespace: String) -> &mut Namespace {
        self.namespaces.entry(namespace).or_default()
    }

    fn remove_if_empty(&mut self, namespace: &str) {
        if self
            .namespaces
            .get(namespace)
            .map_or(false, Namespace::is_empty)
        {
            self.namespaces.remove(namespace);
        }
    }

    fn delete_pod(&mut self, namespace: String, name: String) {
        if let Some(ns) = self.namespaces.get_mut(&namespace) {
            ns.pods.remove(&name);
        }
        self.remove_if_empty(&namespace);
    }

    fn apply_workload<W>(&mut self, resource: W)
    where
        W: Workload + ResourceExt,
    {
        let Some(namespace) = resource.namespace() else {
            tracing::warn!(kind = W::KIND.as_str(), "Ignoring workload without a namespace");
            return;
        };
        let name = resource.name_unchecked();
        let selector = workload::compile(&name, &resource);
        if let Err(error) = &selector {
            tracing::info!(%namespace, %name, kind = W::KIND.as_str(), %error, "Workload selector does not compile");
        }
        self.namespace(namespace)
            .workloads
            .insert(WorkloadRef::new(W::KIND, name), selector);
    }

    fn delete_workload<W: Workload>(&mut self, namespace: String, name: String) {
        if let Some(ns) = self.namespaces.get_mut(&namespace) {
            ns.workloads.remove(&WorkloadRef::new(W::KIND, name));
        }
        self.remove_if_empty(&namespace);
    }
}

impl kubert::index::IndexNamespacedResource<k8s::Pod> for Index {
    fn apply(&mut self, pod: k8s::Pod) {
        let Some(namespace) = pod.namespace() else {
            tracing::warn!("Ignoring pod without a namespace");
            return;
        };
        let name = pod.name_unchecked();

        // Terminated pods are no longer governed by any autoscaler.
        let terminated = pod
            .status
            .as_ref()
            .and_then(|s| s.phase.as_deref())
            .map_or(false, |phase| phase == "Succeeded" || phase == "Failed");
        if terminated {
            tracing::debug!(%namespace, %name, "Removing terminated pod");
            self.delete_pod(namespace, name);
            return;
        }

        self.namespace(namespace).pods.insert(name, Arc::new(pod));
    }

    fn delete(&mut self, namespace: String, name: String) {
        self.delete_pod(namespace, name)
    }
}

impl kubert::index::IndexNamespacedResource<k8s::VerticalPodAutoscaler> for Index {
    fn apply(&mut self, vpa: k8s::VerticalPodAutoscaler) {
        let Some(namespace) = vpa.namespace() else {
            tracing::warn!("Ignoring VerticalPodAutoscaler without a namespace");
            return;
        };
        let name = vpa.name_unchecked();
        self.namespace(namespace).vpas.insert(name, Arc::new(vpa));
    }

    fn delete(&mut self, namespace: String, name: String) {
        if let Some(ns) = self.namespaces.get_mut(&namespace) {
            ns.vpas.remove(&name);
        }
        self.remove_if_empty(&namespace);
    }
}

impl kubert::index::IndexNamespacedResource<k8s::Deployment> for Index {
    fn apply(&mut self, resource: k8s::Deployment) {
        self.apply_workload(resource)
    }

    fn delete(&mut self, namespace: String, name: String) {
        self.delete_workload::<k8s::Deployment>(namespace, name)
    }
}

impl kubert::index::IndexNamespacedResource<k8s::StatefulSet> for Index {
    fn apply(&mut self, resource: k8s::StatefulSet) {
        self.apply_workload(resource)
    }

    fn delete(&mut self, namespace: String, name: String) {
        self.delete_workload::<k8s::StatefulSet>(namespace, name)
    }
}

impl kubert::index::IndexNamespacedResource<k8s::DaemonSet> for Index {
    fn apply(&mut self, resource: k8s::DaemonSet) {
        self.apply_workload(resource)
    }

    fn delete(&mut self, namespace: String, name: String) {
        self.delete_workload::<k8s::DaemonSet>(namespace, name)
    }
}

impl kubert::index::IndexNamespacedResource<k8s::ReplicaSet> for Index {
    fn apply(&mut self, resource: k8s::ReplicaSet) {
        self.apply_workload(resource)
    }

    fn delete(&mut self, namespace: String, name: String) {
        self.delete_workload::<k8s::ReplicaSet>(namespace, name)
    }
}

#[cfg(test)]
impl Index {
    /// Returns the autoscaler governing the given pod, if any.
    pub(crate) fn controlling_vpa(
        &self,
        namespace: &str,
        pod_name: &str,
    ) -> Option<crate::core::VpaId> {
        let ns = self.namespaces.get(namespace)?;
        let pod = ns.pods.get(pod_name)?;
        let (candidates, _) = ns.candidates();
        controlling_vpa_for_pod(pod, &candidates).map(|c| crate::core::VpaId::from(&*c.vpa))
    }
}

// === impl Namespace ===

impl Namespace {
    fn is_empty(&self) -> bool {
        self.pods.is_empty() && self.vpas.is_empty() && self.workloads.is_empty()
    }

    fn target_selector(&self, vpa: &k8s::VerticalPodAutoscaler) -> Result<Selector, TargetError> {
        let target = WorkloadRef::try_from(vpa.spec.target_ref.as_ref())?;
        match self.workloads.get(&target) {
            Some(selector) => selector.clone(),
            None => Err(TargetError::NotFound {
                kind: target.kind.as_str().to_string(),
                name: target.name,
            }),
        }
    }

    /// Pairs each autoscaler with its target's selector. Autoscalers whose
    /// selector cannot be determined are returned separately and match no
    /// pods.
    fn candidates(&self) -> (Vec<VpaWithSelector>, HashMap<&str, TargetError>) {
        let mut candidates = Vec::with_capacity(self.vpas.len());
        let mut errors = HashMap::new();
        for (name, vpa) in &self.vpas {
            match self.target_selector(vpa) {
                Ok(selector) => candidates.push(VpaWithSelector::new(vpa.clone(), selector)),
                Err(error) => {
                    errors.insert(name.as_str(), error);
                }
            }
        }
        (candidates, errors)
    }

    fn desired_statuses(&self, now: DateTime<Utc>) -> Vec<DesiredStatus> {
        let (candidates, errors) = self.candidates();

        let mut governed = HashMap::<&str, usize>::new();
        for pod in self.pods.values() {
            if let Some(name) =
                controlling_vpa_for_pod(pod, &candidates).and_then(|c| c.vpa.metadata.name.as_deref())
            {
                *governed.entry(name).or_default() += 1;
            }
        }

        self.vpas
            .iter()
            .map(|(name, vpa)| {
                let mut desired = Vpa::from_resource(vpa);
                match errors.get(name.as_str()) {
                    Some(error) => desired.conditions.set_at(
                        ConditionType::ConfigUnsupported,
                        true,
                        CONFIG_UNSUPPORTED_REASON,
                        error.to_string(),
                        now,
                    ),
                    None => {
                        desired.conditions.remove(ConditionType::ConfigUnsupported);
                    }
                }
                let pods_matched = governed.get(name.as_str()).copied().unwrap_or(0) > 0;
                desired.update_conditions_at(pods_matched, now);

                DesiredStatus {
                    observed: vpa.status.clone().unwrap_or_default(),
                    desired,
                }
            })
            .collect()
    }
}
