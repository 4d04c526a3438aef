use crate::{
    conditions::Conditions,
    k8s::{quantity, RecommendedContainerResources, ResourceList, VerticalPodAutoscalerStatus},
    vpa::Vpa,
};
use std::collections::BTreeMap;


/// Writes an autoscaler's status.
///
/// Implementations issue a single request per call; retries, backoff and
/// timeouts belong to the caller.
#[async_trait::async_trait]
pub trait UpdateVpaStatus: Send + Sync {
    type Error: Send;

    async fn update_status(
        &self,
        namespace: &str,
        name: &str,
        status: VerticalPodAutoscalerStatus,
    ) -> Result<VerticalPodAutoscalerStatus, Self::Error>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum StatusUpdate {
    /// The persisted status already matched; nothing was written.
    Unchanged(VerticalPodAutoscalerStatus),
    /// The desired status was written and the store returned this status.
    Written(VerticalPodAutoscalerStatus),
}

/// Writes the model's status if it differs from the observed one.
///
/// Observed and desired statuses are equal when they hold the same
/// recommendation per container and the same conditions, ignoring transition
/// times. When they are equal the observed status is returned as-is and no
/// request is made. Otherwise exactly one update carrying the full desired
/// status is issued, and its error, if any, is returned unchanged.
pub async fn update_vpa_status_if_needed<C>(
    client: &C,
    vpa: &Vpa,
    observed: &VerticalPodAutoscalerStatus,
) -> Result<StatusUpdate, C::Error>
where
    C: UpdateVpaStatus + ?Sized,
{
    let desired = vpa.as_status();
    if status_eq(&desired, observed) {
        tracing::trace!(namespace = %vpa.id.namespace, name = %vpa.id.name, "Status unchanged");
        return Ok(StatusUpdate::Unchanged(observed.clone()));
    }

    tracing::debug!(namespace = %vpa.id.namespace, name = %vpa.id.name, "Updating status");
    client
        .update_status(&vpa.id.namespace, &vpa.id.name, desired)
        .await
        .map(StatusUpdate::Written)
}

pub fn status_eq(a: &VerticalPodAutoscalerStatus, b: &VerticalPodAutoscalerStatus) -> bool {
    recommendations_eq(a.container_recommendations(), b.container_recommendations())
        && a.conditions()
            .iter()
            .collect::<Conditions>()
            .same_as(&b.conditions().iter().collect())
}

/// Compares recommendations keyed by container name. Resource quantities are
/// compared by value, and an absent bound equals an empty one. Lists of
/// different lengths, including lists with repeated containers, differ.
pub fn recommendations_eq(
    a: &[RecommendedContainerResources],
    b: &[RecommendedContainerResources],
) -> bool {
    fn by_container(
        recs: &[RecommendedContainerResources],
    ) -> BTreeMap<&str, &RecommendedContainerResources> {
        recs.iter().map(|r| (r.container_name.as_str(), r)).collect()
    }

    // Duplicate container entries collapse when keyed, so they count as a
    // difference.
    if a.len() != b.len() {
        return false;
    }
    let (a, b) = (by_container(a), by_container(b));
    a.len() == b.len()
        && a.iter().all(|(name, ra)| {
            b.get(name)
                .map_or(false, |rb| container_recommendation_eq(ra, rb))
        })
}

fn container_recommendation_eq(
    a: &RecommendedContainerResources,
    b: &RecommendedContainerResources,
) -> bool {
    fn bounds_eq(a: Option<&ResourceList>, b: Option<&ResourceList>) -> bool {
        let empty = ResourceList::new();
        quantity::resource_lists_eq(a.unwrap_or(&empty), b.unwrap_or(&empty))
    }

    quantity::resource_lists_eq(&a.target, &b.target)
        && bounds_eq(a.lower_bound.as_ref(), b.lower_bound.as_ref())
        && bounds_eq(a.upper_bound.as_ref(), b.upper_bound.as_ref())
        && bounds_eq(a.uncapped_target.as_ref(), b.uncapped_target.as_ref())
}
