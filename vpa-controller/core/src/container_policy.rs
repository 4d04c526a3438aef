//! Resolution of per-container resource policies.

use crate::k8s::{
    ContainerName, ContainerResourcePolicy, ContainerScalingMode, PodResourcePolicy,
    RecommendedPodResources,
};

/// Returns the policy bound to `container_name`, falling back to the default
/// (`"*"`) policy.
///
/// A named policy wins over the default wherever either appears in the list.
/// If the list holds more than one default policy, the last one applies.
pub fn for_container<'p>(
    container_name: &str,
    policies: &'p [ContainerResourcePolicy],
) -> Option<&'p ContainerResourcePolicy> {
    let mut default = None;
    for policy in policies {
        match &policy.container_name {
            ContainerName::Specific(name) if name == container_name => return Some(policy),
            ContainerName::Specific(_) => {}
            ContainerName::Default => default = Some(policy),
        }
    }
    default
}

pub fn for_pod_container<'p>(
    container_name: &str,
    policy: Option<&'p PodResourcePolicy>,
) -> Option<&'p ContainerResourcePolicy> {
    policy.and_then(|p| for_container(container_name, &p.container_policies))
}

pub fn scaling_mode(container_name: &str, policy: Option<&PodResourcePolicy>) -> ContainerScalingMode {
    for_pod_container(container_name, policy)
        .and_then(|p| p.mode)
        .unwrap_or_default()
}

/// Drops the recommendations of containers whose scaling is turned off.
pub fn filter_recommendation(
    recommendation: &RecommendedPodResources,
    policy: Option<&PodResourcePolicy>,
) -> RecommendedPodResources {
    RecommendedPodResources {
        container_recommendations: recommendation
            .container_recommendations
            .iter()
            .filter(|r| scaling_mode(&r.container_name, policy) != ContainerScalingMode::Off)
            .cloned()
            .collect(),
    }
}
