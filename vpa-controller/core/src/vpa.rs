use crate::{
    conditions::Conditions,
    container_policy,
    k8s::{
        self, ConditionType, RecommendedPodResources, ResourceExt, VerticalPodAutoscaler,
        VerticalPodAutoscalerStatus,
    },
};
use chrono::{offset::Utc, DateTime};
use std::sync::Arc;

const NO_PODS_MATCHED_REASON: &str = "NoPodsMatched";
const NO_PODS_MATCHED_MESSAGE: &str = "No pods match this VPA object";

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VpaId {
    pub namespace: String,
    pub name: String,
}

/// An autoscaler paired with the compiled selector of the pods it targets.
///
/// Autoscalers whose selector could not be compiled never become candidates,
/// so they match nothing.
#[derive(Clone, Debug)]
pub struct VpaWithSelector {
    pub vpa: Arc<VerticalPodAutoscaler>,
    pub selector: k8s::Selector,
}

/// The desired state of an autoscaler's status.
#[derive(Clone, Debug, PartialEq)]
pub struct Vpa {
    pub id: VpaId,
    pub recommendation: Option<RecommendedPodResources>,
    pub conditions: Conditions,
}

// === impl VpaId ===

impl VpaId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl From<&VerticalPodAutoscaler> for VpaId {
    fn from(vpa: &VerticalPodAutoscaler) -> Self {
        Self::new(vpa.namespace().unwrap_or_default(), vpa.name_any())
    }
}

impl std::fmt::Display for VpaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

// === impl VpaWithSelector ===

impl VpaWithSelector {
    pub fn new(vpa: impl Into<Arc<VerticalPodAutoscaler>>, selector: k8s::Selector) -> Self {
        Self {
            vpa: vpa.into(),
            selector,
        }
    }
}

// === impl Vpa ===

impl Vpa {
    pub fn new(id: VpaId) -> Self {
        Self {
            id,
            recommendation: None,
            conditions: Conditions::default(),
        }
    }

    /// Seeds the model from the persisted resource. Recommendations for
    /// containers whose scaling is turned off are dropped.
    pub fn from_resource(vpa: &VerticalPodAutoscaler) -> Self {
        let status = vpa.status.as_ref();
        let policy = vpa.spec.resource_policy.as_ref();
        Self {
            id: VpaId::from(vpa),
            recommendation: status
                .and_then(|s| s.recommendation.as_ref())
                .map(|r| container_policy::filter_recommendation(r, policy)),
            conditions: status
                .map(|s| s.conditions().iter().collect())
                .unwrap_or_default(),
        }
    }

    pub fn has_recommendation(&self) -> bool {
        self.recommendation
            .as_ref()
            .map_or(false, |r| !r.container_recommendations.is_empty())
    }

    pub fn update_conditions(&mut self, pods_matched: bool) {
        self.update_conditions_at(pods_matched, Utc::now())
    }

    /// Records whether any pod is governed by this autoscaler and whether it
    /// carries a recommendation.
    pub fn update_conditions_at(&mut self, pods_matched: bool, now: DateTime<Utc>) {
        let (reason, message) = if pods_matched {
            self.conditions.remove(ConditionType::NoPodsMatched);
            ("", "")
        } else {
            self.conditions.set_at(
                ConditionType::NoPodsMatched,
                true,
                NO_PODS_MATCHED_REASON,
                NO_PODS_MATCHED_MESSAGE,
                now,
            );
            (NO_PODS_MATCHED_REASON, NO_PODS_MATCHED_MESSAGE)
        };

        if self.has_recommendation() {
            self.conditions
                .set_at(ConditionType::RecommendationProvided, true, "", "", now);
        } else {
            self.conditions.set_at(
                ConditionType::RecommendationProvided,
                false,
                reason,
                message,
                now,
            );
        }
    }

    /// Renders the full desired status.
    pub fn as_status(&self) -> VerticalPodAutoscalerStatus {
        VerticalPodAutoscalerStatus {
            recommendation: self.recommendation.clone(),
            conditions: Some(self.conditions.to_list()).filter(|c| !c.is_empty()),
        }
    }
}
