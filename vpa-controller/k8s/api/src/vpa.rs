use crate::{Quantity, Time};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

pub type ResourceList = BTreeMap<String, Quantity>;

/// Configures how the resources of a set of pods are autoscaled.
#[derive(Clone, Debug, PartialEq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "autoscaling.k8s.io",
    version = "v1",
    kind = "VerticalPodAutoscaler",
    status = "VerticalPodAutoscalerStatus",
    shortname = "vpa",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct VerticalPodAutoscalerSpec {
    /// The workload controller whose pod selector determines the governed pods.
    pub target_ref: Option<TargetRef>,
    pub update_policy: Option<PodUpdatePolicy>,
    pub resource_policy: Option<PodResourcePolicy>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TargetRef {
    pub api_version: Option<String>,
    pub kind: String,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PodUpdatePolicy {
    pub update_mode: Option<UpdateMode>,
    pub min_replicas: Option<i32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub enum UpdateMode {
    Off,
    Initial,
    Recreate,
    #[default]
    Auto,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PodResourcePolicy {
    #[serde(default)]
    pub container_policies: Vec<ContainerResourcePolicy>,
}

/// Bounds applied to the recommendation of one container, or of every
/// container without a rule of its own.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContainerResourcePolicy {
    pub container_name: ContainerName,
    pub mode: Option<ContainerScalingMode>,
    pub min_allowed: Option<ResourceList>,
    pub max_allowed: Option<ResourceList>,
    pub controlled_resources: Option<Vec<String>>,
    pub controlled_values: Option<ContainerControlledValues>,
}

/// Binds a container policy to a named container or to all containers that
/// have no policy of their own. `Default` is spelled `"*"` on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum ContainerName {
    Specific(String),
    Default,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub enum ContainerScalingMode {
    #[default]
    Auto,
    Off,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub enum ContainerControlledValues {
    #[default]
    RequestsAndLimits,
    RequestsOnly,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerticalPodAutoscalerStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<RecommendedPodResources>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<VerticalPodAutoscalerCondition>>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedPodResources {
    #[serde(default)]
    pub container_recommendations: Vec<RecommendedContainerResources>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedContainerResources {
    pub container_name: String,
    pub target: ResourceList,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<ResourceList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<ResourceList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uncapped_target: Option<ResourceList>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerticalPodAutoscalerCondition {
    #[serde(rename = "type")]
    pub type_: ConditionType,
    pub status: ConditionStatus,
    pub last_transition_time: Option<Time>,
    pub reason: Option<String>,
    pub message: Option<String>,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize, JsonSchema,
)]
pub enum ConditionType {
    RecommendationProvided,
    LowConfidence,
    NoPodsMatched,
    FetchingHistory,
    ConfigDeprecated,
    ConfigUnsupported,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

// === impl ContainerName ===

impl ContainerName {
    const DEFAULT: &'static str = "*";

    pub fn named(name: impl Into<String>) -> Self {
        Self::Specific(name.into())
    }
}

impl From<String> for ContainerName {
    fn from(name: String) -> Self {
        if name == Self::DEFAULT {
            Self::Default
        } else {
            Self::Specific(name)
        }
    }
}

impl From<ContainerName> for String {
    fn from(name: ContainerName) -> Self {
        match name {
            ContainerName::Specific(name) => name,
            ContainerName::Default => ContainerName::DEFAULT.to_string(),
        }
    }
}

impl fmt::Display for ContainerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Specific(name) => name.fmt(f),
            Self::Default => Self::DEFAULT.fmt(f),
        }
    }
}

impl JsonSchema for ContainerName {
    fn schema_name() -> String {
        "ContainerName".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(gen)
    }
}

// === impl ConditionStatus ===

impl From<bool> for ConditionStatus {
    fn from(status: bool) -> Self {
        if status {
            Self::True
        } else {
            Self::False
        }
    }
}

// === impl ContainerResourcePolicy ===

impl ContainerResourcePolicy {
    pub fn new(container_name: ContainerName) -> Self {
        Self {
            container_name,
            mode: None,
            min_allowed: None,
            max_allowed: None,
            controlled_resources: None,
            controlled_values: None,
        }
    }
}

// === impl VerticalPodAutoscalerStatus ===

impl VerticalPodAutoscalerStatus {
    pub fn container_recommendations(&self) -> &[RecommendedContainerResources] {
        self.recommendation
            .as_ref()
            .map(|r| r.container_recommendations.as_slice())
            .unwrap_or_default()
    }

    pub fn conditions(&self) -> &[VerticalPodAutoscalerCondition] {
        self.conditions.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_name_wildcard_round_trips() {
        let policy: ContainerResourcePolicy = serde_json::from_value(serde_json::json!({
            "containerName": "*",
            "mode": "Off",
        }))
        .unwrap();
        assert_eq!(policy.container_name, ContainerName::Default);
        assert_eq!(policy.mode, Some(ContainerScalingMode::Off));

        let value = serde_json::to_value(&policy).unwrap();
        assert_eq!(value["containerName"], "*");
    }

    #[test]
    fn deserializes_resource() {
        let vpa: VerticalPodAutoscaler = serde_json::from_value(serde_json::json!({
            "apiVersion": "autoscaling.k8s.io/v1",
            "kind": "VerticalPodAutoscaler",
            "metadata": { "name": "web", "namespace": "ns-0" },
            "spec": {
                "targetRef": { "apiVersion": "apps/v1", "kind": "Deployment", "name": "web" },
                "updatePolicy": { "updateMode": "Initial" },
                "resourcePolicy": {
                    "containerPolicies": [
                        { "containerName": "app", "minAllowed": { "cpu": "100m" } },
                        { "containerName": "*", "maxAllowed": { "memory": "1Gi" } },
                    ],
                },
            },
            "status": {
                "recommendation": {
                    "containerRecommendations": [
                        { "containerName": "app", "target": { "cpu": "250m", "memory": "200Mi" } },
                    ],
                },
                "conditions": [
                    { "type": "RecommendationProvided", "status": "True", "lastTransitionTime": "2024-01-01T00:00:00Z" },
                ],
            },
        }))
        .unwrap();

        let policies = &vpa.spec.resource_policy.as_ref().unwrap().container_policies;
        assert_eq!(policies[0].container_name, ContainerName::named("app"));
        assert_eq!(policies[1].container_name, ContainerName::Default);
        assert_eq!(
            vpa.spec.update_policy.and_then(|p| p.update_mode),
            Some(UpdateMode::Initial)
        );

        let status = vpa.status.unwrap();
        assert_eq!(status.container_recommendations()[0].container_name, "app");
        assert_eq!(
            status.conditions()[0].type_,
            ConditionType::RecommendationProvided
        );
        assert_eq!(status.conditions()[0].status, ConditionStatus::True);
    }
}
